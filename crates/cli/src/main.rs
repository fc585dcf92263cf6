// tabchat: exercise the data-exploration core from the command line.
// The chat transport is out of scope; this binary plays the dispatcher
// for one local user.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tabchat_explore::{Event, MenuOption, Reply};
use tabchat_io::FormatHint;
use tabchat_session::{Service, Settings, TransformOp, TransformOutput};

const USER: &str = "local";
const CONVERSATION: &str = "local";

#[derive(Parser)]
#[command(name = "tabchat", version, about = "Conversational data exploration, headless")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Summarize a dataset: shape, statistics, missing values
    Describe { file: PathBuf },
    /// Show the first rows of a dataset
    Head {
        file: PathBuf,
        #[arg(short = 'n', long, default_value_t = 5)]
        rows: usize,
    },
    /// Apply cleanup transforms and write the result as CSV
    Clean {
        file: PathBuf,
        /// Fill missing values: `median`, a number, or any string
        #[arg(long)]
        fill: Option<String>,
        /// Drop rows that duplicate an earlier row
        #[arg(long)]
        drop_duplicates: bool,
        /// Drop IQR outlier rows
        #[arg(long)]
        drop_outliers: bool,
        /// Output path; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Interactively explore a SQLite database
    Explore { database: String },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<(), String> {
    match command {
        Command::Describe { file } => {
            let service = Service::new(Settings::load());
            let summary = load(&service, &file)?;
            println!("columns: {}", summary.columns.join(", "));
            println!("size: {} rows, {} columns", summary.rows, summary.cols);
            if let Some(describe) = summary.describe {
                println!("\nstatistics:\n{describe}");
            }
            println!("\nmissing values:\n{}", summary.missing);
            Ok(())
        }
        Command::Head { file, rows } => {
            let settings = Settings { preview_rows: rows, ..Settings::load() };
            let service = Service::new(settings);
            load(&service, &file)?;
            let output = service
                .run_transform(USER, &TransformOp::Head)
                .map_err(|e| e.to_string())?;
            print_output(output);
            Ok(())
        }
        Command::Clean { file, fill, drop_duplicates, drop_outliers, output } => {
            let service = Service::new(Settings::load());
            load(&service, &file)?;

            let mut ops = Vec::new();
            if let Some(spec) = fill {
                ops.push(TransformOp::FillMissing(spec));
            }
            if drop_duplicates {
                ops.push(TransformOp::Duplicates { remove: true });
            }
            if drop_outliers {
                ops.push(TransformOp::Outliers { remove: true });
            }
            if ops.is_empty() {
                return Err("nothing to do: pass --fill, --drop-duplicates, or --drop-outliers".into());
            }
            for op in &ops {
                match service.run_transform(USER, op) {
                    Ok(TransformOutput::Report(text)) => eprintln!("{text}"),
                    Ok(_) => {}
                    Err(e) => return Err(e.to_string()),
                }
            }

            let bytes = service.export_dataset(USER).map_err(|e| e.to_string())?;
            match output {
                Some(path) => std::fs::write(&path, bytes).map_err(|e| e.to_string())?,
                None => io::stdout().write_all(&bytes).map_err(|e| e.to_string())?,
            }
            Ok(())
        }
        Command::Explore { database } => explore_repl(&database),
    }
}

fn load(service: &Service, file: &Path) -> Result<tabchat_session::LoadSummary, String> {
    let name = file
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| format!("bad file name: {}", file.display()))?;
    let hint = FormatHint::from_name(name)
        .ok_or_else(|| format!("unsupported format: {name} (csv, tsv, xlsx, xls)"))?;
    let bytes = std::fs::read(file).map_err(|e| e.to_string())?;
    service
        .load_dataset(USER, &bytes, hint)
        .map_err(|e| e.to_string())
}

fn print_output(output: TransformOutput) {
    match output {
        TransformOutput::Report(text) => println!("{text}"),
        TransformOutput::Series { column, points } => {
            println!("series for '{column}':");
            for (index, value) in points {
                println!("{index}\t{value}");
            }
        }
        TransformOutput::Matrix(corr) => {
            println!("{}", tabchat_engine::render::correlation_text(&corr));
        }
    }
}

/// What kind of input the REPL should wrap the next line in, tracked from
/// the machine's replies.
#[derive(Clone, Copy)]
enum Mode {
    Table,
    Menu,
    Column,
    Term,
}

fn explore_repl(database: &str) -> Result<(), String> {
    let service = Service::new(Settings::load());
    service.explore(CONVERSATION, Event::Begin);

    let reply = service.explore(CONVERSATION, Event::Uri(database.to_string()));
    let mut mode = match &reply {
        Reply::Tables(_) => Mode::Table,
        Reply::Failed(message) => return Err(message.clone()),
        other => return Err(format!("unexpected reply: {other:?}")),
    };
    show(&reply);

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.map_err(|e| e.to_string())?;
        let token = line.trim();
        if token.is_empty() {
            continue;
        }
        if token == "quit" || token == "exit" {
            break;
        }

        let event = match mode {
            Mode::Table => Event::TableChoice(token.to_string()),
            Mode::Menu => match MenuOption::parse(token) {
                Some(option) => Event::MenuChoice(option),
                None => {
                    eprintln!("options: info, missing, duplicates, search, quit");
                    continue;
                }
            },
            Mode::Column => Event::ColumnChoice(token.to_string()),
            Mode::Term => Event::Term(token.to_string()),
        };

        let reply = service.explore(CONVERSATION, event);
        mode = match &reply {
            Reply::Tables(_) => Mode::Table,
            Reply::Columns(_) => Mode::Column,
            Reply::PromptTerm { .. } => Mode::Term,
            Reply::Ignored => {
                eprintln!("input does not fit the current step; try again");
                mode
            }
            // A failed table load leaves the machine waiting for a table
            Reply::Failed(_) => match mode {
                Mode::Table => Mode::Table,
                _ => Mode::Menu,
            },
            _ => Mode::Menu,
        };
        show(&reply);
    }
    Ok(())
}

fn show(reply: &Reply) {
    match reply {
        Reply::PromptUri => println!("send the database path:"),
        Reply::Tables(tables) => {
            println!("connected; pick a table:");
            for table in tables {
                println!("  {table}");
            }
        }
        Reply::TableLoaded { name, rows, cols } => {
            println!("table '{name}' loaded: {rows} rows, {cols} columns");
            println!("menu: info | missing | duplicates | search");
        }
        Reply::Report(text) | Reply::SearchResults(text) => {
            println!("{text}");
            println!("menu: info | missing | duplicates | search");
        }
        Reply::Columns(columns) => {
            println!("pick a column to search:");
            for column in columns {
                println!("  {column}");
            }
        }
        Reply::PromptTerm { column } => println!("enter the search term for '{column}':"),
        Reply::Failed(message) => println!("failed: {message}"),
        Reply::Ignored => {}
    }
}
