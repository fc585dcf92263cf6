//! Transition function and per-conversation registry.
//!
//! `step` is pure over (state, event): it returns the successor state and
//! a reply for the rendering layer. Events that fail their state's guard
//! are ignored — same state back, `Reply::Ignored`, no side effect. That
//! is policy, not an omission.

use std::collections::HashMap;
use std::sync::Mutex;

use tabchat_engine::{render, transform};

use crate::source::ExternalSource;
use crate::state::{ExploreState, MenuContext};

// ---------------------------------------------------------------------------
// Events and replies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuOption {
    Info,
    Missing,
    Duplicates,
    Search,
}

impl MenuOption {
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "info" => Some(Self::Info),
            "missing" => Some(Self::Missing),
            "duplicates" => Some(Self::Duplicates),
            "search" => Some(Self::Search),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// User asked to connect to the external store.
    Begin,
    /// Connection string supplied.
    Uri(String),
    /// Table picked from the presented list.
    TableChoice(String),
    /// Menu option picked.
    MenuChoice(MenuOption),
    /// Search column picked.
    ColumnChoice(String),
    /// Search term supplied.
    Term(String),
}

/// What the transition produced, handed to the rendering collaborator.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Ask the user for the connection string.
    PromptUri,
    /// Connected; offer these tables.
    Tables(Vec<String>),
    /// Table loaded; menu is now active.
    TableLoaded { name: String, rows: usize, cols: usize },
    /// Preformatted text block (preview, missing report, duplicates).
    Report(String),
    /// Offer these columns for the search flow.
    Columns(Vec<String>),
    /// Column recorded; ask for the term.
    PromptTerm { column: String },
    /// Search executed; preformatted matches or "no matches".
    SearchResults(String),
    /// Connection or query failure, reported to the user.
    Failed(String),
    /// Event did not fit the current state; nothing happened.
    Ignored,
}

/// Output caps, supplied by the boundary layer's settings.
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    pub preview_rows: usize,
    pub search_limit: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self { preview_rows: 5, search_limit: 5 }
    }
}

// ---------------------------------------------------------------------------
// Transition function
// ---------------------------------------------------------------------------

pub fn step(state: ExploreState, event: Event, limits: &Limits) -> (ExploreState, Reply) {
    match (state, event) {
        // Begin supersedes whatever was in flight; dropping the old state
        // releases its connection.
        (_, Event::Begin) => (ExploreState::AwaitingUri, Reply::PromptUri),

        (ExploreState::AwaitingUri, Event::Uri(uri)) => connect(&uri),

        (ExploreState::AwaitingTable { source, tables }, Event::TableChoice(name)) => {
            if !tables.iter().any(|t| t == &name) {
                return (
                    ExploreState::AwaitingTable { source, tables },
                    Reply::Ignored,
                );
            }
            match source.load_table(&name) {
                Ok(table) => {
                    log::info!(
                        "explore: loaded table '{}' ({} rows, {} cols)",
                        name,
                        table.row_count(),
                        table.column_count()
                    );
                    let reply = Reply::TableLoaded {
                        name: name.clone(),
                        rows: table.row_count(),
                        cols: table.column_count(),
                    };
                    (
                        ExploreState::Menu(MenuContext { source, table_name: name, table }),
                        reply,
                    )
                }
                Err(e) => {
                    log::warn!("explore: loading table '{name}' failed: {e}");
                    (
                        ExploreState::AwaitingTable { source, tables },
                        Reply::Failed(e.to_string()),
                    )
                }
            }
        }

        (ExploreState::Menu(ctx), Event::MenuChoice(option)) => menu(ctx, option, limits),

        (ExploreState::AwaitingSearchColumn(ctx), Event::ColumnChoice(column)) => {
            if ctx.table.column(&column).is_none() {
                return (ExploreState::AwaitingSearchColumn(ctx), Reply::Ignored);
            }
            let reply = Reply::PromptTerm { column: column.clone() };
            (ExploreState::AwaitingSearchTerm { ctx, column }, reply)
        }

        (ExploreState::AwaitingSearchTerm { ctx, column }, Event::Term(term)) => {
            match ctx.source.search(&ctx.table_name, &column, &term, limits.search_limit) {
                Ok(matches) => {
                    let text = if matches.is_empty() {
                        "no matches".to_string()
                    } else {
                        render::preview(&matches, limits.search_limit)
                    };
                    (ExploreState::Menu(ctx), Reply::SearchResults(text))
                }
                Err(e) => {
                    log::warn!("explore: search on '{}' failed: {e}", ctx.table_name);
                    (ExploreState::Menu(ctx), Reply::Failed(e.to_string()))
                }
            }
        }

        // Guard failure: event does not fit the state
        (state, _) => (state, Reply::Ignored),
    }
}

fn connect(uri: &str) -> (ExploreState, Reply) {
    let source = match ExternalSource::connect(uri) {
        Ok(source) => source,
        Err(e) => {
            log::warn!("explore: connection to '{uri}' failed: {e}");
            return (ExploreState::Idle, Reply::Failed(e.to_string()));
        }
    };
    match source.table_names() {
        Ok(tables) => {
            log::info!("explore: connected to '{uri}', {} tables", tables.len());
            let reply = Reply::Tables(tables.clone());
            (ExploreState::AwaitingTable { source, tables }, reply)
        }
        Err(e) => {
            log::warn!("explore: enumerating tables on '{uri}' failed: {e}");
            (ExploreState::Idle, Reply::Failed(e.to_string()))
        }
    }
}

fn menu(ctx: MenuContext, option: MenuOption, limits: &Limits) -> (ExploreState, Reply) {
    match option {
        MenuOption::Info => {
            let text = render::preview(&ctx.table, limits.preview_rows);
            (ExploreState::Menu(ctx), Reply::Report(text))
        }
        MenuOption::Missing => {
            let text = render::missing_text(&transform::missing_report(&ctx.table));
            (ExploreState::Menu(ctx), Reply::Report(text))
        }
        MenuOption::Duplicates => {
            let dups = transform::duplicate_rows(&ctx.table);
            let text = if dups.is_empty() {
                "no duplicates".to_string()
            } else {
                render::preview(&dups, limits.preview_rows)
            };
            (ExploreState::Menu(ctx), Reply::Report(text))
        }
        MenuOption::Search => {
            let columns: Vec<String> =
                ctx.table.column_names().iter().map(|s| (*s).to_string()).collect();
            (
                ExploreState::AwaitingSearchColumn(ctx),
                Reply::Columns(columns),
            )
        }
    }
}

// ---------------------------------------------------------------------------
// Per-conversation registry
// ---------------------------------------------------------------------------

/// Conversation-keyed state map. One event is processed at a time per
/// conversation; different conversations do not interfere.
pub struct Conversations {
    inner: Mutex<HashMap<String, ExploreState>>,
    limits: Limits,
}

impl Conversations {
    pub fn new(limits: Limits) -> Self {
        Self { inner: Mutex::new(HashMap::new()), limits }
    }

    /// Run one transition for this conversation. Unknown conversations
    /// start at `Idle`.
    ///
    /// The registry lock is not held across the transition: connect, load,
    /// and search block on the external store, and one stuck conversation
    /// must not stall the others.
    pub fn handle(&self, conversation: &str, event: Event) -> Reply {
        let state = {
            let mut map = self.inner.lock().expect("conversation registry lock");
            map.remove(conversation).unwrap_or_default()
        };
        let (next, reply) = step(state, event, &self.limits);
        // Idle carries no context; keeping it out of the map lets reset
        // and expiry stay trivial
        if !matches!(next, ExploreState::Idle) {
            let mut map = self.inner.lock().expect("conversation registry lock");
            map.insert(conversation.to_string(), next);
        }
        reply
    }

    /// Drop a conversation's state (and any connection it owns).
    /// Returns whether there was one.
    pub fn reset(&self, conversation: &str) -> bool {
        let mut map = self.inner.lock().expect("conversation registry lock");
        map.remove(conversation).is_some()
    }

    /// Current state name, for diagnostics and tests.
    pub fn state_name(&self, conversation: &str) -> &'static str {
        let map = self.inner.lock().expect("conversation registry lock");
        map.get(conversation).map_or("idle", ExploreState::name)
    }
}
