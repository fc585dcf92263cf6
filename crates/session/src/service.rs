//! Boundary service: maps inbound events onto store, engine, io, and
//! exploration calls.
//!
//! One method per inbound event shape. Mutating transforms commit the new
//! snapshot only after the operation succeeds; no error path leaves a
//! partially mutated table in the store.

use serde::Serialize;

use tabchat_engine::transform::{
    self, Correlation, FillOutcome, FillSpec, OutlierMode,
};
use tabchat_engine::{render, Table};
use tabchat_explore::{Conversations, Event, Limits, Reply};
use tabchat_io::FormatHint;

use crate::error::ServiceError;
use crate::settings::Settings;
use crate::store::SessionStore;

// ---------------------------------------------------------------------------
// Request/response shapes
// ---------------------------------------------------------------------------

/// Reply to a successful dataset upload, mirroring what the user sees:
/// column list, shape, statistics, missing counts.
#[derive(Debug, Clone, Serialize)]
pub struct LoadSummary {
    pub columns: Vec<String>,
    pub rows: usize,
    pub cols: usize,
    /// Absent when the dataset has no numeric statistics to show.
    pub describe: Option<String>,
    pub missing: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransformOp {
    Describe,
    Missing,
    /// First-rows preview.
    Head,
    Duplicates { remove: bool },
    Outliers { remove: bool },
    /// The raw user token: `median`, a number, or any string.
    FillMissing(String),
    LineSeries(String),
    CorrelationMatrix,
}

/// Transform result handed to the rendering collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformOutput {
    /// Preformatted text block.
    Report(String),
    /// Plot data for one column.
    Series { column: String, points: Vec<(usize, f64)> },
    /// Pairwise correlation data.
    Matrix(Correlation),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetOutcome {
    Cleared,
    NothingToReset,
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

pub struct Service {
    store: SessionStore,
    conversations: Conversations,
    settings: Settings,
}

impl Default for Service {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl Service {
    pub fn new(settings: Settings) -> Self {
        let limits = Limits {
            preview_rows: settings.preview_rows,
            search_limit: settings.search_limit,
        };
        Self {
            store: SessionStore::new(),
            conversations: Conversations::new(limits),
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Parse uploaded bytes, replace the user's session, and summarize.
    pub fn load_dataset(
        &self,
        user: &str,
        bytes: &[u8],
        hint: FormatHint,
    ) -> Result<LoadSummary, ServiceError> {
        let table = tabchat_io::import(bytes, hint)?;
        let summary = summarize(&table);
        log::info!(
            "user {user}: loaded dataset ({} rows, {} cols)",
            summary.rows,
            summary.cols
        );
        self.store.put(user, table);
        Ok(summary)
    }

    /// Run one transform against the user's current snapshot. Mutating
    /// operations commit their result before returning.
    pub fn run_transform(
        &self,
        user: &str,
        op: &TransformOp,
    ) -> Result<TransformOutput, ServiceError> {
        let table = self.store.get(user).ok_or(ServiceError::SessionNotFound)?;
        let preview_rows = self.settings.preview_rows;

        match op {
            TransformOp::Describe => {
                let report = transform::describe(&table)?;
                Ok(TransformOutput::Report(render::describe_text(&report)))
            }
            TransformOp::Missing => Ok(TransformOutput::Report(render::missing_text(
                &transform::missing_report(&table),
            ))),
            TransformOp::Head => Ok(TransformOutput::Report(render::preview(
                &table,
                preview_rows,
            ))),
            TransformOp::Duplicates { remove } => {
                let count = transform::count_duplicates(&table);
                if count == 0 {
                    return Ok(TransformOutput::Report("no duplicates found".to_string()));
                }
                if *remove {
                    let cleaned = transform::remove_duplicates(&table);
                    let remaining = cleaned.row_count();
                    self.store.put(user, cleaned);
                    log::info!("user {user}: removed {count} duplicate row(s)");
                    Ok(TransformOutput::Report(format!(
                        "removed {count} duplicate row(s); {remaining} row(s) remain"
                    )))
                } else {
                    Ok(TransformOutput::Report(format!(
                        "found {count} duplicate row(s)"
                    )))
                }
            }
            TransformOp::Outliers { remove } => {
                let mode = if *remove { OutlierMode::Remove } else { OutlierMode::Preview };
                let report = transform::detect_outliers(&table, mode)?;
                match report.table {
                    Some(cleaned) => {
                        let removed = report.rows_removed;
                        let remaining = cleaned.row_count();
                        self.store.put(user, cleaned);
                        log::info!("user {user}: removed {removed} outlier row(s)");
                        Ok(TransformOutput::Report(format!(
                            "removed {removed} outlier row(s); {remaining} row(s) remain"
                        )))
                    }
                    None => Ok(TransformOutput::Report(format!(
                        "the IQR method would remove {} row(s)",
                        report.rows_removed
                    ))),
                }
            }
            TransformOp::FillMissing(token) => {
                let spec = FillSpec::parse(token);
                let (filled, outcome) = transform::fill_missing(&table, &spec);
                let message = match &outcome {
                    FillOutcome::MedianNoNumeric => {
                        // No-op by definition; nothing to commit
                        return Ok(TransformOutput::Report(
                            "no numeric columns to fill with median".to_string(),
                        ));
                    }
                    FillOutcome::Median { columns } => format!(
                        "filled missing values in numeric column(s) with medians: {}",
                        columns.join(", ")
                    ),
                    FillOutcome::Number(n) => {
                        format!("filled missing values with number {n}")
                    }
                    FillOutcome::Text(s) => {
                        format!("filled missing values with string '{s}'")
                    }
                };
                self.store.put(user, filled);
                Ok(TransformOutput::Report(message))
            }
            TransformOp::LineSeries(column) => {
                let points = transform::line_series(&table, column)?;
                Ok(TransformOutput::Series { column: column.clone(), points })
            }
            TransformOp::CorrelationMatrix => {
                Ok(TransformOutput::Matrix(transform::correlation_matrix(&table)))
            }
        }
    }

    /// Serialize the current snapshot as CSV bytes.
    pub fn export_dataset(&self, user: &str) -> Result<Vec<u8>, ServiceError> {
        let table = self.store.get(user).ok_or(ServiceError::SessionNotFound)?;
        if table.is_empty() {
            return Err(ServiceError::EmptyTable);
        }
        tabchat_io::csv::export_bytes(&table).map_err(ServiceError::ParseError)
    }

    pub fn reset_session(&self, user: &str) -> ResetOutcome {
        if self.store.clear(user) {
            log::info!("user {user}: session reset");
            ResetOutcome::Cleared
        } else {
            ResetOutcome::NothingToReset
        }
    }

    /// One exploration state-machine transition for this conversation.
    pub fn explore(&self, conversation: &str, event: Event) -> Reply {
        self.conversations.handle(conversation, event)
    }

    /// Drop a conversation's exploration context (and its connection).
    pub fn reset_conversation(&self, conversation: &str) -> bool {
        self.conversations.reset(conversation)
    }

    /// Sweep sessions idle past the configured TTL. The host decides when
    /// to call this; nothing expires mid-operation.
    pub fn evict_idle_sessions(&self) -> usize {
        self.store.evict_idle(self.settings.session_ttl())
    }
}

fn summarize(table: &Table) -> LoadSummary {
    let describe = transform::describe(table)
        .ok()
        .map(|report| render::describe_text(&report));
    LoadSummary {
        columns: table.column_names().iter().map(|s| (*s).to_string()).collect(),
        rows: table.row_count(),
        cols: table.column_count(),
        describe,
        missing: render::missing_text(&transform::missing_report(table)),
    }
}
