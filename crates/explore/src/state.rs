//! Conversation states for the guided exploration flow.
//!
//! One tagged variant per state, each carrying exactly the context its
//! successor transitions need. Returning to `Idle` drops the variant and
//! with it the connection it owned.

use tabchat_engine::Table;

use crate::source::ExternalSource;

/// Context shared by every post-selection state: the live connection, the
/// chosen table's name, and its loaded snapshot.
#[derive(Debug)]
pub struct MenuContext {
    pub source: ExternalSource,
    pub table_name: String,
    pub table: Table,
}

#[derive(Debug, Default)]
pub enum ExploreState {
    #[default]
    Idle,
    /// Connection prompt sent, waiting for the connection string.
    AwaitingUri,
    /// Connected; waiting for the user to pick one of `tables`.
    AwaitingTable {
        source: ExternalSource,
        tables: Vec<String>,
    },
    /// Table loaded, menu presented.
    Menu(MenuContext),
    /// Search flow: waiting for the column pick.
    AwaitingSearchColumn(MenuContext),
    /// Search flow: column picked, waiting for the term.
    AwaitingSearchTerm { ctx: MenuContext, column: String },
}

impl ExploreState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AwaitingUri => "awaiting_uri",
            Self::AwaitingTable { .. } => "awaiting_table",
            Self::Menu(_) => "menu",
            Self::AwaitingSearchColumn(_) => "awaiting_search_column",
            Self::AwaitingSearchTerm { .. } => "awaiting_search_term",
        }
    }
}
