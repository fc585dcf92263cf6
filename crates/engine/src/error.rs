use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Table has no rows.
    EmptyTable,
    /// A named column does not exist in the table.
    UnknownColumn(String),
    /// Operation requires at least one numeric column.
    NoNumericColumns,
    /// Snapshot constructor rejected the input (ragged columns, duplicate names).
    Malformed(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTable => write!(f, "table has no rows"),
            Self::UnknownColumn(name) => write!(f, "unknown column: {name}"),
            Self::NoNumericColumns => write!(f, "no numeric columns"),
            Self::Malformed(msg) => write!(f, "malformed table: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}
