use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ExploreError {
    /// Could not open the external store or enumerate its tables.
    ConnectionFailed(String),
    /// A query against an established connection failed.
    QueryFailed(String),
}

impl fmt::Display for ExploreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectionFailed(msg) => write!(f, "connection failed: {msg}"),
            Self::QueryFailed(msg) => write!(f, "query failed: {msg}"),
        }
    }
}

impl std::error::Error for ExploreError {}
