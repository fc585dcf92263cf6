use std::fmt;

use tabchat_engine::EngineError;
use tabchat_explore::ExploreError;
use tabchat_io::ImportError;

/// Boundary-level error kinds. Every one is recoverable and local: it is
/// reported back to the requesting conversation and never terminates the
/// session or the process. The stored table is left unchanged by any
/// failed operation.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceError {
    SessionNotFound,
    EmptyTable,
    UnsupportedFormat(String),
    ParseError(String),
    UnknownColumn(String),
    NoNumericColumns,
    ConnectionFailed(String),
    QueryFailed(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SessionNotFound => write!(f, "no dataset loaded for this user"),
            Self::EmptyTable => write!(f, "the dataset has no rows"),
            Self::UnsupportedFormat(msg) => write!(f, "unsupported format: {msg}"),
            Self::ParseError(msg) => write!(f, "could not parse dataset: {msg}"),
            Self::UnknownColumn(name) => write!(f, "unknown column: {name}"),
            Self::NoNumericColumns => write!(f, "no numeric columns"),
            Self::ConnectionFailed(msg) => write!(f, "connection failed: {msg}"),
            Self::QueryFailed(msg) => write!(f, "query failed: {msg}"),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<EngineError> for ServiceError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::EmptyTable => Self::EmptyTable,
            EngineError::UnknownColumn(name) => Self::UnknownColumn(name),
            EngineError::NoNumericColumns => Self::NoNumericColumns,
            EngineError::Malformed(msg) => Self::ParseError(msg),
        }
    }
}

impl From<ImportError> for ServiceError {
    fn from(e: ImportError) -> Self {
        match e {
            ImportError::Parse(msg) => Self::ParseError(msg),
            ImportError::UnsupportedFormat(msg) => Self::UnsupportedFormat(msg),
        }
    }
}

impl From<ExploreError> for ServiceError {
    fn from(e: ExploreError) -> Self {
        match e {
            ExploreError::ConnectionFailed(msg) => Self::ConnectionFailed(msg),
            ExploreError::QueryFailed(msg) => Self::QueryFailed(msg),
        }
    }
}
