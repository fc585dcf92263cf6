use std::fmt;

/// Upload format, resolved by the boundary layer from a filename or MIME
/// type before the bytes reach this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatHint {
    Csv,
    Tsv,
    Xlsx,
    Xls,
}

impl FormatHint {
    /// Resolve from a file name's extension. Unknown extensions are the
    /// caller's `UnsupportedFormat` case.
    pub fn from_name(name: &str) -> Option<Self> {
        let ext = name.rsplit('.').next()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(Self::Csv),
            "tsv" => Some(Self::Tsv),
            "xlsx" => Some(Self::Xlsx),
            "xls" => Some(Self::Xls),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImportError {
    /// The format is recognized but the payload cannot be read as it.
    Parse(String),
    /// Format not recognized (bad hint, unreadable container).
    UnsupportedFormat(String),
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "parse error: {msg}"),
            Self::UnsupportedFormat(msg) => write!(f, "unsupported format: {msg}"),
        }
    }
}

impl std::error::Error for ImportError {}
