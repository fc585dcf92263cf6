// Dataset I/O: upload bytes in, Table snapshots out, CSV export back

pub mod csv;
pub mod error;
pub mod xlsx;

pub use error::{FormatHint, ImportError};

use tabchat_engine::Table;

/// Parse uploaded dataset bytes per the format hint.
pub fn import(bytes: &[u8], hint: FormatHint) -> Result<Table, ImportError> {
    match hint {
        FormatHint::Csv => csv::import_bytes(bytes, None),
        FormatHint::Tsv => csv::import_bytes(bytes, Some(b'\t')),
        FormatHint::Xlsx | FormatHint::Xls => xlsx::import_bytes(bytes, hint),
    }
}
