// Excel import via calamine, first worksheet only

use std::io::Cursor;

use calamine::{Data, Reader, Xls, Xlsx};
use tabchat_engine::{Column, Table, Value};

use crate::error::{FormatHint, ImportError};

/// Import spreadsheet bytes. The first worksheet's first row is the
/// header; remaining rows are data.
pub fn import_bytes(bytes: &[u8], hint: FormatHint) -> Result<Table, ImportError> {
    let range = match hint {
        FormatHint::Xlsx => {
            let mut workbook = Xlsx::new(Cursor::new(bytes))
                .map_err(|e| ImportError::UnsupportedFormat(e.to_string()))?;
            workbook
                .worksheet_range_at(0)
                .ok_or_else(|| ImportError::Parse("workbook has no sheets".to_string()))?
                .map_err(|e| ImportError::Parse(e.to_string()))?
        }
        FormatHint::Xls => {
            let mut workbook = Xls::new(Cursor::new(bytes))
                .map_err(|e| ImportError::UnsupportedFormat(e.to_string()))?;
            workbook
                .worksheet_range_at(0)
                .ok_or_else(|| ImportError::Parse("workbook has no sheets".to_string()))?
                .map_err(|e| ImportError::Parse(e.to_string()))?
        }
        FormatHint::Csv | FormatHint::Tsv => {
            return Err(ImportError::UnsupportedFormat(
                "not a spreadsheet format".to_string(),
            ))
        }
    };

    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| ImportError::Parse("empty sheet".to_string()))?;
    let names = crate::csv::header_names(header.iter().map(cell_text));

    let mut columns: Vec<Vec<Value>> = vec![Vec::new(); names.len()];
    for row in rows {
        for (i, col) in columns.iter_mut().enumerate() {
            col.push(row.get(i).map_or(Value::Null, cell_value));
        }
    }

    let columns = names
        .into_iter()
        .zip(columns)
        .map(|(name, values)| Column::new(name, values))
        .collect();
    Table::new(columns).map_err(|e| ImportError::Parse(e.to_string()))
}

/// Header cell as text, regardless of its stored type.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Empty => String::new(),
        other => format!("{other}"),
    }
}

/// Map one calamine cell to a table value. Dates come through as their
/// Excel serial number; error cells import as null.
fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty | Data::Error(_) => Value::Null,
        Data::Float(f) => Value::Number(*f),
        Data::Int(i) => Value::Number(*i as f64),
        Data::Bool(b) => Value::Text(b.to_string()),
        Data::String(s) => {
            if s.trim().is_empty() {
                Value::Null
            } else {
                Value::Text(s.clone())
            }
        }
        Data::DateTime(dt) => Value::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Value::Text(s.clone()),
    }
}
