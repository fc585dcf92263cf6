// CSV/TSV import and export over in-memory upload bytes

use tabchat_engine::{Column, Table, Value};

use crate::error::ImportError;

/// Tokens that import as null, compared case-insensitively.
const NULL_TOKENS: &[&str] = &["", "na", "nan", "null"];

/// Import delimiter-separated bytes. First record is the header row.
/// With no explicit delimiter the most plausible one is sniffed from the
/// leading lines.
pub fn import_bytes(bytes: &[u8], delimiter: Option<u8>) -> Result<Table, ImportError> {
    let content = decode_utf8(bytes);
    let delimiter = delimiter.unwrap_or_else(|| sniff_delimiter(&content));

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = reader.records();
    let header = match records.next() {
        Some(record) => record.map_err(|e| ImportError::Parse(e.to_string()))?,
        None => return Err(ImportError::Parse("empty file".to_string())),
    };
    let names = header_names(header.iter().map(String::from));

    let mut raw: Vec<Vec<String>> = vec![Vec::new(); names.len()];
    for record in records {
        let record = record.map_err(|e| ImportError::Parse(e.to_string()))?;
        for (i, cells) in raw.iter_mut().enumerate() {
            cells.push(record.get(i).unwrap_or("").to_string());
        }
    }

    let columns = names
        .into_iter()
        .zip(raw)
        .map(|(name, cells)| Column::new(name, type_cells(&cells)))
        .collect();
    Table::new(columns).map_err(|e| ImportError::Parse(e.to_string()))
}

/// Serialize the table to CSV bytes: header row then data rows, nulls as
/// empty fields, no index column.
pub fn export_bytes(table: &Table) -> Result<Vec<u8>, String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(table.column_names())
        .map_err(|e| e.to_string())?;
    for row in 0..table.row_count() {
        let record: Vec<String> = table.row(row).iter().map(|v| v.display()).collect();
        writer.write_record(&record).map_err(|e| e.to_string())?;
    }
    writer.into_inner().map_err(|e| e.to_string())
}

/// Decode upload bytes, trying UTF-8 first and falling back to
/// Windows-1252 (common for Excel-exported CSVs).
fn decode_utf8(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}

/// Detect the most likely field delimiter by checking consistency across
/// the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line.
/// The delimiter that produces the most consistent field count (>1 field)
/// wins.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        // Must produce >1 field on the first line to be viable
        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        // Score: (number of lines with same field count as line 1) * field_count
        // Higher field count breaks ties
        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Header names with duplicates disambiguated: `a, a, a` -> `a, a.1, a.2`.
/// Blank headers become positional `column_N` names. Shared with the
/// spreadsheet importer.
pub(crate) fn header_names(raw: impl Iterator<Item = String>) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for (i, name) in raw.enumerate() {
        let base = if name.trim().is_empty() {
            format!("column_{i}")
        } else {
            name.trim().to_string()
        };
        let mut candidate = base.clone();
        let mut suffix = 1;
        while names.contains(&candidate) {
            candidate = format!("{base}.{suffix}");
            suffix += 1;
        }
        names.push(candidate);
    }
    names
}

fn is_null_token(cell: &str) -> bool {
    NULL_TOKENS.iter().any(|t| cell.eq_ignore_ascii_case(t))
}

/// Type one column of raw cells: numeric when every non-null cell parses
/// as f64 (and at least one does), text otherwise.
fn type_cells(cells: &[String]) -> Vec<Value> {
    let mut numeric = false;
    for cell in cells {
        let cell = cell.trim();
        if is_null_token(cell) {
            continue;
        }
        if cell.parse::<f64>().is_ok() {
            numeric = true;
        } else {
            numeric = false;
            break;
        }
    }

    cells
        .iter()
        .map(|cell| {
            let cell = cell.trim();
            if is_null_token(cell) {
                Value::Null
            } else if numeric {
                // Parse cannot fail: the typing pass above proved it
                Value::Number(cell.parse().unwrap_or(f64::NAN))
            } else {
                Value::Text(cell.to_string())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_semicolon_delimiter() {
        let content = "Name;Age;City\nAlice;30;Paris\nBob;25;London\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn test_sniff_comma_delimiter() {
        let content = "Name,Age,City\nAlice,30,Paris\nBob,25,London\n";
        assert_eq!(sniff_delimiter(content), b',');
    }

    #[test]
    fn test_sniff_tab_delimiter() {
        let content = "Name\tAge\tCity\nAlice\t30\tParis\nBob\t25\tLondon\n";
        assert_eq!(sniff_delimiter(content), b'\t');
    }

    #[test]
    fn test_sniff_semicolon_with_commas_in_values() {
        let content =
            "Name;Address\n\"Doe, Jane\";\"123 Main St, Apt 4\"\nBob;\"456 Elm\"\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn test_import_types_columns() {
        let data = b"name,age,score\nalice,30,1.5\nbob,25,\ncarol,na,2.5\n";
        let table = import_bytes(data, None).unwrap();

        assert_eq!(table.column_names(), vec!["name", "age", "score"]);
        assert_eq!(table.row_count(), 3);

        let age = table.column("age").unwrap();
        assert!(age.is_numeric());
        assert_eq!(age.values[2], Value::Null);

        let score = table.column("score").unwrap();
        assert_eq!(score.values[1], Value::Null);
        assert_eq!(score.values[2], Value::Number(2.5));

        let name = table.column("name").unwrap();
        assert!(!name.is_numeric());
        assert_eq!(name.values[0], Value::Text("alice".into()));
    }

    #[test]
    fn test_import_mixed_column_is_text() {
        let data = b"x\n1\ntwo\n3\n";
        let table = import_bytes(data, None).unwrap();
        let x = table.column("x").unwrap();
        assert!(!x.is_numeric());
        assert_eq!(x.values[0], Value::Text("1".into()));
    }

    #[test]
    fn test_import_duplicate_and_blank_headers() {
        let data = b"a,a,\n1,2,3\n";
        let table = import_bytes(data, None).unwrap();
        assert_eq!(table.column_names(), vec!["a", "a.1", "column_2"]);
    }

    #[test]
    fn test_import_ragged_rows_pad_with_null() {
        let data = b"a,b\n1,2\n3\n";
        let table = import_bytes(data, None).unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column("b").unwrap().values[1], Value::Null);
    }

    #[test]
    fn test_import_empty_payload() {
        assert!(matches!(
            import_bytes(b"", None),
            Err(ImportError::Parse(_))
        ));
    }

    #[test]
    fn test_import_windows_1252_fallback() {
        // "café" in Windows-1252: e9 is not valid UTF-8
        let data = b"name\ncaf\xe9\n";
        let table = import_bytes(data, None).unwrap();
        assert_eq!(
            table.column("name").unwrap().values[0],
            Value::Text("caf\u{e9}".into())
        );
    }

    #[test]
    fn test_export_roundtrip() {
        let data = b"name,age\nalice,30\nbob,\n";
        let table = import_bytes(data, None).unwrap();
        let out = export_bytes(&table).unwrap();
        let reimported = import_bytes(&out, None).unwrap();
        assert_eq!(reimported, table);
    }

    #[test]
    fn test_export_whole_numbers_without_decimal() {
        let data = b"age\n30\n";
        let table = import_bytes(data, None).unwrap();
        let out = String::from_utf8(export_bytes(&table).unwrap()).unwrap();
        assert_eq!(out, "age\n30\n");
    }
}
