//! Preformatted text blocks for the rendering collaborator.
//!
//! Pure string building: the core hands these to whatever surface displays
//! them (chat message, terminal). Layout is plain monospace columns, right
//! room for the widest cell per column.

use crate::table::Table;
use crate::transform::{Correlation, DescribeReport};

/// Numeric cell formatting: whole numbers without a decimal tail, others
/// to six places with trailing zeros trimmed.
fn fmt_num(n: f64) -> String {
    if !n.is_finite() {
        return "NaN".to_string();
    }
    if n.fract() == 0.0 && n.abs() < 1e15 {
        return format!("{}", n as i64);
    }
    let s = format!("{n:.6}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    s.to_string()
}

fn fmt_opt(n: Option<f64>) -> String {
    n.map_or_else(|| "NaN".to_string(), fmt_num)
}

/// Render rows of cells as aligned columns, first row treated as header.
fn aligned(rows: &[Vec<String>]) -> String {
    let cols = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![0usize; cols];
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.len());
        }
    }
    let mut out = String::new();
    for row in rows {
        let mut line = String::new();
        for (i, cell) in row.iter().enumerate() {
            if i > 0 {
                line.push_str("  ");
            }
            line.push_str(&format!("{cell:>width$}", width = widths[i]));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// First `n` rows of the table as an aligned text block, with a leading
/// row-index column.
pub fn preview(table: &Table, n: usize) -> String {
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut header = vec![String::new()];
    header.extend(table.column_names().iter().map(|s| (*s).to_string()));
    rows.push(header);

    for i in 0..table.row_count().min(n) {
        let mut row = vec![i.to_string()];
        row.extend(table.row(i).iter().map(|v| v.display()));
        rows.push(row);
    }
    aligned(&rows)
}

/// Describe report in the count/mean/std/min/25%/50%/75%/max layout.
pub fn describe_text(report: &DescribeReport) -> String {
    if report.columns.is_empty() {
        return "no numeric columns".to_string();
    }
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut header = vec![String::new()];
    header.extend(report.columns.iter().map(|c| c.name.clone()));
    rows.push(header);

    let stats: [(&str, fn(&crate::transform::ColumnSummary) -> String); 8] = [
        ("count", |c| c.count.to_string()),
        ("mean", |c| fmt_opt(c.mean)),
        ("std", |c| fmt_opt(c.std)),
        ("min", |c| fmt_opt(c.min)),
        ("25%", |c| fmt_opt(c.q1)),
        ("50%", |c| fmt_opt(c.median)),
        ("75%", |c| fmt_opt(c.q3)),
        ("max", |c| fmt_opt(c.max)),
    ];
    for (label, get) in stats {
        let mut row = vec![label.to_string()];
        row.extend(report.columns.iter().map(get));
        rows.push(row);
    }
    aligned(&rows)
}

/// Missing-value report: one `column  count` line per column.
pub fn missing_text(counts: &[(String, usize)]) -> String {
    let rows: Vec<Vec<String>> = counts
        .iter()
        .map(|(name, n)| vec![name.clone(), n.to_string()])
        .collect();
    aligned(&rows)
}

/// Correlation matrix as an aligned square block.
pub fn correlation_text(corr: &Correlation) -> String {
    if corr.columns.is_empty() {
        return "fewer than two numeric columns".to_string();
    }
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut header = vec![String::new()];
    header.extend(corr.columns.iter().cloned());
    rows.push(header);
    for (name, line) in corr.columns.iter().zip(&corr.matrix) {
        let mut row = vec![name.clone()];
        row.extend(line.iter().map(|v| fmt_num(*v)));
        rows.push(row);
    }
    aligned(&rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Column, Value};
    use crate::transform;

    fn sample() -> Table {
        Table::new(vec![
            Column::new(
                "name",
                vec![Value::Text("alice".into()), Value::Text("bob".into())],
            ),
            Column::new("age", vec![Value::Number(30.0), Value::Null]),
        ])
        .unwrap()
    }

    #[test]
    fn test_preview_has_header_and_index() {
        let text = preview(&sample(), 5);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("name"));
        assert!(lines[0].contains("age"));
        assert!(lines[1].trim_start().starts_with('0'));
        assert!(lines[1].contains("alice"));
    }

    #[test]
    fn test_preview_caps_rows() {
        let text = preview(&sample(), 1);
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn test_describe_text_layout() {
        let report = transform::describe(&sample()).unwrap();
        let text = describe_text(&report);
        assert!(text.contains("count"));
        assert!(text.contains("50%"));
        assert!(text.contains("age"));
    }

    #[test]
    fn test_fmt_num_trims() {
        assert_eq!(fmt_num(3.0), "3");
        assert_eq!(fmt_num(2.5), "2.5");
        assert_eq!(fmt_num(1.0 / 3.0), "0.333333");
        assert_eq!(fmt_num(f64::NAN), "NaN");
    }

    #[test]
    fn test_missing_text_lines() {
        let text = missing_text(&[("a".into(), 0), ("b".into(), 2)]);
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains('b'));
    }
}
