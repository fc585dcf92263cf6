//! Tabular snapshot model.
//!
//! A `Table` is an ordered list of named columns of equal length; each cell
//! is a nullable scalar. Snapshots are copy-on-write: every transform takes
//! a table by reference and returns a new one, never editing in place.
//!
//! Key invariants:
//! - column names are unique within a table
//! - all columns share the same row count
//! - both are enforced by the only constructor, `Table::new`

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

/// A single nullable cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    Null,
    Number(f64),
    Text(String),
}

/// Hashable projection of a `Value`, used to key rows in duplicate
/// detection. Floats go through `OrderedFloat` so NaN compares equal to
/// itself and rows can live in a `HashSet`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueKey {
    Null,
    Number(OrderedFloat<f64>),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn key(&self) -> ValueKey {
        match self {
            Value::Null => ValueKey::Null,
            Value::Number(n) => ValueKey::Number(OrderedFloat(*n)),
            Value::Text(s) => ValueKey::Text(s.clone()),
        }
    }

    /// Display form for text reports and CSV export. Whole numbers print
    /// without a trailing `.0`; nulls print empty.
    pub fn display(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Number(n) => {
                // casts outside i64 range saturate
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{n}")
                }
            }
            Value::Text(s) => s.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Columns
// ---------------------------------------------------------------------------

/// A named, ordered sequence of nullable values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self { name: name.into(), values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_null()).count()
    }

    /// A column is numeric when it holds at least one number and no text.
    /// Nulls do not disqualify.
    pub fn is_numeric(&self) -> bool {
        let mut saw_number = false;
        for v in &self.values {
            match v {
                Value::Number(_) => saw_number = true,
                Value::Text(_) => return false,
                Value::Null => {}
            }
        }
        saw_number
    }

    /// Non-null numeric values, in row order.
    pub fn numbers(&self) -> Vec<f64> {
        self.values.iter().filter_map(Value::as_number).collect()
    }
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// An immutable-at-a-point-in-time tabular snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Build a snapshot, validating the snapshot invariants.
    pub fn new(columns: Vec<Column>) -> Result<Self, EngineError> {
        if let Some(first) = columns.first() {
            let rows = first.len();
            for col in &columns {
                if col.len() != rows {
                    return Err(EngineError::Malformed(format!(
                        "column '{}' has {} rows, expected {}",
                        col.name,
                        col.len(),
                        rows
                    )));
                }
            }
        }
        let mut seen = std::collections::HashSet::new();
        for col in &columns {
            if !seen.insert(col.name.as_str()) {
                return Err(EngineError::Malformed(format!(
                    "duplicate column name '{}'",
                    col.name
                )));
            }
        }
        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    /// Names of numeric columns, in table order.
    pub fn numeric_column_names(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.is_numeric())
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Cells of one row, in column order.
    pub fn row(&self, index: usize) -> Vec<&Value> {
        self.columns.iter().map(|c| &c.values[index]).collect()
    }

    /// Hashable key for one full row.
    pub fn row_key(&self, index: usize) -> Vec<ValueKey> {
        self.columns.iter().map(|c| c.values[index].key()).collect()
    }

    /// New snapshot keeping only the rows where `mask` is true.
    /// `mask` is indexed by row, same length as the table.
    pub fn filter_rows(&self, mask: &[bool]) -> Self {
        debug_assert_eq!(mask.len(), self.row_count());
        let columns = self
            .columns
            .iter()
            .map(|col| {
                let values = col
                    .values
                    .iter()
                    .zip(mask)
                    .filter(|(_, keep)| **keep)
                    .map(|(v, _)| v.clone())
                    .collect();
                Column::new(col.name.clone(), values)
            })
            .collect();
        Self { columns }
    }

    /// New snapshot keeping only the first `n` rows.
    pub fn head(&self, n: usize) -> Self {
        let columns = self
            .columns
            .iter()
            .map(|col| Column::new(col.name.clone(), col.values.iter().take(n).cloned().collect()))
            .collect();
        Self { columns }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(values: &[Option<f64>]) -> Vec<Value> {
        values
            .iter()
            .map(|v| v.map_or(Value::Null, Value::Number))
            .collect()
    }

    #[test]
    fn test_new_rejects_ragged_columns() {
        let cols = vec![
            Column::new("a", num(&[Some(1.0), Some(2.0)])),
            Column::new("b", num(&[Some(1.0)])),
        ];
        assert!(matches!(Table::new(cols), Err(EngineError::Malformed(_))));
    }

    #[test]
    fn test_new_rejects_duplicate_names() {
        let cols = vec![
            Column::new("a", num(&[Some(1.0)])),
            Column::new("a", num(&[Some(2.0)])),
        ];
        assert!(matches!(Table::new(cols), Err(EngineError::Malformed(_))));
    }

    #[test]
    fn test_numeric_detection() {
        let numeric = Column::new("n", num(&[Some(1.0), None, Some(3.0)]));
        assert!(numeric.is_numeric());

        let mixed = Column::new(
            "m",
            vec![Value::Number(1.0), Value::Text("x".into())],
        );
        assert!(!mixed.is_numeric());

        let all_null = Column::new("z", num(&[None, None]));
        assert!(!all_null.is_numeric());
    }

    #[test]
    fn test_filter_rows() {
        let table = Table::new(vec![
            Column::new("a", num(&[Some(1.0), Some(2.0), Some(3.0)])),
            Column::new("b", num(&[Some(4.0), Some(5.0), Some(6.0)])),
        ])
        .unwrap();

        let filtered = table.filter_rows(&[true, false, true]);
        assert_eq!(filtered.row_count(), 2);
        assert_eq!(filtered.column("a").unwrap().values[1], Value::Number(3.0));
        // Original untouched
        assert_eq!(table.row_count(), 3);
    }

    #[test]
    fn test_number_display_trims_whole() {
        assert_eq!(Value::Number(7.0).display(), "7");
        assert_eq!(Value::Number(7.5).display(), "7.5");
        assert_eq!(Value::Null.display(), "");
    }

    #[test]
    fn test_number_display_keeps_huge_magnitudes() {
        let big = Value::Number(1e300).display();
        assert_ne!(big, i64::MAX.to_string());
        assert_eq!(big.parse::<f64>().unwrap(), 1e300);

        let negative = Value::Number(-1e300).display();
        assert_eq!(negative.parse::<f64>().unwrap(), -1e300);

        assert_eq!(Value::Number(f64::INFINITY).display(), "inf");
    }
}
