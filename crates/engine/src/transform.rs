//! Transform operations over table snapshots.
//!
//! Every operation takes a `&Table` and returns a derived report, a new
//! snapshot, or both. Inputs are never mutated; callers decide whether to
//! commit the returned snapshot.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::EngineError;
use crate::stats;
use crate::table::{Column, Table, Value, ValueKey};

// ---------------------------------------------------------------------------
// Describe
// ---------------------------------------------------------------------------

/// Summary statistics for one numeric column.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    /// Count of non-null values.
    pub count: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation; None below two values.
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q1: Option<f64>,
    pub median: Option<f64>,
    pub q3: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DescribeReport {
    pub columns: Vec<ColumnSummary>,
}

/// Per-numeric-column summary. `EmptyTable` when the table has no rows;
/// a table with rows but no numeric columns yields an empty report.
pub fn describe(table: &Table) -> Result<DescribeReport, EngineError> {
    if table.is_empty() {
        return Err(EngineError::EmptyTable);
    }
    let columns = table
        .columns()
        .iter()
        .filter(|c| c.is_numeric())
        .map(|c| {
            let nums = c.numbers();
            ColumnSummary {
                name: c.name.clone(),
                count: nums.len(),
                mean: stats::mean(&nums),
                std: stats::std_dev(&nums),
                min: nums.iter().copied().reduce(f64::min),
                q1: stats::quantile(&nums, 0.25),
                median: stats::median(&nums),
                q3: stats::quantile(&nums, 0.75),
                max: nums.iter().copied().reduce(f64::max),
            }
        })
        .collect();
    Ok(DescribeReport { columns })
}

// ---------------------------------------------------------------------------
// Missing values
// ---------------------------------------------------------------------------

/// Per-column null counts, in table order.
pub fn missing_report(table: &Table) -> Vec<(String, usize)> {
    table
        .columns()
        .iter()
        .map(|c| (c.name.clone(), c.null_count()))
        .collect()
}

// ---------------------------------------------------------------------------
// Duplicates
// ---------------------------------------------------------------------------

/// Mask over rows: true where the full row exactly equals an earlier row.
fn duplicate_mask(table: &Table) -> Vec<bool> {
    let mut seen: HashSet<Vec<ValueKey>> = HashSet::new();
    (0..table.row_count())
        .map(|row| !seen.insert(table.row_key(row)))
        .collect()
}

/// Number of rows that duplicate an earlier row.
pub fn count_duplicates(table: &Table) -> usize {
    duplicate_mask(table).iter().filter(|d| **d).count()
}

/// The duplicated rows themselves (second and later occurrences).
pub fn duplicate_rows(table: &Table) -> Table {
    table.filter_rows(&duplicate_mask(table))
}

/// New snapshot keeping only first occurrences, original order preserved.
pub fn remove_duplicates(table: &Table) -> Table {
    let keep: Vec<bool> = duplicate_mask(table).iter().map(|d| !d).collect();
    table.filter_rows(&keep)
}

// ---------------------------------------------------------------------------
// Missing-value fill
// ---------------------------------------------------------------------------

/// Parsed fill specification. The literal token `median` is special; any
/// other token becomes a number when it parses as f64 and a string
/// otherwise — a failed parse is the string branch, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum FillSpec {
    Median,
    Number(f64),
    Text(String),
}

impl FillSpec {
    pub fn parse(token: &str) -> Self {
        let token = token.trim();
        if token.eq_ignore_ascii_case("median") {
            return FillSpec::Median;
        }
        match token.parse::<f64>() {
            Ok(n) => FillSpec::Number(n),
            Err(_) => FillSpec::Text(token.to_string()),
        }
    }
}

/// What a fill actually did, for user feedback.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FillOutcome {
    /// Medians applied to these numeric columns.
    Median { columns: Vec<String> },
    /// No numeric columns existed; the table is unchanged.
    MedianNoNumeric,
    /// Every null in every column became this number.
    Number(f64),
    /// Every null in every column became this string.
    Text(String),
}

/// Fill nulls per `spec`. Median mode touches numeric columns only, each
/// with its own median over non-null values; constant modes touch every
/// column.
pub fn fill_missing(table: &Table, spec: &FillSpec) -> (Table, FillOutcome) {
    match spec {
        FillSpec::Median => {
            let mut filled_names = Vec::new();
            let columns = table
                .columns()
                .iter()
                .map(|col| {
                    if !col.is_numeric() {
                        return col.clone();
                    }
                    let median = stats::median(&col.numbers());
                    let Some(median) = median else {
                        return col.clone();
                    };
                    if col.null_count() > 0 {
                        filled_names.push(col.name.clone());
                    }
                    let values = col
                        .values
                        .iter()
                        .map(|v| {
                            if v.is_null() {
                                Value::Number(median)
                            } else {
                                v.clone()
                            }
                        })
                        .collect();
                    Column::new(col.name.clone(), values)
                })
                .collect();
            // Constructor invariants hold: names and lengths are unchanged.
            let table = Table::new(columns).expect("fill preserves shape");
            let outcome = if table.numeric_column_names().is_empty() {
                FillOutcome::MedianNoNumeric
            } else {
                FillOutcome::Median { columns: filled_names }
            };
            (table, outcome)
        }
        FillSpec::Number(n) => {
            let table = fill_constant(table, &Value::Number(*n));
            (table, FillOutcome::Number(*n))
        }
        FillSpec::Text(s) => {
            let table = fill_constant(table, &Value::Text(s.clone()));
            (table, FillOutcome::Text(s.clone()))
        }
    }
}

fn fill_constant(table: &Table, fill: &Value) -> Table {
    let columns = table
        .columns()
        .iter()
        .map(|col| {
            let values = col
                .values
                .iter()
                .map(|v| if v.is_null() { fill.clone() } else { v.clone() })
                .collect();
            Column::new(col.name.clone(), values)
        })
        .collect();
    Table::new(columns).expect("fill preserves shape")
}

// ---------------------------------------------------------------------------
// IQR outliers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutlierMode {
    /// Count only; the input snapshot stays current.
    Preview,
    /// Return the filtered snapshot for commit.
    Remove,
}

#[derive(Debug)]
pub struct OutlierReport {
    pub rows_before: usize,
    pub rows_removed: usize,
    /// Present in `Remove` mode only.
    pub table: Option<Table>,
}

/// IQR outlier detection with sequential per-column narrowing.
///
/// Columns are processed in table order; each column's Q1/Q3 are computed
/// on the table as already filtered by earlier columns, and its bounds
/// filter that same shrinking table. This ordering is load-bearing: the
/// reported counts change if the columns are combined into one predicate.
/// A null in a numeric column fails the bounds check and drops the row.
pub fn detect_outliers(table: &Table, mode: OutlierMode) -> Result<OutlierReport, EngineError> {
    let names: Vec<String> = table
        .numeric_column_names()
        .iter()
        .map(|s| (*s).to_string())
        .collect();
    if names.is_empty() {
        return Err(EngineError::NoNumericColumns);
    }

    let rows_before = table.row_count();
    let mut working = table.clone();

    for name in &names {
        let col = match working.column(name) {
            Some(c) => c,
            None => continue,
        };
        let nums = col.numbers();
        let (Some(q1), Some(q3)) = (stats::quantile(&nums, 0.25), stats::quantile(&nums, 0.75))
        else {
            continue;
        };
        let iqr = q3 - q1;
        let lower = q1 - 1.5 * iqr;
        let upper = q3 + 1.5 * iqr;

        let mask: Vec<bool> = col
            .values
            .iter()
            .map(|v| v.as_number().is_some_and(|n| n >= lower && n <= upper))
            .collect();
        working = working.filter_rows(&mask);
    }

    let rows_removed = rows_before - working.row_count();
    Ok(OutlierReport {
        rows_before,
        rows_removed,
        table: match mode {
            OutlierMode::Preview => None,
            OutlierMode::Remove => Some(working),
        },
    })
}

// ---------------------------------------------------------------------------
// Plot data
// ---------------------------------------------------------------------------

/// Ordered (row index, value) pairs for one column's numeric cells.
/// Nulls and text cells are skipped; the column must exist.
pub fn line_series(table: &Table, column: &str) -> Result<Vec<(usize, f64)>, EngineError> {
    let col = table
        .column(column)
        .ok_or_else(|| EngineError::UnknownColumn(column.to_string()))?;
    Ok(col
        .values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.as_number().map(|n| (i, n)))
        .collect())
}

/// Pairwise Pearson correlation over numeric columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Correlation {
    pub columns: Vec<String>,
    /// Row-major square matrix aligned with `columns`. Undefined pairs
    /// (zero variance, under two shared rows) are NaN.
    pub matrix: Vec<Vec<f64>>,
}

/// Each pair is computed over the rows where both columns are non-null.
/// Fewer than two numeric columns yields an empty matrix, not an error.
pub fn correlation_matrix(table: &Table) -> Correlation {
    let numeric: Vec<&Column> = table.columns().iter().filter(|c| c.is_numeric()).collect();
    if numeric.len() < 2 {
        return Correlation { columns: Vec::new(), matrix: Vec::new() };
    }

    let columns: Vec<String> = numeric.iter().map(|c| c.name.clone()).collect();
    let n = numeric.len();
    let mut matrix = vec![vec![f64::NAN; n]; n];

    for i in 0..n {
        matrix[i][i] = 1.0;
        for j in (i + 1)..n {
            let mut xs = Vec::new();
            let mut ys = Vec::new();
            for (x, y) in numeric[i].values.iter().zip(&numeric[j].values) {
                if let (Some(x), Some(y)) = (x.as_number(), y.as_number()) {
                    xs.push(x);
                    ys.push(y);
                }
            }
            let r = stats::pearson(&xs, &ys).unwrap_or(f64::NAN);
            matrix[i][j] = r;
            matrix[j][i] = r;
        }
    }

    Correlation { columns, matrix }
}
