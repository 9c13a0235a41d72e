use std::fmt;
use std::path::{Path, PathBuf};

use super::error::{DataError, Result};

// ---------------------------------------------------------------------------
// Cell – a single value in a results table
// ---------------------------------------------------------------------------

/// A dynamically-typed table cell. The type is guessed per cell when the
/// table is parsed, so the same column may hold `Integer(100)` in one file and
/// `Float(100.0)` in another; [`Cell::loosely_eq`] hides that difference.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl Cell {
    /// Guess the type of a raw text field. Tokens such as `nan` or `inf`
    /// stay strings so they keep comparing by text.
    pub fn parse(s: &str) -> Cell {
        if s.is_empty() {
            return Cell::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return Cell::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            if f.is_finite() {
                return Cell::Float(f);
            }
        }
        if s == "true" || s == "false" {
            return Cell::Bool(s == "true");
        }
        Cell::String(s.to_string())
    }

    /// Numeric reading of the cell. Strings count when they parse as a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Float(v) => Some(*v),
            Cell::Integer(i) => Some(*i as f64),
            Cell::String(s) => s.trim().parse::<f64>().ok(),
            Cell::Bool(_) | Cell::Null => None,
        }
    }

    /// Exact textual form used for non-numeric comparisons.
    pub fn token(&self) -> String {
        match self {
            Cell::String(s) => s.clone(),
            Cell::Integer(i) => i.to_string(),
            Cell::Float(v) => v.to_string(),
            Cell::Bool(b) => b.to_string(),
            Cell::Null => String::new(),
        }
    }

    /// Equality that tolerates numeric-vs-string representation: `100`,
    /// `100.0` and `"100.0"` all match each other. Two integers compare
    /// exactly. Anything without a finite numeric reading on both sides
    /// compares by exact token, so the relation is reflexive.
    pub fn loosely_eq(&self, other: &Cell) -> bool {
        if let (Cell::Integer(a), Cell::Integer(b)) = (self, other) {
            return a == b;
        }
        match (self.as_f64(), other.as_f64()) {
            (Some(a), Some(b)) if a.is_finite() && b.is_finite() => a == b,
            _ => self.token() == other.token(),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => write!(f, "<null>"),
            other => write!(f, "{}", other.token()),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::String(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::String(s)
    }
}

impl From<i64> for Cell {
    fn from(i: i64) -> Self {
        Cell::Integer(i)
    }
}

impl From<i32> for Cell {
    fn from(i: i32) -> Self {
        Cell::Integer(i64::from(i))
    }
}

impl From<u32> for Cell {
    fn from(i: u32) -> Self {
        Cell::Integer(i64::from(i))
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Float(v)
    }
}

impl From<bool> for Cell {
    fn from(b: bool) -> Self {
        Cell::Bool(b)
    }
}

// ---------------------------------------------------------------------------
// Column schema
// ---------------------------------------------------------------------------

/// Type summary of a column, inferred once when the table is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Float,
    Bool,
    Text,
    /// Every cell is null.
    Empty,
}

impl ColumnKind {
    fn of(cell: &Cell) -> Option<ColumnKind> {
        match cell {
            Cell::Integer(_) => Some(ColumnKind::Integer),
            Cell::Float(_) => Some(ColumnKind::Float),
            Cell::Bool(_) => Some(ColumnKind::Bool),
            Cell::String(_) => Some(ColumnKind::Text),
            Cell::Null => None,
        }
    }

    /// Widen `self` so that it also covers `other`.
    fn merge(self, other: ColumnKind) -> ColumnKind {
        use ColumnKind::*;
        match (self, other) {
            (Empty, k) | (k, Empty) => k,
            (a, b) if a == b => a,
            (Integer, Float) | (Float, Integer) => Float,
            _ => Text,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

// ---------------------------------------------------------------------------
// ResultsTable – the complete loaded table
// ---------------------------------------------------------------------------

/// One results table: a fixed ordered schema and rows of cells, one row per
/// trial. Immutable once built.
#[derive(Debug, Clone)]
pub struct ResultsTable {
    source: PathBuf,
    columns: Vec<Column>,
    rows: Vec<Vec<Cell>>,
}

impl ResultsTable {
    /// Build a table from a header and rows, inferring column kinds.
    ///
    /// Fails with [`DataError::Format`] when the header is empty or a row is
    /// not exactly as wide as the header.
    pub fn new(source: impl Into<PathBuf>, header: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self> {
        let source = source.into();
        if header.is_empty() {
            return Err(DataError::format(&source, "missing header row"));
        }
        let mut kinds = vec![ColumnKind::Empty; header.len()];
        for (row_no, row) in rows.iter().enumerate() {
            if row.len() != header.len() {
                return Err(DataError::format(
                    &source,
                    format!(
                        "row {row_no} has {} fields but the header has {}",
                        row.len(),
                        header.len()
                    ),
                ));
            }
            for (kind, cell) in kinds.iter_mut().zip(row) {
                if let Some(k) = ColumnKind::of(cell) {
                    *kind = kind.merge(k);
                }
            }
        }
        let columns = header
            .into_iter()
            .zip(kinds)
            .map(|(name, kind)| Column { name, kind })
            .collect();
        Ok(ResultsTable {
            source,
            columns,
            rows,
        })
    }

    /// Path the table was read from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Position of `name` in the schema.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| DataError::UnknownColumn {
                path: self.source.clone(),
                column: name.to_string(),
            })
    }

    /// Number of rows (trials).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
