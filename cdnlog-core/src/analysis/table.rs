use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Named result tables of one analyzer, e.g. `status_counts`, `top_ips`.
pub type AnalyzerResult = BTreeMap<String, Table>;

/// Analyzer name → its result tables. Handed to reporters read-only.
pub type AnalysisResults = BTreeMap<String, AnalyzerResult>;

/// Ordered rows of named columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Rows must have exactly one cell per column.
    pub fn push_row(&mut self, row: Vec<Cell>) {
        debug_assert_eq!(row.len(), self.columns.len(), "row width mismatch");
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Every cell of column `name`, top to bottom.
    pub fn column(&self, name: &str) -> Vec<&Cell> {
        match self.column_index(name) {
            Some(i) => self.rows.iter().filter_map(|r| r.get(i)).collect(),
            None => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Integer(u64),
    Float(f64),
    Text(String),
    #[serde(serialize_with = "serialize_time")]
    Time(DateTime<FixedOffset>),
    Empty,
}

/// RFC 3339 with a numeric offset, `+00:00` included.
fn serialize_time<S: Serializer>(v: &DateTime<FixedOffset>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&v.to_rfc3339_opts(SecondsFormat::Secs, false))
}

impl Cell {
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Cell::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Float(v) => Some(*v),
            Cell::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Integer(v) => write!(f, "{v}"),
            Cell::Float(v) => write!(f, "{v:.2}"),
            Cell::Text(v) => f.write_str(v),
            Cell::Time(v) => write!(f, "{}", v.format("%Y-%m-%d %H:%M:%S %:z")),
            Cell::Empty => f.write_str("-"),
        }
    }
}

impl From<u64> for Cell {
    fn from(v: u64) -> Self {
        Cell::Integer(v)
    }
}

impl From<u16> for Cell {
    fn from(v: u16) -> Self {
        Cell::Integer(u64::from(v))
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Float(v)
    }
}

impl From<String> for Cell {
    fn from(v: String) -> Self {
        Cell::Text(v)
    }
}

impl From<&str> for Cell {
    fn from(v: &str) -> Self {
        Cell::Text(v.to_string())
    }
}

impl From<Option<String>> for Cell {
    fn from(v: Option<String>) -> Self {
        v.map(Cell::Text).unwrap_or(Cell::Empty)
    }
}

impl From<DateTime<FixedOffset>> for Cell {
    fn from(v: DateTime<FixedOffset>) -> Self {
        Cell::Time(v)
    }
}
