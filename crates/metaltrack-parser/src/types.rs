//! Raw table types of the spreadsheet export payload

use serde::{Deserialize, Serialize};

/// Top-level export response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SheetResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub errors: Vec<SheetErrorEntry>,
    #[serde(default)]
    pub table: Option<Table>,
}

/// Error entry reported by the export endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SheetErrorEntry {
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub detailed_message: Option<String>,
}

/// Tabular data: rows of positional cells
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Table {
    #[serde(default)]
    pub rows: Vec<Row>,
}

/// One row; `c` is absent for fully empty rows and holds `null` for blank cells
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Row {
    #[serde(default)]
    pub c: Option<Vec<Option<Cell>>>,
}

impl Row {
    /// Cell at a column, if present and non-null
    pub fn cell(&self, column: usize) -> Option<&Cell> {
        self.c.as_ref()?.get(column)?.as_ref()
    }

    /// Whether the row carries any cells at all
    pub fn has_cells(&self) -> bool {
        self.c.is_some()
    }

    /// Trimmed text of a cell, empty when blank
    pub fn text(&self, column: usize) -> String {
        self.cell(column).map(Cell::text).unwrap_or_default()
    }
}

/// A single cell: `v` is the typed value, `f` the formatted display string
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cell {
    #[serde(default)]
    pub v: Option<serde_json::Value>,
    #[serde(default)]
    pub f: Option<String>,
}

impl Cell {
    /// Cell value rendered as trimmed text
    pub fn text(&self) -> String {
        match &self.v {
            None | Some(serde_json::Value::Null) => String::new(),
            Some(serde_json::Value::String(s)) => s.trim().to_string(),
            Some(serde_json::Value::Number(n)) => match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
                _ => n.to_string(),
            },
            Some(serde_json::Value::Bool(b)) => b.to_string(),
            Some(other) => other.to_string(),
        }
    }

    /// Whether the cell holds a non-null value
    pub fn is_set(&self) -> bool {
        !matches!(self.v, None | Some(serde_json::Value::Null))
    }
}
