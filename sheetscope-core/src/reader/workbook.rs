//! Workbook data structures

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

static EMPTY: CellValue = CellValue::Empty;

/// Represents a complete workbook
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    pub path: PathBuf,
    /// Sheets carrying a cell grid, in workbook order (hidden ones included)
    pub sheets: Vec<Sheet>,
    /// Every sheet name declared by the workbook, including hidden and chart sheets
    pub sheet_names: Vec<String>,
}

impl Workbook {
    /// Build an in-memory workbook whose name list is taken from its sheets
    pub fn from_sheets(sheets: Vec<Sheet>) -> Self {
        let sheet_names = sheets.iter().map(|s| s.name.clone()).collect();
        Self {
            path: PathBuf::new(),
            sheets,
            sheet_names,
        }
    }

    /// Get a sheet by name
    pub fn get_sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// Sheets that take part in table extraction
    pub fn visible_sheets(&self) -> impl Iterator<Item = &Sheet> {
        self.sheets.iter().filter(|s| s.visible)
    }
}

/// Represents a worksheet, holding both the values view and the formula view
#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: String,
    pub visible: bool,
    /// Cells keyed by 1-based (row, col)
    pub cells: BTreeMap<(u32, u32), Cell>,
    /// Error message if there was an error parsing formulas for this sheet
    pub formula_parsing_error: Option<String>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visible: true,
            cells: BTreeMap::new(),
            formula_parsing_error: None,
        }
    }

    /// Set the computed value of a cell
    pub fn set_value(&mut self, row: u32, col: u32, value: CellValue) -> &mut Self {
        self.cell_mut(row, col).value = value;
        self
    }

    /// Set the formula source of a cell, normalised to start with `=`
    pub fn set_formula(&mut self, row: u32, col: u32, formula: impl Into<String>) -> &mut Self {
        self.cell_mut(row, col).formula = Some(normalize_formula(formula.into()));
        self
    }

    fn cell_mut(&mut self, row: u32, col: u32) -> &mut Cell {
        self.cells.entry((row, col)).or_insert_with(|| Cell {
            row,
            col,
            value: CellValue::Empty,
            formula: None,
        })
    }

    /// Get a cell at the given position
    pub fn get_cell(&self, row: u32, col: u32) -> Option<&Cell> {
        self.cells.get(&(row, col))
    }

    /// Computed value at the given position; empty when the cell is absent
    pub fn value(&self, row: u32, col: u32) -> &CellValue {
        self.get_cell(row, col)
            .map(|c| &c.value)
            .unwrap_or(&EMPTY)
    }

    /// Formula source at the given position
    pub fn formula(&self, row: u32, col: u32) -> Option<&str> {
        self.get_cell(row, col).and_then(|c| c.formula.as_deref())
    }

    /// Cells of one row with a non-empty computed value, left to right
    pub fn values_in_row(&self, row: u32) -> impl Iterator<Item = &Cell> {
        self.cells
            .range((row, 0)..=(row, u32::MAX))
            .map(|(_, c)| c)
            .filter(|c| !c.value.is_empty())
    }
}

/// Represents a single cell
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub row: u32,
    pub col: u32,
    /// Last computed value; empty for unevaluated formulas
    pub value: CellValue,
    pub formula: Option<String>,
}

impl Cell {
    pub fn is_formula(&self) -> bool {
        self.formula.is_some()
    }
}

/// Cell value types
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Boolean(bool),
    Error(String),
}

impl CellValue {
    /// Check if the cell is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Boolean(true) => f.write_str("TRUE"),
            CellValue::Boolean(false) => f.write_str("FALSE"),
            CellValue::Error(e) => f.write_str(e),
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Empty => serializer.serialize_none(),
            CellValue::Number(n) => serializer.serialize_f64(*n),
            CellValue::Text(s) | CellValue::Error(s) => serializer.serialize_str(s),
            CellValue::Boolean(b) => serializer.serialize_bool(*b),
        }
    }
}

pub(crate) fn normalize_formula(formula: String) -> String {
    if formula.starts_with('=') {
        formula
    } else {
        format!("={}", formula)
    }
}
