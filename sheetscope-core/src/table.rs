//! Extracted tables and their column metadata

use crate::reader::CellValue;
use crate::reference::column_letters;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Rectangle of one sheet, 1-based and inclusive on both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TableRange {
    pub start_row: u32,
    pub start_col: u32,
    pub end_row: u32,
    pub end_col: u32,
}

impl TableRange {
    pub fn new(start_row: u32, start_col: u32, end_row: u32, end_col: u32) -> Self {
        Self {
            start_row,
            start_col,
            end_row,
            end_col,
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = u32> {
        self.start_row..=self.end_row
    }

    pub fn cols(&self) -> impl Iterator<Item = u32> {
        self.start_col..=self.end_col
    }

    pub fn height(&self) -> usize {
        (self.end_row - self.start_row + 1) as usize
    }

    pub fn width(&self) -> usize {
        (self.end_col - self.start_col + 1) as usize
    }
}

impl fmt::Display for TableRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}:{}{}",
            column_letters(self.start_col),
            self.start_row,
            column_letters(self.end_col),
            self.end_row
        )
    }
}

/// Descriptive record for one column of one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnMetadata {
    /// Absolute 1-based column index
    pub column: u32,
    /// First literal value of the column; `None` when every cell is a formula or blank
    pub name: Option<String>,
    /// Source of the first formula cell of the column
    pub formula: Option<String>,
    /// Sheets mentioned by `formula`
    pub dependencies: BTreeSet<String>,
    /// `formula` with every cell reference annotated by its column name
    pub enhanced_formula: Option<String>,
}

/// A detected table with its values and per-column metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub range: TableRange,
    /// Row-major computed values inside `range`
    pub data: Vec<Vec<CellValue>>,
    /// One record per column of `range`, left to right
    pub columns: Vec<ColumnMetadata>,
}

impl Table {
    /// First `n` rows of the table data
    pub fn head(&self, n: usize) -> &[Vec<CellValue>] {
        &self.data[..n.min(self.data.len())]
    }
}

/// Tables found on one sheet, top to bottom
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetTables {
    pub sheet: String,
    pub tables: Vec<Table>,
}

/// Tables of every processed sheet, in workbook order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct WorkbookTables {
    pub sheets: Vec<SheetTables>,
}

impl WorkbookTables {
    /// Get the tables of a sheet by name
    pub fn get(&self, sheet: &str) -> Option<&[Table]> {
        self.sheets
            .iter()
            .find(|s| s.sheet == sheet)
            .map(|s| s.tables.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = &SheetTables> {
        self.sheets.iter()
    }

    pub fn table_count(&self) -> usize {
        self.sheets.iter().map(|s| s.tables.len()).sum()
    }
}
