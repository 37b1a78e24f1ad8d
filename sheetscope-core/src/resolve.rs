//! Cross-sheet resolution of formula references to column names

use crate::reference::{CellAddress, find_references};
use crate::table::WorkbookTables;
use std::collections::HashMap;

/// Read-only map from every cell of every detected table to the name of the
/// column owning it.
///
/// Built once from the complete extraction of a workbook; it has no way to
/// be modified afterwards.
#[derive(Debug, Clone, Default)]
pub struct ColumnIndex {
    sheets: HashMap<String, HashMap<(u32, u32), Option<String>>>,
}

impl ColumnIndex {
    pub fn build(tables: &WorkbookTables) -> Self {
        let mut sheets: HashMap<String, HashMap<(u32, u32), Option<String>>> = HashMap::new();

        for sheet in tables.iter() {
            let cells = sheets.entry(sheet.sheet.clone()).or_default();
            for table in &sheet.tables {
                for column in &table.columns {
                    for row in table.range.rows() {
                        cells.insert((row, column.column), column.name.clone());
                    }
                }
            }
        }

        Self { sheets }
    }

    /// Column owning a cell. The outer `None` means the cell lies outside
    /// every table; the inner one means the owning column has no name.
    pub fn lookup(&self, sheet: &str, row: u32, col: u32) -> Option<Option<&str>> {
        self.sheets
            .get(sheet)?
            .get(&(row, col))
            .map(|name| name.as_deref())
    }

    pub fn get(&self, address: &CellAddress) -> Option<Option<&str>> {
        self.lookup(&address.sheet, address.row, address.col)
    }

    /// Number of indexed cells
    pub fn len(&self) -> usize {
        self.sheets.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Annotate each cell reference of `formula` with `(column name)`.
///
/// Unqualified references resolve against `current_sheet`. References that
/// map to no named column get `unknown_marker`; references whose column
/// letters are out of range are copied unchanged.
pub fn enhance_formula(
    formula: &str,
    index: &ColumnIndex,
    current_sheet: &str,
    unknown_marker: &str,
) -> String {
    let mut enhanced = String::with_capacity(formula.len() * 2);
    let mut last = 0;

    for reference in find_references(formula) {
        let (start, end) = reference.span;
        enhanced.push_str(&formula[last..start]);
        enhanced.push_str(reference.text);
        last = end;

        let Some(address) = reference.address(current_sheet) else {
            continue;
        };
        let name = index.get(&address).flatten().unwrap_or(unknown_marker);

        enhanced.push('(');
        enhanced.push_str(name);
        enhanced.push(')');
    }

    enhanced.push_str(&formula[last..]);
    enhanced
}

impl WorkbookTables {
    /// Fill `enhanced_formula` for every column that has a formula
    pub fn enhance(&mut self, index: &ColumnIndex, unknown_marker: &str) {
        for sheet in &mut self.sheets {
            for table in &mut sheet.tables {
                for column in &mut table.columns {
                    column.enhanced_formula = column
                        .formula
                        .as_deref()
                        .map(|f| enhance_formula(f, index, &sheet.sheet, unknown_marker));
                }
            }
        }
    }
}
