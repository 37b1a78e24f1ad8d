//! Per-sheet table extraction

pub mod bounds;
pub mod columns;

pub use bounds::{detect_tables, merge_adjacent};
pub use columns::{extract_columns, formula_dependencies};

use crate::config::ScanConfig;
use crate::reader::{Sheet, Workbook};
use crate::table::{SheetTables, Table, WorkbookTables};
use rayon::prelude::*;
use tracing::{debug, info};

/// Detect the tables of one sheet and describe their columns
pub fn extract_sheet(sheet: &Sheet, sheet_names: &[String], config: &ScanConfig) -> SheetTables {
    let tables: Vec<Table> = detect_tables(sheet)
        .into_iter()
        .map(|range| {
            debug!(sheet = %sheet.name, range = %range, "detected table");
            Table {
                range,
                data: columns::table_data(sheet, &range),
                columns: extract_columns(
                    sheet,
                    &range,
                    sheet_names,
                    &config.broken_reference_marker,
                ),
            }
        })
        .collect();

    info!(sheet = %sheet.name, tables = tables.len(), "extracted sheet");

    SheetTables {
        sheet: sheet.name.clone(),
        tables,
    }
}

/// Extract every visible, non-skipped sheet. Sheets are independent, so they
/// are processed in parallel; the result keeps workbook order.
pub fn extract_workbook(workbook: &Workbook, config: &ScanConfig) -> WorkbookTables {
    let sheets: Vec<&Sheet> = workbook
        .visible_sheets()
        .filter(|s| !config.is_sheet_skipped(&s.name))
        .collect();

    let sheets = sheets
        .par_iter()
        .map(|sheet| extract_sheet(sheet, &workbook.sheet_names, config))
        .collect();

    WorkbookTables { sheets }
}
