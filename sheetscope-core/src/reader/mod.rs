//! Excel/ODS file reader using calamine

use crate::error::LoadError;
use calamine::{Data, Range, Reader, SheetType, SheetVisible, open_workbook_auto};
use std::path::Path;
use tracing::{debug, warn};

pub mod workbook;

pub use workbook::{Cell, CellValue, Sheet, Workbook};

/// Read a workbook from a file path, loading the values view and the
/// formula view of every visible worksheet
pub fn read_workbook<P: AsRef<Path>>(path: P) -> Result<Workbook, LoadError> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(LoadError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let mut excel = open_workbook_auto(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let metadata = excel.sheets_metadata().to_vec();
    let sheet_names = metadata.iter().map(|m| m.name.clone()).collect();
    let mut sheets = Vec::new();

    for meta in &metadata {
        if !matches!(meta.typ, SheetType::WorkSheet) {
            debug!(sheet = %meta.name, "skipping sheet without a cell grid");
            continue;
        }

        if !matches!(meta.visible, SheetVisible::Visible) {
            debug!(sheet = %meta.name, "skipping hidden sheet");
            let mut sheet = Sheet::new(meta.name.as_str());
            sheet.visible = false;
            sheets.push(sheet);
            continue;
        }

        let range = excel
            .worksheet_range(&meta.name)
            .map_err(|source| LoadError::Sheet {
                path: path.to_path_buf(),
                sheet: meta.name.clone(),
                source,
            })?;

        let (formula_range, formula_error) = match excel.worksheet_formula(&meta.name) {
            Ok(range) => (Some(range), None),
            Err(e) => {
                warn!(sheet = %meta.name, error = %e, "formula view unavailable");
                (None, Some(e.to_string()))
            }
        };

        sheets.push(parse_sheet(
            &meta.name,
            &range,
            formula_range.as_ref(),
            formula_error,
        ));
    }

    Ok(Workbook {
        path: path.to_path_buf(),
        sheets,
        sheet_names,
    })
}

fn parse_sheet(
    name: &str,
    range: &Range<Data>,
    formula_range: Option<&Range<String>>,
    formula_parsing_error: Option<String>,
) -> Sheet {
    let mut sheet = Sheet::new(name);
    sheet.formula_parsing_error = formula_parsing_error;

    // calamine positions are 0-based and relative to the range start
    if let Some((row0, col0)) = range.start() {
        for (row, col, data) in range.used_cells() {
            sheet.set_value(
                row0 + row as u32 + 1,
                col0 + col as u32 + 1,
                parse_cell_value(data),
            );
        }
    }

    if let Some(f) = formula_range {
        if let Some((row0, col0)) = f.start() {
            for (row, col, formula) in f.used_cells() {
                sheet.set_formula(
                    row0 + row as u32 + 1,
                    col0 + col as u32 + 1,
                    formula.as_str(),
                );
            }
        }
    }

    sheet
}

fn parse_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Boolean(*b),
        Data::Error(e) => CellValue::Error(e.to_string()),
        Data::Empty => CellValue::Empty,
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) => CellValue::Text(s.clone()),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}
