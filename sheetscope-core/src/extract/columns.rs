//! Column metadata extraction from the formula view of a sheet

use crate::reader::{CellValue, Sheet};
use crate::table::{ColumnMetadata, TableRange};
use std::collections::BTreeSet;

/// Separator between a sheet qualifier and a cell reference
const SHEET_SEPARATOR: char = '!';

/// Build one metadata record per column of `range`, left to right.
///
/// `sheet_names` is the complete sheet list of the workbook; formulas
/// containing `broken_marker` keep their text but get no dependencies.
pub fn extract_columns(
    sheet: &Sheet,
    range: &TableRange,
    sheet_names: &[String],
    broken_marker: &str,
) -> Vec<ColumnMetadata> {
    range
        .cols()
        .map(|col| {
            let formula = first_formula(sheet, range, col).map(str::to_string);
            let dependencies = match &formula {
                Some(f) if !f.contains(broken_marker) => formula_dependencies(f, sheet_names),
                _ => BTreeSet::new(),
            };

            ColumnMetadata {
                column: col,
                name: column_name(sheet, range, col),
                formula,
                dependencies,
                enhanced_formula: None,
            }
        })
        .collect()
}

/// First non-formula, non-empty value of a column within the table rows
pub fn column_name(sheet: &Sheet, range: &TableRange, col: u32) -> Option<String> {
    range
        .rows()
        .filter_map(|row| sheet.get_cell(row, col))
        .find(|cell| !cell.is_formula() && !cell.value.is_empty())
        .map(|cell| cell.value.to_string())
}

/// Source text of the first formula cell of a column within the table rows
pub fn first_formula<'a>(sheet: &'a Sheet, range: &TableRange, col: u32) -> Option<&'a str> {
    range.rows().find_map(|row| sheet.formula(row, col))
}

/// Sheets whose name occurs in any `!`-delimited token of the formula.
///
/// Matching is plain substring containment, so a sheet called `Sales`
/// is reported for `=SalesTotals!A1` as well.
pub fn formula_dependencies(formula: &str, sheet_names: &[String]) -> BTreeSet<String> {
    let mut dependencies = BTreeSet::new();

    for token in formula.split(SHEET_SEPARATOR) {
        let token = token.trim_matches('=');
        for name in sheet_names {
            if token.contains(name.as_str()) {
                dependencies.insert(name.clone());
            }
        }
    }

    dependencies
}

/// Row-major computed values inside `range`
pub fn table_data(sheet: &Sheet, range: &TableRange) -> Vec<Vec<CellValue>> {
    range
        .rows()
        .map(|row| range.cols().map(|col| sheet.value(row, col).clone()).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn test_column_name_skips_formulas_and_blanks() {
        let mut sheet = Sheet::new("Orders");
        sheet
            .set_formula(1, 1, "=TODAY()")
            .set_value(1, 1, CellValue::Number(45000.0))
            .set_value(3, 1, text("Date"))
            .set_value(4, 1, text("later"));

        let range = TableRange::new(1, 1, 4, 1);
        assert_eq!(column_name(&sheet, &range, 1), Some("Date".to_string()));
    }

    #[test]
    fn test_column_name_absent_for_formula_only_column() {
        let mut sheet = Sheet::new("Orders");
        sheet
            .set_formula(1, 2, "=A1*2")
            .set_value(1, 2, CellValue::Number(4.0))
            .set_formula(2, 2, "=A2*2");

        let range = TableRange::new(1, 1, 2, 2);
        assert_eq!(column_name(&sheet, &range, 2), None);
    }

    #[test]
    fn test_numeric_name_is_rendered() {
        let mut sheet = Sheet::new("Plan");
        sheet.set_value(1, 1, CellValue::Number(2024.0));
        let range = TableRange::new(1, 1, 1, 1);
        assert_eq!(column_name(&sheet, &range, 1), Some("2024".to_string()));
    }

    #[test]
    fn test_only_first_formula_is_captured() {
        let mut sheet = Sheet::new("Orders");
        sheet
            .set_value(1, 3, text("Total"))
            .set_formula(2, 3, "=Inventory!B2*2")
            .set_formula(3, 3, "=Forecast!B3*2");

        let all = names(&["Orders", "Inventory", "Forecast"]);
        let columns = extract_columns(&sheet, &TableRange::new(1, 3, 3, 3), &all, "#REF!");

        assert_eq!(columns.len(), 1);
        assert_eq!(columns[0].column, 3);
        assert_eq!(columns[0].name.as_deref(), Some("Total"));
        assert_eq!(columns[0].formula.as_deref(), Some("=Inventory!B2*2"));
        assert_eq!(
            columns[0].dependencies,
            BTreeSet::from(["Inventory".to_string()])
        );
    }

    #[test]
    fn test_broken_reference_keeps_text_without_dependencies() {
        let mut sheet = Sheet::new("Orders");
        sheet
            .set_value(1, 1, text("Qty"))
            .set_formula(2, 1, "=Inventory!#REF!+1")
            .set_formula(3, 1, "=Inventory!B3");

        let all = names(&["Orders", "Inventory"]);
        let columns = extract_columns(&sheet, &TableRange::new(1, 1, 3, 1), &all, "#REF!");

        assert_eq!(columns[0].formula.as_deref(), Some("=Inventory!#REF!+1"));
        assert!(columns[0].dependencies.is_empty());
    }

    #[test]
    fn test_dependencies_match_substrings() {
        let all = names(&["Sales", "Inventory", "Orders"]);
        let deps = formula_dependencies("=SalesTotals!A1+Inventory!B2", &all);
        assert_eq!(
            deps,
            BTreeSet::from(["Inventory".to_string(), "Sales".to_string()])
        );
    }

    #[test]
    fn test_dependencies_are_case_sensitive() {
        let all = names(&["Sales"]);
        assert!(formula_dependencies("=sales!A1", &all).is_empty());
    }

    #[test]
    fn test_quoted_sheet_is_found() {
        let all = names(&["Stock Levels", "Orders"]);
        let deps = formula_dependencies("=SUM('Stock Levels'!B2:B9)", &all);
        assert_eq!(deps, BTreeSet::from(["Stock Levels".to_string()]));
    }

    #[test]
    fn test_columns_without_formula() {
        let mut sheet = Sheet::new("Orders");
        sheet.set_value(1, 1, text("SKU")).set_value(1, 2, text("Qty"));

        let columns = extract_columns(&sheet, &TableRange::new(1, 1, 1, 2), &names(&["Orders"]), "#REF!");
        assert_eq!(columns.len(), 2);
        assert!(columns.iter().all(|c| c.formula.is_none() && c.dependencies.is_empty()));
        assert_eq!(columns[1].name.as_deref(), Some("Qty"));
    }

    #[test]
    fn test_table_data_fills_blanks() {
        let mut sheet = Sheet::new("Orders");
        sheet
            .set_value(1, 1, text("SKU"))
            .set_value(2, 2, CellValue::Number(3.0));

        let data = table_data(&sheet, &TableRange::new(1, 1, 2, 2));
        assert_eq!(
            data,
            vec![
                vec![text("SKU"), CellValue::Empty],
                vec![CellValue::Empty, CellValue::Number(3.0)],
            ]
        );
    }
}
