//! sheetscope-core: table detection and column provenance for spreadsheets
//!
//! A workbook is read in two views (computed values and formula source).
//! Each visible sheet is split into rectangular tables, each table column is
//! given a name, its driving formula and the sheets that formula depends on,
//! and finally every formula is annotated with the names of the columns its
//! cell references point at, across sheets.

pub mod classify;
pub mod config;
pub mod error;
pub mod extract;
pub mod reader;
pub mod reference;
pub mod resolve;
pub mod table;

use std::path::Path;
use tracing::info;

pub use classify::{Classification, Role, TableClassifier, TablePreview, TableVerdict};

pub use config::ScanConfig;
pub use error::{ClassifyError, LoadError};
pub use reader::{CellValue, Sheet, Workbook};
pub use resolve::{ColumnIndex, enhance_formula};
pub use table::{ColumnMetadata, SheetTables, Table, TableRange, WorkbookTables};

/// Main scanner interface
pub struct Scanner {
    config: ScanConfig,
}

impl Scanner {
    /// Create a new scanner with default configuration
    pub fn new() -> Self {
        Self::with_config(ScanConfig::default())
    }

    /// Create a new scanner with custom configuration
    pub fn with_config(config: ScanConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Read a spreadsheet file and extract its tables
    pub fn scan_file<P: AsRef<Path>>(&self, path: P) -> Result<WorkbookTables, LoadError> {
        let workbook = reader::read_workbook(path)?;
        Ok(self.scan_workbook(&workbook))
    }

    /// Extract the tables of every sheet, then resolve formula references.
    /// Resolution starts only once all sheets are extracted, since a
    /// reference may point at any of them.
    pub fn scan_workbook(&self, workbook: &Workbook) -> WorkbookTables {
        let mut tables = extract::extract_workbook(workbook, &self.config);

        let index = ColumnIndex::build(&tables);
        tables.enhance(&index, &self.config.unknown_marker);

        info!(
            path = %workbook.path.display(),
            sheets = tables.sheets.len(),
            tables = tables.table_count(),
            indexed_cells = index.len(),
            "scanned workbook"
        );

        tables
    }
}

impl Scanner {
    /// Classify every scanned table with the configured preview size and
    /// attempt budget
    pub fn classify(
        &self,
        tables: &WorkbookTables,
        classifier: &dyn TableClassifier,
    ) -> Vec<TableVerdict> {
        classify::classify_workbook(tables, classifier, &self.config)
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    /// Orders references Inventory, which comes later in workbook order
    fn workbook() -> Workbook {
        let mut orders = Sheet::new("Orders");
        orders
            .set_value(1, 1, text("SKU"))
            .set_value(1, 2, text("Price"))
            .set_value(1, 3, text("Value"));
        for row in 2..=5 {
            orders
                .set_value(row, 1, text(&format!("SKU-{}", row)))
                .set_value(row, 2, CellValue::Number(2.0))
                .set_formula(row, 3, format!("=Inventory!B{}*B{}", row, row))
                .set_value(row, 3, CellValue::Number(20.0));
        }
        for row in 7..=9 {
            orders
                .set_value(row, 1, text("x"))
                .set_value(row, 3, text("y"));
        }

        let mut inventory = Sheet::new("Inventory");
        inventory.set_value(1, 1, text("SKU")).set_value(1, 2, text("Qty"));
        for row in 2..=5 {
            inventory
                .set_value(row, 1, text(&format!("SKU-{}", row)))
                .set_value(row, 2, CellValue::Number(10.0));
        }

        Workbook::from_sheets(vec![orders, inventory])
    }

    #[test]
    fn test_scan_workbook_end_to_end() {
        let tables = Scanner::new().scan_workbook(&workbook());

        let orders = tables.get("Orders").unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].range, TableRange::new(1, 1, 5, 3));
        assert_eq!(orders[1].range, TableRange::new(7, 1, 9, 3));

        let value = &orders[0].columns[2];
        assert_eq!(value.name.as_deref(), Some("Value"));
        assert_eq!(value.formula.as_deref(), Some("=Inventory!B2*B2"));
        assert!(value.dependencies.contains("Inventory"));
        assert_eq!(
            value.enhanced_formula.as_deref(),
            Some("=Inventory!B2(Qty)*B2(Price)")
        );

        // Column B of the second Orders table is blank throughout
        assert_eq!(orders[1].columns[1].name, None);
        assert_eq!(tables.get("Inventory").unwrap().len(), 1);
    }

    #[test]
    fn test_custom_unknown_marker() {
        let config = ScanConfig {
            unknown_marker: "?".to_string(),
            ..ScanConfig::default()
        };
        let mut sheet = Sheet::new("Solo");
        sheet
            .set_value(1, 1, text("Total"))
            .set_formula(2, 1, "=Z50")
            .set_value(2, 1, CellValue::Number(0.0));

        let tables = Scanner::with_config(config).scan_workbook(&Workbook::from_sheets(vec![sheet]));
        let column = &tables.get("Solo").unwrap()[0].columns[0];
        assert_eq!(column.enhanced_formula.as_deref(), Some("=Z50(?)"));
    }

    struct AlwaysStock;

    impl TableClassifier for AlwaysStock {
        fn classify(&self, preview: &TablePreview) -> Result<String, ClassifyError> {
            if preview.rows.len() > 2 {
                return Err(ClassifyError::Backend("preview too long".to_string()));
            }
            Ok(r#"{"is_inventory_planning": true, "details": {"SKU": "SKU", "Location/Warehouse": null, "Quantity": "Qty", "Total Inventory": null, "Current Inventory": null, "Sales Forecast": null}, "description": "stock"}"#.to_string())
        }
    }

    #[test]
    fn test_scanner_classify_forwards_preview_rows() {
        let config = ScanConfig {
            preview_rows: 2,
            ..ScanConfig::default()
        };
        let scanner = Scanner::with_config(config);
        let tables = scanner.scan_workbook(&workbook());

        let verdicts = scanner.classify(&tables, &AlwaysStock);
        assert_eq!(verdicts.len(), tables.table_count());
        assert!(verdicts.iter().all(|v| v.classification.is_inventory_planning));
    }
}
