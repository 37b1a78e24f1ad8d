//! Contract with an external table classifier
//!
//! The core does not decide what a table means. A [`TableClassifier`] is
//! handed a short preview of a table and answers with a JSON document naming
//! whether the table is relevant for inventory planning and which column
//! plays each [`Role`]. This module renders previews, validates answers and
//! bounds the retries spent on malformed ones.

use crate::config::ScanConfig;
use crate::error::ClassifyError;
use crate::reader::CellValue;
use crate::table::{TableRange, WorkbookTables};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};

/// Semantic roles a classifier may assign to columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    Sku,
    Location,
    Quantity,
    TotalInventory,
    CurrentInventory,
    SalesForecast,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::Sku,
        Role::Location,
        Role::Quantity,
        Role::TotalInventory,
        Role::CurrentInventory,
        Role::SalesForecast,
    ];

    /// Key used for this role in classifier responses
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Sku => "SKU",
            Role::Location => "Location/Warehouse",
            Role::Quantity => "Quantity",
            Role::TotalInventory => "Total Inventory",
            Role::CurrentInventory => "Current Inventory",
            Role::SalesForecast => "Sales Forecast",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// First rows of a table, as shown to a classifier
#[derive(Debug, Clone, PartialEq)]
pub struct TablePreview {
    pub sheet: String,
    pub range: TableRange,
    pub rows: Vec<Vec<CellValue>>,
}

impl TablePreview {
    /// Render as a Markdown table with positional column headers and a row index
    pub fn to_markdown(&self) -> String {
        let width = self.rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut out = String::from("|   |");
        for col in 0..width {
            out.push_str(&format!(" {} |", col));
        }
        out.push_str("\n|---|");
        out.push_str(&"---|".repeat(width));

        for (idx, row) in self.rows.iter().enumerate() {
            out.push_str(&format!("\n| {} |", idx));
            for col in 0..width {
                let cell = row.get(col).map(|v| v.to_string()).unwrap_or_default();
                out.push_str(&format!(" {} |", cell.replace('|', "\\|")));
            }
        }

        out
    }
}

/// Validated classifier answer
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub is_inventory_planning: bool,
    /// Column name per role; `None` when no column plays it
    pub details: BTreeMap<Role, Option<String>>,
    pub description: String,
}

#[derive(Deserialize)]
struct RawClassification {
    is_inventory_planning: Value,
    details: Map<String, Value>,
    description: String,
}

/// Pluggable classifier; returns its raw textual response
pub trait TableClassifier: Send + Sync {
    fn classify(&self, preview: &TablePreview) -> Result<String, ClassifyError>;
}

/// Remove a surrounding ```json fence and whitespace
pub fn clean_response(response: &str) -> &str {
    let mut body = response.trim();
    if let Some(rest) = body.strip_prefix("```json") {
        body = rest;
    } else if let Some(rest) = body.strip_prefix("```") {
        body = rest;
    }
    if let Some(rest) = body.strip_suffix("```") {
        body = rest;
    }
    body.trim()
}

/// Parse and validate a classifier response
pub fn parse_classification(response: &str) -> Result<Classification, ClassifyError> {
    let raw: RawClassification = serde_json::from_str(clean_response(response))?;

    let is_inventory_planning = match &raw.is_inventory_planning {
        Value::Bool(b) => *b,
        Value::Number(n) if n.as_u64() == Some(1) => true,
        Value::Number(n) if n.as_u64() == Some(0) => false,
        other => {
            return Err(ClassifyError::Malformed(format!(
                "is_inventory_planning must be 0 or 1, got {}",
                other
            )));
        }
    };

    let mut details = BTreeMap::new();
    for role in Role::ALL {
        let column = match raw.details.get(role.as_str()) {
            None => {
                return Err(ClassifyError::Malformed(format!(
                    "missing role '{}' in details",
                    role
                )));
            }
            Some(Value::Null) => None,
            Some(Value::String(s)) if s.is_empty() || s == "None" || s == "null" => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => {
                return Err(ClassifyError::Malformed(format!(
                    "role '{}' must name a column, got {}",
                    role, other
                )));
            }
        };
        details.insert(role, column);
    }

    Ok(Classification {
        is_inventory_planning,
        details,
        description: raw.description,
    })
}

/// Ask `classifier` until it returns a well-formed answer or `attempts` run out.
///
/// Returns `Ok(None)` when every attempt was malformed. Backend failures are
/// returned immediately.
pub fn classify_with_retries(
    classifier: &dyn TableClassifier,
    preview: &TablePreview,
    attempts: usize,
) -> Result<Option<Classification>, ClassifyError> {
    for attempt in 1..=attempts {
        let response = classifier.classify(preview)?;
        match parse_classification(&response) {
            Ok(classification) => return Ok(Some(classification)),
            Err(e) => {
                warn!(
                    sheet = %preview.sheet,
                    range = %preview.range,
                    attempt,
                    attempts_left = attempts - attempt,
                    error = %e,
                    "invalid classifier response"
                );
            }
        }
    }

    Ok(None)
}

/// Classification of one table
#[derive(Debug, Clone, PartialEq)]
pub struct TableVerdict {
    pub sheet: String,
    pub range: TableRange,
    pub classification: Classification,
}

/// Classify every table of a workbook; tables the classifier cannot answer
/// for are logged and left out
pub fn classify_workbook(
    tables: &WorkbookTables,
    classifier: &dyn TableClassifier,
    config: &ScanConfig,
) -> Vec<TableVerdict> {
    let mut verdicts = Vec::new();

    for sheet in tables.iter() {
        for table in &sheet.tables {
            let preview = TablePreview {
                sheet: sheet.sheet.clone(),
                range: table.range,
                rows: table.head(config.preview_rows).to_vec(),
            };

            match classify_with_retries(classifier, &preview, config.classifier_attempts) {
                Ok(Some(classification)) => {
                    debug!(sheet = %sheet.sheet, range = %table.range, "classified table");
                    verdicts.push(TableVerdict {
                        sheet: sheet.sheet.clone(),
                        range: table.range,
                        classification,
                    });
                }
                Ok(None) => {
                    warn!(sheet = %sheet.sheet, range = %table.range, "max retries reached, skipping table");
                }
                Err(e) => {
                    warn!(sheet = %sheet.sheet, range = %table.range, error = %e, "failed to classify table");
                }
            }
        }
    }

    verdicts
}
