//! Output formatters for extracted tables

use anyhow::Result;
use colored::*;
use sheetscope_core::{CellValue, ColumnMetadata, Table, WorkbookTables};
use std::path::Path;

/// Print tables in human-readable format with colors and hierarchy
pub fn print_human(file_path: &Path, tables: &WorkbookTables, display_rows: usize) {
    println!("{}", format!("Scanning: {}", file_path.display()).bold());
    println!();

    if tables.table_count() == 0 {
        println!("{}", "No tables found".yellow().bold());
        println!();
        return;
    }

    for sheet in tables.iter() {
        println!("{} {}", "Sheet:".bold(), sheet.sheet.cyan().bold());
        println!("{}", "-".repeat(40));

        for (i, table) in sheet.tables.iter().enumerate() {
            println!(
                "  {} {} {}",
                format!("Table {}:", i + 1).bold(),
                table.range.to_string().yellow(),
                format!("({} rows x {} cols)", table.range.height(), table.range.width())
                    .bright_black()
            );
            print_data(table, display_rows);
            println!("    {}", "Metadata:".bold());
            for column in &table.columns {
                print_column(column);
            }
        }
        println!();
    }

    println!("{}", "Summary:".bold().underline());
    println!("  {} {}", "Sheets:".bold(), tables.sheets.len());
    println!("  {} {}", "Tables:".bold(), tables.table_count());
}

fn print_data(table: &Table, display_rows: usize) {
    let rows = table.head(display_rows);
    if rows.is_empty() {
        println!("    Table Data: {}", "Not available".bright_black());
        return;
    }

    println!("    Table Data (First {} Rows):", rows.len());
    for row in rows {
        let cells: Vec<String> = row.iter().map(render_cell).collect();
        println!("      {}", cells.join(" | "));
    }
}

fn render_cell(value: &CellValue) -> String {
    match value {
        CellValue::Empty => "·".to_string(),
        other => other.to_string(),
    }
}

fn print_column(column: &ColumnMetadata) {
    let name = match &column.name {
        Some(name) => name.green().to_string(),
        None => "<unnamed>".bright_black().to_string(),
    };
    println!(
        "      {} {}",
        sheetscope_core::reference::column_letters(column.column).bright_black(),
        name
    );

    if let Some(formula) = &column.formula {
        println!("        {} {}", "Formula:".bold(), formula);
    }
    if let Some(enhanced) = &column.enhanced_formula {
        println!("        {} {}", "Resolved:".bold(), enhanced.cyan());
    }
    if !column.dependencies.is_empty() {
        let deps: Vec<&str> = column.dependencies.iter().map(String::as_str).collect();
        println!("        {} {}", "Depends on:".bold(), deps.join(", "));
    }
}

/// Print tables in JSON format
pub fn print_json(file_path: &Path, tables: &WorkbookTables) -> Result<()> {
    let output = serde_json::json!({
        "file": file_path.display().to_string(),
        "sheets": tables,
        "summary": {
            "sheets": tables.sheets.len(),
            "tables": tables.table_count(),
        }
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
