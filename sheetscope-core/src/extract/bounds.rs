//! Table boundary detection over the values view of a sheet

use crate::reader::Sheet;
use crate::table::TableRange;

/// Partition the non-empty regions of a sheet into table ranges, top to bottom.
///
/// Each maximal run of non-empty rows becomes one candidate whose column
/// bounds are the tightest box around its values. Tables that share rows but
/// sit side by side are therefore reported as a single range.
pub fn detect_tables(sheet: &Sheet) -> Vec<TableRange> {
    let candidates = row_runs(sheet)
        .into_iter()
        .filter_map(|(start_row, end_row)| {
            let (start_col, end_col) = column_bounds(sheet, start_row, end_row)?;
            Some(TableRange::new(start_row, start_col, end_row, end_col))
        })
        .collect();

    merge_adjacent(candidates)
}

/// Merge each candidate into its predecessor when both span the same columns
/// and no blank row separates them
pub fn merge_adjacent(candidates: Vec<TableRange>) -> Vec<TableRange> {
    let mut tables: Vec<TableRange> = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        match tables.last_mut() {
            Some(prev)
                if prev.end_row + 1 >= candidate.start_row
                    && prev.start_col == candidate.start_col
                    && prev.end_col == candidate.end_col =>
            {
                prev.end_row = candidate.end_row;
            }
            _ => tables.push(candidate),
        }
    }

    tables
}

/// Maximal runs of rows holding at least one non-empty value, as (start, end)
fn row_runs(sheet: &Sheet) -> Vec<(u32, u32)> {
    let mut runs = Vec::new();
    let mut current: Option<(u32, u32)> = None;

    // Cells iterate in (row, col) order, so non-empty rows arrive ascending
    let non_empty_rows = sheet
        .cells
        .values()
        .filter(|c| !c.value.is_empty())
        .map(|c| c.row);

    for row in non_empty_rows {
        current = match current {
            Some((start, end)) if row == end || row == end + 1 => Some((start, row)),
            Some(run) => {
                runs.push(run);
                Some((row, row))
            }
            None => Some((row, row)),
        };
    }

    if let Some(run) = current {
        runs.push(run);
    }

    runs
}

/// Minimum and maximum column holding a value across a row run
fn column_bounds(sheet: &Sheet, start_row: u32, end_row: u32) -> Option<(u32, u32)> {
    let mut bounds: Option<(u32, u32)> = None;

    for row in start_row..=end_row {
        for cell in sheet.values_in_row(row) {
            bounds = Some(match bounds {
                Some((min, max)) => (min.min(cell.col), max.max(cell.col)),
                None => (cell.col, cell.col),
            });
        }
    }

    bounds
}
