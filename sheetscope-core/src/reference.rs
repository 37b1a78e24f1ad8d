//! Cell addresses and A1-style references

use regex::Regex;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

/// Last column of a spreadsheet grid (XFD)
pub const MAX_COLUMN: u32 = 16_384;

/// Cell reference inside a formula, optionally sheet-qualified.
/// Group 1: quoted sheet name, group 2: bare sheet name,
/// group 3: column letters, group 4: row digits.
static CELL_REF_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:'((?:[^']|'')+)'!|(\w+)!)?([A-Z]+)(\d+)").expect("valid cell reference regex")
});

pub(crate) fn cell_ref_pattern() -> &'static Regex {
    &CELL_REF_PATTERN
}

/// (sheet, row, column) triple, 1-based
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CellAddress {
    pub sheet: String,
    pub row: u32,
    pub col: u32,
}

impl CellAddress {
    pub fn new(sheet: impl Into<String>, row: u32, col: u32) -> Self {
        Self {
            sheet: sheet.into(),
            row,
            col,
        }
    }
}

impl PartialOrd for CellAddress {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellAddress {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sheet
            .cmp(&other.sheet)
            .then_with(|| self.row.cmp(&other.row))
            .then_with(|| self.col.cmp(&other.col))
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}!{}{}", self.sheet, column_letters(self.col), self.row)
    }
}

/// Convert a 1-based column index to letters (1 -> A, 27 -> AA)
pub fn column_letters(col: u32) -> String {
    let mut result = String::new();
    let mut col = col;

    while col > 0 {
        col -= 1;
        result.insert(0, (b'A' + (col % 26) as u8) as char);
        col /= 26;
    }

    result
}

/// Convert column letters to a 1-based index (A -> 1, AA -> 27).
/// Returns `None` for empty input, non-letters, or columns past XFD.
pub fn column_index(letters: &str) -> Option<u32> {
    if letters.is_empty() || letters.len() > 3 {
        return None;
    }

    let mut col = 0u32;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        col = col * 26 + (ch.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
    }

    (col <= MAX_COLUMN).then_some(col)
}

/// A cell reference found in formula text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormulaReference<'a> {
    /// Byte span of the whole match in the formula
    pub span: (usize, usize),
    pub text: &'a str,
    /// Sheet qualifier with quoting removed
    pub sheet: Option<String>,
    pub column_letters: &'a str,
    pub row: u32,
}

impl FormulaReference<'_> {
    /// Address this reference points at, unqualified ones resolving to
    /// `current_sheet`; `None` when the column letters are out of range
    pub fn address(&self, current_sheet: &str) -> Option<CellAddress> {
        let col = column_index(self.column_letters)?;
        let sheet = self.sheet.as_deref().unwrap_or(current_sheet);
        Some(CellAddress::new(sheet, self.row, col))
    }
}

/// Scan formula text for cell references, left to right
pub fn find_references(formula: &str) -> Vec<FormulaReference<'_>> {
    let mut refs = Vec::new();

    for cap in cell_ref_pattern().captures_iter(formula) {
        let Some(whole) = cap.get(0) else { continue };
        let (Some(letters), Some(digits)) = (cap.get(3), cap.get(4)) else {
            continue;
        };
        // Rows too large for u32 cannot address anything
        let Ok(row) = digits.as_str().parse::<u32>() else {
            continue;
        };

        let sheet = if let Some(quoted) = cap.get(1) {
            Some(quoted.as_str().replace("''", "'"))
        } else {
            cap.get(2).map(|m| m.as_str().to_string())
        };

        refs.push(FormulaReference {
            span: (whole.start(), whole.end()),
            text: whole.as_str(),
            sheet,
            column_letters: letters.as_str(),
            row,
        });
    }

    refs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letters() {
        assert_eq!(column_letters(1), "A");
        assert_eq!(column_letters(26), "Z");
        assert_eq!(column_letters(27), "AA");
        assert_eq!(column_letters(28), "AB");
        assert_eq!(column_letters(MAX_COLUMN), "XFD");
    }

    #[test]
    fn test_column_index() {
        assert_eq!(column_index("A"), Some(1));
        assert_eq!(column_index("Z"), Some(26));
        assert_eq!(column_index("AA"), Some(27));
        assert_eq!(column_index("XFD"), Some(MAX_COLUMN));
        assert_eq!(column_index("XFE"), None);
        assert_eq!(column_index("ABCD"), None);
        assert_eq!(column_index(""), None);
    }

    #[test]
    fn test_letters_roundtrip_boundaries() {
        for col in [1, 26, 27, 52, 53, 702, 703, MAX_COLUMN] {
            assert_eq!(column_index(&column_letters(col)), Some(col));
        }
    }

    #[test]
    fn test_find_references() {
        let refs = find_references("=Inventory!B2+C3");
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].text, "Inventory!B2");
        assert_eq!(refs[0].sheet.as_deref(), Some("Inventory"));
        assert_eq!(refs[0].column_letters, "B");
        assert_eq!(refs[0].row, 2);
        assert_eq!(refs[1].text, "C3");
        assert_eq!(refs[1].sheet, None);
    }

    #[test]
    fn test_find_quoted_reference() {
        let refs = find_references("='Sales ''24'!D10*2");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].sheet.as_deref(), Some("Sales '24"));
        assert_eq!(refs[0].text, "'Sales ''24'!D10");
    }

    #[test]
    fn test_absolute_and_lowercase_not_matched() {
        assert!(find_references("=$A$1+b2").is_empty());
        assert!(find_references("=TODAY()").is_empty());
    }

    #[test]
    fn test_reference_address() {
        let refs = find_references("=Inventory!B2+C3+ABCD4");
        assert_eq!(
            refs[0].address("Orders"),
            Some(CellAddress::new("Inventory", 2, 2))
        );
        assert_eq!(refs[1].address("Orders"), Some(CellAddress::new("Orders", 3, 3)));
        assert_eq!(refs[2].address("Orders"), None);
    }

    #[test]
    fn test_address_display() {
        assert_eq!(CellAddress::new("Orders", 3, 3).to_string(), "Orders!C3");
    }
}
