//! Conversions between zero-based `(row, col)` pairs and A1 notation.
//!
//! Column names are bijective base-26: `A`..`Z`, `AA`..`ZZ`, `AAA`.. with no
//! zero digit. All functions are pure.

use crate::common::{Error, Result};
use std::fmt;

/// Number of rows in a worksheet.
pub const ROW_MAX: u32 = 1_048_576;
/// Number of columns in a worksheet.
pub const COL_MAX: u32 = 16_384;
/// Maximum number of characters in a cell string.
pub const STR_MAX: usize = 32_767;

/// Convert a zero-based column index to its letters, optionally with a `$`.
pub fn col_to_name(col: u32, absolute: bool) -> String {
    let mut letters = Vec::with_capacity(4);
    let mut n = col + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();

    let mut name = String::with_capacity(letters.len() + 1);
    if absolute {
        name.push('$');
    }
    name.extend(letters.into_iter().map(char::from));
    name
}

/// Convert `(row, col)` to a relative cell reference such as `C2`.
///
/// # Examples
///
/// ```
/// use litchi_xlsxwriter::xlsx::utility::rowcol_to_cell;
/// assert_eq!(rowcol_to_cell(0, 0), "A1");
/// assert_eq!(rowcol_to_cell(1, 2), "C2");
/// ```
pub fn rowcol_to_cell(row: u32, col: u32) -> String {
    rowcol_to_cell_abs(row, col, false, false)
}

/// Convert `(row, col)` to a cell reference with optional `$` anchors.
pub fn rowcol_to_cell_abs(row: u32, col: u32, row_abs: bool, col_abs: bool) -> String {
    let mut cell = col_to_name(col, col_abs);
    if row_abs {
        cell.push('$');
    }
    let mut buffer = itoa::Buffer::new();
    cell.push_str(buffer.format(row as u64 + 1));
    cell
}

/// Parse a cell reference such as `B3` or `$B$3` into `(row, col)`.
pub fn cell_to_rowcol(cell: &str) -> Result<(u32, u32)> {
    let invalid = || Error::InvalidReference(cell.to_string());
    let s = cell.trim();
    let s = s.strip_prefix('$').unwrap_or(s);

    let letters_end = s
        .find(|c: char| !c.is_ascii_alphabetic())
        .ok_or_else(invalid)?;
    if letters_end == 0 || letters_end > 3 {
        return Err(invalid());
    }
    let (letters, rest) = s.split_at(letters_end);
    let digits = rest.strip_prefix('$').unwrap_or(rest);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let col = name_to_col(letters).ok_or_else(invalid)?;
    let row: u32 = digits.parse().map_err(|_| invalid())?;
    if row == 0 {
        return Err(invalid());
    }
    Ok((row - 1, col))
}

/// Parse column letters (`A`, `xfd`) into a zero-based index.
pub fn name_to_col(name: &str) -> Option<u32> {
    let name = name.strip_prefix('$').unwrap_or(name);
    if name.is_empty() || name.len() > 3 {
        return None;
    }
    let mut col: u32 = 0;
    for b in name.bytes() {
        if !b.is_ascii_alphabetic() {
            return None;
        }
        col = col * 26 + (b.to_ascii_uppercase() - b'A') as u32 + 1;
    }
    Some(col - 1)
}

/// Build a range string `A1:B2` from corner cells.
///
/// A range whose corners coincide is still written with both corners.
pub fn range(row1: u32, col1: u32, row2: u32, col2: u32) -> String {
    format!("{}:{}", rowcol_to_cell(row1, col1), rowcol_to_cell(row2, col2))
}

/// Build an absolute range string `$A$1:$B$2`.
pub fn range_abs(row1: u32, col1: u32, row2: u32, col2: u32) -> String {
    format!(
        "{}:{}",
        rowcol_to_cell_abs(row1, col1, true, true),
        rowcol_to_cell_abs(row2, col2, true, true)
    )
}

/// Quote a sheet name for use in a defined name unless it is a plain `SheetN`.
pub fn quote_sheetname(name: &str) -> String {
    let plain = name
        .strip_prefix("Sheet")
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()));
    if plain {
        name.to_string()
    } else {
        format!("'{}'", name)
    }
}

/// Build a defined-name area such as `Sheet1!$A$1:$C$13`.
///
/// Full-column and full-row blocks use the short `$A:$C` and `$1:$3` forms;
/// a single cell is written once.
///
/// # Examples
///
/// ```
/// use litchi_xlsxwriter::xlsx::utility::name_area;
/// assert_eq!(name_area("Sheet1", 0, 0, 9, 3), "Sheet1!$A$1:$D$10");
/// assert_eq!(name_area("Data", 0, 0, 1_048_575, 1), "'Data'!$A:$B");
/// ```
pub fn name_area(sheet_name: &str, row1: u32, col1: u32, row2: u32, col2: u32) -> String {
    let col_1 = col_to_name(col1, true);
    let col_2 = col_to_name(col2, true);
    let row_1 = format!("${}", row1 + 1);
    let row_2 = format!("${}", row2 + 1);

    let (range1, range2, row_col_only) = if row1 == 0 && row2 == ROW_MAX - 1 {
        (col_1, col_2, true)
    } else if col1 == 0 && col2 == COL_MAX - 1 {
        (row_1, row_2, true)
    } else {
        (col_1 + &row_1, col_2 + &row_2, false)
    };

    let area = if range1 == range2 && !row_col_only {
        range1
    } else {
        format!("{}:{}", range1, range2)
    };
    format!("{}!{}", quote_sheetname(sheet_name), area)
}

/// Check that a coordinate lies inside the worksheet grid.
#[inline]
pub fn check_dimensions(row: u32, col: u32) -> Result<()> {
    if row >= ROW_MAX || col >= COL_MAX {
        return Err(Error::Dimension { row, col });
    }
    Ok(())
}

/// A rectangular block of cells with `first <= last` on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellRange {
    pub first_row: u32,
    pub first_col: u32,
    pub last_row: u32,
    pub last_col: u32,
}

impl CellRange {
    /// Create a range, swapping corners so that first <= last.
    pub fn new(row1: u32, col1: u32, row2: u32, col2: u32) -> Self {
        Self {
            first_row: row1.min(row2),
            first_col: col1.min(col2),
            last_row: row1.max(row2),
            last_col: col1.max(col2),
        }
    }

    /// A range covering one cell.
    pub fn cell(row: u32, col: u32) -> Self {
        Self::new(row, col, row, col)
    }

    /// Parse `A1`, `A1:B2` or a column span such as `C:F`.
    ///
    /// # Examples
    ///
    /// ```
    /// use litchi_xlsxwriter::xlsx::utility::CellRange;
    /// let r = CellRange::parse("B2:A1").unwrap();
    /// assert_eq!((r.first_row, r.first_col, r.last_row, r.last_col), (0, 0, 1, 1));
    /// let cols = CellRange::parse("C:F").unwrap();
    /// assert_eq!((cols.first_col, cols.last_col), (2, 5));
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        match s.split_once(':') {
            Some((a, b)) => {
                if let (Some(c1), Some(c2)) = (name_to_col(a), name_to_col(b)) {
                    return Ok(Self::new(0, c1, ROW_MAX - 1, c2));
                }
                let (r1, c1) = cell_to_rowcol(a)?;
                let (r2, c2) = cell_to_rowcol(b)?;
                Ok(Self::new(r1, c1, r2, c2))
            },
            None => {
                let (r, c) = cell_to_rowcol(s)?;
                Ok(Self::cell(r, c))
            },
        }
    }

    #[inline]
    pub fn is_single_cell(&self) -> bool {
        self.first_row == self.last_row && self.first_col == self.last_col
    }

    /// Top-left cell reference.
    pub fn first_cell(&self) -> String {
        rowcol_to_cell(self.first_row, self.first_col)
    }

    /// Check both corners against the worksheet grid.
    pub fn check(&self) -> Result<()> {
        check_dimensions(self.first_row, self.first_col)?;
        check_dimensions(self.last_row, self.last_col)
    }

    /// `sqref`-style text: `A1` for a single cell, `A1:B2` otherwise.
    pub fn to_sqref(&self) -> String {
        if self.is_single_cell() {
            self.first_cell()
        } else {
            range(self.first_row, self.first_col, self.last_row, self.last_col)
        }
    }

    pub fn contains(&self, row: u32, col: u32) -> bool {
        (self.first_row..=self.last_row).contains(&row)
            && (self.first_col..=self.last_col).contains(&col)
    }

    pub fn cells(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (self.first_row..=self.last_row)
            .flat_map(move |r| (self.first_col..=self.last_col).map(move |c| (r, c)))
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&range(
            self.first_row,
            self.first_col,
            self.last_row,
            self.last_col,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn column_names() {
        assert_eq!(col_to_name(0, false), "A");
        assert_eq!(col_to_name(25, false), "Z");
        assert_eq!(col_to_name(26, false), "AA");
        assert_eq!(col_to_name(701, false), "ZZ");
        assert_eq!(col_to_name(702, false), "AAA");
        assert_eq!(col_to_name(COL_MAX - 1, true), "$XFD");
    }

    #[test]
    fn cell_references() {
        assert_eq!(rowcol_to_cell(0, 0), "A1");
        assert_eq!(rowcol_to_cell(1, 2), "C2");
        assert_eq!(rowcol_to_cell_abs(4, 1, true, true), "$B$5");
        assert_eq!(rowcol_to_cell_abs(4, 1, false, true), "$B5");
        assert_eq!(cell_to_rowcol("C2").unwrap(), (1, 2));
        assert_eq!(cell_to_rowcol("$XFD$1048576").unwrap(), (ROW_MAX - 1, COL_MAX - 1));
        assert_eq!(cell_to_rowcol("aa10").unwrap(), (9, 26));
    }

    #[test]
    fn malformed_references_are_rejected() {
        for bad in ["", "A", "1", "A0", "1A", "ABCD1", "A1B", "A-1"] {
            assert!(
                matches!(cell_to_rowcol(bad), Err(Error::InvalidReference(_))),
                "{bad}"
            );
        }
    }

    #[test]
    fn ranges() {
        assert_eq!(range(0, 0, 9, 3), "A1:D10");
        assert_eq!(range_abs(0, 0, 0, 0), "$A$1:$A$1");
        let r = CellRange::new(5, 4, 1, 2);
        assert_eq!(r.to_sqref(), "C2:E6");
        assert_eq!(CellRange::cell(2, 2).to_sqref(), "C3");
        assert_eq!(r.to_string(), "C2:E6");
        assert_eq!(r.cells().count(), 15);
    }

    #[test]
    fn sheet_name_quoting() {
        assert_eq!(quote_sheetname("Sheet1"), "Sheet1");
        assert_eq!(quote_sheetname("Sheet"), "'Sheet'");
        assert_eq!(quote_sheetname("Sales Data"), "'Sales Data'");
    }

    #[test]
    fn defined_name_areas() {
        assert_eq!(name_area("Sheet1", 2, 2, 2, 2), "Sheet1!$C$3");
        assert_eq!(name_area("Sheet1", 0, 0, 1, COL_MAX - 1), "Sheet1!$1:$2");
        assert_eq!(name_area("Sheet1", 0, 4, ROW_MAX - 1, 4), "Sheet1!$E:$E");
        assert_eq!(name_area("My Sheet", 0, 0, 9, 3), "'My Sheet'!$A$1:$D$10");
    }

    #[test]
    fn dimension_limits() {
        assert!(check_dimensions(ROW_MAX - 1, COL_MAX - 1).is_ok());
        assert!(matches!(
            check_dimensions(ROW_MAX, 0),
            Err(Error::Dimension { .. })
        ));
        assert!(check_dimensions(0, COL_MAX).is_err());
    }

    proptest! {
        #[test]
        fn a1_round_trip(row in 0u32..ROW_MAX, col in 0u32..COL_MAX) {
            let cell = rowcol_to_cell(row, col);
            prop_assert_eq!(cell_to_rowcol(&cell).unwrap(), (row, col));
        }
    }
}
