//! Sparse row → column cell storage with dimension tracking.

use super::cell::{Cell, RangeValue};
use crate::common::Result;
use crate::xlsx::utility::{check_dimensions, rowcol_to_cell};
use std::collections::BTreeMap;

/// Running bounds of everything that contributes to `<dimension>`.
///
/// Bounds only ever grow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dimensions {
    pub min_row: Option<u32>,
    pub max_row: Option<u32>,
    pub min_col: Option<u32>,
    pub max_col: Option<u32>,
}

impl Dimensions {
    pub fn update(&mut self, row: u32, col: u32) {
        self.update_row(row);
        self.update_col(col);
    }

    pub fn update_row(&mut self, row: u32) {
        self.min_row = Some(self.min_row.map_or(row, |r| r.min(row)));
        self.max_row = Some(self.max_row.map_or(row, |r| r.max(row)));
    }

    pub fn update_col(&mut self, col: u32) {
        self.min_col = Some(self.min_col.map_or(col, |c| c.min(col)));
        self.max_col = Some(self.max_col.map_or(col, |c| c.max(col)));
    }

    /// The `ref` attribute of `<dimension>`.
    pub fn to_ref(&self) -> String {
        match (self.min_row, self.max_row, self.min_col, self.max_col) {
            (None, _, None, _) => "A1".to_string(),
            (None, _, Some(c1), Some(c2)) => {
                if c1 == c2 {
                    rowcol_to_cell(0, c1)
                } else {
                    format!("{}:{}", rowcol_to_cell(0, c1), rowcol_to_cell(0, c2))
                }
            },
            (Some(r1), Some(r2), c1, c2) => {
                let c1 = c1.unwrap_or(0);
                let c2 = c2.unwrap_or(0);
                if r1 == r2 && c1 == c2 {
                    rowcol_to_cell(r1, c1)
                } else {
                    format!("{}:{}", rowcol_to_cell(r1, c1), rowcol_to_cell(r2, c2))
                }
            },
            _ => "A1".to_string(),
        }
    }
}

/// Sparse cell storage keyed by row then column.
///
/// Both levels are ordered maps so that serialization walks rows and cells in
/// ascending order without sorting.
#[derive(Debug, Default)]
pub struct CellGrid {
    rows: BTreeMap<u32, BTreeMap<u32, Cell>>,
    dims: Dimensions,
}

impl CellGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a record, replacing whatever was at the coordinate.
    pub fn write(&mut self, row: u32, col: u32, cell: Cell) -> Result<()> {
        check_dimensions(row, col)?;
        self.dims.update(row, col);
        self.rows.entry(row).or_default().insert(col, cell);
        Ok(())
    }

    pub fn get(&self, row: u32, col: u32) -> Option<&Cell> {
        self.rows.get(&row)?.get(&col)
    }

    pub fn row(&self, row: u32) -> Option<&BTreeMap<u32, Cell>> {
        self.rows.get(&row)
    }

    pub fn has_row(&self, row: u32) -> bool {
        self.rows.contains_key(&row)
    }

    pub fn rows(&self) -> impl Iterator<Item = (&u32, &BTreeMap<u32, Cell>)> {
        self.rows.iter()
    }

    pub fn dimensions(&self) -> &Dimensions {
        &self.dims
    }

    pub fn dimensions_mut(&mut self) -> &mut Dimensions {
        &mut self.dims
    }

    pub fn cell_count(&self) -> usize {
        self.rows.values().map(BTreeMap::len).sum()
    }

    /// Literal values for a block of cells in row-major order.
    ///
    /// Every coordinate yields exactly one entry, `None` where no record
    /// exists.
    pub fn range_data(
        &self,
        first_row: u32,
        first_col: u32,
        last_row: u32,
        last_col: u32,
    ) -> Vec<Option<RangeValue>> {
        let mut data = Vec::new();
        for row in first_row..=last_row {
            let cells = self.rows.get(&row);
            for col in first_col..=last_col {
                data.push(cells.and_then(|c| c.get(&col)).map(Cell::range_value));
            }
        }
        data
    }
}

/// Per-16-row `spans` hints over the occupied columns of each block.
///
/// `occupied` yields, for a row, the columns holding data or comments.
pub(crate) fn calculate_spans<F, I>(min_row: u32, max_row: u32, occupied: F) -> BTreeMap<u32, String>
where
    F: Fn(u32) -> I,
    I: Iterator<Item = u32>,
{
    let mut spans = BTreeMap::new();
    let mut bounds: Option<(u32, u32)> = None;

    for row in min_row..=max_row {
        for col in occupied(row) {
            bounds = Some(match bounds {
                None => (col, col),
                Some((lo, hi)) => (lo.min(col), hi.max(col)),
            });
        }

        if (row + 1) % 16 == 0 || row == max_row {
            if let Some((lo, hi)) = bounds.take() {
                spans.insert(row / 16, format!("{}:{}", lo + 1, hi + 1));
            }
        }
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Error;
    use crate::xlsx::writer::cell::CellData;

    fn number(n: f64) -> Cell {
        Cell::new(CellData::Number(n), None)
    }

    #[test]
    fn last_write_wins() {
        let mut grid = CellGrid::new();
        grid.write(0, 0, number(1.0)).unwrap();
        grid.write(0, 0, Cell::new(CellData::String(0), None)).unwrap();
        assert_eq!(grid.cell_count(), 1);
        assert_eq!(grid.get(0, 0).unwrap().data, CellData::String(0));
        assert_eq!(grid.dimensions().to_ref(), "A1");
    }

    #[test]
    fn out_of_range_writes_fail_without_side_effects() {
        let mut grid = CellGrid::new();
        assert!(matches!(
            grid.write(1_048_576, 0, number(1.0)),
            Err(Error::Dimension { .. })
        ));
        assert_eq!(grid.cell_count(), 0);
        assert_eq!(*grid.dimensions(), Dimensions::default());
    }

    #[test]
    fn dimension_refs() {
        let mut dims = Dimensions::default();
        assert_eq!(dims.to_ref(), "A1");
        dims.update_col(2);
        assert_eq!(dims.to_ref(), "C1");
        dims.update_col(4);
        assert_eq!(dims.to_ref(), "C1:E1");
        dims.update(9, 3);
        assert_eq!(dims.to_ref(), "C10:E10");
        dims.update(1, 3);
        assert_eq!(dims.to_ref(), "C2:E10");
    }

    #[test]
    fn range_data_has_one_entry_per_coordinate() {
        let mut grid = CellGrid::new();
        grid.write(0, 0, number(1.0)).unwrap();
        grid.write(2, 1, Cell::new(CellData::String(3), None)).unwrap();

        let data = grid.range_data(0, 0, 2, 1);
        assert_eq!(data.len(), 6);
        assert_eq!(data[0], Some(RangeValue::Number(1.0)));
        assert_eq!(data[1], None);
        assert_eq!(data[2], None);
        assert_eq!(data[5], Some(RangeValue::SharedString(3)));
    }

    #[test]
    fn spans_per_block() {
        let occupied = |row: u32| -> std::vec::IntoIter<u32> {
            match row {
                0 => vec![1, 3].into_iter(),
                5 => vec![0].into_iter(),
                17 => vec![7].into_iter(),
                _ => Vec::new().into_iter(),
            }
        };
        let spans = calculate_spans(0, 17, occupied);
        assert_eq!(spans.get(&0).map(String::as_str), Some("1:4"));
        assert_eq!(spans.get(&1).map(String::as_str), Some("8:8"));
    }
}
