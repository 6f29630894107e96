//! Column and row settings, outlines and merged ranges.

use super::{ColumnInfo, RowInfo, Worksheet};
use crate::common::{Error, Result};
use crate::xlsx::format::Format;
use crate::xlsx::utility::{CellRange, check_dimensions};
use crate::xlsx::writer::cell::{FormulaResult, Token};
use log::warn;
use serde::{Deserialize, Serialize};

/// Height of a row without an override, in points.
pub(crate) const DEFAULT_ROW_HEIGHT: f64 = 15.0;

/// Width of a column without an override, in characters.
pub(crate) const DEFAULT_COL_WIDTH: f64 = 8.43;

const MAX_OUTLINE_LEVEL: u8 = 7;

/// Visibility and grouping options of `set_row` and `set_column`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutlineOptions {
    pub hidden: bool,
    /// Outline level, 0..=7. Larger values are clamped.
    pub level: u8,
    pub collapsed: bool,
}

impl OutlineOptions {
    pub fn hidden() -> Self {
        Self {
            hidden: true,
            ..Default::default()
        }
    }

    pub fn with_level(mut self, level: u8) -> Self {
        self.level = level;
        self
    }

    pub fn with_collapsed(mut self, collapsed: bool) -> Self {
        self.collapsed = collapsed;
        self
    }
}

fn clamp_level(level: u8) -> u8 {
    if level > MAX_OUTLINE_LEVEL {
        warn!("outline level {} clamped to {}", level, MAX_OUTLINE_LEVEL);
        MAX_OUTLINE_LEVEL
    } else {
        level
    }
}

/// The value written to the first cell of a merged range by
/// [`Worksheet::merge_range_type`].
#[derive(Debug, Clone, PartialEq)]
pub enum MergeValue<'a> {
    String(&'a str),
    Number(f64),
    Blank,
    DateTime(&'a str),
    RichString(&'a [(Option<&'a Format>, &'a str)]),
    Url {
        url: &'a str,
        text: Option<&'a str>,
        tooltip: Option<&'a str>,
    },
    Formula {
        formula: &'a str,
        result: Option<FormulaResult>,
    },
    /// An array formula over the first cell only.
    ArrayFormula {
        formula: &'a str,
        result: Option<FormulaResult>,
    },
}

impl Worksheet {
    // ===== Columns and rows =====

    /// Set the width, format and outline options of columns `first..=last`.
    ///
    /// Each call produces one `<col>` element. A format also becomes the
    /// default style of unformatted cells in those columns.
    ///
    /// # Arguments
    /// * `width` - Width in characters; `None` keeps the default
    /// * `format` - Default format of the columns
    /// * `options` - Hidden, outline level and collapsed flags
    pub fn set_column(
        &mut self,
        first: u32,
        last: u32,
        width: Option<f64>,
        format: Option<&Format>,
        options: &OutlineOptions,
    ) -> Result<()> {
        let (first, last) = (first.min(last), first.max(last));
        check_dimensions(0, first)?;
        check_dimensions(0, last)?;

        // Only columns that carry a style or a hidden width count for the
        // dimension.
        if format.is_some() || (width.is_some() && options.hidden) {
            let dims = self.grid.dimensions_mut();
            dims.update_col(first);
            dims.update_col(last);
        }

        let level = clamp_level(options.level);
        self.outline_col_level = self.outline_col_level.max(level);

        self.columns.push(ColumnInfo {
            first,
            last,
            width,
            format: format.cloned(),
            hidden: options.hidden,
            level,
            collapsed: options.collapsed,
        });

        let size = if options.hidden { Some(0.0) } else { width };
        for col in first..=last {
            if let Some(size) = size {
                self.col_sizes.insert(col, size);
            }
            if let Some(format) = format {
                self.col_formats.insert(col, format.clone());
            }
        }
        Ok(())
    }

    /// Set the height, format and outline options of a row.
    ///
    /// A height of 0 hides the row. A format becomes the default style of
    /// unformatted cells in the row.
    pub fn set_row(
        &mut self,
        row: u32,
        height: Option<f64>,
        format: Option<&Format>,
        options: &OutlineOptions,
    ) -> Result<()> {
        let min_col = self.grid.dimensions().min_col.unwrap_or(0);
        check_dimensions(row, min_col)?;
        self.grid.dimensions_mut().update(row, min_col);

        let mut height = height.unwrap_or(DEFAULT_ROW_HEIGHT);
        let mut hidden = options.hidden;
        if height == 0.0 {
            hidden = true;
            height = DEFAULT_ROW_HEIGHT;
        }

        let level = clamp_level(options.level);
        self.outline_row_level = self.outline_row_level.max(level);

        self.rows.insert(
            row,
            RowInfo {
                height,
                format: format.cloned(),
                hidden,
                level,
                collapsed: options.collapsed,
            },
        );
        self.row_sizes.insert(row, height);
        Ok(())
    }

    /// How outlines are displayed.
    ///
    /// # Arguments
    /// * `visible` - Show the outline symbols
    /// * `below` - Summary rows are below the detail
    /// * `right` - Summary columns are right of the detail
    /// * `auto_style` - Apply automatic outline styles
    pub fn outline_settings(&mut self, visible: bool, below: bool, right: bool, auto_style: bool) {
        self.outline.visible = visible;
        self.outline.below = below;
        self.outline.right = right;
        self.outline.auto_style = auto_style;
        self.outline.changed = true;
        self.view.hide_outline_symbols = !visible;
    }

    // ===== Merged ranges =====

    fn check_merge(first_row: u32, first_col: u32, last_row: u32, last_col: u32) -> Result<CellRange> {
        let range = CellRange::new(first_row, first_col, last_row, last_col);
        if range.is_single_cell() {
            return Err(Error::Limit("Can't merge single cell".into()));
        }
        range.check()?;
        Ok(range)
    }

    fn finish_merge(&mut self, range: CellRange, format: &Format) -> Result<()> {
        self.grid
            .dimensions_mut()
            .update(range.last_row, range.last_col);
        for (row, col) in range.cells().skip(1) {
            self.write_blank(row, col, Some(format))?;
        }
        self.merged.push(range);
        Ok(())
    }

    /// Merge a range, writing `token` to its first cell with `write` and
    /// the format to every other cell.
    ///
    /// # Examples
    ///
    /// ```
    /// use litchi_xlsxwriter::xlsx::{Format, Worksheet, WorkbookContext};
    ///
    /// let mut sheet = Worksheet::new("Sheet1", 0, WorkbookContext::shared());
    /// let merged = Format::new().with_xf_index(1);
    /// sheet.merge_range(0, 0, 1, 1, "Merged", &merged)?;
    /// assert!(sheet.to_xml()?.contains(r#"<mergeCells count="1"><mergeCell ref="A1:B2"/></mergeCells>"#));
    /// # Ok::<(), litchi_xlsxwriter::common::Error>(())
    /// ```
    pub fn merge_range(
        &mut self,
        first_row: u32,
        first_col: u32,
        last_row: u32,
        last_col: u32,
        token: impl Into<Token>,
        format: &Format,
    ) -> Result<()> {
        let range = Self::check_merge(first_row, first_col, last_row, last_col)?;
        self.write(range.first_row, range.first_col, token, Some(format))?;
        self.finish_merge(range, format)
    }

    /// Merge a range, writing a value of an explicit type to its first cell.
    pub fn merge_range_type(
        &mut self,
        first_row: u32,
        first_col: u32,
        last_row: u32,
        last_col: u32,
        value: MergeValue<'_>,
        format: &Format,
    ) -> Result<()> {
        let range = Self::check_merge(first_row, first_col, last_row, last_col)?;
        let (row, col) = (range.first_row, range.first_col);
        let cell_format = Some(format);
        match value {
            MergeValue::String(s) => self.write_string(row, col, s, cell_format)?,
            MergeValue::Number(n) => self.write_number(row, col, n, cell_format)?,
            MergeValue::Blank => self.write_blank(row, col, cell_format)?,
            MergeValue::DateTime(s) => self.write_date_time(row, col, s, cell_format)?,
            MergeValue::RichString(fragments) => {
                self.write_rich_string(row, col, fragments, cell_format)?
            },
            MergeValue::Url { url, text, tooltip } => {
                self.write_url(row, col, url, cell_format, text, tooltip)?
            },
            MergeValue::Formula { formula, result } => {
                self.write_formula(row, col, formula, cell_format, result)?
            },
            MergeValue::ArrayFormula { formula, result } => {
                self.write_array_formula(row, col, row, col, formula, cell_format, result)?
            },
        }
        self.finish_merge(range, format)
    }
}
