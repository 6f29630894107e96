//! Tables, drawings and comments attached to a worksheet.

use super::Worksheet;
use super::cells::{MAX_HYPERLINKS, URL_PREFIXES, resolve_url};
use crate::common::{Error, Result};
use crate::xlsx::utility::{CellRange, check_dimensions};
use crate::xlsx::writer::cell::{RangeValue, Token};
use crate::xlsx::writer::chart::ChartRef;
use crate::xlsx::writer::comments::{Comment, Comments};
use crate::xlsx::writer::drawing::{
    Anchor, Drawing, Image, ObjectSizer, Placement, QueuedChart, QueuedImage,
};
use crate::xlsx::writer::rels::Relationship;
use crate::xlsx::writer::table::{Table, TableOptions};

/// Check a token the way `write_token` would store it, counting hyperlinks.
fn check_token(row: u32, col: u32, token: &Token, links: &mut u32) -> Result<()> {
    match token {
        Token::List(items) => {
            for (i, item) in items.iter().enumerate() {
                let col = col + i as u32;
                match item {
                    Token::List(down) => {
                        for (j, t) in down.iter().enumerate() {
                            check_token(row + j as u32, col, t, links)?;
                        }
                    },
                    _ => check_token(row, col, item, links)?,
                }
            }
            Ok(())
        },
        Token::Text(s) if URL_PREFIXES.iter().any(|p| s.starts_with(p)) => {
            check_dimensions(row, col)?;
            resolve_url(s, None, None)?;
            *links += 1;
            Ok(())
        },
        _ => check_dimensions(row, col),
    }
}

impl Worksheet {
    // ===== Tables =====

    /// Add a table over a range and write its header, formula, total-row
    /// and data cells.
    ///
    /// The header row holds the column names; columns with a formula get it
    /// in every data row; the total row, if enabled, holds each column's
    /// label or `SUBTOTAL` formula. `options.data` fills the data rows,
    /// clipped to the table.
    ///
    /// # Examples
    ///
    /// ```
    /// use litchi_xlsxwriter::xlsx::{TableColumn, TableOptions, Worksheet, WorkbookContext};
    ///
    /// let mut sheet = Worksheet::new("Sheet1", 0, WorkbookContext::shared());
    /// let options = TableOptions {
    ///     total_row: true,
    ///     columns: vec![TableColumn::new("Product"), TableColumn::new("Sales").with_total_function("sum")],
    ///     ..Default::default()
    /// };
    /// sheet.add_table(2, 1, 6, 2, &options)?;
    /// assert_eq!(sheet.tables()[0].name(), "Table1");
    /// # Ok::<(), litchi_xlsxwriter::common::Error>(())
    /// ```
    pub fn add_table(
        &mut self,
        first_row: u32,
        first_col: u32,
        last_row: u32,
        last_col: u32,
        options: &TableOptions,
    ) -> Result<()> {
        let range = CellRange::new(first_row, first_col, last_row, last_col);
        let mut table = Table::new(range, options)?;

        let data_rows = table.data_rows();
        let width = table.columns().len();
        let mut links = 0;
        for (i, row) in options.data.iter().take(data_rows.len()).enumerate() {
            for (j, token) in row.iter().take(width).enumerate() {
                check_token(data_rows.start + i as u32, range.first_col + j as u32, token, &mut links)?;
            }
        }
        if self.hyperlink_count + links > MAX_HYPERLINKS {
            return Err(Error::Limit(format!(
                "table data adds {} URLS, over Excel's limit of 65,530 URLS per worksheet",
                links
            )));
        }

        let id = self.workbook.borrow_mut().next_table_id();
        table.assign_id(id);

        let columns = table.columns().to_vec();
        for (j, column) in columns.iter().enumerate() {
            let col = range.first_col + j as u32;
            let format = column.format.as_ref();

            if table.has_header_row() {
                self.write_string(range.first_row, col, &column.name, None)?;
            }
            if let Some(formula) = &column.formula {
                for row in data_rows.clone() {
                    self.write_formula(row, col, formula, format, None)?;
                }
            }
            if table.has_total_row() {
                if let Some(function) = column.total_function {
                    self.write_formula(range.last_row, col, &function.formula(&column.name), format, None)?;
                } else if let Some(label) = &column.total_string {
                    self.write_string(range.last_row, col, label, format)?;
                }
            }
        }

        for (i, row) in options.data.iter().take(data_rows.len()).enumerate() {
            for (j, token) in row.iter().take(width).enumerate() {
                let format = columns[j].format.as_ref();
                self.write_token(data_rows.start + i as u32, range.first_col + j as u32, token, format)?;
            }
        }

        self.tables.push(table);
        Ok(())
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    // ===== Drawings =====

    /// Queue an embedded chart at a cell. It is anchored by
    /// [`prepare_chart`](Self::prepare_chart).
    pub fn insert_chart(&mut self, chart: &ChartRef, placement: Placement) -> Result<()> {
        check_dimensions(placement.row, placement.col)?;
        if !chart.borrow().is_embedded() {
            return Err(Error::option("insert_chart", "chart", "chartsheet chart"));
        }
        self.charts.push(QueuedChart {
            placement,
            chart: chart.clone(),
        });
        Ok(())
    }

    /// Queue an image at a cell. It is anchored by
    /// [`prepare_image`](Self::prepare_image).
    pub fn insert_image(&mut self, image: Image, placement: Placement) -> Result<()> {
        check_dimensions(placement.row, placement.col)?;
        self.images.push(QueuedImage { placement, image });
        Ok(())
    }

    pub fn chart_count(&self) -> usize {
        self.charts.len()
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    fn sizer(&self) -> ObjectSizer<'_> {
        ObjectSizer {
            col_sizes: &self.col_sizes,
            row_sizes: &self.row_sizes,
        }
    }

    /// The drawing part, creating it and its `/drawing` link on first use.
    fn drawing_for(&mut self, drawing_id: u32) -> &mut Drawing {
        if self.drawing_rel.is_none() {
            self.drawing_rel = Some(Relationship::new(
                "/drawing",
                format!("../drawings/drawing{}.xml", drawing_id),
            ));
        }
        self.drawing.get_or_insert_with(|| Drawing {
            embedded: true,
            ..Default::default()
        })
    }

    /// Anchor the `index`-th queued chart and link it as `chart{chart_id}`.
    pub fn prepare_chart(&mut self, index: usize, chart_id: u32, drawing_id: u32) -> Result<()> {
        let queued = self
            .charts
            .get(index)
            .ok_or_else(|| Error::Limit(format!("no chart queued at index {}", index)))?;
        let object = queued.resolve(&self.sizer());
        queued.chart.borrow_mut().set_id(chart_id);

        self.drawing_for(drawing_id).objects.push(object);
        self.drawing_links.push(Relationship::new(
            "/chart",
            format!("../charts/chart{}.xml", chart_id),
        ));
        Ok(())
    }

    /// Anchor the `index`-th queued image and link it as
    /// `image{image_id}.{type}`.
    pub fn prepare_image(&mut self, index: usize, image_id: u32, drawing_id: u32) -> Result<()> {
        let queued = self
            .images
            .get(index)
            .ok_or_else(|| Error::Limit(format!("no image queued at index {}", index)))?;
        let object = queued.resolve(&self.sizer());
        let target = format!("../media/image{}.{}", image_id, queued.image.image_type);

        self.drawing_for(drawing_id).objects.push(object);
        self.drawing_links.push(Relationship::new("/image", target));
        Ok(())
    }

    /// Anchor every queued chart and image, taking ids from the workbook
    /// counters. Does nothing once the drawing exists.
    pub fn prepare_drawings(&mut self) -> Result<()> {
        if self.drawing.is_some() || (self.charts.is_empty() && self.images.is_empty()) {
            return Ok(());
        }
        let drawing_id = self.workbook.borrow_mut().next_drawing_id();
        for index in 0..self.charts.len() {
            let chart_id = self.workbook.borrow_mut().next_chart_id();
            self.prepare_chart(index, chart_id, drawing_id)?;
        }
        for index in 0..self.images.len() {
            let image_id = self.workbook.borrow_mut().next_image_id();
            self.prepare_image(index, image_id, drawing_id)?;
        }
        Ok(())
    }

    pub fn drawing(&self) -> Option<&Drawing> {
        self.drawing.as_ref()
    }

    /// Relationships of the drawing part, in object order.
    pub fn drawing_links(&self) -> &[Relationship] {
        &self.drawing_links
    }

    // ===== Comments =====

    /// Author used for comments written without one.
    pub fn set_comments_author(&mut self, author: &str) {
        self.comments.set_default_author(author);
    }

    /// Show every comment by default instead of only on hover.
    pub fn show_comments(&mut self, visible: bool) {
        self.comments.set_visible(visible);
    }

    pub fn comments(&self) -> &Comments {
        &self.comments
    }

    /// Allocate the comments part id and the VML ids, starting the VML data
    /// id at `vml_data_id_start`. Returns the number of comments.
    pub fn prepare_comments(&mut self, vml_data_id_start: u32) -> usize {
        if self.comments.is_empty() {
            return 0;
        }
        if self.comments_id.is_none() {
            self.comments_id = Some(self.workbook.borrow_mut().next_comment_id());
        }
        self.vml_data_id = self.comments.vml_data_id(vml_data_id_start);
        self.vml_shape_id = 1024 * vml_data_id_start;
        self.comments.len()
    }

    pub fn comments_id(&self) -> Option<u32> {
        self.comments_id
    }

    /// The `o:idmap` data attribute of the VML part.
    pub fn vml_data_id(&self) -> &str {
        &self.vml_data_id
    }

    /// First shape id of the VML part.
    pub fn vml_shape_id(&self) -> u32 {
        self.vml_shape_id
    }

    /// Each comment with the anchor of its box, for the VML part.
    pub fn comment_anchors(&self) -> Vec<(&Comment, Anchor)> {
        let sizer = self.sizer();
        self.comments
            .iter()
            .map(|comment| (comment, comment.anchor(&sizer)))
            .collect()
    }

    // ===== Range data =====

    /// Cached values of a block of cells for chart data caches, one entry
    /// per cell in row-major order.
    pub fn get_range_data(
        &self,
        first_row: u32,
        first_col: u32,
        last_row: u32,
        last_col: u32,
    ) -> Vec<Option<RangeValue>> {
        let range = CellRange::new(first_row, first_col, last_row, last_col);
        self.grid
            .range_data(range.first_row, range.first_col, range.last_row, range.last_col)
    }
}
