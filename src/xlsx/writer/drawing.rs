//! Anchoring of charts and images inserted into a worksheet.
//!
//! Insertions are queued with their cell, pixel offset and scale. Anchors are
//! computed only when the drawing is prepared, once every column width and
//! row height override is known.

use super::chart::ChartRef;
use crate::common::unit::{
    DEFAULT_COL_PIXELS, DEFAULT_ROW_PIXELS, EMUS_PER_PIXEL, col_width_to_pixels,
    row_height_to_pixels,
};
use std::collections::BTreeMap;

/// Default size of an embedded chart, in pixels.
pub const CHART_WIDTH: f64 = 480.0;
pub const CHART_HEIGHT: f64 = 288.0;

/// Where and how large an inserted object is, before anchoring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub row: u32,
    pub col: u32,
    pub x_offset: u32,
    pub y_offset: u32,
    pub x_scale: f64,
    pub y_scale: f64,
}

impl Placement {
    pub fn new(row: u32, col: u32) -> Self {
        Self {
            row,
            col,
            x_offset: 0,
            y_offset: 0,
            x_scale: 1.0,
            y_scale: 1.0,
        }
    }

    pub fn with_offset(mut self, x: u32, y: u32) -> Self {
        self.x_offset = x;
        self.y_offset = y;
        self
    }

    pub fn with_scale(mut self, x: f64, y: f64) -> Self {
        self.x_scale = x;
        self.y_scale = y;
        self
    }
}

/// An image supplied by the caller; pixel size and type come from the
/// image header, which is read by the packaging stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub name: String,
    pub width: f64,
    pub height: f64,
    /// File extension of the media part, e.g. `png`.
    pub image_type: String,
    pub x_dpi: f64,
    pub y_dpi: f64,
}

impl Image {
    pub fn new(name: &str, width: f64, height: f64, image_type: &str) -> Self {
        Self {
            name: name.to_string(),
            width,
            height,
            image_type: image_type.to_string(),
            x_dpi: 96.0,
            y_dpi: 96.0,
        }
    }
}

/// A two-cell anchor: start and end cells with offsets, plus the absolute
/// position. Offsets and positions are in EMUs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Anchor {
    pub col_from: u32,
    pub row_from: u32,
    pub col_from_offset: u64,
    pub row_from_offset: u64,
    pub col_to: u32,
    pub row_to: u32,
    pub col_to_offset: u64,
    pub row_to_offset: u64,
    pub x_abs: u64,
    pub y_abs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawingKind {
    Chart,
    Image,
}

/// A resolved object of a worksheet drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawingObject {
    pub kind: DrawingKind,
    pub anchor: Anchor,
    /// Extent in EMUs; zero for charts, which take their size from the anchor.
    pub width: u64,
    pub height: u64,
    pub name: Option<String>,
}

/// The drawing part of one worksheet or chartsheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Drawing {
    /// Objects anchored to cells; false for a chartsheet's full-page chart.
    pub embedded: bool,
    /// Page orientation, only meaningful for a chartsheet drawing.
    pub portrait: bool,
    pub objects: Vec<DrawingObject>,
}

/// Column and row pixel sizes used to place objects.
#[derive(Debug, Clone, Copy)]
pub struct ObjectSizer<'a> {
    pub col_sizes: &'a BTreeMap<u32, f64>,
    pub row_sizes: &'a BTreeMap<u32, f64>,
}

impl ObjectSizer<'_> {
    /// Width of a column in pixels, 64 when it has no override.
    pub fn size_col(&self, col: u32) -> u32 {
        self.col_sizes
            .get(&col)
            .map_or(DEFAULT_COL_PIXELS, |&w| col_width_to_pixels(w))
    }

    /// Height of a row in pixels, 20 when it has no override.
    pub fn size_row(&self, row: u32) -> u32 {
        self.row_sizes
            .get(&row)
            .map_or(DEFAULT_ROW_PIXELS, |&h| row_height_to_pixels(h))
    }

    fn adjust_col(&self, mut x: u32, mut col: u32) -> (u32, u32) {
        loop {
            let size = self.size_col(col);
            if x < size {
                return (x, col);
            }
            x -= size;
            col += 1;
        }
    }

    fn adjust_row(&self, mut y: u32, mut row: u32) -> (u32, u32) {
        loop {
            let size = self.size_row(row);
            if y < size {
                return (y, row);
            }
            y -= size;
            row += 1;
        }
    }

    /// Anchor an object given in pixels.
    ///
    /// Offsets larger than the start cell move the start cell. For drawings,
    /// an object ending exactly on a cell boundary is anchored to the end of
    /// the previous cell.
    pub fn position_pixels(
        &self,
        col_start: u32,
        row_start: u32,
        x1: u32,
        y1: u32,
        width: u32,
        height: u32,
        is_drawing: bool,
    ) -> Anchor {
        let x_abs = (0..col_start).map(|c| self.size_col(c) as u64).sum::<u64>() + x1 as u64;
        let y_abs = (0..row_start).map(|r| self.size_row(r) as u64).sum::<u64>() + y1 as u64;

        let (x1, col_start) = self.adjust_col(x1, col_start);
        let (y1, row_start) = self.adjust_row(y1, row_start);

        let (x2, mut col_end) = self.adjust_col(width + x1, col_start);
        let (y2, mut row_end) = self.adjust_row(height + y1, row_start);

        if is_drawing {
            if x2 == 0 {
                col_end = col_end.saturating_sub(1);
            }
            if y2 == 0 {
                row_end = row_end.saturating_sub(1);
            }
        }

        Anchor {
            col_from: col_start,
            row_from: row_start,
            col_from_offset: x1 as u64,
            row_from_offset: y1 as u64,
            col_to: col_end,
            row_to: row_end,
            col_to_offset: x2 as u64,
            row_to_offset: y2 as u64,
            x_abs,
            y_abs,
        }
    }

    /// Anchor a drawing object, converting pixels to EMUs.
    pub fn position_emus(&self, col_start: u32, row_start: u32, x1: u32, y1: u32, width: u32, height: u32) -> Anchor {
        let px = self.position_pixels(col_start, row_start, x1, y1, width, height, true);
        let emu = EMUS_PER_PIXEL as u64;
        Anchor {
            col_from_offset: px.col_from_offset * emu,
            row_from_offset: px.row_from_offset * emu,
            col_to_offset: px.col_to_offset * emu,
            row_to_offset: px.row_to_offset * emu,
            x_abs: px.x_abs * emu,
            y_abs: px.y_abs * emu,
            ..px
        }
    }
}

/// A chart queued for placement.
#[derive(Debug, Clone)]
pub(crate) struct QueuedChart {
    pub placement: Placement,
    pub chart: ChartRef,
}

impl QueuedChart {
    /// Anchor the chart at its scaled default size.
    pub fn resolve(&self, sizer: &ObjectSizer<'_>) -> DrawingObject {
        let p = &self.placement;
        let width = (0.5 + CHART_WIDTH * p.x_scale) as u32;
        let height = (0.5 + CHART_HEIGHT * p.y_scale) as u32;
        DrawingObject {
            kind: DrawingKind::Chart,
            anchor: sizer.position_emus(p.col, p.row, p.x_offset, p.y_offset, width, height),
            width: 0,
            height: 0,
            name: self.chart.borrow().name().map(str::to_string),
        }
    }
}

/// An image queued for placement.
#[derive(Debug, Clone)]
pub(crate) struct QueuedImage {
    pub placement: Placement,
    pub image: Image,
}

impl QueuedImage {
    /// Anchor the image, scaling its pixel size to 96 dpi.
    pub fn resolve(&self, sizer: &ObjectSizer<'_>) -> DrawingObject {
        let p = &self.placement;
        let img = &self.image;
        let width = img.width * p.x_scale * 96.0 / img.x_dpi;
        let height = img.height * p.y_scale * 96.0 / img.y_dpi;
        DrawingObject {
            kind: DrawingKind::Image,
            anchor: sizer.position_emus(p.col, p.row, p.x_offset, p.y_offset, width as u32, height as u32),
            width: (0.5 + width * EMUS_PER_PIXEL as f64) as u64,
            height: (0.5 + height * EMUS_PER_PIXEL as f64) as u64,
            name: Some(img.name.clone()),
        }
    }
}
