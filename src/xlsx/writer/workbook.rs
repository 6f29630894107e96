//! Workbook-level state shared by every sheet.
use super::strings::SharedStrings;
use crate::common::{RGBColor, Result};
use crate::xlsx::color::Palette;
use std::cell::RefCell;
use std::rc::Rc;

/// Shared handle to the workbook context held by each sheet.
pub type WorkbookRef = Rc<RefCell<WorkbookContext>>;

/// State that outlives a single worksheet.
///
/// Sheets only read the epoch and palette and only increment the counters;
/// the shared string table is append-only.
#[derive(Debug, Default)]
pub struct WorkbookContext {
    /// Use the 1904 date epoch instead of 1900.
    pub date_1904: bool,
    /// Shared strings table
    pub shared_strings: SharedStrings,
    palette: Palette,
    table_count: u32,
    chart_count: u32,
    image_count: u32,
    drawing_count: u32,
    comment_count: u32,
    /// Index of the active sheet
    pub active_sheet: usize,
    /// Index of the first visible sheet tab
    pub first_sheet: usize,
}

impl WorkbookContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context wrapped in a shareable handle.
    pub fn shared() -> WorkbookRef {
        Rc::new(RefCell::new(Self::new()))
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Override one of the 56 palette entries (indices 8..=63).
    pub fn set_custom_color(&mut self, index: u8, rgb: RGBColor) -> Result<()> {
        self.palette.set_custom_color(index, rgb)
    }

    /// Allocate the next table id.
    pub fn next_table_id(&mut self) -> u32 {
        self.table_count += 1;
        self.table_count
    }

    /// Allocate the next chart id.
    pub fn next_chart_id(&mut self) -> u32 {
        self.chart_count += 1;
        self.chart_count
    }

    /// Allocate the next image id.
    pub fn next_image_id(&mut self) -> u32 {
        self.image_count += 1;
        self.image_count
    }

    /// Allocate the next drawing part id.
    pub fn next_drawing_id(&mut self) -> u32 {
        self.drawing_count += 1;
        self.drawing_count
    }

    /// Allocate the next comments part id.
    pub fn next_comment_id(&mut self) -> u32 {
        self.comment_count += 1;
        self.comment_count
    }

    pub fn table_count(&self) -> u32 {
        self.table_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_are_monotonic() {
        let mut ctx = WorkbookContext::new();
        assert_eq!(ctx.next_table_id(), 1);
        assert_eq!(ctx.next_table_id(), 2);
        assert_eq!(ctx.next_chart_id(), 1);
        assert_eq!(ctx.next_drawing_id(), 1);
        assert_eq!(ctx.table_count(), 2);
    }

    #[test]
    fn custom_colors_go_through_the_palette() {
        let mut ctx = WorkbookContext::new();
        ctx.set_custom_color(40, RGBColor::new(0x12, 0x34, 0x56)).unwrap();
        assert_eq!(
            ctx.palette().argb(crate::xlsx::color::Color::Indexed(40)).unwrap(),
            "FF123456"
        );
    }
}
