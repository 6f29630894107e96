//! Unit conversion utilities for drawing anchors and column/row sizing.
//!
//! Pixel sizes assume the default Calibri 11 font: a maximum digit width of
//! 7 pixels and 5 pixels of cell padding.

pub const EMUS_PER_INCH: i64 = 914_400;
pub const EMUS_PER_PT: i64 = 12_700;
pub const EMUS_PER_PIXEL: i64 = 9_525;

/// Maximum digit width, in pixels, of the default font.
pub const MAX_DIGIT_WIDTH: f64 = 7.0;
/// Horizontal cell padding, in pixels.
pub const CELL_PADDING: f64 = 5.0;

/// Width of a column that has no explicit size, in pixels.
pub const DEFAULT_COL_PIXELS: u32 = 64;
/// Height of a row that has no explicit size, in pixels.
pub const DEFAULT_ROW_PIXELS: u32 = 20;

#[inline]
pub fn px_to_emu(px: f64) -> i64 {
    (px * EMUS_PER_PIXEL as f64) as i64
}

#[inline]
pub fn pt_to_emu_f64(pt: f64) -> i64 {
    (pt * EMUS_PER_PT as f64) as i64
}

/// Convert a column width in character units to pixels.
#[inline]
pub fn col_width_to_pixels(width: f64) -> u32 {
    if width == 0.0 {
        0
    } else if width < 1.0 {
        (width * 12.0 + 0.5) as u32
    } else {
        (width * MAX_DIGIT_WIDTH + 0.5) as u32 + CELL_PADDING as u32
    }
}

/// Convert a row height in points to pixels.
#[inline]
pub fn row_height_to_pixels(height: f64) -> u32 {
    if height == 0.0 {
        0
    } else {
        (4.0 / 3.0 * height) as u32
    }
}

/// Width stored in a `<col>` element for a width given in character units.
///
/// The value is snapped to 1/256 of a character the way Excel stores it.
pub fn col_width_to_xml(width: f64) -> f64 {
    if width <= 0.0 {
        return width;
    }
    let scaled = ((width * MAX_DIGIT_WIDTH + CELL_PADDING) / MAX_DIGIT_WIDTH * 256.0) as i64;
    scaled as f64 / 256.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_pixels() {
        assert_eq!(col_width_to_pixels(0.0), 0);
        assert_eq!(col_width_to_pixels(0.5), 6);
        assert_eq!(col_width_to_pixels(8.43), 64);
        assert_eq!(col_width_to_pixels(10.0), 75);
    }

    #[test]
    fn row_pixels() {
        assert_eq!(row_height_to_pixels(0.0), 0);
        assert_eq!(row_height_to_pixels(15.0), 20);
        assert_eq!(row_height_to_pixels(30.0), 40);
    }

    #[test]
    fn xml_width_is_snapped() {
        assert_eq!(col_width_to_xml(8.43), 9.140625);
        assert_eq!(col_width_to_xml(10.0), 10.7109375);
        assert_eq!(col_width_to_xml(0.0), 0.0);
    }

    #[test]
    fn emu_conversion() {
        assert_eq!(px_to_emu(1.0), 9_525);
        assert_eq!(px_to_emu(96.0), EMUS_PER_INCH);
        assert_eq!(pt_to_emu_f64(72.0), EMUS_PER_INCH);
    }
}
