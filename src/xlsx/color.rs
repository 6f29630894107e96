//! Spreadsheet colors: explicit RGB values or indices into the workbook palette.

use crate::common::{Error, RGBColor, Result};
use phf::phf_map;

/// Named colors and their palette indices.
static NAMED_COLORS: phf::Map<&'static str, u8> = phf_map! {
    "black" => 0x08,
    "blue" => 0x0C,
    "brown" => 0x10,
    "cyan" => 0x0F,
    "gray" => 0x17,
    "grey" => 0x17,
    "green" => 0x11,
    "lime" => 0x0B,
    "magenta" => 0x0E,
    "navy" => 0x12,
    "orange" => 0x35,
    "pink" => 0x21,
    "purple" => 0x14,
    "red" => 0x0A,
    "silver" => 0x16,
    "white" => 0x09,
    "yellow" => 0x0D,
};

/// First palette index; indices 0..8 are reserved for the built-in colors.
pub const PALETTE_OFFSET: u8 = 8;

const DEFAULT_PALETTE: [u32; 56] = [
    0x000000, 0xFFFFFF, 0xFF0000, 0x00FF00, 0x0000FF, 0xFFFF00, 0xFF00FF, 0x00FFFF, // 8
    0x800000, 0x008000, 0x000080, 0x808000, 0x800080, 0x008080, 0xC0C0C0, 0x808080, // 16
    0x9999FF, 0x993366, 0xFFFFCC, 0xCCFFFF, 0x660066, 0xFF8080, 0x0066CC, 0xCCCCFF, // 24
    0x000080, 0xFF00FF, 0xFFFF00, 0x00FFFF, 0x800080, 0x800000, 0x008080, 0x0000FF, // 32
    0x00CCFF, 0xCCFFFF, 0xCCFFCC, 0xFFFF99, 0x99CCFF, 0xFF99CC, 0xCC99FF, 0xFFCC99, // 40
    0x3366FF, 0x33CCCC, 0x99CC00, 0xFFCC00, 0xFF9900, 0xFF6600, 0x666699, 0x969696, // 48
    0x003366, 0x339966, 0x003300, 0x333300, 0x993300, 0x993366, 0x333399, 0x333333, // 56
];

/// A color as supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    /// An explicit `#RRGGBB` value.
    Rgb(RGBColor),
    /// A palette index in `8..=63`.
    Indexed(u8),
}

impl Color {
    /// Parse `#RRGGBB`, a color name such as `"red"`, or a palette index.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.starts_with('#') {
            return RGBColor::from_hex(s)
                .map(Color::Rgb)
                .ok_or_else(|| Error::option("color", "color", s));
        }
        if let Some(&index) = NAMED_COLORS.get(s.to_ascii_lowercase().as_str()) {
            return Ok(Color::Indexed(index));
        }
        match s.parse::<u8>() {
            Ok(index) if (PALETTE_OFFSET..PALETTE_OFFSET + 56).contains(&index) => {
                Ok(Color::Indexed(index))
            },
            _ => Err(Error::option("color", "color", s)),
        }
    }
}

/// The workbook's 56-color palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: [RGBColor; 56],
}

impl Palette {
    pub fn new() -> Self {
        let mut colors = [RGBColor::new(0, 0, 0); 56];
        for (slot, rgb) in colors.iter_mut().zip(DEFAULT_PALETTE) {
            *slot = RGBColor::new((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8);
        }
        Self { colors }
    }

    /// Look up a palette index in `8..=63`.
    pub fn get(&self, index: u8) -> Option<RGBColor> {
        let slot = index.checked_sub(PALETTE_OFFSET)?;
        self.colors.get(slot as usize).copied()
    }

    /// Replace a palette entry, as Excel's "custom color" feature does.
    pub fn set_custom_color(&mut self, index: u8, rgb: RGBColor) -> Result<()> {
        let slot = index
            .checked_sub(PALETTE_OFFSET)
            .filter(|&s| (s as usize) < self.colors.len())
            .ok_or_else(|| Error::option("set_custom_color", "index", index.to_string()))?;
        self.colors[slot as usize] = rgb;
        Ok(())
    }

    /// Resolve a color to the `FFRRGGBB` text used in `rgb` attributes.
    pub fn argb(&self, color: Color) -> Result<String> {
        match color {
            Color::Rgb(rgb) => Ok(rgb.to_argb()),
            Color::Indexed(index) => self
                .get(index)
                .map(|rgb| rgb.to_argb())
                .ok_or_else(|| Error::option("color", "index", index.to_string())),
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_forms() {
        assert_eq!(
            Color::parse("#FF7128").unwrap(),
            Color::Rgb(RGBColor::new(0xFF, 0x71, 0x28))
        );
        assert_eq!(Color::parse("Red").unwrap(), Color::Indexed(10));
        assert_eq!(Color::parse("63").unwrap(), Color::Indexed(63));
        assert!(Color::parse("7").is_err());
        assert!(Color::parse("chartreuse").is_err());
        assert!(Color::parse("#12345").is_err());
    }

    #[test]
    fn palette_lookup() {
        let palette = Palette::new();
        assert_eq!(palette.argb(Color::Indexed(10)).unwrap(), "FFFF0000");
        assert_eq!(palette.argb(Color::Indexed(0x35)).unwrap(), "FFFF6600");
        assert_eq!(
            palette.argb(Color::parse("#638ec6").unwrap()).unwrap(),
            "FF638EC6"
        );
        assert!(palette.argb(Color::Indexed(64)).is_err());
    }

    #[test]
    fn custom_colors() {
        let mut palette = Palette::new();
        palette.set_custom_color(40, RGBColor::new(1, 2, 3)).unwrap();
        assert_eq!(palette.argb(Color::Indexed(40)).unwrap(), "FF010203");
        assert!(palette.set_custom_color(7, RGBColor::new(0, 0, 0)).is_err());
        assert!(palette.set_custom_color(64, RGBColor::new(0, 0, 0)).is_err());
    }
}
