//! Cell format handles as seen by the worksheet writer.
//!
//! The workbook's style table owns the full formatting model and assigns each
//! format an `xf` index (cell styles) and optionally a `dxf` index
//! (differential styles used by conditional formats). The worksheet only
//! needs those indices plus the font capabilities used by rich strings.

use super::color::{Color, Palette};
use crate::common::number::write_num;
use crate::common::xml::escape_attr;
use crate::common::Result;
use std::fmt::Write as FmtWrite;

/// Underline styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Underline {
    #[default]
    None,
    Single,
    Double,
    SingleAccounting,
    DoubleAccounting,
}

impl Underline {
    /// `val` attribute of `<u>`; `None` for the single style, which has no attribute.
    pub(crate) fn as_val(&self) -> Option<&'static str> {
        match self {
            Self::None | Self::Single => None,
            Self::Double => Some("double"),
            Self::SingleAccounting => Some("singleAccounting"),
            Self::DoubleAccounting => Some("doubleAccounting"),
        }
    }
}

/// Superscript / subscript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontScript {
    #[default]
    None,
    Superscript,
    Subscript,
}

/// Font properties for a format.
#[derive(Debug, Clone, PartialEq)]
pub struct FontProperties {
    pub name: String,
    pub size: f64,
    pub family: u8,
    pub scheme: String,
    pub bold: bool,
    pub italic: bool,
    pub strikeout: bool,
    pub outline: bool,
    pub shadow: bool,
    pub underline: Underline,
    pub script: FontScript,
    pub color: Option<Color>,
    /// Theme color index; 0 means unset.
    pub theme: u8,
    /// Set on the built-in hyperlink style.
    pub hyperlink: bool,
}

impl Default for FontProperties {
    fn default() -> Self {
        Self {
            name: "Calibri".to_string(),
            size: 11.0,
            family: 2,
            scheme: "minor".to_string(),
            bold: false,
            italic: false,
            strikeout: false,
            outline: false,
            shadow: false,
            underline: Underline::None,
            script: FontScript::None,
            color: None,
            theme: 0,
            hyperlink: false,
        }
    }
}

/// A format handle with its style-table indices.
///
/// # Examples
///
/// ```
/// use litchi_xlsxwriter::xlsx::Format;
///
/// let bold = Format::new().with_xf_index(3).set_bold();
/// assert_eq!(bold.xf_index(), 3);
/// assert!(bold.is_bold());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Format {
    xf_index: u32,
    dxf_index: Option<u32>,
    font: FontProperties,
}

impl Format {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cell style index assigned by the style table.
    pub fn with_xf_index(mut self, index: u32) -> Self {
        self.xf_index = index;
        self
    }

    /// Set the differential style index assigned by the style table.
    pub fn with_dxf_index(mut self, index: u32) -> Self {
        self.dxf_index = Some(index);
        self
    }

    pub fn xf_index(&self) -> u32 {
        self.xf_index
    }

    pub fn dxf_index(&self) -> Option<u32> {
        self.dxf_index
    }

    pub fn font(&self) -> &FontProperties {
        &self.font
    }

    pub fn font_mut(&mut self) -> &mut FontProperties {
        &mut self.font
    }

    pub fn set_bold(mut self) -> Self {
        self.font.bold = true;
        self
    }

    pub fn set_italic(mut self) -> Self {
        self.font.italic = true;
        self
    }

    pub fn set_underline(mut self, underline: Underline) -> Self {
        self.font.underline = underline;
        self
    }

    pub fn set_font_color(mut self, color: Color) -> Self {
        self.font.color = Some(color);
        self
    }

    pub fn set_font_name(mut self, name: &str) -> Self {
        self.font.name = name.to_string();
        self
    }

    pub fn set_font_size(mut self, size: f64) -> Self {
        self.font.size = size;
        self
    }

    pub fn is_bold(&self) -> bool {
        self.font.bold
    }

    pub fn is_italic(&self) -> bool {
        self.font.italic
    }

    pub fn is_strikeout(&self) -> bool {
        self.font.strikeout
    }

    pub fn is_outline(&self) -> bool {
        self.font.outline
    }

    pub fn is_shadow(&self) -> bool {
        self.font.shadow
    }

    pub fn is_underline(&self) -> bool {
        self.font.underline != Underline::None
    }
}

/// Write the `<rPr>` run properties of a rich string fragment.
pub(crate) fn write_run_properties(xml: &mut String, format: &Format, palette: &Palette) -> Result<()> {
    let font = format.font();
    xml.push_str("<rPr>");

    if font.bold {
        xml.push_str("<b/>");
    }
    if font.italic {
        xml.push_str("<i/>");
    }
    if font.strikeout {
        xml.push_str("<strike/>");
    }
    if font.outline {
        xml.push_str("<outline/>");
    }
    if font.shadow {
        xml.push_str("<shadow/>");
    }
    if font.underline != Underline::None {
        match font.underline.as_val() {
            Some(val) => write!(xml, r#"<u val="{}"/>"#, val)?,
            None => xml.push_str("<u/>"),
        }
    }
    match font.script {
        FontScript::Superscript => xml.push_str(r#"<vertAlign val="superscript"/>"#),
        FontScript::Subscript => xml.push_str(r#"<vertAlign val="subscript"/>"#),
        FontScript::None => {},
    }

    xml.push_str(r#"<sz val=""#);
    write_num(xml, font.size);
    xml.push_str(r#""/>"#);

    if font.theme != 0 {
        write!(xml, r#"<color theme="{}"/>"#, font.theme)?;
    } else if let Some(color) = font.color {
        write!(xml, r#"<color rgb="{}"/>"#, palette.argb(color)?)?;
    } else {
        xml.push_str(r#"<color theme="1"/>"#);
    }

    write!(xml, r#"<rFont val="{}"/>"#, escape_attr(&font.name))?;
    write!(xml, r#"<family val="{}"/>"#, font.family)?;

    if font.name == "Calibri" && !font.hyperlink {
        write!(xml, r#"<scheme val="{}"/>"#, escape_attr(&font.scheme))?;
    }

    xml.push_str("</rPr>");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_run_properties() {
        let mut xml = String::new();
        write_run_properties(&mut xml, &Format::new(), &Palette::new()).unwrap();
        assert_eq!(
            xml,
            r#"<rPr><sz val="11"/><color theme="1"/><rFont val="Calibri"/><family val="2"/><scheme val="minor"/></rPr>"#
        );
    }

    #[test]
    fn styled_run_properties() {
        let format = Format::new()
            .set_bold()
            .set_italic()
            .set_underline(Underline::Double)
            .set_font_color(Color::Indexed(10))
            .set_font_name("Arial");
        let mut xml = String::new();
        write_run_properties(&mut xml, &format, &Palette::new()).unwrap();
        assert_eq!(
            xml,
            r#"<rPr><b/><i/><u val="double"/><sz val="11"/><color rgb="FFFF0000"/><rFont val="Arial"/><family val="2"/></rPr>"#
        );
    }

    #[test]
    fn capability_queries() {
        let format = Format::new().with_xf_index(2).with_dxf_index(0).set_underline(Underline::Single);
        assert_eq!(format.xf_index(), 2);
        assert_eq!(format.dxf_index(), Some(0));
        assert!(format.is_underline());
        assert!(!format.is_bold());
    }
}
