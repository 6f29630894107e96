//! Page setup and print options shared by worksheets and chartsheets.

use crate::common::number::write_num;
use crate::common::xml::escape_data;
use crate::common::{Error, Result};
use log::warn;
use std::fmt::Write as FmtWrite;

/// Excel stops honoring manual page breaks past this count.
pub const MAX_PAGE_BREAKS: usize = 1023;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
    pub header: f64,
    pub footer: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            left: 0.7,
            right: 0.7,
            top: 0.75,
            bottom: 0.75,
            header: 0.3,
            footer: 0.3,
        }
    }
}

/// Print settings of a sheet. Each `write_*` emits nothing unless the
/// corresponding settings were changed.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSetup {
    pub(crate) portrait: bool,
    pub(crate) paper_size: Option<u32>,
    pub(crate) scale: u32,
    pub(crate) fit_page: bool,
    pub(crate) fit_width: u32,
    pub(crate) fit_height: u32,
    pub(crate) across: bool,
    pub(crate) start_page: Option<u32>,
    pub(crate) page_setup_changed: bool,

    pub(crate) hcenter: bool,
    pub(crate) vcenter: bool,
    pub(crate) print_headers: bool,
    pub(crate) print_gridlines: bool,
    pub(crate) print_options_changed: bool,

    pub(crate) margins: Margins,

    pub(crate) header: String,
    pub(crate) footer: String,
    pub(crate) header_footer_changed: bool,

    pub(crate) hbreaks: Vec<u32>,
    pub(crate) vbreaks: Vec<u32>,
}

impl Default for PageSetup {
    fn default() -> Self {
        Self {
            portrait: true,
            paper_size: None,
            scale: 100,
            fit_page: false,
            fit_width: 0,
            fit_height: 0,
            across: false,
            start_page: None,
            page_setup_changed: false,
            hcenter: false,
            vcenter: false,
            print_headers: false,
            print_gridlines: false,
            print_options_changed: false,
            margins: Margins::default(),
            header: String::new(),
            footer: String::new(),
            header_footer_changed: false,
            hbreaks: Vec::new(),
            vbreaks: Vec::new(),
        }
    }
}

impl PageSetup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_portrait(&mut self) {
        self.portrait = true;
        self.page_setup_changed = true;
    }

    pub fn set_landscape(&mut self) {
        self.portrait = false;
        self.page_setup_changed = true;
    }

    pub fn is_portrait(&self) -> bool {
        self.portrait
    }

    /// Excel paper size index, e.g. 9 for A4. Zero leaves the printer default.
    pub fn set_paper(&mut self, paper_size: u32) {
        if paper_size != 0 {
            self.paper_size = Some(paper_size);
            self.page_setup_changed = true;
        }
    }

    /// Print scale in percent; values outside 10..=400 reset to 100.
    pub fn print_scale(&mut self, scale: u32) {
        let scale = if (10..=400).contains(&scale) {
            scale
        } else {
            warn!("print scale {} outside 10..=400, using 100", scale);
            100
        };
        self.fit_page = false;
        self.scale = scale;
        self.page_setup_changed = true;
    }

    /// Fit the print area to `width` x `height` pages; 0 means unconstrained.
    pub fn fit_to_pages(&mut self, width: u32, height: u32) {
        self.fit_page = true;
        self.fit_width = width;
        self.fit_height = height;
        self.page_setup_changed = true;
    }

    pub fn is_fit_page(&self) -> bool {
        self.fit_page
    }

    /// Print pages across then down instead of down then across.
    pub fn print_across(&mut self, across: bool) {
        self.across = across;
        if across {
            self.page_setup_changed = true;
        }
    }

    pub fn set_start_page(&mut self, page: u32) {
        self.start_page = Some(page);
        self.page_setup_changed = true;
    }

    pub fn center_horizontally(&mut self) {
        self.hcenter = true;
        self.print_options_changed = true;
    }

    pub fn center_vertically(&mut self) {
        self.vcenter = true;
        self.print_options_changed = true;
    }

    pub fn print_row_col_headers(&mut self, headers: bool) {
        self.print_headers = headers;
        if headers {
            self.print_options_changed = true;
        }
    }

    pub(crate) fn show_print_gridlines(&mut self, show: bool) {
        self.print_gridlines = show;
        if show {
            self.print_options_changed = true;
        }
    }

    pub fn margins(&self) -> &Margins {
        &self.margins
    }

    pub fn set_margins(&mut self, margin: f64) {
        self.set_margins_lr(margin);
        self.set_margins_tb(margin);
    }

    pub fn set_margins_lr(&mut self, margin: f64) {
        self.margins.left = margin;
        self.margins.right = margin;
    }

    pub fn set_margins_tb(&mut self, margin: f64) {
        self.margins.top = margin;
        self.margins.bottom = margin;
    }

    pub fn set_margin_left(&mut self, margin: f64) {
        self.margins.left = margin;
    }

    pub fn set_margin_right(&mut self, margin: f64) {
        self.margins.right = margin;
    }

    pub fn set_margin_top(&mut self, margin: f64) {
        self.margins.top = margin;
    }

    pub fn set_margin_bottom(&mut self, margin: f64) {
        self.margins.bottom = margin;
    }

    fn check_header_footer(method: &'static str, text: &str) -> Result<()> {
        if text.chars().count() >= 255 {
            return Err(Error::Limit(format!(
                "{}() string must be less than 255 characters",
                method
            )));
        }
        Ok(())
    }

    /// Page header with Excel's `&L`/`&C`/`&R` control codes, and its margin.
    pub fn set_header(&mut self, text: &str, margin: f64) -> Result<()> {
        Self::check_header_footer("set_header", text)?;
        self.header = text.to_string();
        self.margins.header = margin;
        self.header_footer_changed = true;
        Ok(())
    }

    pub fn set_footer(&mut self, text: &str, margin: f64) -> Result<()> {
        Self::check_header_footer("set_footer", text)?;
        self.footer = text.to_string();
        self.margins.footer = margin;
        self.header_footer_changed = true;
        Ok(())
    }

    /// Rows after which a page break is inserted.
    pub fn set_h_pagebreaks(&mut self, breaks: &[u32]) {
        self.hbreaks.extend_from_slice(breaks);
    }

    /// Columns after which a page break is inserted.
    pub fn set_v_pagebreaks(&mut self, breaks: &[u32]) {
        self.vbreaks.extend_from_slice(breaks);
    }

    pub fn write_print_options(&self, xml: &mut String) {
        if !self.print_options_changed {
            return;
        }
        xml.push_str("<printOptions");
        if self.hcenter {
            xml.push_str(r#" horizontalCentered="1""#);
        }
        if self.vcenter {
            xml.push_str(r#" verticalCentered="1""#);
        }
        if self.print_headers {
            xml.push_str(r#" headings="1""#);
        }
        if self.print_gridlines {
            xml.push_str(r#" gridLines="1""#);
        }
        xml.push_str("/>");
    }

    pub fn write_page_margins(&self, xml: &mut String) {
        let m = &self.margins;
        xml.push_str("<pageMargins");
        for (name, value) in [
            ("left", m.left),
            ("right", m.right),
            ("top", m.top),
            ("bottom", m.bottom),
            ("header", m.header),
            ("footer", m.footer),
        ] {
            xml.push(' ');
            xml.push_str(name);
            xml.push_str("=\"");
            write_num(xml, value);
            xml.push('"');
        }
        xml.push_str("/>");
    }

    pub fn write_page_setup(&self, xml: &mut String) -> Result<()> {
        if !self.page_setup_changed {
            return Ok(());
        }
        xml.push_str("<pageSetup");
        if let Some(size) = self.paper_size {
            write!(xml, r#" paperSize="{}""#, size)?;
        }
        if self.scale != 100 {
            write!(xml, r#" scale="{}""#, self.scale)?;
        }
        if let Some(page) = self.start_page {
            write!(xml, r#" firstPageNumber="{}""#, page)?;
        }
        if self.fit_page && self.fit_width != 1 {
            write!(xml, r#" fitToWidth="{}""#, self.fit_width)?;
        }
        if self.fit_page && self.fit_height != 1 {
            write!(xml, r#" fitToHeight="{}""#, self.fit_height)?;
        }
        if self.across {
            xml.push_str(r#" pageOrder="overThenDown""#);
        }
        xml.push_str(if self.portrait {
            r#" orientation="portrait""#
        } else {
            r#" orientation="landscape""#
        });
        if self.start_page.is_some() {
            xml.push_str(r#" useFirstPageNumber="1""#);
        }
        xml.push_str("/>");
        Ok(())
    }

    pub fn write_header_footer(&self, xml: &mut String) -> Result<()> {
        if !self.header_footer_changed {
            return Ok(());
        }
        xml.push_str("<headerFooter>");
        if !self.header.is_empty() {
            write!(xml, "<oddHeader>{}</oddHeader>", escape_data(&self.header))?;
        }
        if !self.footer.is_empty() {
            write!(xml, "<oddFooter>{}</oddFooter>", escape_data(&self.footer))?;
        }
        xml.push_str("</headerFooter>");
        Ok(())
    }

    pub fn write_row_breaks(&self, xml: &mut String) -> Result<()> {
        write_breaks(xml, "rowBreaks", &self.hbreaks, 16_383)
    }

    pub fn write_col_breaks(&self, xml: &mut String) -> Result<()> {
        write_breaks(xml, "colBreaks", &self.vbreaks, 1_048_575)
    }
}

/// Deduplicate, sort, drop 0 and cap at [`MAX_PAGE_BREAKS`].
pub fn sort_pagebreaks(breaks: &[u32]) -> Vec<u32> {
    let mut sorted: Vec<u32> = breaks.iter().copied().filter(|&b| b != 0).collect();
    sorted.sort_unstable();
    sorted.dedup();
    if sorted.len() > MAX_PAGE_BREAKS {
        warn!(
            "{} page breaks requested, keeping the first {}",
            sorted.len(),
            MAX_PAGE_BREAKS
        );
        sorted.truncate(MAX_PAGE_BREAKS);
    }
    sorted
}

fn write_breaks(xml: &mut String, tag: &str, breaks: &[u32], max: u32) -> Result<()> {
    let breaks = sort_pagebreaks(breaks);
    if breaks.is_empty() {
        return Ok(());
    }
    write!(
        xml,
        r#"<{} count="{}" manualBreakCount="{}">"#,
        tag,
        breaks.len(),
        breaks.len()
    )?;
    for id in breaks {
        write!(xml, r#"<brk id="{}" max="{}" man="1"/>"#, id, max)?;
    }
    write!(xml, "</{}>", tag)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn all(setup: &PageSetup) -> String {
        let mut xml = String::new();
        setup.write_print_options(&mut xml);
        setup.write_page_margins(&mut xml);
        setup.write_page_setup(&mut xml).unwrap();
        setup.write_header_footer(&mut xml).unwrap();
        setup.write_row_breaks(&mut xml).unwrap();
        setup.write_col_breaks(&mut xml).unwrap();
        xml
    }

    #[test]
    fn untouched_setup_writes_margins_only() {
        assert_eq!(
            all(&PageSetup::new()),
            r#"<pageMargins left="0.7" right="0.7" top="0.75" bottom="0.75" header="0.3" footer="0.3"/>"#
        );
    }

    #[test]
    fn page_setup_attributes() {
        let mut setup = PageSetup::new();
        setup.set_landscape();
        setup.set_paper(9);
        setup.fit_to_pages(1, 0);
        setup.print_across(true);
        let mut xml = String::new();
        setup.write_page_setup(&mut xml).unwrap();
        assert_eq!(
            xml,
            r#"<pageSetup paperSize="9" fitToHeight="0" pageOrder="overThenDown" orientation="landscape"/>"#
        );
    }

    #[test]
    fn scale_is_clamped_and_turns_off_fitting() {
        let mut setup = PageSetup::new();
        setup.fit_to_pages(2, 2);
        setup.print_scale(5);
        let mut xml = String::new();
        setup.write_page_setup(&mut xml).unwrap();
        assert_eq!(xml, r#"<pageSetup orientation="portrait"/>"#);

        setup.print_scale(110);
        setup.set_start_page(3);
        xml.clear();
        setup.write_page_setup(&mut xml).unwrap();
        assert_eq!(
            xml,
            r#"<pageSetup scale="110" firstPageNumber="3" orientation="portrait" useFirstPageNumber="1"/>"#
        );
    }

    #[test]
    fn header_footer_and_margins() {
        let mut setup = PageSetup::new();
        setup.set_header("&CPage &P of &N", 0.5).unwrap();
        setup.set_margins_lr(1.25);
        setup.center_horizontally();
        let xml = all(&setup);
        assert!(xml.starts_with(r#"<printOptions horizontalCentered="1"/><pageMargins left="1.25" right="1.25" top="0.75" bottom="0.75" header="0.5" footer="0.3"/>"#));
        assert!(xml.ends_with("<headerFooter><oddHeader>&amp;CPage &amp;P of &amp;N</oddHeader></headerFooter>"));

        let long = "x".repeat(255);
        assert!(setup.set_footer(&long, 0.3).is_err());
        assert!(setup.footer.is_empty());
    }

    #[test]
    fn page_breaks() {
        assert_eq!(sort_pagebreaks(&[20, 0, 5, 20, 1]), vec![1, 5, 20]);
        let many: Vec<u32> = (1..=1100).collect();
        assert_eq!(sort_pagebreaks(&many).len(), MAX_PAGE_BREAKS);

        let mut setup = PageSetup::new();
        setup.set_h_pagebreaks(&[20, 40]);
        setup.set_v_pagebreaks(&[3]);
        let mut xml = String::new();
        setup.write_row_breaks(&mut xml).unwrap();
        setup.write_col_breaks(&mut xml).unwrap();
        assert_eq!(
            xml,
            concat!(
                r#"<rowBreaks count="2" manualBreakCount="2"><brk id="20" max="16383" man="1"/><brk id="40" max="16383" man="1"/></rowBreaks>"#,
                r#"<colBreaks count="1" manualBreakCount="1"><brk id="3" max="1048575" man="1"/></colBreaks>"#
            )
        );
    }
}
