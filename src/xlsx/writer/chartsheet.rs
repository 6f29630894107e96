//! A sheet holding a single full-page chart.

use super::chart::{BlanksAs, ChartArea, ChartAxis, ChartLegend, ChartRef, ChartSeries, ChartTitle};
use super::drawing::Drawing;
use super::page::PageSetup;
use super::protection::{ProtectionOptions, SheetProtection};
use super::rels::{Relationship, relationships_xml};
use super::view::SheetView;
use super::workbook::WorkbookRef;
use crate::common::Result;
use crate::xlsx::color::Color;
use log::debug;
use std::fmt::Write as FmtWrite;

/// A chartsheet wrapping one chart.
///
/// The chart is shown full page, landscape unless changed, and its drawing
/// is linked as `rId1`.
///
/// # Examples
///
/// ```
/// use litchi_xlsxwriter::xlsx::{Chart, ChartSeries, ChartType, Chartsheet, WorkbookContext};
///
/// let workbook = WorkbookContext::shared();
/// let chart = Chart::new(ChartType::Bar).into_ref();
/// let mut sheet = Chartsheet::new("Chart1", 1, workbook, chart);
/// sheet.add_series(ChartSeries::new("=Sheet1!$A$1:$A$5"));
/// sheet.prepare_chart(1, 1);
/// assert!(sheet.to_xml()?.contains(r#"<drawing r:id="rId1"/>"#));
/// # Ok::<(), litchi_xlsxwriter::common::Error>(())
/// ```
#[derive(Debug)]
pub struct Chartsheet {
    name: String,
    index: usize,
    workbook: WorkbookRef,
    chart: ChartRef,
    view: SheetView,
    page: PageSetup,
    protection: Option<SheetProtection>,
    tab_color: Option<Color>,
    hidden: bool,
    drawing: Option<Drawing>,
    drawing_rel: Option<Relationship>,
    drawing_links: Vec<Relationship>,
}

impl Chartsheet {
    pub fn new(name: &str, index: usize, workbook: WorkbookRef, chart: ChartRef) -> Self {
        chart.borrow_mut().set_embedded(false);
        Self {
            name: name.to_string(),
            index,
            workbook,
            chart,
            view: SheetView {
                zoom_scale_normal: false,
                ..Default::default()
            },
            page: PageSetup {
                portrait: false,
                ..Default::default()
            },
            protection: None,
            tab_color: None,
            hidden: false,
            drawing: None,
            drawing_rel: None,
            drawing_links: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn chart(&self) -> &ChartRef {
        &self.chart
    }

    // ===== Sheet state =====

    pub fn select(&mut self) {
        self.hidden = false;
        self.view.selected = true;
    }

    pub fn activate(&mut self) {
        self.select();
        self.workbook.borrow_mut().active_sheet = self.index;
    }

    pub fn hide(&mut self) {
        self.hidden = true;
        self.view.selected = false;
        let mut workbook = self.workbook.borrow_mut();
        workbook.active_sheet = 0;
        workbook.first_sheet = 0;
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn set_tab_color(&mut self, color: &str) -> Result<()> {
        self.tab_color = Some(Color::parse(color)?);
        Ok(())
    }

    pub fn set_zoom(&mut self, scale: u32) {
        self.view.set_zoom(scale);
    }

    /// Protect the sheet. The chart is protected too; only its content and
    /// scenarios flags are set on the sheet.
    pub fn protect(&mut self, password: Option<&str>, options: &ProtectionOptions) {
        self.chart.borrow_mut().set_protected(true);
        let options = ProtectionOptions {
            sheet: false,
            content: true,
            scenarios: true,
            ..*options
        };
        self.protection = Some(SheetProtection::new(password, &options));
    }

    pub fn page_setup(&self) -> &PageSetup {
        &self.page
    }

    pub fn page_setup_mut(&mut self) -> &mut PageSetup {
        &mut self.page
    }

    // ===== Chart delegation =====

    pub fn add_series(&mut self, series: ChartSeries) {
        self.chart.borrow_mut().add_series(series);
    }

    pub fn set_x_axis(&mut self, axis: ChartAxis) {
        self.chart.borrow_mut().set_x_axis(axis);
    }

    pub fn set_y_axis(&mut self, axis: ChartAxis) {
        self.chart.borrow_mut().set_y_axis(axis);
    }

    pub fn set_x2_axis(&mut self, axis: ChartAxis) {
        self.chart.borrow_mut().set_x2_axis(axis);
    }

    pub fn set_y2_axis(&mut self, axis: ChartAxis) {
        self.chart.borrow_mut().set_y2_axis(axis);
    }

    pub fn set_title(&mut self, title: ChartTitle) {
        self.chart.borrow_mut().set_title(title);
    }

    pub fn set_legend(&mut self, legend: ChartLegend) {
        self.chart.borrow_mut().set_legend(legend);
    }

    pub fn set_plotarea(&mut self, area: ChartArea) {
        self.chart.borrow_mut().set_plotarea(area);
    }

    pub fn set_chartarea(&mut self, area: ChartArea) {
        self.chart.borrow_mut().set_chartarea(area);
    }

    pub fn set_style(&mut self, style: u8) {
        self.chart.borrow_mut().set_style(style);
    }

    pub fn show_blanks_as(&mut self, option: BlanksAs) {
        self.chart.borrow_mut().show_blanks_as(option);
    }

    pub fn show_hidden_data(&mut self) {
        self.chart.borrow_mut().show_hidden_data();
    }

    // ===== Drawing =====

    /// Create the full-page drawing and link the chart as `chart{chart_id}`.
    pub fn prepare_chart(&mut self, chart_id: u32, drawing_id: u32) {
        self.chart.borrow_mut().set_id(chart_id);
        self.drawing = Some(Drawing {
            embedded: false,
            portrait: self.page.portrait,
            objects: Vec::new(),
        });
        self.drawing_rel = Some(Relationship::new(
            "/drawing",
            format!("../drawings/drawing{}.xml", drawing_id),
        ));
        self.drawing_links = vec![Relationship::new(
            "/chart",
            format!("../charts/chart{}.xml", chart_id),
        )];
    }

    pub fn drawing(&self) -> Option<&Drawing> {
        self.drawing.as_ref()
    }

    pub fn relationships(&self) -> Vec<Relationship> {
        self.drawing_rel.iter().cloned().collect()
    }

    pub fn relationships_xml(&self) -> Result<Option<String>> {
        match &self.drawing_rel {
            Some(rel) => relationships_xml(std::slice::from_ref(rel)).map(Some),
            None => Ok(None),
        }
    }

    pub fn drawing_relationships_xml(&self) -> Result<Option<String>> {
        if self.drawing_links.is_empty() {
            return Ok(None);
        }
        relationships_xml(&self.drawing_links).map(Some)
    }

    // ===== Serialization =====

    /// Serialize the chartsheet part.
    pub fn to_xml(&self) -> Result<String> {
        let mut xml = String::with_capacity(1024);
        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n");
        xml.push_str(concat!(
            r#"<chartsheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" "#,
            r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#
        ));

        self.write_sheet_pr(&mut xml)?;
        self.view.write_xml(&mut xml)?;
        if let Some(protection) = &self.protection {
            protection.write_xml(&mut xml)?;
        }
        self.page.write_print_options(&mut xml);
        self.page.write_page_margins(&mut xml);
        self.page.write_page_setup(&mut xml)?;
        self.page.write_header_footer(&mut xml)?;
        if self.drawing_rel.is_some() {
            xml.push_str(r#"<drawing r:id="rId1"/>"#);
        }

        xml.push_str("</chartsheet>\n");
        debug!("serialized chartsheet '{}'", self.name);
        Ok(xml)
    }

    fn write_sheet_pr(&self, xml: &mut String) -> Result<()> {
        let fit_page = self.page.is_fit_page();
        if !fit_page && self.tab_color.is_none() {
            xml.push_str("<sheetPr/>");
            return Ok(());
        }
        xml.push_str("<sheetPr>");
        if let Some(color) = self.tab_color {
            let argb = self.workbook.borrow().palette().argb(color)?;
            write!(xml, r#"<tabColor rgb="{}"/>"#, argb)?;
        }
        if fit_page {
            xml.push_str(r#"<pageSetUpPr fitToPage="1"/>"#);
        }
        xml.push_str("</sheetPr>");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xlsx::writer::chart::{Chart, ChartType};
    use crate::xlsx::writer::workbook::WorkbookContext;
    use pretty_assertions::assert_eq;

    fn chartsheet() -> Chartsheet {
        let chart = Chart::new(ChartType::Column).into_ref();
        Chartsheet::new("Chart1", 0, WorkbookContext::shared(), chart)
    }

    #[test]
    fn minimal_chartsheet() {
        let mut sheet = chartsheet();
        sheet.prepare_chart(1, 1);
        assert_eq!(
            sheet.to_xml().unwrap(),
            concat!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n",
                r#"<chartsheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
                r#"<sheetPr/>"#,
                r#"<sheetViews><sheetView workbookViewId="0"/></sheetViews>"#,
                r#"<pageMargins left="0.7" right="0.7" top="0.75" bottom="0.75" header="0.3" footer="0.3"/>"#,
                r#"<drawing r:id="rId1"/>"#,
                "</chartsheet>\n"
            )
        );
        let drawing = sheet.drawing().unwrap();
        assert!(!drawing.embedded);
        assert!(!drawing.portrait);
        assert!(!sheet.chart().borrow().is_embedded());
        assert_eq!(sheet.chart().borrow().id(), Some(1));
    }

    #[test]
    fn protection_flags() {
        let mut sheet = chartsheet();
        sheet.protect(None, &ProtectionOptions::default());
        let xml = sheet.to_xml().unwrap();
        assert!(xml.contains(r#"<sheetProtection content="1" objects="1"/>"#));
        assert!(sheet.chart().borrow().is_protected());
    }

    #[test]
    fn zoom_is_not_mirrored_to_normal_view() {
        let mut sheet = chartsheet();
        sheet.set_zoom(75);
        sheet.set_tab_color("green").unwrap();
        let xml = sheet.to_xml().unwrap();
        assert!(xml.contains(r#"<sheetView zoomScale="75" workbookViewId="0"/>"#));
        assert!(xml.contains(r#"<sheetPr><tabColor rgb="FF008000"/></sheetPr>"#));
    }

    #[test]
    fn delegates_to_chart() {
        let mut sheet = chartsheet();
        sheet.add_series(ChartSeries::new("=Sheet1!$A$1:$A$5"));
        sheet.set_style(37);
        sheet.show_hidden_data();
        let chart = sheet.chart().borrow();
        assert_eq!(chart.series().len(), 1);
        assert_eq!(chart.style(), 37);
        assert!(chart.is_showing_hidden_data());
    }

    #[test]
    fn landscape_only_written_when_changed() {
        let mut sheet = chartsheet();
        sheet.page_setup_mut().set_paper(9);
        let xml = sheet.to_xml().unwrap();
        assert!(xml.contains(r#"<pageSetup paperSize="9" orientation="landscape"/>"#));
    }
}
