//! Worksheet part serialization and relationship lists.
//!
//! Elements are written in the order the SpreadsheetML schema requires.
//! Relationship ids are derived here rather than stored: external
//! hyperlinks take `rId1..` in row-major cell order, followed by the
//! drawing, the VML drawing of comments and each table part.

use super::layout::{DEFAULT_COL_WIDTH, DEFAULT_ROW_HEIGHT};
use super::{RowInfo, Worksheet};
use crate::common::Result;
use crate::common::number::write_num;
use crate::common::unit::col_width_to_xml;
use crate::common::xml::escape_attr;
use crate::xlsx::utility::rowcol_to_cell;
use crate::xlsx::writer::cell::{CellData, LinkKind};
use crate::xlsx::writer::grid::calculate_spans;
use crate::xlsx::writer::rels::{Relationship, relationships_xml};
use crate::xlsx::writer::validation::write_data_validations;
use log::debug;
use std::collections::BTreeSet;
use std::fmt::Write as FmtWrite;

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n";

/// Relationship ids of the parts referenced from the worksheet element.
struct PartIds {
    drawing: Option<usize>,
    legacy_drawing: Option<usize>,
    tables: usize,
}

impl Worksheet {
    /// Serialize the worksheet part.
    pub fn to_xml(&self) -> Result<String> {
        let mut xml = String::with_capacity(4096 + self.grid.cell_count() * 32);
        xml.push_str(XML_DECLARATION);
        xml.push_str(concat!(
            r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" "#,
            r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#
        ));

        self.write_sheet_pr(&mut xml)?;
        write!(xml, r#"<dimension ref="{}"/>"#, self.grid.dimensions().to_ref())?;
        self.view.write_xml(&mut xml)?;
        self.write_sheet_format_pr(&mut xml)?;
        self.write_cols(&mut xml)?;
        self.write_sheet_data(&mut xml)?;
        if let Some(protection) = &self.protection {
            protection.write_xml(&mut xml)?;
        }
        if let Some(filter) = &self.autofilter {
            filter.write_xml(&mut xml)?;
        }
        self.write_merge_cells(&mut xml)?;
        self.cond_formats.write_xml(&mut xml)?;
        write_data_validations(&mut xml, &self.validations)?;
        let hyperlinks = self.write_hyperlinks(&mut xml)?;
        self.page.write_print_options(&mut xml);
        self.page.write_page_margins(&mut xml);
        self.page.write_page_setup(&mut xml)?;
        self.page.write_header_footer(&mut xml)?;
        self.page.write_row_breaks(&mut xml)?;
        self.page.write_col_breaks(&mut xml)?;

        let ids = self.part_ids(hyperlinks);
        if let Some(id) = ids.drawing {
            write!(xml, r#"<drawing r:id="rId{}"/>"#, id)?;
        }
        if let Some(id) = ids.legacy_drawing {
            write!(xml, r#"<legacyDrawing r:id="rId{}"/>"#, id)?;
        }
        if !self.tables.is_empty() {
            write!(xml, r#"<tableParts count="{}">"#, self.tables.len())?;
            for i in 0..self.tables.len() {
                write!(xml, r#"<tablePart r:id="rId{}"/>"#, ids.tables + i)?;
            }
            xml.push_str("</tableParts>");
        }

        xml.push_str("</worksheet>\n");
        debug!(
            "serialized worksheet '{}': {} cells, {} relationships",
            self.name,
            self.grid.cell_count(),
            ids.tables - 1 + self.tables.len() + self.comments_id.is_some() as usize
        );
        Ok(xml)
    }

    /// Ids follow the external hyperlinks in a fixed order.
    fn part_ids(&self, hyperlinks: usize) -> PartIds {
        let mut next = hyperlinks + 1;
        let mut take = |present: bool| {
            present.then(|| {
                next += 1;
                next - 1
            })
        };
        let drawing = take(self.drawing_rel.is_some());
        let legacy_drawing = take(self.comments_id.is_some());
        PartIds {
            drawing,
            legacy_drawing,
            tables: next,
        }
    }

    fn external_hyperlinks(&self) -> impl Iterator<Item = &str> {
        self.grid.rows().flat_map(|(_, cells)| {
            cells.values().filter_map(|cell| match &cell.data {
                CellData::Hyperlink { link, .. } if link.kind == LinkKind::External => {
                    Some(link.url.as_str())
                },
                _ => None,
            })
        })
    }

    /// Relationships of the worksheet part, in id order.
    ///
    /// The comments part comes last; it is not referenced from the sheet.
    pub fn relationships(&self) -> Vec<Relationship> {
        let mut rels: Vec<Relationship> = self
            .external_hyperlinks()
            .map(|url| Relationship::external("/hyperlink", url))
            .collect();
        if let Some(drawing) = &self.drawing_rel {
            rels.push(drawing.clone());
        }
        if let Some(id) = self.comments_id {
            rels.push(Relationship::new(
                "/vmlDrawing",
                format!("../drawings/vmlDrawing{}.vml", id),
            ));
        }
        rels.extend(
            self.tables
                .iter()
                .map(|table| Relationship::new("/table", table.target())),
        );
        if let Some(id) = self.comments_id {
            rels.push(Relationship::new("/comments", format!("../comments{}.xml", id)));
        }
        rels
    }

    /// The worksheet `.rels` part, if the sheet references anything.
    pub fn relationships_xml(&self) -> Result<Option<String>> {
        let rels = self.relationships();
        if rels.is_empty() {
            return Ok(None);
        }
        relationships_xml(&rels).map(Some)
    }

    /// The drawing `.rels` part, once a drawing has been prepared.
    pub fn drawing_relationships_xml(&self) -> Result<Option<String>> {
        if self.drawing_links.is_empty() {
            return Ok(None);
        }
        relationships_xml(&self.drawing_links).map(Some)
    }

    /// The comments part, once comments have been prepared.
    pub fn comments_xml(&self) -> Result<Option<String>> {
        match self.comments_id {
            Some(_) => self.comments.to_xml().map(Some),
            None => Ok(None),
        }
    }

    // ===== Elements =====

    fn write_sheet_pr(&self, xml: &mut String) -> Result<()> {
        let fit_page = self.page.is_fit_page();
        let filter_on = self.autofilter.as_ref().is_some_and(|f| f.is_filtering());
        if !fit_page && !filter_on && self.tab_color.is_none() && !self.outline.changed {
            return Ok(());
        }

        xml.push_str("<sheetPr");
        if filter_on {
            xml.push_str(r#" filterMode="1""#);
        }
        if !fit_page && self.tab_color.is_none() && !self.outline.changed {
            xml.push_str("/>");
            return Ok(());
        }
        xml.push('>');

        if let Some(color) = self.tab_color {
            let argb = self.workbook.borrow().palette().argb(color)?;
            write!(xml, r#"<tabColor rgb="{}"/>"#, argb)?;
        }
        if self.outline.changed {
            xml.push_str("<outlinePr");
            if self.outline.auto_style {
                xml.push_str(r#" applyStyles="1""#);
            }
            if !self.outline.below {
                xml.push_str(r#" summaryBelow="0""#);
            }
            if !self.outline.right {
                xml.push_str(r#" summaryRight="0""#);
            }
            if !self.outline.visible {
                xml.push_str(r#" showOutlineSymbols="0""#);
            }
            xml.push_str("/>");
        }
        if fit_page {
            xml.push_str(r#"<pageSetUpPr fitToPage="1"/>"#);
        }
        xml.push_str("</sheetPr>");
        Ok(())
    }

    fn write_sheet_format_pr(&self, xml: &mut String) -> Result<()> {
        xml.push_str(r#"<sheetFormatPr defaultRowHeight="15""#);
        if self.outline_row_level > 0 {
            write!(xml, r#" outlineLevelRow="{}""#, self.outline_row_level)?;
        }
        if self.outline_col_level > 0 {
            write!(xml, r#" outlineLevelCol="{}""#, self.outline_col_level)?;
        }
        xml.push_str("/>");
        Ok(())
    }

    fn write_cols(&self, xml: &mut String) -> Result<()> {
        if self.columns.is_empty() {
            return Ok(());
        }
        xml.push_str("<cols>");
        for info in &self.columns {
            let (width, custom_width) = match info.width {
                None if info.hidden => (0.0, true),
                None => (DEFAULT_COL_WIDTH, false),
                Some(w) => (w, w != DEFAULT_COL_WIDTH),
            };
            let width = if width > 0.0 { col_width_to_xml(width) } else { width };

            write!(xml, r#"<col min="{}" max="{}" width=""#, info.first + 1, info.last + 1)?;
            write_num(xml, width);
            xml.push('"');
            if let Some(xf) = info.format.as_ref().map(|f| f.xf_index()).filter(|&xf| xf != 0) {
                write!(xml, r#" style="{}""#, xf)?;
            }
            if info.hidden {
                xml.push_str(r#" hidden="1""#);
            }
            if custom_width {
                xml.push_str(r#" customWidth="1""#);
            }
            if info.level > 0 {
                write!(xml, r#" outlineLevel="{}""#, info.level)?;
            }
            if info.collapsed {
                xml.push_str(r#" collapsed="1""#);
            }
            xml.push_str("/>");
        }
        xml.push_str("</cols>");
        Ok(())
    }

    fn write_row_start(&self, xml: &mut String, row: u32, span: Option<&str>, info: Option<&RowInfo>) -> Result<()> {
        write!(xml, r#"<row r="{}""#, row + 1)?;
        if let Some(span) = span {
            write!(xml, r#" spans="{}""#, span)?;
        }
        if let Some(info) = info {
            let xf = info.format.as_ref().map_or(0, |f| f.xf_index());
            if xf != 0 {
                write!(xml, r#" s="{}""#, xf)?;
            }
            if info.format.is_some() {
                xml.push_str(r#" customFormat="1""#);
            }
            if info.height != DEFAULT_ROW_HEIGHT {
                xml.push_str(r#" ht=""#);
                write_num(xml, info.height);
                xml.push('"');
            }
            if info.hidden {
                xml.push_str(r#" hidden="1""#);
            }
            if info.height != DEFAULT_ROW_HEIGHT {
                xml.push_str(r#" customHeight="1""#);
            }
            if info.level > 0 {
                write!(xml, r#" outlineLevel="{}""#, info.level)?;
            }
            if info.collapsed {
                xml.push_str(r#" collapsed="1""#);
            }
        }
        Ok(())
    }

    fn write_sheet_data(&self, xml: &mut String) -> Result<()> {
        let dims = self.grid.dimensions();
        let (Some(min_row), Some(max_row)) = (dims.min_row, dims.max_row) else {
            xml.push_str("<sheetData/>");
            return Ok(());
        };

        let spans = calculate_spans(min_row, max_row, |row| {
            self.grid
                .row(row)
                .into_iter()
                .flat_map(|cells| cells.keys().copied())
                .chain(self.comments.cols_in_row(row))
        });

        let mut rows: BTreeSet<u32> = self.grid.rows().map(|(row, _)| *row).collect();
        rows.extend(self.rows.keys().copied());
        rows.extend(self.comments.iter().map(|c| c.row));

        xml.push_str("<sheetData>");
        for row in rows {
            let info = self.rows.get(&row);
            let span = spans.get(&(row / 16)).map(String::as_str);
            match self.grid.row(row) {
                Some(cells) => {
                    self.write_row_start(xml, row, span, info)?;
                    xml.push('>');
                    let row_xf = info.and_then(|i| i.format.as_ref()).map(|f| f.xf_index());
                    for (&col, cell) in cells {
                        let mut xf = cell.xf_index();
                        if xf == 0 {
                            xf = row_xf
                                .or_else(|| self.col_formats.get(&col).map(|f| f.xf_index()))
                                .unwrap_or(0);
                        }
                        cell.render(xml, row, col, xf)?;
                    }
                    xml.push_str("</row>");
                },
                None if self.comments.has_comment_in_row(row) => {
                    self.write_row_start(xml, row, span, info)?;
                    xml.push_str("/>");
                },
                None => {
                    self.write_row_start(xml, row, None, info)?;
                    xml.push_str("/>");
                },
            }
        }
        xml.push_str("</sheetData>");
        Ok(())
    }

    fn write_merge_cells(&self, xml: &mut String) -> Result<()> {
        if self.merged.is_empty() {
            return Ok(());
        }
        write!(xml, r#"<mergeCells count="{}">"#, self.merged.len())?;
        for range in &self.merged {
            write!(xml, r#"<mergeCell ref="{}"/>"#, range.to_sqref())?;
        }
        xml.push_str("</mergeCells>");
        Ok(())
    }

    /// Write `<hyperlinks>`, returning the number of external links.
    fn write_hyperlinks(&self, xml: &mut String) -> Result<usize> {
        let mut external = 0;
        let mut opened = false;
        for (&row, cells) in self.grid.rows() {
            for (&col, cell) in cells {
                let CellData::Hyperlink { link, .. } = &cell.data else {
                    continue;
                };
                if !opened {
                    xml.push_str("<hyperlinks>");
                    opened = true;
                }
                write!(xml, r#"<hyperlink ref="{}""#, rowcol_to_cell(row, col))?;
                match link.kind {
                    LinkKind::External => {
                        external += 1;
                        write!(xml, r#" r:id="rId{}""#, external)?;
                        if let Some(location) = &link.location {
                            write!(xml, r#" location="{}""#, escape_attr(location))?;
                        }
                        if let Some(tooltip) = &link.tooltip {
                            write!(xml, r#" tooltip="{}""#, escape_attr(tooltip))?;
                        }
                    },
                    LinkKind::Internal => {
                        write!(xml, r#" location="{}""#, escape_attr(&link.url))?;
                        if let Some(tooltip) = &link.tooltip {
                            write!(xml, r#" tooltip="{}""#, escape_attr(tooltip))?;
                        }
                        if let Some(display) = &link.location {
                            write!(xml, r#" display="{}""#, escape_attr(display))?;
                        }
                    },
                }
                xml.push_str("/>");
            }
        }
        if opened {
            xml.push_str("</hyperlinks>");
        }
        Ok(external)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xlsx::format::Format;
    use crate::xlsx::writer::chart::{Chart, ChartType};
    use crate::xlsx::writer::comments::CommentOptions;
    use crate::xlsx::writer::drawing::Placement;
    use crate::xlsx::writer::sheet::OutlineOptions;
    use crate::xlsx::writer::table::TableOptions;
    use crate::xlsx::writer::workbook::WorkbookContext;
    use pretty_assertions::assert_eq;

    fn sheet() -> Worksheet {
        Worksheet::new("Sheet1", 0, WorkbookContext::shared())
    }

    fn between<'a>(xml: &'a str, start: &str, end: &str) -> &'a str {
        let from = xml.find(start).unwrap();
        let to = xml[from..].find(end).unwrap() + from + end.len();
        &xml[from..to]
    }

    #[test]
    fn empty_sheet() {
        let ws = sheet();
        let xml = ws.to_xml().unwrap();
        assert_eq!(
            xml,
            concat!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n",
                r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
                r#"<dimension ref="A1"/>"#,
                r#"<sheetViews><sheetView workbookViewId="0"/></sheetViews>"#,
                r#"<sheetFormatPr defaultRowHeight="15"/>"#,
                r#"<sheetData/>"#,
                r#"<pageMargins left="0.7" right="0.7" top="0.75" bottom="0.75" header="0.3" footer="0.3"/>"#,
                "</worksheet>\n"
            )
        );
        assert_eq!(ws.relationships_xml().unwrap(), None);
    }

    #[test]
    fn rows_and_spans() {
        let mut ws = sheet();
        ws.write_number(0, 0, 1.0, None).unwrap();
        ws.write_number(0, 2, 2.0, None).unwrap();
        ws.write_number(17, 1, 3.0, None).unwrap();
        let xml = ws.to_xml().unwrap();
        assert!(xml.contains(r#"<dimension ref="A1:C18"/>"#));
        assert!(xml.contains(r#"<row r="1" spans="1:3"><c r="A1"><v>1</v></c><c r="C1"><v>2</v></c></row>"#));
        assert!(xml.contains(r#"<row r="18" spans="2:2"><c r="B18"><v>3</v></c></row>"#));
    }

    #[test]
    fn row_and_column_formats_fall_back() {
        let mut ws = sheet();
        let row_format = Format::new().with_xf_index(2);
        let col_format = Format::new().with_xf_index(3);
        let own = Format::new().with_xf_index(4);
        ws.set_row(0, Some(30.0), Some(&row_format), &OutlineOptions::default())
            .unwrap();
        ws.set_column(1, 1, None, Some(&col_format), &OutlineOptions::default())
            .unwrap();
        ws.write_number(0, 0, 1.0, None).unwrap();
        ws.write_number(0, 1, 1.0, Some(&own)).unwrap();
        ws.write_number(1, 1, 1.0, None).unwrap();
        let xml = ws.to_xml().unwrap();

        assert!(xml.contains(r#"<row r="1" spans="1:2" s="2" customFormat="1" ht="30" customHeight="1">"#));
        assert!(xml.contains(r#"<c r="A1" s="2">"#));
        assert!(xml.contains(r#"<c r="B1" s="4">"#));
        assert!(xml.contains(r#"<c r="B2" s="3">"#));
        assert!(xml.contains(r#"<col min="2" max="2" width="9.140625" style="3"/>"#));
    }

    #[test]
    fn columns() {
        let mut ws = sheet();
        let none = OutlineOptions::default();
        ws.set_column(0, 0, Some(20.0), None, &none).unwrap();
        ws.set_column(2, 3, None, None, &OutlineOptions::hidden()).unwrap();
        ws.set_column(4, 4, Some(8.43), None, &none.with_level(1))
            .unwrap();
        let xml = ws.to_xml().unwrap();
        assert_eq!(
            between(&xml, "<cols>", "</cols>"),
            concat!(
                "<cols>",
                r#"<col min="1" max="1" width="20.7109375" customWidth="1"/>"#,
                r#"<col min="3" max="4" width="0" hidden="1" customWidth="1"/>"#,
                r#"<col min="5" max="5" width="9.140625" outlineLevel="1"/>"#,
                "</cols>"
            )
        );
        assert!(xml.contains(r#"<sheetFormatPr defaultRowHeight="15" outlineLevelCol="1"/>"#));
    }

    #[test]
    fn formatted_empty_rows() {
        let mut ws = sheet();
        ws.set_row(4, Some(0.0), None, &OutlineOptions::default()).unwrap();
        let xml = ws.to_xml().unwrap();
        assert!(xml.contains(r#"<sheetData><row r="5" hidden="1"/></sheetData>"#));
    }

    #[test]
    fn sheet_properties() {
        let mut ws = sheet();
        ws.set_tab_color("red").unwrap();
        ws.outline_settings(false, false, true, false);
        ws.fit_to_pages(1, 2);
        let xml = ws.to_xml().unwrap();
        assert!(xml.contains(concat!(
            r#"<sheetPr><tabColor rgb="FFFF0000"/>"#,
            r#"<outlinePr summaryBelow="0" showOutlineSymbols="0"/>"#,
            r#"<pageSetUpPr fitToPage="1"/></sheetPr>"#
        )));

        let mut filtered = sheet();
        filtered.autofilter("A1:D51").unwrap();
        filtered.filter_column(0, "x == East").unwrap();
        assert!(filtered.to_xml().unwrap().contains(r#"<sheetPr filterMode="1"/>"#));
    }

    #[test]
    fn hyperlinks_and_relationship_ids() {
        let mut ws = sheet();
        ws.write_url(2, 0, "internal:Sheet2!A1", None, None, Some("go"))
            .unwrap();
        ws.write_url(0, 0, "https://example.com/", None, None, None)
            .unwrap();
        ws.write_url(1, 1, "external:c:/foo.xlsx#Sheet1!A1", None, None, None)
            .unwrap();
        ws.write_comment(5, 5, "note", &CommentOptions::default())
            .unwrap();
        ws.add_table(10, 0, 12, 1, &TableOptions::default()).unwrap();
        let chart = Chart::new(ChartType::Bar).into_ref();
        ws.insert_chart(&chart, Placement::new(20, 0)).unwrap();
        ws.prepare_drawings().unwrap();
        ws.prepare_comments(1);

        let xml = ws.to_xml().unwrap();
        assert_eq!(
            between(&xml, "<hyperlinks>", "</hyperlinks>"),
            concat!(
                "<hyperlinks>",
                r#"<hyperlink ref="A1" r:id="rId1"/>"#,
                r#"<hyperlink ref="B2" r:id="rId2" location="Sheet1!A1"/>"#,
                r#"<hyperlink ref="A3" location="Sheet2!A1" tooltip="go" display="Sheet2!A1"/>"#,
                "</hyperlinks>"
            )
        );
        assert!(xml.ends_with(concat!(
            r#"<drawing r:id="rId3"/><legacyDrawing r:id="rId4"/>"#,
            r#"<tableParts count="1"><tablePart r:id="rId5"/></tableParts></worksheet>"#,
            "\n"
        )));

        let types: Vec<_> = ws.relationships().iter().map(|r| r.rel_type()).collect();
        assert_eq!(
            types,
            ["/hyperlink", "/hyperlink", "/drawing", "/vmlDrawing", "/table", "/comments"]
        );
        let rels = ws.relationships_xml().unwrap().unwrap();
        assert!(rels.contains(r#"Target="file:///c:\foo.xlsx" TargetMode="External""#));
        assert!(ws.comments_xml().unwrap().is_some());
        assert!(ws.drawing_relationships_xml().unwrap().is_some());
    }

    #[test]
    fn comment_rows_are_written() {
        let mut ws = sheet();
        ws.write_number(0, 0, 1.0, None).unwrap();
        ws.write_comment(2, 3, "note", &CommentOptions::default())
            .unwrap();
        let xml = ws.to_xml().unwrap();
        assert!(xml.contains(r#"<row r="3" spans="1:4"/>"#));
        assert!(xml.contains(r#"<row r="1" spans="1:4">"#));
        // Unprepared comments are not linked.
        assert!(!xml.contains("legacyDrawing"));
        assert_eq!(ws.relationships_xml().unwrap(), None);
    }

    #[test]
    fn merged_cells() {
        let mut ws = sheet();
        let format = Format::new().with_xf_index(1);
        ws.merge_range(1, 1, 2, 3, "merged", &format).unwrap();
        let xml = ws.to_xml().unwrap();
        assert!(xml.contains(r#"<mergeCells count="1"><mergeCell ref="B2:D3"/></mergeCells>"#));
    }
}
