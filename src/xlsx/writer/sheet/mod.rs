//! The worksheet aggregate.
//!
//! A [`Worksheet`] owns the cell grid and every per-sheet registry (columns,
//! rows, merges, filters, conditional formats, validations, tables, drawings
//! and comments). Workbook-wide state is reached through the shared
//! [`WorkbookRef`] handle, whose counters are only ever incremented here.
//!
//! The API is split by concern:
//! - `cells`: value writes and the generic `write` dispatch
//! - `layout`: columns, rows, outlines and merged ranges
//! - `objects`: tables, charts, images and comments
//! - `xml`: serialization and relationship lists

mod cells;
mod layout;
mod objects;
mod xml;

pub use layout::{MergeValue, OutlineOptions};

use super::comments::Comments;
use super::conditional::{ConditionalFormat, ConditionalFormats};
use super::drawing::{Drawing, QueuedChart, QueuedImage};
use super::filter::AutoFilter;
use super::grid::CellGrid;
use super::page::PageSetup;
use super::protection::{ProtectionOptions, SheetProtection};
use super::rels::Relationship;
use super::table::Table;
use super::validation::{DataValidation, ValidationRule};
use super::view::{PaneType, Panes, SheetView};
use super::workbook::WorkbookRef;
use crate::common::{Error, Result};
use crate::xlsx::color::Color;
use crate::xlsx::format::Format;
use crate::xlsx::utility::{
    COL_MAX, CellRange, ROW_MAX, check_dimensions, col_to_name, name_area, quote_sheetname,
};
use std::collections::BTreeMap;

/// Settings from one `set_column` call, written as one `<col>` element.
#[derive(Debug, Clone, PartialEq)]
struct ColumnInfo {
    first: u32,
    last: u32,
    width: Option<f64>,
    format: Option<Format>,
    hidden: bool,
    level: u8,
    collapsed: bool,
}

/// Settings from a `set_row` call.
#[derive(Debug, Clone, PartialEq)]
struct RowInfo {
    height: f64,
    format: Option<Format>,
    hidden: bool,
    level: u8,
    collapsed: bool,
}

/// Outline display settings written to `<outlinePr>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Outline {
    visible: bool,
    below: bool,
    right: bool,
    auto_style: bool,
    changed: bool,
}

impl Default for Outline {
    fn default() -> Self {
        Self {
            visible: true,
            below: true,
            right: true,
            auto_style: false,
            changed: false,
        }
    }
}

/// A worksheet being built.
///
/// Coordinates are zero-based `(row, col)` pairs. Every call validates its
/// arguments before touching any state, so a failed call leaves the sheet as
/// it was.
///
/// # Examples
///
/// ```
/// use litchi_xlsxwriter::xlsx::{Worksheet, WorkbookContext};
///
/// let workbook = WorkbookContext::shared();
/// let mut sheet = Worksheet::new("Sheet1", 0, workbook);
/// sheet.write(0, 0, "Hello", None)?;
/// sheet.write(1, 0, 123456, None)?;
/// sheet.write(2, 0, "=A2+1", None)?;
///
/// let xml = sheet.to_xml()?;
/// assert!(xml.contains(r#"<dimension ref="A1:A3"/>"#));
/// # Ok::<(), litchi_xlsxwriter::common::Error>(())
/// ```
#[derive(Debug)]
pub struct Worksheet {
    name: String,
    index: usize,
    workbook: WorkbookRef,
    grid: CellGrid,

    columns: Vec<ColumnInfo>,
    col_sizes: BTreeMap<u32, f64>,
    col_formats: BTreeMap<u32, Format>,
    rows: BTreeMap<u32, RowInfo>,
    row_sizes: BTreeMap<u32, f64>,
    outline: Outline,
    outline_row_level: u8,
    outline_col_level: u8,

    merged: Vec<CellRange>,
    autofilter: Option<AutoFilter>,
    cond_formats: ConditionalFormats,
    validations: Vec<ValidationRule>,
    tables: Vec<Table>,
    hyperlink_count: u32,

    charts: Vec<QueuedChart>,
    images: Vec<QueuedImage>,
    drawing: Option<Drawing>,
    drawing_rel: Option<Relationship>,
    drawing_links: Vec<Relationship>,
    comments: Comments,
    comments_id: Option<u32>,
    vml_data_id: String,
    vml_shape_id: u32,

    view: SheetView,
    page: PageSetup,
    print_area: Option<String>,
    repeat_rows: Option<String>,
    repeat_cols: Option<String>,
    protection: Option<SheetProtection>,
    tab_color: Option<Color>,
    hidden: bool,
}

impl Worksheet {
    /// Create an empty worksheet at position `index` of the workbook.
    pub fn new(name: &str, index: usize, workbook: WorkbookRef) -> Self {
        Self {
            name: name.to_string(),
            index,
            workbook,
            grid: CellGrid::new(),
            columns: Vec::new(),
            col_sizes: BTreeMap::new(),
            col_formats: BTreeMap::new(),
            rows: BTreeMap::new(),
            row_sizes: BTreeMap::new(),
            outline: Outline::default(),
            outline_row_level: 0,
            outline_col_level: 0,
            merged: Vec::new(),
            autofilter: None,
            cond_formats: ConditionalFormats::new(),
            validations: Vec::new(),
            tables: Vec::new(),
            hyperlink_count: 0,
            charts: Vec::new(),
            images: Vec::new(),
            drawing: None,
            drawing_rel: None,
            drawing_links: Vec::new(),
            comments: Comments::new(),
            comments_id: None,
            vml_data_id: String::new(),
            vml_shape_id: 0,
            view: SheetView::default(),
            page: PageSetup::default(),
            print_area: None,
            repeat_rows: None,
            repeat_cols: None,
            protection: None,
            tab_color: None,
            hidden: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// The cell grid, for the chart and packaging stages.
    pub fn grid(&self) -> &CellGrid {
        &self.grid
    }

    // ===== Sheet state =====

    /// Select the sheet tab. Several sheets may be selected at once.
    pub fn select(&mut self) {
        self.hidden = false;
        self.view.selected = true;
    }

    /// Make this the sheet displayed when the workbook is opened.
    pub fn activate(&mut self) {
        self.select();
        self.workbook.borrow_mut().active_sheet = self.index;
    }

    /// Hide the sheet. A hidden sheet can be neither selected nor active.
    pub fn hide(&mut self) {
        self.hidden = true;
        self.view.selected = false;
        let mut workbook = self.workbook.borrow_mut();
        workbook.active_sheet = 0;
        workbook.first_sheet = 0;
    }

    /// Make this the first visible tab when there are too many to show.
    pub fn set_first_sheet(&mut self) {
        self.hidden = false;
        self.workbook.borrow_mut().first_sheet = self.index;
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn is_selected(&self) -> bool {
        self.view.selected
    }

    pub fn is_active(&self) -> bool {
        self.workbook.borrow().active_sheet == self.index
    }

    /// Protect the sheet, optionally with a password.
    ///
    /// # Arguments
    /// * `password` - Password to unprotect the sheet; empty means none
    /// * `options` - Actions still allowed on the protected sheet
    pub fn protect(&mut self, password: Option<&str>, options: &ProtectionOptions) {
        self.protection = Some(SheetProtection::new(password, options));
    }

    pub fn is_protected(&self) -> bool {
        self.protection.is_some()
    }

    /// Tab color as a palette index (8..=63), a color name or `#RRGGBB`.
    pub fn set_tab_color(&mut self, color: &str) -> Result<()> {
        self.tab_color = Some(Color::parse(color)?);
        Ok(())
    }

    // ===== Views =====

    /// Select a cell or range in the sheet view.
    pub fn set_selection(&mut self, first_row: u32, first_col: u32, last_row: u32, last_col: u32) {
        self.view.set_selection(first_row, first_col, last_row, last_col);
    }

    /// Freeze the rows above `row` and the columns left of `col`.
    ///
    /// `top_left` is the first visible cell of the scrolling pane; it defaults
    /// to `(row, col)`. With [`PaneType::Split`] the row and column are read
    /// as split positions, as in [`split_panes`](Self::split_panes).
    pub fn freeze_panes(&mut self, row: u32, col: u32, top_left: Option<(u32, u32)>, pane_type: PaneType) {
        let panes = match pane_type {
            PaneType::Split => Panes::Split {
                y: row as f64,
                x: col as f64,
                top_left,
            },
            PaneType::Frozen | PaneType::FrozenSplit => {
                let (top_row, left_col) = top_left.unwrap_or((row, col));
                Panes::Freeze {
                    row,
                    col,
                    top_row,
                    left_col,
                    frozen_split: pane_type == PaneType::FrozenSplit,
                }
            },
        };
        self.view.panes = Some(panes);
    }

    /// Split the window at `y` points from the top and `x` character widths
    /// from the left.
    pub fn split_panes(&mut self, y: f64, x: f64, top_left: Option<(u32, u32)>) {
        self.view.panes = Some(Panes::Split { y, x, top_left });
    }

    /// Zoom in percent; values outside 10..=400 reset to 100.
    pub fn set_zoom(&mut self, scale: u32) {
        self.view.set_zoom(scale);
    }

    pub fn right_to_left(&mut self) {
        self.view.right_to_left = true;
    }

    /// Display zero values as blank cells.
    pub fn hide_zero(&mut self) {
        self.view.show_zeros = false;
    }

    /// Gridline visibility.
    ///
    /// * `0` - shown on screen and printed
    /// * `1` - shown on screen only (the default)
    /// * `2` - hidden on screen and not printed
    pub fn hide_gridlines(&mut self, option: u8) {
        match option {
            0 => {
                self.page.show_print_gridlines(true);
                self.view.screen_gridlines = true;
            },
            1 => {
                self.page.show_print_gridlines(false);
                self.view.screen_gridlines = true;
            },
            _ => {
                self.page.show_print_gridlines(false);
                self.view.screen_gridlines = false;
            },
        }
    }

    /// Show the sheet in page layout view.
    pub fn set_page_view(&mut self) {
        self.view.page_view = true;
    }

    // ===== Printing =====

    /// Page setup and print options.
    pub fn page_setup(&self) -> &PageSetup {
        &self.page
    }

    pub fn page_setup_mut(&mut self) -> &mut PageSetup {
        &mut self.page
    }

    pub fn set_portrait(&mut self) {
        self.page.set_portrait();
    }

    pub fn set_landscape(&mut self) {
        self.page.set_landscape();
    }

    pub fn set_paper(&mut self, paper_size: u32) {
        self.page.set_paper(paper_size);
    }

    pub fn set_header(&mut self, text: &str, margin: f64) -> Result<()> {
        self.page.set_header(text, margin)
    }

    pub fn set_footer(&mut self, text: &str, margin: f64) -> Result<()> {
        self.page.set_footer(text, margin)
    }

    pub fn center_horizontally(&mut self) {
        self.page.center_horizontally();
    }

    pub fn center_vertically(&mut self) {
        self.page.center_vertically();
    }

    pub fn set_margins(&mut self, margin: f64) {
        self.page.set_margins(margin);
    }

    pub fn print_scale(&mut self, scale: u32) {
        self.page.print_scale(scale);
    }

    pub fn fit_to_pages(&mut self, width: u32, height: u32) {
        self.page.fit_to_pages(width, height);
    }

    pub fn print_across(&mut self) {
        self.page.print_across(true);
    }

    pub fn print_row_col_headers(&mut self) {
        self.page.print_row_col_headers(true);
    }

    pub fn set_start_page(&mut self, page: u32) {
        self.page.set_start_page(page);
    }

    pub fn set_h_pagebreaks(&mut self, breaks: &[u32]) {
        self.page.set_h_pagebreaks(breaks);
    }

    pub fn set_v_pagebreaks(&mut self, breaks: &[u32]) {
        self.page.set_v_pagebreaks(breaks);
    }

    /// Repeat rows `first..=last` at the top of each printed page.
    pub fn repeat_rows(&mut self, first: u32, last: Option<u32>) -> Result<()> {
        let last = last.unwrap_or(first);
        check_dimensions(first.max(last), 0)?;
        let (first, last) = (first.min(last), first.max(last));
        self.repeat_rows = Some(format!(
            "{}!${}:${}",
            quote_sheetname(&self.name),
            first + 1,
            last + 1
        ));
        Ok(())
    }

    /// Repeat columns `first..=last` at the left of each printed page.
    pub fn repeat_columns(&mut self, first: u32, last: Option<u32>) -> Result<()> {
        let last = last.unwrap_or(first);
        check_dimensions(0, first.max(last))?;
        let (first, last) = (first.min(last), first.max(last));
        self.repeat_cols = Some(format!(
            "{}!{}:{}",
            quote_sheetname(&self.name),
            col_to_name(first, true),
            col_to_name(last, true)
        ));
        Ok(())
    }

    /// Limit printing to a range. Selecting the whole sheet clears nothing
    /// and is ignored.
    pub fn print_area(&mut self, first_row: u32, first_col: u32, last_row: u32, last_col: u32) -> Result<()> {
        let range = CellRange::new(first_row, first_col, last_row, last_col);
        range.check()?;
        if range == CellRange::new(0, 0, ROW_MAX - 1, COL_MAX - 1) {
            return Ok(());
        }
        self.print_area = Some(name_area(
            &self.name,
            range.first_row,
            range.first_col,
            range.last_row,
            range.last_col,
        ));
        Ok(())
    }

    /// `_xlnm.Print_Area` defined name value.
    pub fn print_area_name(&self) -> Option<&str> {
        self.print_area.as_deref()
    }

    /// Row part of the `_xlnm.Print_Titles` defined name.
    pub fn repeat_rows_name(&self) -> Option<&str> {
        self.repeat_rows.as_deref()
    }

    /// Column part of the `_xlnm.Print_Titles` defined name.
    pub fn repeat_columns_name(&self) -> Option<&str> {
        self.repeat_cols.as_deref()
    }

    // ===== Filters, conditional formats and validations =====

    /// Add an autofilter over `range`, e.g. `A1:D20`.
    pub fn autofilter(&mut self, range: &str) -> Result<()> {
        let range = CellRange::parse(range)?;
        range.check()?;
        self.autofilter = Some(AutoFilter::new(&self.name, range));
        Ok(())
    }

    fn autofilter_mut(&mut self, method: &str) -> Result<&mut AutoFilter> {
        self.autofilter
            .as_mut()
            .ok_or_else(|| Error::Limit(format!("Must call autofilter before {}", method)))
    }

    /// Filter a column of the autofilter with an expression such as
    /// `x > 2000 and x < 5000`. `col` is absolute, not relative to the
    /// filter range.
    pub fn filter_column(&mut self, col: u32, expression: &str) -> Result<()> {
        self.autofilter_mut("filter_column")?
            .filter_column(col, expression)
    }

    /// Show only the listed values in a column of the autofilter.
    pub fn filter_column_list<S: AsRef<str>>(&mut self, col: u32, values: &[S]) -> Result<()> {
        self.autofilter_mut("filter_column_list")?
            .filter_column_list(col, values)
    }

    /// `_xlnm._FilterDatabase` defined name value.
    pub fn autofilter_area(&self) -> Option<&str> {
        self.autofilter.as_ref().map(AutoFilter::defined_name)
    }

    /// Whether any autofilter column is filtering.
    pub fn is_filtering(&self) -> bool {
        self.autofilter.as_ref().is_some_and(AutoFilter::is_filtering)
    }

    /// Apply a conditional format to one or more ranges.
    ///
    /// `ranges` holds A1 ranges separated by spaces or commas, e.g.
    /// `"B3:K6 B9:K12"`; `$` anchors are ignored.
    pub fn conditional_formatting(&mut self, ranges: &str, options: &ConditionalFormat) -> Result<()> {
        let ranges = ranges
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|r| !r.is_empty())
            .map(|r| CellRange::parse(&r.replace('$', "")))
            .collect::<Result<Vec<_>>>()?;

        let workbook = self.workbook.borrow();
        self.cond_formats
            .add(&ranges, options, workbook.palette(), workbook.date_1904)
    }

    /// Add a data validation over a range.
    pub fn data_validation(
        &mut self,
        first_row: u32,
        first_col: u32,
        last_row: u32,
        last_col: u32,
        options: &DataValidation,
    ) -> Result<()> {
        let range = CellRange::new(first_row, first_col, last_row, last_col);
        range.check()?;
        let date_1904 = self.workbook.borrow().date_1904;
        if let Some(rule) = ValidationRule::compile(range, options, date_1904)? {
            self.validations.push(rule);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xlsx::writer::workbook::WorkbookContext;

    fn sheet(name: &str) -> Worksheet {
        Worksheet::new(name, 1, WorkbookContext::shared())
    }

    #[test]
    fn activation_and_hiding() {
        let mut ws = sheet("Sheet2");
        ws.activate();
        assert!(ws.is_active() && ws.is_selected());

        ws.hide();
        assert!(ws.is_hidden());
        assert!(!ws.is_selected());
        assert!(!ws.is_active());

        ws.set_first_sheet();
        assert!(!ws.is_hidden());
        assert_eq!(ws.workbook.borrow().first_sheet, 1);
    }

    #[test]
    fn print_titles_and_area() {
        let mut ws = sheet("Sales Data");
        ws.repeat_rows(0, Some(1)).unwrap();
        ws.repeat_columns(0, None).unwrap();
        ws.print_area(0, 0, 9, 3).unwrap();
        assert_eq!(ws.repeat_rows_name(), Some("'Sales Data'!$1:$2"));
        assert_eq!(ws.repeat_columns_name(), Some("'Sales Data'!$A:$A"));
        assert_eq!(ws.print_area_name(), Some("'Sales Data'!$A$1:$D$10"));

        let mut ws = sheet("Sheet1");
        ws.print_area(0, 0, ROW_MAX - 1, COL_MAX - 1).unwrap();
        assert_eq!(ws.print_area_name(), None);
    }

    #[test]
    fn filter_column_needs_an_autofilter() {
        let mut ws = sheet("Sheet1");
        assert!(matches!(ws.filter_column(0, "x > 1"), Err(Error::Limit(_))));
        ws.autofilter("A1:D20").unwrap();
        ws.filter_column(0, "x > 1").unwrap();
        assert!(ws.is_filtering());
        assert_eq!(ws.autofilter_area(), Some("Sheet1!$A$1:$D$20"));
    }

    #[test]
    fn conditional_formatting_ranges() {
        let mut ws = sheet("Sheet1");
        let rule = ConditionalFormat::new("cell")
            .with_criteria(">")
            .with_value(5);
        ws.conditional_formatting("$B$3:$K$6, B9:K12", &rule).unwrap();
        assert!(ws.cond_formats.rules("B3:K6 B9:K12").is_some());
        assert!(matches!(
            ws.conditional_formatting("B3:K6:Z", &rule),
            Err(Error::InvalidReference(_))
        ));
    }

    #[test]
    fn invalid_tab_color_is_rejected() {
        let mut ws = sheet("Sheet1");
        assert!(ws.set_tab_color("not-a-color").is_err());
        ws.set_tab_color("red").unwrap();
        assert!(ws.tab_color.is_some());
    }
}
