//! Sheet view state: selection, frozen and split panes, zoom and display flags.

use crate::common::Result;
use crate::common::unit::{CELL_PADDING, MAX_DIGIT_WIDTH};
use crate::common::xml::escape_attr;
use crate::xlsx::utility::rowcol_to_cell;
use log::warn;
use std::fmt::Write as FmtWrite;

/// How a frozen pane behaves when unfrozen in Excel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PaneType {
    #[default]
    Frozen,
    /// Frozen, reverting to a split when unfrozen.
    FrozenSplit,
    /// A plain split, with the row and column read as a split position.
    Split,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Panes {
    Freeze {
        row: u32,
        col: u32,
        top_row: u32,
        left_col: u32,
        frozen_split: bool,
    },
    /// Split position in points (vertical) and character widths
    /// (horizontal). The top-left visible cell is estimated when not given.
    Split {
        y: f64,
        x: f64,
        top_left: Option<(u32, u32)>,
    },
}

/// One `<selection>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub pane: Option<&'static str>,
    pub active_cell: Option<String>,
    pub sqref: Option<String>,
}

impl Selection {
    fn write_xml(&self, xml: &mut String) -> Result<()> {
        xml.push_str("<selection");
        if let Some(pane) = self.pane {
            write!(xml, r#" pane="{}""#, pane)?;
        }
        if let Some(cell) = &self.active_cell {
            write!(xml, r#" activeCell="{}""#, cell)?;
        }
        if let Some(sqref) = &self.sqref {
            write!(xml, r#" sqref="{}""#, escape_attr(sqref))?;
        }
        xml.push_str("/>");
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SheetView {
    pub(crate) screen_gridlines: bool,
    pub(crate) show_zeros: bool,
    pub(crate) right_to_left: bool,
    pub(crate) selected: bool,
    pub(crate) hide_outline_symbols: bool,
    pub(crate) page_view: bool,
    pub(crate) zoom: u32,
    pub(crate) zoom_scale_normal: bool,
    pub(crate) panes: Option<Panes>,
    pub(crate) selection: Option<Selection>,
}

impl Default for SheetView {
    fn default() -> Self {
        Self {
            screen_gridlines: true,
            show_zeros: true,
            right_to_left: false,
            selected: false,
            hide_outline_symbols: false,
            page_view: false,
            zoom: 100,
            zoom_scale_normal: true,
            panes: None,
            selection: None,
        }
    }
}

/// Pane split width in twips for a column width in characters.
pub fn calculate_x_split_width(width: f64) -> u32 {
    let pixels = if width < 1.0 {
        (width * 12.0 + 0.5) as u32
    } else {
        (width * MAX_DIGIT_WIDTH + 0.5) as u32 + CELL_PADDING as u32
    };
    let points = pixels * 3 / 4;
    points * 20 + 390
}

impl SheetView {
    /// Zoom in percent; values outside 10..=400 reset to 100.
    pub fn set_zoom(&mut self, scale: u32) {
        self.zoom = if (10..=400).contains(&scale) {
            scale
        } else {
            warn!("zoom {} outside 10..=400, using 100", scale);
            100
        };
    }

    /// Select a cell or range. Selecting only `A1` is the default and is
    /// not stored.
    pub fn set_selection(&mut self, row1: u32, col1: u32, row2: u32, col2: u32) {
        let active = rowcol_to_cell(row1, col1);
        let (r1, r2) = (row1.min(row2), row1.max(row2));
        let (c1, c2) = (col1.min(col2), col1.max(col2));
        let sqref = if r1 == r2 && c1 == c2 {
            active.clone()
        } else {
            crate::xlsx::utility::range(r1, c1, r2, c2)
        };
        if sqref == "A1" {
            return;
        }
        self.selection = Some(Selection {
            pane: None,
            active_cell: Some(active),
            sqref: Some(sqref),
        });
    }

    /// Pane selections for the given split, with the user selection moved
    /// into the active pane.
    fn pane_selections(
        row_split: bool,
        col_split: bool,
        top_row: u32,
        left_col: u32,
        active_cell: Option<String>,
        sqref: Option<String>,
    ) -> (&'static str, Vec<Selection>) {
        if row_split && col_split {
            let row_cell = rowcol_to_cell(top_row, 0);
            let col_cell = rowcol_to_cell(0, left_col);
            (
                "bottomRight",
                vec![
                    Selection {
                        pane: Some("topRight"),
                        active_cell: Some(col_cell.clone()),
                        sqref: Some(col_cell),
                    },
                    Selection {
                        pane: Some("bottomLeft"),
                        active_cell: Some(row_cell.clone()),
                        sqref: Some(row_cell),
                    },
                    Selection {
                        pane: Some("bottomRight"),
                        active_cell,
                        sqref,
                    },
                ],
            )
        } else if col_split {
            (
                "topRight",
                vec![Selection {
                    pane: Some("topRight"),
                    active_cell,
                    sqref,
                }],
            )
        } else {
            (
                "bottomLeft",
                vec![Selection {
                    pane: Some("bottomLeft"),
                    active_cell,
                    sqref,
                }],
            )
        }
    }

    /// Write `<pane>` and return the selections that follow it.
    fn write_pane(&self, xml: &mut String, panes: &Panes) -> Result<Vec<Selection>> {
        let user = self.selection.clone();
        let (active_cell, sqref) = match &user {
            Some(s) => (s.active_cell.clone(), s.sqref.clone()),
            None => (None, None),
        };

        match *panes {
            Panes::Freeze {
                row,
                col,
                top_row,
                left_col,
                frozen_split,
            } => {
                let (active_pane, selections) =
                    Self::pane_selections(row > 0, col > 0, row, col, active_cell, sqref);
                xml.push_str("<pane");
                if col > 0 {
                    write!(xml, r#" xSplit="{}""#, col)?;
                }
                if row > 0 {
                    write!(xml, r#" ySplit="{}""#, row)?;
                }
                write!(
                    xml,
                    r#" topLeftCell="{}" activePane="{}" state="{}"/>"#,
                    rowcol_to_cell(top_row, left_col),
                    active_pane,
                    if frozen_split { "frozenSplit" } else { "frozen" }
                )?;
                Ok(selections)
            },
            Panes::Split { y, x, top_left } => {
                let y_split = if y > 0.0 { (20.0 * y + 300.0) as u32 } else { 0 };
                let x_split = if x > 0.0 { calculate_x_split_width(x) } else { 0 };
                let (top_row, left_col) = top_left.unwrap_or_else(|| {
                    (
                        y_split.saturating_sub(300) / 20 / 15,
                        x_split.saturating_sub(390) / 20 / 3 * 4 / 64,
                    )
                });
                let top_left_cell = rowcol_to_cell(top_row, left_col);

                let has_selection = user.is_some();
                let (active_cell, sqref) = if has_selection {
                    (active_cell, sqref)
                } else {
                    (Some(top_left_cell.clone()), Some(top_left_cell.clone()))
                };
                let (active_pane, selections) =
                    Self::pane_selections(y > 0.0, x > 0.0, top_row, left_col, active_cell, sqref);

                xml.push_str("<pane");
                if x_split > 0 {
                    write!(xml, r#" xSplit="{}""#, x_split)?;
                }
                if y_split > 0 {
                    write!(xml, r#" ySplit="{}""#, y_split)?;
                }
                write!(xml, r#" topLeftCell="{}""#, top_left_cell)?;
                if has_selection {
                    write!(xml, r#" activePane="{}""#, active_pane)?;
                }
                xml.push_str("/>");
                Ok(selections)
            },
        }
    }

    /// Write `<sheetViews>`.
    pub fn write_xml(&self, xml: &mut String) -> Result<()> {
        xml.push_str("<sheetViews><sheetView");
        if !self.screen_gridlines {
            xml.push_str(r#" showGridLines="0""#);
        }
        if !self.show_zeros {
            xml.push_str(r#" showZeros="0""#);
        }
        if self.right_to_left {
            xml.push_str(r#" rightToLeft="1""#);
        }
        if self.selected {
            xml.push_str(r#" tabSelected="1""#);
        }
        if self.hide_outline_symbols {
            xml.push_str(r#" showOutlineSymbols="0""#);
        }
        if self.page_view {
            xml.push_str(r#" view="pageLayout""#);
        }
        if self.zoom != 100 {
            if !self.page_view {
                write!(xml, r#" zoomScale="{}""#, self.zoom)?;
            }
            if self.zoom_scale_normal {
                write!(xml, r#" zoomScaleNormal="{}""#, self.zoom)?;
            }
        }
        xml.push_str(r#" workbookViewId="0""#);

        match (&self.panes, &self.selection) {
            (None, None) => xml.push_str("/>"),
            (Some(panes), _) => {
                xml.push('>');
                for s in self.write_pane(xml, panes)? {
                    s.write_xml(xml)?;
                }
                xml.push_str("</sheetView>");
            },
            (None, Some(selection)) => {
                xml.push('>');
                selection.write_xml(xml)?;
                xml.push_str("</sheetView>");
            },
        }
        xml.push_str("</sheetViews>");
        Ok(())
    }
}
