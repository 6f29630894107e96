//! Cell comments and the comments part.
//!
//! Comments are kept sorted by cell. The box geometry is resolved into a
//! pixel anchor at prepare time for the VML drawing that shows them.

use super::drawing::{Anchor, ObjectSizer};
use crate::common::{RGBColor, Result};
use crate::common::xml::{escape_attr, escape_data};
use crate::xlsx::color::Color;
use crate::xlsx::utility::{COL_MAX, ROW_MAX, rowcol_to_cell};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as FmtWrite;

/// Options for [`Worksheet::write_comment`](crate::xlsx::Worksheet::write_comment).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CommentOptions {
    pub author: Option<String>,
    /// Overrides [`Worksheet::show_comments`](crate::xlsx::Worksheet::show_comments).
    pub visible: Option<bool>,
    /// Background color name, palette index or `#RRGGBB`.
    pub color: Option<String>,
    /// Box size in pixels.
    pub width: f64,
    pub height: f64,
    pub x_scale: f64,
    pub y_scale: f64,
    pub start_row: Option<u32>,
    pub start_col: Option<u32>,
    pub x_offset: Option<u32>,
    pub y_offset: Option<u32>,
}

impl Default for CommentOptions {
    fn default() -> Self {
        Self {
            author: None,
            visible: None,
            color: None,
            width: 128.0,
            height: 74.0,
            x_scale: 1.0,
            y_scale: 1.0,
            start_row: None,
            start_col: None,
            x_offset: None,
            y_offset: None,
        }
    }
}

impl CommentOptions {
    pub fn with_author(mut self, author: &str) -> Self {
        self.author = Some(author.to_string());
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = Some(visible);
        self
    }
}

/// A comment attached to a cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub row: u32,
    pub col: u32,
    pub text: String,
    pub author: Option<String>,
    pub visible: Option<bool>,
    pub color: Color,
    /// Box size in pixels, after scaling.
    pub width: u32,
    pub height: u32,
    pub start_row: u32,
    pub start_col: u32,
    pub x_offset: u32,
    pub y_offset: u32,
}

impl Comment {
    /// Resolve options for a comment on `(row, col)`.
    ///
    /// The box sits one column right and one row up from its cell, pulled
    /// back inside the sheet near the last rows and columns.
    pub fn new(row: u32, col: u32, text: &str, options: &CommentOptions) -> Result<Self> {
        let start_row = options.start_row.unwrap_or(match row {
            0 => 0,
            r if r == ROW_MAX - 3 => ROW_MAX - 7,
            r if r == ROW_MAX - 2 => ROW_MAX - 6,
            r if r == ROW_MAX - 1 => ROW_MAX - 5,
            r => r - 1,
        });
        let y_offset = options.y_offset.unwrap_or(match row {
            0 => 2,
            r if r == ROW_MAX - 3 || r == ROW_MAX - 2 => 16,
            r if r == ROW_MAX - 1 => 14,
            _ => 10,
        });
        let start_col = options.start_col.unwrap_or(match col {
            c if c == COL_MAX - 3 => COL_MAX - 6,
            c if c == COL_MAX - 2 => COL_MAX - 5,
            c if c == COL_MAX - 1 => COL_MAX - 4,
            c => c + 1,
        });
        let x_offset = options
            .x_offset
            .unwrap_or(if col + 3 >= COL_MAX { 49 } else { 15 });

        let color = match &options.color {
            Some(c) => Color::parse(c)?,
            None => Color::Rgb(RGBColor::new(0xFF, 0xFF, 0xE1)),
        };

        Ok(Self {
            row,
            col,
            text: text.to_string(),
            author: options.author.clone(),
            visible: options.visible,
            color,
            width: (0.5 + options.width * options.x_scale) as u32,
            height: (0.5 + options.height * options.y_scale) as u32,
            start_row,
            start_col,
            x_offset,
            y_offset,
        })
    }

    /// Pixel anchor of the comment box.
    pub fn anchor(&self, sizer: &ObjectSizer<'_>) -> Anchor {
        sizer.position_pixels(
            self.start_col,
            self.start_row,
            self.x_offset,
            self.y_offset,
            self.width,
            self.height,
            false,
        )
    }
}

/// The comments of one worksheet, ordered by row then column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Comments {
    comments: BTreeMap<(u32, u32), Comment>,
    default_author: String,
    visible: bool,
}

impl Comments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a comment, replacing any earlier one on the same cell.
    pub fn add(&mut self, comment: Comment) {
        self.comments.insert((comment.row, comment.col), comment);
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn has_comment_in_row(&self, row: u32) -> bool {
        self.comments.range((row, 0)..=(row, u32::MAX)).next().is_some()
    }

    /// Columns of the comments in a row.
    pub fn cols_in_row(&self, row: u32) -> impl Iterator<Item = u32> + '_ {
        self.comments
            .range((row, 0)..=(row, u32::MAX))
            .map(|(&(_, col), _)| col)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Comment> {
        self.comments.values()
    }

    pub fn set_default_author(&mut self, author: &str) {
        self.default_author = author.to_string();
    }

    pub fn default_author(&self) -> &str {
        &self.default_author
    }

    /// Make comments visible unless a comment says otherwise.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn is_visible(&self, comment: &Comment) -> bool {
        comment.visible.unwrap_or(self.visible)
    }

    fn author_of<'a>(&'a self, comment: &'a Comment) -> &'a str {
        comment.author.as_deref().unwrap_or(&self.default_author)
    }

    /// The `o:idmap` data id of the VML part: one extra id per 1024 comments.
    pub fn vml_data_id(&self, start: u32) -> String {
        let mut ids = start.to_string();
        for i in 1..=(self.comments.len() / 1024) as u32 {
            let _ = write!(ids, ",{}", start + i);
        }
        ids
    }

    /// Serialize the comments part.
    pub fn to_xml(&self) -> Result<String> {
        let mut authors: Vec<&str> = Vec::new();
        for comment in self.iter() {
            let author = self.author_of(comment);
            if !authors.contains(&author) {
                authors.push(author);
            }
        }

        let mut xml = String::with_capacity(1024);
        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n");
        xml.push_str(
            r#"<comments xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        );

        xml.push_str("<authors>");
        for author in &authors {
            write!(xml, "<author>{}</author>", escape_data(author))?;
        }
        xml.push_str("</authors>");

        xml.push_str("<commentList>");
        for comment in self.iter() {
            let author = self.author_of(comment);
            let author_id = authors.iter().position(|a| *a == author).unwrap_or(0);
            write!(
                xml,
                r#"<comment ref="{}" authorId="{}"><text>"#,
                escape_attr(&rowcol_to_cell(comment.row, comment.col)),
                author_id
            )?;
            if !author.is_empty() {
                xml.push_str("<r>");
                xml.push_str(r#"<rPr><b/><sz val="9"/><color indexed="81"/><rFont val="Tahoma"/><charset val="1"/></rPr>"#);
                write!(xml, "<t>{}:</t>", escape_data(author))?;
                xml.push_str("</r>");
            }
            xml.push_str("<r>");
            xml.push_str(r#"<rPr><sz val="9"/><color indexed="81"/><rFont val="Tahoma"/><charset val="1"/></rPr>"#);
            write!(xml, r#"<t xml:space="preserve">{}</t>"#, escape_data(&comment.text))?;
            xml.push_str("</r>");
            xml.push_str("</text></comment>");
        }
        xml.push_str("</commentList>");
        xml.push_str("</comments>");
        Ok(xml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn comment(row: u32, col: u32, text: &str, options: &CommentOptions) -> Comment {
        Comment::new(row, col, text, options).unwrap()
    }

    #[test]
    fn default_box_position() {
        let c = comment(2, 1, "note", &CommentOptions::default());
        assert_eq!((c.start_row, c.start_col, c.x_offset, c.y_offset), (1, 2, 15, 10));
        assert_eq!((c.width, c.height), (128, 74));

        let c = comment(0, 0, "note", &CommentOptions::default());
        assert_eq!((c.start_row, c.y_offset), (0, 2));

        let c = comment(ROW_MAX - 1, COL_MAX - 1, "note", &CommentOptions::default());
        assert_eq!((c.start_row, c.y_offset), (ROW_MAX - 5, 14));
        assert_eq!((c.start_col, c.x_offset), (COL_MAX - 4, 49));
    }

    #[test]
    fn scaled_box() {
        let options = CommentOptions {
            x_scale: 2.0,
            height: 100.0,
            ..Default::default()
        };
        let c = comment(5, 5, "note", &options);
        assert_eq!((c.width, c.height), (256, 100));
    }

    #[test]
    fn ordered_by_cell_with_last_write_winning() {
        let mut comments = Comments::new();
        let options = CommentOptions::default();
        comments.add(comment(3, 0, "later", &options));
        comments.add(comment(0, 2, "first", &options));
        comments.add(comment(3, 0, "replaced", &options));

        let texts: Vec<_> = comments.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, ["first", "replaced"]);
        assert!(comments.has_comment_in_row(3));
        assert!(!comments.has_comment_in_row(1));
        assert_eq!(comments.cols_in_row(0).collect::<Vec<_>>(), [2]);
    }

    #[test]
    fn visibility_defaults_to_sheet_setting() {
        let mut comments = Comments::new();
        let hidden = comment(0, 0, "a", &CommentOptions::default().with_visible(false));
        let plain = comment(0, 1, "b", &CommentOptions::default());
        comments.set_visible(true);
        assert!(!comments.is_visible(&hidden));
        assert!(comments.is_visible(&plain));
    }

    #[test]
    fn vml_data_ids() {
        let mut comments = Comments::new();
        assert_eq!(comments.vml_data_id(3), "3");
        for row in 0..1024 {
            comments.add(comment(row, 0, "x", &CommentOptions::default()));
        }
        assert_eq!(comments.vml_data_id(3), "3,4");
    }

    #[test]
    fn comments_xml() {
        let mut comments = Comments::new();
        comments.set_default_author("Anon");
        comments.add(comment(0, 0, "Some text", &CommentOptions::default()));
        comments.add(comment(1, 1, "a < b", &CommentOptions::default().with_author("Ann")));

        let xml = comments.to_xml().unwrap();
        assert!(xml.contains("<authors><author>Anon</author><author>Ann</author></authors>"));
        assert!(xml.contains(r#"<comment ref="A1" authorId="0">"#));
        assert!(xml.contains(r#"<comment ref="B2" authorId="1">"#));
        assert!(xml.contains("<t>Ann:</t>"));
        assert!(xml.contains(r#"<t xml:space="preserve">a &lt; b</t>"#));
    }

    #[test]
    fn anonymous_comments_have_no_author_run() {
        let mut comments = Comments::new();
        comments.add(comment(0, 0, "x", &CommentOptions::default()));
        let xml = comments.to_xml().unwrap();
        assert!(xml.contains("<authors><author></author></authors>"));
        assert!(!xml.contains("<b/>"));
    }

    #[test]
    fn options_reject_unknown_keys() {
        let o: CommentOptions = serde_json::from_str(r#"{"author":"Bo","visible":true}"#).unwrap();
        assert_eq!(o.author.as_deref(), Some("Bo"));
        assert_eq!(o.width, 128.0);
        assert!(serde_json::from_str::<CommentOptions>(r#"{"writer":"Bo"}"#).is_err());
    }
}
