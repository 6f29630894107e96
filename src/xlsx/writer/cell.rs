//! Cell records stored in the worksheet grid.
//!
//! Each occupied coordinate holds one [`Cell`]: a [`CellData`] variant plus
//! an optional format. Rendering is centralized here so that the `<c>`
//! element layout for every kind lives in one exhaustive match.

use crate::common::Result;
use crate::common::number::{is_numeric, write_num};
use crate::common::xml::escape_data;
use crate::xlsx::format::Format;
use crate::xlsx::utility::{CellRange, rowcol_to_cell};
use serde::{Deserialize, Serialize};
use std::fmt::Write as FmtWrite;

/// A cached formula result supplied by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaResult {
    Number(f64),
    Text(String),
}

impl FormulaResult {
    /// Whether the result is written without a `t="str"` type.
    fn is_numeric(&self) -> bool {
        match self {
            Self::Number(_) => true,
            Self::Text(s) => is_numeric(s),
        }
    }

    fn write_value(&self, xml: &mut String) {
        match self {
            Self::Number(n) => write_num(xml, *n),
            Self::Text(s) => xml.push_str(&escape_data(s)),
        }
    }
}

impl From<f64> for FormulaResult {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for FormulaResult {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FormulaResult {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// Where a hyperlink cell points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    /// A URL or file target, stored as a package relationship.
    External,
    /// A location inside the workbook.
    Internal,
}

/// Hyperlink details carried by a hyperlink cell.
#[derive(Debug, Clone, PartialEq)]
pub struct HyperlinkData {
    pub kind: LinkKind,
    /// Relationship target (external) or location (internal).
    pub url: String,
    /// Location inside an external file, or display text of an internal link.
    pub location: Option<String>,
    pub tooltip: Option<String>,
}

/// Value of an occupied cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellData {
    Number(f64),
    /// Index into the shared string table.
    String(u32),
    Formula {
        formula: String,
        result: Option<FormulaResult>,
    },
    ArrayFormula {
        formula: String,
        range: CellRange,
        result: Option<FormulaResult>,
    },
    Hyperlink {
        /// Shared string index of the displayed text.
        index: u32,
        link: HyperlinkData,
    },
    Blank,
}

/// A literal value extracted from the grid for chart caches.
#[derive(Debug, Clone, PartialEq)]
pub enum RangeValue {
    Number(f64),
    SharedString(u32),
    Text(String),
}

/// A cell record: data plus its own format, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub data: CellData,
    pub format: Option<Format>,
}

impl Cell {
    pub fn new(data: CellData, format: Option<&Format>) -> Self {
        Self {
            data,
            format: format.cloned(),
        }
    }

    /// Own style index, 0 when unformatted.
    pub fn xf_index(&self) -> u32 {
        self.format.as_ref().map_or(0, Format::xf_index)
    }

    /// The literal value a chart would cache for this cell.
    pub fn range_value(&self) -> RangeValue {
        match &self.data {
            CellData::Number(n) => RangeValue::Number(*n),
            CellData::String(index) | CellData::Hyperlink { index, .. } => {
                RangeValue::SharedString(*index)
            },
            CellData::Formula { result, .. } | CellData::ArrayFormula { result, .. } => {
                match result {
                    Some(FormulaResult::Number(n)) => RangeValue::Number(*n),
                    Some(FormulaResult::Text(s)) => RangeValue::Text(s.clone()),
                    None => RangeValue::Number(0.0),
                }
            },
            CellData::Blank => RangeValue::Text(String::new()),
        }
    }

    /// Write the `<c>` element.
    ///
    /// `xf` is the resolved style index: the cell's own, else the row's, else
    /// the column's.
    pub fn render(&self, xml: &mut String, row: u32, col: u32, xf: u32) -> Result<()> {
        write!(xml, r#"<c r="{}""#, rowcol_to_cell(row, col))?;
        if xf != 0 {
            write!(xml, r#" s="{}""#, xf)?;
        }

        match &self.data {
            CellData::Number(n) => {
                xml.push_str("><v>");
                write_num(xml, *n);
                xml.push_str("</v></c>");
            },
            CellData::String(index) | CellData::Hyperlink { index, .. } => {
                write!(xml, r#" t="s"><v>{}</v></c>"#, index)?;
            },
            CellData::Formula { formula, result } => {
                if result.as_ref().is_some_and(|r| !r.is_numeric()) {
                    xml.push_str(r#" t="str""#);
                }
                write!(xml, "><f>{}</f><v>", escape_data(formula))?;
                match result {
                    Some(r) => r.write_value(xml),
                    None => xml.push('0'),
                }
                xml.push_str("</v></c>");
            },
            CellData::ArrayFormula {
                formula,
                range,
                result,
            } => {
                write!(
                    xml,
                    r#"><f t="array" ref="{}">{}</f><v>"#,
                    range.to_sqref(),
                    escape_data(formula)
                )?;
                if let Some(r) = result {
                    r.write_value(xml);
                }
                xml.push_str("</v></c>");
            },
            CellData::Blank => xml.push_str("/>"),
        }
        Ok(())
    }
}

/// A value accepted by the generic `write` dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Token {
    Number(f64),
    Text(String),
    /// A nested list, written down a column by `write_row`.
    List(Vec<Token>),
}

impl From<f64> for Token {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Token {
    fn from(n: i32) -> Self {
        Self::Number(n as f64)
    }
}

impl From<i64> for Token {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<u32> for Token {
    fn from(n: u32) -> Self {
        Self::Number(n as f64)
    }
}

impl From<&str> for Token {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Token {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl<T: Into<Token>> From<Vec<T>> for Token {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn render(data: CellData, xf: u32) -> String {
        let mut xml = String::new();
        Cell::new(data, None).render(&mut xml, 0, 0, xf).unwrap();
        xml
    }

    #[test]
    fn number_cells() {
        assert_eq!(render(CellData::Number(123456.0), 0), r#"<c r="A1"><v>123456</v></c>"#);
        assert_eq!(render(CellData::Number(1.5), 3), r#"<c r="A1" s="3"><v>1.5</v></c>"#);
    }

    #[test]
    fn string_and_blank_cells() {
        assert_eq!(render(CellData::String(4), 0), r#"<c r="A1" t="s"><v>4</v></c>"#);
        assert_eq!(render(CellData::Blank, 2), r#"<c r="A1" s="2"/>"#);
    }

    #[test]
    fn formula_cells() {
        let plain = CellData::Formula {
            formula: "A2+1".into(),
            result: None,
        };
        assert_eq!(render(plain, 0), r#"<c r="A1"><f>A2+1</f><v>0</v></c>"#);

        let text = CellData::Formula {
            formula: "\"a\"&\"b\"".into(),
            result: Some("ab".into()),
        };
        assert_eq!(
            render(text, 0),
            r#"<c r="A1" t="str"><f>"a"&amp;"b"</f><v>ab</v></c>"#
        );

        let numeric_text = CellData::Formula {
            formula: "1+2".into(),
            result: Some("3".into()),
        };
        assert_eq!(render(numeric_text, 0), r#"<c r="A1"><f>1+2</f><v>3</v></c>"#);
    }

    #[test]
    fn array_formula_cells() {
        let data = CellData::ArrayFormula {
            formula: "SUM(B1:C1*B2:C2)".into(),
            range: CellRange::cell(0, 0),
            result: None,
        };
        assert_eq!(
            render(data, 0),
            r#"<c r="A1"><f t="array" ref="A1">SUM(B1:C1*B2:C2)</f><v></v></c>"#
        );

        let with_result = CellData::ArrayFormula {
            formula: "SUM(B1:C1*B2:C2)".into(),
            range: CellRange::new(0, 0, 1, 0),
            result: Some("7".into()),
        };
        assert_eq!(
            render(with_result, 0),
            r#"<c r="A1"><f t="array" ref="A1:A2">SUM(B1:C1*B2:C2)</f><v>7</v></c>"#
        );
    }

    #[test]
    fn range_values() {
        let formula = Cell::new(
            CellData::Formula {
                formula: "A1".into(),
                result: None,
            },
            None,
        );
        assert_eq!(formula.range_value(), RangeValue::Number(0.0));
        assert_eq!(
            Cell::new(CellData::String(7), None).range_value(),
            RangeValue::SharedString(7)
        );
        assert_eq!(
            Cell::new(CellData::Blank, None).range_value(),
            RangeValue::Text(String::new())
        );
    }

    #[test]
    fn token_conversions() {
        assert_eq!(Token::from(3), Token::Number(3.0));
        assert_eq!(Token::from("x"), Token::Text("x".into()));
        assert_eq!(
            Token::from(vec![1, 2]),
            Token::List(vec![Token::Number(1.0), Token::Number(2.0)])
        );
    }
}
