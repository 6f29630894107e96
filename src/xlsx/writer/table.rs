//! Worksheet tables (list objects) and their table parts.

use super::cell::Token;
use crate::common::xml::{escape_attr, escape_data};
use crate::common::{Error, Result};
use crate::xlsx::format::Format;
use crate::xlsx::utility::CellRange;
use serde::{Deserialize, Serialize};
use std::fmt::Write as FmtWrite;
use std::ops::Range;

/// Functions available in a table's total row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalFunction {
    Average,
    CountNums,
    Count,
    Max,
    Min,
    StdDev,
    Sum,
    Var,
}

impl TotalFunction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Average => "average",
            Self::CountNums => "countNums",
            Self::Count => "count",
            Self::Max => "max",
            Self::Min => "min",
            Self::StdDev => "stdDev",
            Self::Sum => "sum",
            Self::Var => "var",
        }
    }

    /// Parse a user spelling such as `"Std Dev"`, `"count_nums"` or `"sum"`.
    pub fn parse(s: &str) -> Option<Self> {
        let name: String = s
            .chars()
            .filter(|c| *c != '_' && !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect();
        match name.as_str() {
            "average" => Some(Self::Average),
            "countnums" => Some(Self::CountNums),
            "count" => Some(Self::Count),
            "max" => Some(Self::Max),
            "min" => Some(Self::Min),
            "stddev" => Some(Self::StdDev),
            "sum" => Some(Self::Sum),
            "var" => Some(Self::Var),
            _ => None,
        }
    }

    /// The `SUBTOTAL` function number that ignores hidden rows.
    pub fn subtotal(&self) -> u32 {
        match self {
            Self::Average => 101,
            Self::CountNums => 102,
            Self::Count => 103,
            Self::Max => 104,
            Self::Min => 105,
            Self::StdDev => 107,
            Self::Sum => 109,
            Self::Var => 110,
        }
    }

    /// The total-row formula for a column.
    pub fn formula(&self, column_name: &str) -> String {
        format!("SUBTOTAL({},[{}])", self.subtotal(), column_name)
    }
}

/// Per-column options of [`TableOptions`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TableColumn {
    pub header: Option<String>,
    /// Calculated-column formula, written to every data row.
    pub formula: Option<String>,
    pub total_function: Option<String>,
    pub total_string: Option<String>,
    #[serde(skip)]
    pub format: Option<Format>,
}

impl TableColumn {
    pub fn new(header: &str) -> Self {
        Self {
            header: Some(header.to_string()),
            ..Default::default()
        }
    }

    pub fn with_formula(mut self, formula: &str) -> Self {
        self.formula = Some(formula.to_string());
        self
    }

    pub fn with_total_function(mut self, function: &str) -> Self {
        self.total_function = Some(function.to_string());
        self
    }

    pub fn with_total_string(mut self, label: &str) -> Self {
        self.total_string = Some(label.to_string());
        self
    }

    pub fn with_format(mut self, format: &Format) -> Self {
        self.format = Some(format.clone());
        self
    }
}

/// Options for [`Worksheet::add_table`](crate::xlsx::Worksheet::add_table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TableOptions {
    pub autofilter: bool,
    pub banded_columns: bool,
    pub banded_rows: bool,
    pub columns: Vec<TableColumn>,
    /// Row-major data written below the header.
    pub data: Vec<Vec<Token>>,
    pub first_column: bool,
    pub header_row: bool,
    pub last_column: bool,
    pub name: Option<String>,
    pub style: Option<String>,
    pub total_row: bool,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            autofilter: true,
            banded_columns: false,
            banded_rows: true,
            columns: Vec::new(),
            data: Vec::new(),
            first_column: false,
            header_row: true,
            last_column: false,
            name: None,
            style: None,
            total_row: false,
        }
    }
}

/// A resolved table column.
#[derive(Debug, Clone, PartialEq)]
pub struct TableColumnDef {
    pub id: u32,
    pub name: String,
    pub formula: Option<String>,
    pub total_function: Option<TotalFunction>,
    pub total_string: Option<String>,
    pub format: Option<Format>,
}

/// A table registered on a worksheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    id: u32,
    name: String,
    style: String,
    range: CellRange,
    autofilter: Option<CellRange>,
    header_row: bool,
    total_row: bool,
    show_first_col: bool,
    show_last_col: bool,
    show_row_stripes: bool,
    show_col_stripes: bool,
    columns: Vec<TableColumnDef>,
}

impl Table {
    /// Resolve options over `range` without assigning an id.
    ///
    /// Every option is checked here so that a failure leaves nothing written.
    pub(crate) fn new(range: CellRange, options: &TableOptions) -> Result<Self> {
        range.check()?;

        let rows_needed = options.header_row as u32 + options.total_row as u32;
        if range.last_row - range.first_row + 1 < rows_needed {
            return Err(Error::Limit(format!(
                "table range {} has no room for its header and total rows",
                range
            )));
        }

        let mut columns = Vec::new();
        for i in 0..=(range.last_col - range.first_col) as usize {
            let id = i as u32 + 1;
            let user = options.columns.get(i);
            let name = user
                .and_then(|u| u.header.as_deref())
                .filter(|h| !h.is_empty())
                .map_or_else(|| format!("Column{}", id), str::to_string);

            let total_function = match user.and_then(|u| u.total_function.as_deref()) {
                Some(f) => Some(
                    TotalFunction::parse(f)
                        .ok_or_else(|| Error::option("add_table", "total_function", f))?,
                ),
                None => None,
            };
            let formula = user.and_then(|u| u.formula.as_deref()).map(|f| {
                f.strip_prefix('=')
                    .unwrap_or(f)
                    .replace('@', "[#This Row],")
            });

            columns.push(TableColumnDef {
                id,
                name,
                formula,
                total_function,
                total_string: user
                    .filter(|_| total_function.is_none())
                    .and_then(|u| u.total_string.clone()),
                format: user.and_then(|u| u.format.clone()),
            });
        }

        let style = options
            .style
            .as_deref()
            .map_or_else(
                || "TableStyleMedium9".to_string(),
                |s| s.chars().filter(|c| !c.is_whitespace()).collect(),
            );

        let mut table = Self {
            id: 0,
            name: String::new(),
            style,
            range,
            autofilter: None,
            header_row: options.header_row,
            total_row: options.total_row,
            show_first_col: options.first_column,
            show_last_col: options.last_column,
            show_row_stripes: options.banded_rows,
            show_col_stripes: options.banded_columns,
            columns,
        };
        if options.autofilter && options.header_row {
            table.autofilter = Some(CellRange::new(
                range.first_row,
                range.first_col,
                range.last_row - options.total_row as u32,
                range.last_col,
            ));
        }
        table.name = options.name.clone().unwrap_or_default();
        Ok(table)
    }

    /// Assign the workbook-wide id, naming the table `Table{id}` if unnamed.
    pub(crate) fn assign_id(&mut self, id: u32) {
        self.id = id;
        if self.name.is_empty() {
            self.name = format!("Table{}", id);
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn style(&self) -> &str {
        &self.style
    }

    pub fn range(&self) -> CellRange {
        self.range
    }

    pub fn columns(&self) -> &[TableColumnDef] {
        &self.columns
    }

    pub fn has_header_row(&self) -> bool {
        self.header_row
    }

    pub fn has_total_row(&self) -> bool {
        self.total_row
    }

    /// Rows between the header and the total row.
    pub fn data_rows(&self) -> Range<u32> {
        let first = self.range.first_row + self.header_row as u32;
        first..self.range.last_row + 1 - self.total_row as u32
    }

    /// Relationship target of the table part.
    pub fn target(&self) -> String {
        format!("../tables/table{}.xml", self.id)
    }

    /// Serialize the table part.
    pub fn to_xml(&self) -> Result<String> {
        let mut xml = String::with_capacity(1024);
        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n");
        write!(
            xml,
            r#"<table xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" id="{}" name="{}" displayName="{}" ref="{}""#,
            self.id,
            escape_attr(&self.name),
            escape_attr(&self.name),
            self.range
        )?;
        if !self.header_row {
            xml.push_str(r#" headerRowCount="0""#);
        }
        if self.total_row {
            xml.push_str(r#" totalsRowCount="1""#);
        } else {
            xml.push_str(r#" totalsRowShown="0""#);
        }
        xml.push('>');

        if let Some(filter) = &self.autofilter {
            write!(xml, r#"<autoFilter ref="{}"/>"#, filter)?;
        }

        write!(xml, r#"<tableColumns count="{}">"#, self.columns.len())?;
        for column in &self.columns {
            write!(
                xml,
                r#"<tableColumn id="{}" name="{}""#,
                column.id,
                escape_attr(&column.name)
            )?;
            if let Some(label) = &column.total_string {
                write!(xml, r#" totalsRowLabel="{}""#, escape_attr(label))?;
            } else if let Some(func) = column.total_function {
                write!(xml, r#" totalsRowFunction="{}""#, func.as_str())?;
            }
            if let Some(dxf) = column.format.as_ref().and_then(Format::dxf_index) {
                write!(xml, r#" dataDxfId="{}""#, dxf)?;
            }
            match &column.formula {
                Some(formula) => write!(
                    xml,
                    "><calculatedColumnFormula>{}</calculatedColumnFormula></tableColumn>",
                    escape_data(formula)
                )?,
                None => xml.push_str("/>"),
            }
        }
        xml.push_str("</tableColumns>");

        write!(
            xml,
            r#"<tableStyleInfo name="{}" showFirstColumn="{}" showLastColumn="{}" showRowStripes="{}" showColumnStripes="{}"/>"#,
            escape_attr(&self.style),
            self.show_first_col as u8,
            self.show_last_col as u8,
            self.show_row_stripes as u8,
            self.show_col_stripes as u8
        )?;
        xml.push_str("</table>");
        Ok(xml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table(range: &str, options: &TableOptions) -> Table {
        let mut t = Table::new(CellRange::parse(range).unwrap(), options).unwrap();
        t.assign_id(1);
        t
    }

    #[test]
    fn total_function_spellings() {
        assert_eq!(TotalFunction::parse("Std Dev"), Some(TotalFunction::StdDev));
        assert_eq!(TotalFunction::parse("count_nums"), Some(TotalFunction::CountNums));
        assert_eq!(TotalFunction::parse("SUM"), Some(TotalFunction::Sum));
        assert_eq!(TotalFunction::parse("median"), None);
        assert_eq!(TotalFunction::Sum.formula("Column1"), "SUBTOTAL(109,[Column1])");
    }

    #[test]
    fn default_table_part() {
        let t = table("C3:F13", &TableOptions::default());
        assert_eq!(t.name(), "Table1");
        assert_eq!(t.data_rows(), 3..13);
        assert_eq!(
            t.to_xml().unwrap(),
            concat!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n",
                r#"<table xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" id="1" name="Table1" displayName="Table1" ref="C3:F13" totalsRowShown="0">"#,
                r#"<autoFilter ref="C3:F13"/><tableColumns count="4">"#,
                r#"<tableColumn id="1" name="Column1"/><tableColumn id="2" name="Column2"/>"#,
                r#"<tableColumn id="3" name="Column3"/><tableColumn id="4" name="Column4"/>"#,
                r#"</tableColumns><tableStyleInfo name="TableStyleMedium9" showFirstColumn="0" showLastColumn="0" showRowStripes="1" showColumnStripes="0"/></table>"#
            )
        );
    }

    #[test]
    fn totals_and_formulas() {
        let options = TableOptions {
            total_row: true,
            style: Some("Table Style Light 11".into()),
            columns: vec![
                TableColumn::new("Product").with_total_string("Totals"),
                TableColumn::new("Q1").with_total_function("sum"),
                TableColumn::new("Year").with_formula("=SUM(Table1[@[Q1]:[Q1]])"),
            ],
            ..Default::default()
        };
        let t = table("B2:D6", &options);
        assert_eq!(t.data_rows(), 2..5);
        assert_eq!(t.style(), "TableStyleLight11");
        assert_eq!(
            t.columns()[2].formula.as_deref(),
            Some("SUM(Table1[[#This Row],[Q1]:[Q1]])")
        );
        let xml = t.to_xml().unwrap();
        assert!(xml.contains(r#"ref="B2:D6" totalsRowCount="1">"#));
        assert!(xml.contains(r#"<autoFilter ref="B2:D5"/>"#));
        assert!(xml.contains(r#"<tableColumn id="1" name="Product" totalsRowLabel="Totals"/>"#));
        assert!(xml.contains(r#"<tableColumn id="2" name="Q1" totalsRowFunction="sum"/>"#));
        assert!(xml.contains(
            "<calculatedColumnFormula>SUM(Table1[[#This Row],[Q1]:[Q1]])</calculatedColumnFormula>"
        ));
    }

    #[test]
    fn no_header_turns_autofilter_off() {
        let options = TableOptions {
            header_row: false,
            name: Some("Sales".into()),
            ..Default::default()
        };
        let t = table("A1:B3", &options);
        assert_eq!(t.data_rows(), 0..3);
        let xml = t.to_xml().unwrap();
        assert!(xml.contains(r#"name="Sales" displayName="Sales" ref="A1:B3" headerRowCount="0" totalsRowShown="0">"#));
        assert!(!xml.contains("<autoFilter"));
    }

    #[test]
    fn invalid_options() {
        let options = TableOptions {
            columns: vec![TableColumn::new("A").with_total_function("median")],
            total_row: true,
            ..Default::default()
        };
        assert!(matches!(
            Table::new(CellRange::parse("A1:A5").unwrap(), &options),
            Err(Error::OptionParameter { param: "total_function", .. })
        ));

        let options = TableOptions {
            total_row: true,
            ..Default::default()
        };
        assert!(Table::new(CellRange::parse("A1:B1").unwrap(), &options).is_err());

        let bad: std::result::Result<TableOptions, _> =
            serde_json::from_str(r#"{"total_row":true,"stripes":true}"#);
        assert!(bad.is_err());
    }
}
