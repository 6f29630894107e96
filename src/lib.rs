//! Litchi XlsxWriter - worksheet serialization core for SpreadsheetML (.xlsx)
//!
//! This library builds the worksheet parts of an OOXML spreadsheet package
//! from an in-memory model filled incrementally through a typed API.
//!
//! # Features
//!
//! - **Sparse cell store**: numbers, shared strings, rich strings, formulas,
//!   array formulas, hyperlinks and formatted blanks keyed by `(row, col)`
//! - **Feature registries**: columns, rows, outlines, merged ranges,
//!   autofilters, conditional formats, data validations and tables
//! - **Drawings and comments**: queued charts and images anchored in EMUs,
//!   cell comments and their relationship links
//! - **Deterministic XML**: schema-ordered worksheet, chartsheet, table,
//!   comments, shared strings, `app.xml` and `.rels` parts
//!
//! ZIP packaging, chart XML and VML drawing XML are left to the caller.
//!
//! # Example - Writing a worksheet
//!
//! ```
//! use litchi_xlsxwriter::xlsx::{TableColumn, TableOptions, WorkbookContext, Worksheet};
//!
//! # fn main() -> Result<(), litchi_xlsxwriter::common::Error> {
//! let workbook = WorkbookContext::shared();
//! let mut sheet = Worksheet::new("Sales", 0, workbook.clone());
//!
//! sheet.write(0, 0, "Region", None)?;
//! sheet.write(1, 0, 125, None)?;
//! sheet.write_url(2, 0, "https://example.com/", None, Some("Report"), None)?;
//!
//! let options = TableOptions {
//!     total_row: true,
//!     columns: vec![TableColumn::new("Item"), TableColumn::new("Cost").with_total_function("sum")],
//!     ..Default::default()
//! };
//! sheet.add_table(4, 0, 8, 1, &options)?;
//!
//! let xml = sheet.to_xml()?;
//! assert!(xml.contains(r#"<tableParts count="1"><tablePart r:id="rId2"/></tableParts>"#));
//!
//! let rels = sheet.relationships_xml()?.unwrap_or_default();
//! assert!(rels.contains(r#"Target="../tables/table1.xml""#));
//!
//! let strings = workbook.borrow().shared_strings.to_xml()?;
//! assert!(strings.contains("<t>Region</t>"));
//! # Ok(())
//! # }
//! ```

/// Error type, XML escaping and unit conversion shared by the writers
pub mod common;

/// Worksheet model and SpreadsheetML part writers
pub mod xlsx;
