//! SpreadsheetML (.xlsx) worksheet model and part writers.
//!
//! - [`utility`]: A1 references, ranges and grid limits
//! - [`date_time`]: date/time strings to serial dates
//! - [`format`] and [`color`]: style handles and the color palette
//! - [`writer`]: the worksheet aggregate and its registries
//!
//! # Example
//!
//! ```
//! use litchi_xlsxwriter::xlsx::{Format, WorkbookContext, Worksheet};
//!
//! let workbook = WorkbookContext::shared();
//! let mut sheet = Worksheet::new("Sheet1", 0, workbook.clone());
//! let bold = Format::new().with_xf_index(1).set_bold();
//!
//! sheet.write(0, 0, "Total", Some(&bold))?;
//! sheet.write(0, 1, "=SUM(B2:B10)", None)?;
//! sheet.activate();
//!
//! let xml = sheet.to_xml()?;
//! assert!(xml.contains(r#"<c r="B1"><f>SUM(B2:B10)</f><v>0</v></c>"#));
//! assert_eq!(workbook.borrow().shared_strings.unique_count(), 1);
//! # Ok::<(), litchi_xlsxwriter::common::Error>(())
//! ```

pub mod color;
pub mod date_time;
pub mod format;
pub mod utility;
pub mod writer;

pub use color::{Color, Palette};
pub use format::{Format, Underline};
pub use utility::CellRange;
pub use writer::*;
