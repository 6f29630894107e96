//! Mutable worksheet writer components.
//!
//! [`Worksheet`] is the aggregate; every other module here is a registry or
//! part serializer it owns or hands to the packaging stage.

pub mod app;
pub mod cell;
pub mod chart;
pub mod chartsheet;
pub mod comments;
pub mod conditional;
pub mod drawing;
pub mod filter;
pub mod grid;
pub mod options;
pub mod page;
pub mod protection;
pub mod rels;
pub mod sheet;
pub mod strings;
pub mod table;
pub mod validation;
pub mod view;
pub mod workbook;

// Re-export main types
pub use app::AppProperties;
pub use cell::{CellData, FormulaResult, RangeValue, Token};
pub use chart::{
    BlanksAs, Chart, ChartArea, ChartAxis, ChartLegend, ChartRef, ChartSeries, ChartTitle,
    ChartType,
};
pub use chartsheet::Chartsheet;
pub use comments::CommentOptions;
pub use conditional::ConditionalFormat;
pub use drawing::{Image, Placement};
pub use options::OptionValue;
pub use page::PageSetup;
pub use protection::ProtectionOptions;
pub use rels::Relationship;
pub use sheet::{MergeValue, OutlineOptions, Worksheet};
pub use strings::SharedStrings;
pub use table::{TableColumn, TableOptions, TotalFunction};
pub use validation::{DataValidation, ErrorStyle, ValidationValue};
pub use view::PaneType;
pub use workbook::{WorkbookContext, WorkbookRef};
