//! Common types and utilities shared by the writer modules.

pub mod error;
pub mod number;
pub mod style;
pub mod unit;
pub mod xml;

pub use error::{Error, Result};
pub use style::RGBColor;
