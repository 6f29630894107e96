//! Error types shared by every writer module.

pub mod types;

pub use types::{Error, Result};
