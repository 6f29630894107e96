//! XML text helpers used by the string-building serializers.

pub mod escape;

pub use escape::{escape_attr, escape_data};
