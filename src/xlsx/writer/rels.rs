//! Relationships from a sheet or drawing part to its targets.
//!
//! Relationship ids are positional: the n-th relationship of a part is
//! `rId{n}`, so every list here is kept in the order ids were assigned.

use crate::common::Result;
use crate::common::xml::escape_attr;
use std::fmt::Write as FmtWrite;

const SCHEMA: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// One relationship, with its type given relative to the office schema,
/// e.g. `/hyperlink`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    rel_type: &'static str,
    target: String,
    external: bool,
}

impl Relationship {
    pub fn new(rel_type: &'static str, target: impl Into<String>) -> Self {
        Self {
            rel_type,
            target: target.into(),
            external: false,
        }
    }

    pub fn external(rel_type: &'static str, target: impl Into<String>) -> Self {
        Self {
            external: true,
            ..Self::new(rel_type, target)
        }
    }

    #[inline]
    pub fn rel_type(&self) -> &'static str {
        self.rel_type
    }

    /// Full relationship type URI.
    pub fn type_uri(&self) -> String {
        format!("{}{}", SCHEMA, self.rel_type)
    }

    #[inline]
    pub fn target(&self) -> &str {
        &self.target
    }

    #[inline]
    pub fn is_external(&self) -> bool {
        self.external
    }
}

/// Serialize a `.rels` part, numbering relationships from `rId1`.
pub fn relationships_xml(rels: &[Relationship]) -> Result<String> {
    let mut xml = String::with_capacity(256 + rels.len() * 160);
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n");
    xml.push_str(
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for (i, rel) in rels.iter().enumerate() {
        write!(
            xml,
            r#"<Relationship Id="rId{}" Type="{}" Target="{}""#,
            i + 1,
            rel.type_uri(),
            escape_attr(rel.target())
        )?;
        if rel.is_external() {
            xml.push_str(r#" TargetMode="External""#);
        }
        xml.push_str("/>");
    }
    xml.push_str("</Relationships>");
    Ok(xml)
}
