//! Shared strings table for XLSX workbooks.
use crate::common::Result;
use crate::common::xml::escape_data;
use std::collections::HashMap;
use std::fmt::Write as FmtWrite;

/// Mutable shared strings table.
///
/// Excel stores frequently used strings in a shared table to reduce file size.
/// This structure manages the collection of unique strings and their indices.
/// Rich text fragments (already-rendered `<r>` runs) are kept apart from plain
/// text so that a plain string that happens to look like markup is still
/// escaped on output.
#[derive(Debug, Default)]
pub struct SharedStrings {
    /// Unique entries in insertion order, flagged when rich
    strings: Vec<(String, bool)>,
    /// Plain text to index
    plain_index: HashMap<String, u32>,
    /// Rich fragment to index
    rich_index: HashMap<String, u32>,
    /// Total number of references, duplicates included
    total: u32,
}

impl SharedStrings {
    /// Create a new empty shared strings table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a string and return its index.
    ///
    /// If the string already exists, returns the existing index.
    pub fn add_string(&mut self, s: &str) -> u32 {
        self.intern(s, false)
    }

    /// Add a pre-rendered rich text fragment and return its index.
    pub fn add_rich_string(&mut self, fragment: &str) -> u32 {
        self.intern(fragment, true)
    }

    fn intern(&mut self, s: &str, rich: bool) -> u32 {
        self.total += 1;
        let map = if rich {
            &mut self.rich_index
        } else {
            &mut self.plain_index
        };
        if let Some(&index) = map.get(s) {
            return index;
        }
        let index = self.strings.len() as u32;
        map.insert(s.to_string(), index);
        self.strings.push((s.to_string(), rich));
        index
    }

    /// Get the string stored at `index`.
    pub fn get(&self, index: u32) -> Option<&str> {
        self.strings.get(index as usize).map(|(s, _)| s.as_str())
    }

    /// Number of unique strings.
    pub fn unique_count(&self) -> usize {
        self.strings.len()
    }

    /// Number of references handed out.
    pub fn count(&self) -> u32 {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Serialize the shared strings table to XML.
    pub fn to_xml(&self) -> Result<String> {
        let mut xml = String::with_capacity(4096);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        write!(
            xml,
            r#"<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{}" uniqueCount="{}">"#,
            self.total,
            self.strings.len()
        )?;

        for (s, rich) in &self.strings {
            if *rich {
                write!(xml, "<si>{}</si>", s)?;
            } else if needs_preserve(s) {
                write!(xml, r#"<si><t xml:space="preserve">{}</t></si>"#, escape_data(s))?;
            } else {
                write!(xml, "<si><t>{}</t></si>", escape_data(s))?;
            }
        }

        xml.push_str("</sst>");

        Ok(xml)
    }
}

/// Whether text needs `xml:space="preserve"` to keep its outer whitespace.
pub(crate) fn needs_preserve(s: &str) -> bool {
    s.starts_with(char::is_whitespace) || s.ends_with(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_strings() {
        let mut ss = SharedStrings::new();
        let idx1 = ss.add_string("Hello");
        let idx2 = ss.add_string("World");
        let idx3 = ss.add_string("Hello"); // Duplicate

        assert_eq!(idx1, 0);
        assert_eq!(idx2, 1);
        assert_eq!(idx3, 0);
        assert_eq!(ss.unique_count(), 2);
        assert_eq!(ss.count(), 3);
        assert_eq!(ss.get(1), Some("World"));
    }

    #[test]
    fn rich_fragments_are_kept_apart() {
        let mut ss = SharedStrings::new();
        let plain = ss.add_string("<r><t>x</t></r>");
        let rich = ss.add_rich_string("<r><t>x</t></r>");
        assert_ne!(plain, rich);

        let xml = ss.to_xml().unwrap();
        assert!(xml.contains("<si><t>&lt;r&gt;&lt;t&gt;x&lt;/t&gt;&lt;/r&gt;</t></si>"));
        assert!(xml.contains("<si><r><t>x</t></r></si>"));
        assert!(xml.contains(r#"count="2" uniqueCount="2""#));
    }

    #[test]
    fn outer_whitespace_is_preserved() {
        let mut ss = SharedStrings::new();
        ss.add_string(" padded");
        ss.add_string("inner space");
        let xml = ss.to_xml().unwrap();
        assert!(xml.contains(r#"<si><t xml:space="preserve"> padded</t></si>"#));
        assert!(xml.contains("<si><t>inner space</t></si>"));
    }
}
