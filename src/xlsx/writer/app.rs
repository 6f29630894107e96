//! Extended application properties part (`docProps/app.xml`).

use crate::common::Result;
use crate::common::xml::escape_data;
use std::fmt::Write as FmtWrite;

/// Builder for `docProps/app.xml`.
///
/// # Examples
///
/// ```
/// use litchi_xlsxwriter::xlsx::AppProperties;
///
/// let mut app = AppProperties::new();
/// app.add_heading_pair("Worksheets", 1);
/// app.add_part_name("Sheet1");
/// let xml = app.to_xml()?;
/// assert!(xml.contains("<vt:lpstr>Sheet1</vt:lpstr>"));
/// # Ok::<(), litchi_xlsxwriter::common::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppProperties {
    part_names: Vec<String>,
    heading_pairs: Vec<(String, usize)>,
    manager: Option<String>,
    company: Option<String>,
}

impl AppProperties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a title such as a sheet name or a defined print area.
    pub fn add_part_name(&mut self, name: &str) {
        self.part_names.push(name.to_string());
    }

    /// Add a heading (e.g. `Worksheets`) counting the titles that follow it.
    /// Headings with a zero count are skipped.
    pub fn add_heading_pair(&mut self, heading: &str, count: usize) {
        if count > 0 {
            self.heading_pairs.push((heading.to_string(), count));
        }
    }

    pub fn set_manager(&mut self, manager: &str) {
        self.manager = Some(manager.to_string());
    }

    pub fn set_company(&mut self, company: &str) {
        self.company = Some(company.to_string());
    }

    pub fn to_xml(&self) -> Result<String> {
        let mut xml = String::with_capacity(1024);
        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n");
        xml.push_str(concat!(
            r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" "#,
            r#"xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">"#
        ));
        xml.push_str("<Application>Microsoft Excel</Application>");
        xml.push_str("<DocSecurity>0</DocSecurity>");
        xml.push_str("<ScaleCrop>false</ScaleCrop>");

        write!(
            xml,
            r#"<HeadingPairs><vt:vector size="{}" baseType="variant">"#,
            self.heading_pairs.len() * 2
        )?;
        for (heading, count) in &self.heading_pairs {
            write!(
                xml,
                "<vt:variant><vt:lpstr>{}</vt:lpstr></vt:variant><vt:variant><vt:i4>{}</vt:i4></vt:variant>",
                escape_data(heading),
                count
            )?;
        }
        xml.push_str("</vt:vector></HeadingPairs>");

        write!(
            xml,
            r#"<TitlesOfParts><vt:vector size="{}" baseType="lpstr">"#,
            self.part_names.len()
        )?;
        for name in &self.part_names {
            write!(xml, "<vt:lpstr>{}</vt:lpstr>", escape_data(name))?;
        }
        xml.push_str("</vt:vector></TitlesOfParts>");

        if let Some(manager) = &self.manager {
            write!(xml, "<Manager>{}</Manager>", escape_data(manager))?;
        }
        write!(
            xml,
            "<Company>{}</Company>",
            escape_data(self.company.as_deref().unwrap_or_default())
        )?;
        xml.push_str("<LinksUpToDate>false</LinksUpToDate>");
        xml.push_str("<SharedDoc>false</SharedDoc>");
        xml.push_str("<HyperlinksChanged>false</HyperlinksChanged>");
        xml.push_str("<AppVersion>12.0000</AppVersion>");
        xml.push_str("</Properties>\n");
        Ok(xml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn two_sheets_and_a_print_area() {
        let mut app = AppProperties::new();
        app.add_heading_pair("Worksheets", 2);
        app.add_heading_pair("Named Ranges", 1);
        app.add_heading_pair("Charts", 0);
        app.add_part_name("Sheet1");
        app.add_part_name("Sheet2");
        app.add_part_name("Sheet1!Print_Area");
        let xml = app.to_xml().unwrap();

        assert!(xml.contains(concat!(
            r#"<HeadingPairs><vt:vector size="4" baseType="variant">"#,
            "<vt:variant><vt:lpstr>Worksheets</vt:lpstr></vt:variant><vt:variant><vt:i4>2</vt:i4></vt:variant>",
            "<vt:variant><vt:lpstr>Named Ranges</vt:lpstr></vt:variant><vt:variant><vt:i4>1</vt:i4></vt:variant>",
            "</vt:vector></HeadingPairs>"
        )));
        assert!(xml.contains(r#"<TitlesOfParts><vt:vector size="3" baseType="lpstr">"#));
        assert!(!xml.contains("Charts"));
    }

    #[test]
    fn manager_precedes_company() {
        let mut app = AppProperties::new();
        app.set_manager("Dr. Heinz Doofenshmirtz");
        app.set_company("Rubber & Co");
        let xml = app.to_xml().unwrap();
        let manager = xml.find("<Manager>").unwrap();
        let company = xml.find("<Company>Rubber &amp; Co</Company>").unwrap();
        assert!(manager < company);
        assert!(xml.ends_with("<AppVersion>12.0000</AppVersion></Properties>\n"));
    }

    #[test]
    fn empty_company_is_written() {
        let xml = AppProperties::new().to_xml().unwrap();
        assert!(xml.contains("<Company></Company>"));
        assert!(!xml.contains("<Manager>"));
        assert_eq!(xml.matches("baseType").count(), 2);
    }
}
