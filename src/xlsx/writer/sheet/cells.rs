//! Cell value writes.

use super::Worksheet;
use crate::common::xml::escape_data;
use crate::common::{Error, Result};
use crate::xlsx::date_time::{convert_date_time, datetime_to_serial};
use crate::xlsx::format::{Format, write_run_properties};
use crate::xlsx::utility::{CellRange, STR_MAX, check_dimensions};
use crate::xlsx::writer::cell::{Cell, CellData, FormulaResult, HyperlinkData, LinkKind, Token};
use crate::xlsx::writer::comments::{Comment, CommentOptions};
use crate::xlsx::writer::strings::needs_preserve;
use chrono::NaiveDateTime;

/// Most hyperlinks a worksheet may hold.
pub(crate) const MAX_HYPERLINKS: u32 = 65_530;

/// Longest URL accepted, in bytes.
pub(crate) const MAX_URL_LEN: usize = 255;

pub(crate) const URL_PREFIXES: [&str; 7] = [
    "http://",
    "https://",
    "ftp://",
    "ftps://",
    "mailto:",
    "internal:",
    "external:",
];

fn truncate(s: &str) -> &str {
    match s.char_indices().nth(STR_MAX) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

/// Resolve a URL into its hyperlink record and display text.
///
/// `internal:` links point inside the workbook and `external:` links to a
/// local or network file; anything else is a web or mail link.
pub(crate) fn resolve_url(url: &str, text: Option<&str>, tooltip: Option<&str>) -> Result<(HyperlinkData, String)> {
    let (kind, url, is_file) = if let Some(rest) = url.strip_prefix("internal:") {
        (LinkKind::Internal, rest.to_string(), false)
    } else if let Some(rest) = url.strip_prefix("external:") {
        (LinkKind::External, rest.replace('/', "\\"), true)
    } else {
        (LinkKind::External, url.to_string(), false)
    };

    let mut display = match text {
        Some(t) if is_file => t.replace('/', "\\"),
        Some(t) => t.to_string(),
        None => url.clone(),
    };
    if let Some(rest) = display.strip_prefix("mailto:") {
        display = rest.to_string();
    }

    let (url, location) = match kind {
        LinkKind::Internal => (url, Some(display.clone())),
        LinkKind::External if is_file => {
            let mut parts = url.split('#');
            let mut target = parts.next().unwrap_or_default().to_string();
            let location = parts.next().map(str::to_string);
            if target.contains(':') || target.starts_with("\\\\") {
                target = format!("file:///{}", target);
            }
            // A leading relative `.\` style component.
            if target.chars().nth(1) == Some('\\') {
                target = target.chars().skip(2).collect();
            }
            (target, location)
        },
        LinkKind::External => {
            let escaped = url
                .chars()
                .map(|c| {
                    if c.is_whitespace() || c == '\0' {
                        "%20".to_string()
                    } else {
                        c.to_string()
                    }
                })
                .collect();
            (escaped, None)
        },
    };

    if url.len() > MAX_URL_LEN {
        return Err(Error::Limit(format!(
            "URL '{}' > 255 characters, it exceeds Excel's limit for URLS",
            url
        )));
    }

    Ok((
        HyperlinkData {
            kind,
            url,
            location,
            tooltip: tooltip.map(str::to_string),
        },
        display,
    ))
}

/// Split a formula into literal text and cell references.
fn tokenize_formula(formula: &str) -> Vec<String> {
    fn row_end(b: &[u8], mut k: usize) -> Option<usize> {
        if b.get(k) == Some(&b'$') {
            k += 1;
        }
        let start = k;
        while b.get(k).is_some_and(u8::is_ascii_digit) {
            k += 1;
        }
        (k > start).then_some(k)
    }

    fn reference_end(b: &[u8], i: usize) -> Option<usize> {
        let j = if b.get(i) == Some(&b'$') { i + 1 } else { i };
        let upper = |k: usize| b.get(k).is_some_and(u8::is_ascii_uppercase);
        if b.get(j).is_some_and(|c| (b'A'..=b'I').contains(c)) && upper(j + 1) {
            if let Some(end) = row_end(b, j + 2) {
                return Some(end);
            }
        }
        if upper(j) {
            return row_end(b, j + 1);
        }
        None
    }

    let bytes = formula.as_bytes();
    let mut tokens = Vec::new();
    let mut literal_start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match reference_end(bytes, i) {
            Some(end) => {
                if literal_start < i {
                    tokens.push(formula[literal_start..i].to_string());
                }
                tokens.push(formula[i..end].to_string());
                i = end;
                literal_start = end;
            },
            None => i += 1,
        }
    }
    if literal_start < bytes.len() {
        tokens.push(formula[literal_start..].to_string());
    }
    tokens
}

impl Worksheet {
    fn store(&mut self, row: u32, col: u32, data: CellData, format: Option<&Format>) -> Result<()> {
        self.grid.write(row, col, Cell::new(data, format))
    }

    fn intern(&self, s: &str) -> u32 {
        self.workbook.borrow_mut().shared_strings.add_string(s)
    }

    // ===== Generic writes =====

    /// Write a value, choosing the cell kind from the token.
    ///
    /// Numbers and digit-only strings become numbers; strings starting with
    /// a URL scheme, `internal:` or `external:` become hyperlinks; `=...`
    /// becomes a formula and `{=...}` an array formula; an empty string is a
    /// blank; anything else is a string. A list is written along the row.
    pub fn write(&mut self, row: u32, col: u32, token: impl Into<Token>, format: Option<&Format>) -> Result<()> {
        self.write_token(row, col, &token.into(), format)
    }

    pub(crate) fn write_token(&mut self, row: u32, col: u32, token: &Token, format: Option<&Format>) -> Result<()> {
        match token {
            Token::Number(n) => self.write_number(row, col, *n, format),
            Token::List(items) => self.write_row(row, col, items, format),
            Token::Text(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
                let n = fast_float2::parse::<f64, _>(s)
                    .map_err(|_| Error::InvalidReference(s.clone()))?;
                self.write_number(row, col, n, format)
            },
            Token::Text(s) if URL_PREFIXES.iter().any(|p| s.starts_with(p)) => {
                self.write_url(row, col, s, format, None, None)
            },
            Token::Text(s) if s.starts_with('=') || (s.starts_with("{=") && s.ends_with('}')) => {
                self.write_formula(row, col, s, format, None)
            },
            Token::Text(s) if s.is_empty() => self.write_blank(row, col, format),
            Token::Text(s) => self.write_string(row, col, s, format),
        }
    }

    /// Write tokens along a row starting at `(row, col)`. A nested list is
    /// written down a column.
    pub fn write_row(&mut self, row: u32, col: u32, tokens: &[Token], format: Option<&Format>) -> Result<()> {
        for (i, token) in tokens.iter().enumerate() {
            let col = col + i as u32;
            match token {
                Token::List(items) => self.write_col(row, col, items, format)?,
                _ => self.write_token(row, col, token, format)?,
            }
        }
        Ok(())
    }

    /// Write tokens down a column starting at `(row, col)`. A nested list is
    /// written along a row.
    pub fn write_col(&mut self, row: u32, col: u32, tokens: &[Token], format: Option<&Format>) -> Result<()> {
        for (i, token) in tokens.iter().enumerate() {
            self.write_token(row + i as u32, col, token, format)?;
        }
        Ok(())
    }

    // ===== Typed writes =====

    pub fn write_number(&mut self, row: u32, col: u32, number: f64, format: Option<&Format>) -> Result<()> {
        self.store(row, col, CellData::Number(number), format)
    }

    /// Write a string, truncated to 32,767 characters.
    pub fn write_string(&mut self, row: u32, col: u32, s: &str, format: Option<&Format>) -> Result<()> {
        check_dimensions(row, col)?;
        let index = self.intern(truncate(s));
        self.store(row, col, CellData::String(index), format)
    }

    /// Write a string made of differently formatted runs.
    ///
    /// Runs without a format use the default font, except a leading one,
    /// which inherits the cell format.
    ///
    /// # Examples
    ///
    /// ```
    /// use litchi_xlsxwriter::xlsx::{Format, Worksheet, WorkbookContext};
    ///
    /// let mut sheet = Worksheet::new("Sheet1", 0, WorkbookContext::shared());
    /// let bold = Format::new().set_bold();
    /// sheet.write_rich_string(0, 0, &[(None, "This is "), (Some(&bold), "bold")], None)?;
    /// # Ok::<(), litchi_xlsxwriter::common::Error>(())
    /// ```
    pub fn write_rich_string(
        &mut self,
        row: u32,
        col: u32,
        fragments: &[(Option<&Format>, &str)],
        format: Option<&Format>,
    ) -> Result<()> {
        if fragments.is_empty() {
            return Err(Error::InsufficientArgument(
                "write_rich_string requires at least one fragment".into(),
            ));
        }
        check_dimensions(row, col)?;
        let length: usize = fragments.iter().map(|(_, s)| s.chars().count()).sum();
        if length > STR_MAX {
            return Err(Error::Limit(format!(
                "rich string of {} characters exceeds Excel's limit of {}",
                length, STR_MAX
            )));
        }

        let default = Format::default();
        let mut xml = String::with_capacity(length + fragments.len() * 128);
        {
            let workbook = self.workbook.borrow();
            for (i, (run_format, text)) in fragments.iter().enumerate() {
                xml.push_str("<r>");
                match run_format {
                    Some(f) => write_run_properties(&mut xml, f, workbook.palette())?,
                    None if i > 0 => write_run_properties(&mut xml, &default, workbook.palette())?,
                    None => {},
                }
                if needs_preserve(text) {
                    xml.push_str(r#"<t xml:space="preserve">"#);
                } else {
                    xml.push_str("<t>");
                }
                xml.push_str(&escape_data(text));
                xml.push_str("</t></r>");
            }
        }

        let index = self
            .workbook
            .borrow_mut()
            .shared_strings
            .add_rich_string(&xml);
        self.store(row, col, CellData::String(index), format)
    }

    /// Write a formatted blank cell. Without a format nothing is written.
    pub fn write_blank(&mut self, row: u32, col: u32, format: Option<&Format>) -> Result<()> {
        match format {
            Some(_) => self.store(row, col, CellData::Blank, format),
            None => Ok(()),
        }
    }

    /// Write a formula, with an optional cached result.
    ///
    /// A leading `=` is dropped. A formula in braces, `{=...}`, is written as
    /// a single-cell array formula.
    pub fn write_formula(
        &mut self,
        row: u32,
        col: u32,
        formula: &str,
        format: Option<&Format>,
        result: Option<FormulaResult>,
    ) -> Result<()> {
        if formula.starts_with("{=") && formula.ends_with('}') {
            return self.write_array_formula(row, col, row, col, formula, format, result);
        }
        let formula = formula.strip_prefix('=').unwrap_or(formula);
        self.store(
            row,
            col,
            CellData::Formula {
                formula: formula.to_string(),
                result,
            },
            format,
        )
    }

    /// Write an array formula over a range.
    ///
    /// The formula lives in the first cell; the other cells of the range
    /// hold formatted zeros.
    #[allow(clippy::too_many_arguments)]
    pub fn write_array_formula(
        &mut self,
        first_row: u32,
        first_col: u32,
        last_row: u32,
        last_col: u32,
        formula: &str,
        format: Option<&Format>,
        result: Option<FormulaResult>,
    ) -> Result<()> {
        let range = CellRange::new(first_row, first_col, last_row, last_col);
        range.check()?;

        let formula = formula
            .strip_prefix('{')
            .and_then(|f| f.strip_suffix('}'))
            .unwrap_or(formula);
        let formula = formula.strip_prefix('=').unwrap_or(formula);

        self.store(
            range.first_row,
            range.first_col,
            CellData::ArrayFormula {
                formula: formula.to_string(),
                range,
                result,
            },
            format,
        )?;
        for (row, col) in range.cells().skip(1) {
            self.write_number(row, col, 0.0, format)?;
        }
        Ok(())
    }

    /// Write a hyperlink.
    ///
    /// # Arguments
    /// * `url` - `http://`, `https://`, `ftp://`, `mailto:`, `internal:` or
    ///   `external:` target
    /// * `text` - Displayed text; defaults to the URL
    /// * `tooltip` - Text shown when hovering the link
    ///
    /// # Errors
    ///
    /// [`Error::Limit`] when the URL exceeds 255 bytes or the sheet already
    /// holds 65,530 hyperlinks.
    pub fn write_url(
        &mut self,
        row: u32,
        col: u32,
        url: &str,
        format: Option<&Format>,
        text: Option<&str>,
        tooltip: Option<&str>,
    ) -> Result<()> {
        check_dimensions(row, col)?;
        let (link, display) = resolve_url(url, text, tooltip)?;
        if self.hyperlink_count + 1 > MAX_HYPERLINKS {
            return Err(Error::Limit(format!(
                "URL '{}' added but number of URLS is over Excel's limit of 65,530 URLS per worksheet",
                link.url
            )));
        }

        let index = self.intern(truncate(&display));
        self.hyperlink_count += 1;
        self.store(row, col, CellData::Hyperlink { index, link }, format)
    }

    /// Write an ISO 8601 date/time string such as `2008-07-24T10:30:00` as a
    /// serial date. A string that does not convert is written as text.
    pub fn write_date_time(&mut self, row: u32, col: u32, date_time: &str, format: Option<&Format>) -> Result<()> {
        check_dimensions(row, col)?;
        let date_1904 = self.workbook.borrow().date_1904;
        match convert_date_time(date_time, date_1904) {
            Some(serial) => self.write_number(row, col, serial, format),
            None => self.write_string(row, col, date_time, format),
        }
    }

    /// Write a date/time as a serial date.
    pub fn write_date(&mut self, row: u32, col: u32, date_time: &NaiveDateTime, format: Option<&Format>) -> Result<()> {
        let date_1904 = self.workbook.borrow().date_1904;
        let serial = datetime_to_serial(date_time, date_1904)
            .ok_or_else(|| Error::InvalidDateTime(date_time.to_string()))?;
        self.write_number(row, col, serial, format)
    }

    /// Attach a comment to a cell.
    pub fn write_comment(&mut self, row: u32, col: u32, text: &str, options: &CommentOptions) -> Result<()> {
        check_dimensions(row, col)?;
        let comment = Comment::new(row, col, text, options)?;
        self.grid.dimensions_mut().update(row, col);
        self.comments.add(comment);
        Ok(())
    }

    // ===== Repeated formulas =====

    /// Split a formula into literal text and cell references, so that
    /// [`repeat_formula`](Self::repeat_formula) can substitute the references.
    ///
    /// # Examples
    ///
    /// ```
    /// use litchi_xlsxwriter::xlsx::Worksheet;
    /// assert_eq!(Worksheet::store_formula("=A1 * 3 + 50"), ["=", "A1", " * 3 + 50"]);
    /// ```
    pub fn store_formula(formula: &str) -> Vec<String> {
        tokenize_formula(formula)
    }

    /// Write a formula built from tokens of [`store_formula`](Self::store_formula), replacing the
    /// first occurrence of each pattern in the first token that holds it.
    ///
    /// # Examples
    ///
    /// ```
    /// use litchi_xlsxwriter::xlsx::{Worksheet, WorkbookContext};
    ///
    /// let mut sheet = Worksheet::new("Sheet1", 0, WorkbookContext::shared());
    /// let tokens = Worksheet::store_formula("=A1 * 3 + 50");
    /// for row in 0..3 {
    ///     let cell = format!("A{}", row + 1);
    ///     sheet.repeat_formula(row, 1, &tokens, None, &[("A1", cell.as_str())], None)?;
    /// }
    /// # Ok::<(), litchi_xlsxwriter::common::Error>(())
    /// ```
    pub fn repeat_formula(
        &mut self,
        row: u32,
        col: u32,
        tokens: &[String],
        format: Option<&Format>,
        pairs: &[(&str, &str)],
        result: Option<FormulaResult>,
    ) -> Result<()> {
        if tokens.is_empty() {
            return Err(Error::InsufficientArgument("No tokens in formula".into()));
        }
        let mut tokens = tokens.to_vec();
        for (pattern, replacement) in pairs {
            if let Some(token) = tokens.iter_mut().find(|t| t.contains(pattern)) {
                *token = token.replacen(pattern, replacement, 1);
            }
        }
        self.write_formula(row, col, &tokens.concat(), format, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xlsx::writer::workbook::WorkbookContext;
    use pretty_assertions::assert_eq;

    fn sheet() -> Worksheet {
        Worksheet::new("Sheet1", 0, WorkbookContext::shared())
    }

    fn data(ws: &Worksheet, row: u32, col: u32) -> &CellData {
        &ws.grid.get(row, col).unwrap().data
    }

    #[test]
    fn write_dispatch() {
        let mut ws = sheet();
        ws.write(0, 0, 1.5, None).unwrap();
        ws.write(0, 1, "42", None).unwrap();
        ws.write(0, 2, "https://example.com", None).unwrap();
        ws.write(0, 3, "=SUM(A1:B1)", None).unwrap();
        ws.write(0, 4, "{=SUM(A1:B1*2)}", None).unwrap();
        ws.write(0, 5, "", None).unwrap();
        ws.write(0, 6, "text", None).unwrap();

        assert_eq!(data(&ws, 0, 0), &CellData::Number(1.5));
        assert_eq!(data(&ws, 0, 1), &CellData::Number(42.0));
        assert!(matches!(data(&ws, 0, 2), CellData::Hyperlink { .. }));
        assert!(matches!(data(&ws, 0, 3), CellData::Formula { formula, .. } if formula == "SUM(A1:B1)"));
        assert!(matches!(data(&ws, 0, 4), CellData::ArrayFormula { formula, .. } if formula == "SUM(A1:B1*2)"));
        assert!(ws.grid.get(0, 5).is_none());
        assert!(matches!(data(&ws, 0, 6), CellData::String(_)));
    }

    #[test]
    fn rows_and_nested_columns() {
        let mut ws = sheet();
        let tokens = vec![Token::from(1), Token::from(vec!["a", "b"]), Token::from("c")];
        ws.write_row(0, 0, &tokens, None).unwrap();
        assert_eq!(data(&ws, 0, 0), &CellData::Number(1.0));
        assert!(matches!(data(&ws, 0, 1), CellData::String(_)));
        assert!(matches!(data(&ws, 1, 1), CellData::String(_)));
        assert!(matches!(data(&ws, 0, 2), CellData::String(_)));
        assert_eq!(ws.grid.cell_count(), 4);
    }

    #[test]
    fn strings_are_truncated_and_interned() {
        let mut ws = sheet();
        let long = "x".repeat(STR_MAX + 10);
        ws.write_string(0, 0, &long, None).unwrap();
        ws.write_string(1, 0, "x", None).unwrap();
        ws.write_string(2, 0, "x", None).unwrap();
        let workbook = ws.workbook.borrow();
        assert_eq!(workbook.shared_strings.get(0).map(str::len), Some(STR_MAX));
        assert_eq!(workbook.shared_strings.unique_count(), 2);
        assert_eq!(workbook.shared_strings.count(), 3);
    }

    #[test]
    fn blank_without_format_is_ignored() {
        let mut ws = sheet();
        ws.write_blank(0, 0, None).unwrap();
        assert!(ws.grid.get(0, 0).is_none());
        let format = Format::new().with_xf_index(1);
        ws.write_blank(0, 0, Some(&format)).unwrap();
        assert_eq!(data(&ws, 0, 0), &CellData::Blank);
    }

    #[test]
    fn array_formula_fills_range_with_zeros() {
        let mut ws = sheet();
        ws.write_array_formula(2, 1, 0, 0, "{=TREND(C1:C3,B1:B3)}", None, None)
            .unwrap();
        match data(&ws, 0, 0) {
            CellData::ArrayFormula { formula, range, .. } => {
                assert_eq!(formula, "TREND(C1:C3,B1:B3)");
                assert_eq!(range.to_sqref(), "A1:B3");
            },
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(data(&ws, 2, 1), &CellData::Number(0.0));
        assert_eq!(ws.grid.cell_count(), 6);
    }

    #[test]
    fn web_links() {
        let (link, display) = resolve_url("http://www.example.org/a b", None, Some("tip")).unwrap();
        assert_eq!(link.kind, LinkKind::External);
        assert_eq!(link.url, "http://www.example.org/a%20b");
        assert_eq!(link.location, None);
        assert_eq!(link.tooltip.as_deref(), Some("tip"));
        assert_eq!(display, "http://www.example.org/a b");

        let (_, display) = resolve_url("mailto:jmcnamara@cpan.org", None, None).unwrap();
        assert_eq!(display, "jmcnamara@cpan.org");
    }

    #[test]
    fn internal_links() {
        let (link, display) = resolve_url("internal:Sheet2!A1", Some("Go"), None).unwrap();
        assert_eq!(link.kind, LinkKind::Internal);
        assert_eq!(link.url, "Sheet2!A1");
        assert_eq!(link.location.as_deref(), Some("Go"));
        assert_eq!(display, "Go");
    }

    #[test]
    fn file_links() {
        let (link, display) = resolve_url("external:c:/temp/foo.xlsx#Sheet1!A1", None, None).unwrap();
        assert_eq!(link.url, "file:///c:\\temp\\foo.xlsx");
        assert_eq!(link.location.as_deref(), Some("Sheet1!A1"));
        assert_eq!(display, "c:\\temp\\foo.xlsx#Sheet1!A1");

        let (link, _) = resolve_url("external:\\\\NET\\share\\foo.xlsx", None, None).unwrap();
        assert_eq!(link.url, "file:///\\\\NET\\share\\foo.xlsx");

        let (link, _) = resolve_url("external:./foo.xlsx", None, None).unwrap();
        assert_eq!(link.url, "foo.xlsx");
    }

    #[test]
    fn long_urls_fail_without_side_effects() {
        let mut ws = sheet();
        let url = format!("http://{}", "a".repeat(300));
        assert!(matches!(ws.write_url(0, 0, &url, None, None, None), Err(Error::Limit(_))));
        assert_eq!(ws.grid.cell_count(), 0);
        assert_eq!(ws.hyperlink_count, 0);
        assert!(ws.workbook.borrow().shared_strings.is_empty());
    }

    #[test]
    fn hyperlink_limit() {
        let mut ws = sheet();
        ws.hyperlink_count = MAX_HYPERLINKS;
        assert!(matches!(
            ws.write_url(0, 0, "http://a.com", None, None, None),
            Err(Error::Limit(_))
        ));
    }

    #[test]
    fn rich_strings() {
        let mut ws = sheet();
        let bold = Format::new().set_bold();
        ws.write_rich_string(0, 0, &[(None, "This is "), (Some(&bold), "bold"), (None, " text")], None)
            .unwrap();
        let workbook = ws.workbook.borrow();
        let fragment = workbook.shared_strings.get(0).unwrap();
        assert!(fragment.starts_with(r#"<r><t xml:space="preserve">This is </t></r><r><rPr><b/>"#));
        assert!(fragment.ends_with(r#"<t xml:space="preserve"> text</t></r>"#));
        assert_eq!(fragment.matches("<rPr>").count(), 2);
    }

    #[test]
    fn rich_string_needs_fragments() {
        let mut ws = sheet();
        assert!(matches!(
            ws.write_rich_string(0, 0, &[], None),
            Err(Error::InsufficientArgument(_))
        ));
    }

    #[test]
    fn date_time_falls_back_to_string() {
        let mut ws = sheet();
        ws.write_date_time(0, 0, "2008-07-24T", None).unwrap();
        ws.write_date_time(1, 0, "2008-13-01T", None).unwrap();
        assert_eq!(data(&ws, 0, 0), &CellData::Number(39653.0));
        assert!(matches!(data(&ws, 1, 0), CellData::String(_)));
    }

    #[test]
    fn typed_dates() {
        let mut ws = sheet();
        let dt = chrono::NaiveDate::from_ymd_opt(2008, 7, 24)
            .unwrap()
            .and_hms_opt(18, 0, 0)
            .unwrap();
        ws.write_date(0, 0, &dt, None).unwrap();
        assert_eq!(data(&ws, 0, 0), &CellData::Number(39653.75));
    }

    #[test]
    fn formula_tokens() {
        assert_eq!(tokenize_formula("=SUM($A$1:B22)"), ["=SUM(", "$A$1", ":", "B22", ")"]);
        assert_eq!(tokenize_formula("=IF(AB3>1,1,0)"), ["=IF(", "AB3", ">1,1,0)"]);
        assert_eq!(tokenize_formula("=1+2"), ["=1+2"]);
    }

    #[test]
    fn repeated_formulas() {
        let mut ws = sheet();
        let tokens = Worksheet::store_formula("=A1 + A1");
        ws.repeat_formula(0, 1, &tokens, None, &[("A1", "A2")], None)
            .unwrap();
        assert!(matches!(data(&ws, 0, 1), CellData::Formula { formula, .. } if formula == "A2 + A1"));
        assert!(matches!(
            ws.repeat_formula(0, 2, &[], None, &[], None),
            Err(Error::InsufficientArgument(_))
        ));
    }

    #[test]
    fn comments_count_for_dimensions() {
        let mut ws = sheet();
        ws.write_comment(4, 2, "note", &CommentOptions::default())
            .unwrap();
        assert_eq!(ws.grid.dimensions().to_ref(), "C5");
        assert_eq!(ws.comments.len(), 1);
    }
}
