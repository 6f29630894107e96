use aho_corasick::AhoCorasick;
use once_cell::sync::Lazy;

// Attribute values need the double quote escaped as well.
static ATTR_ESCAPER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .build(["&", "<", ">", "\""])
        .expect("Failed to build attribute escaper")
});

static DATA_ESCAPER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .build(["&", "<", ">"])
        .expect("Failed to build data escaper")
});

/// Escape a string for use inside a double-quoted XML attribute.
///
/// # Examples
///
/// ```
/// use litchi_xlsxwriter::common::xml::escape_attr;
/// assert_eq!(escape_attr("a & \"b\""), "a &amp; &quot;b&quot;");
/// assert_eq!(escape_attr("it's"), "it's");
/// ```
#[inline]
pub fn escape_attr(s: &str) -> String {
    ATTR_ESCAPER.replace_all(s, &["&amp;", "&lt;", "&gt;", "&quot;"])
}

/// Escape a string for use as XML character data.
///
/// Quotes are left untouched, which keeps formulas such as `"a"&"b"` readable.
///
/// # Examples
///
/// ```
/// use litchi_xlsxwriter::common::xml::escape_data;
/// assert_eq!(escape_data("<tag>\"hello\"</tag>"), "&lt;tag&gt;\"hello\"&lt;/tag&gt;");
/// ```
#[inline]
pub fn escape_data(s: &str) -> String {
    DATA_ESCAPER.replace_all(s, &["&amp;", "&lt;", "&gt;"])
}
