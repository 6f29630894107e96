//! Autofilter ranges and the filter expression compiler.
//!
//! `filter_column` accepts expressions such as `x > 2000 and x < 5000` or
//! `x == b*`. The left operand is a placeholder; only the operator and the
//! right operand matter. Expressions are compiled into the operator/value
//! pairs the `<customFilter>` element stores, and pure equality tests are
//! collapsed into the more compact `<filters>` list form.

use crate::common::number::fmt_num;
use crate::common::xml::escape_attr;
use crate::common::{Error, Result};
use crate::xlsx::utility::{CellRange, name_area, range};
use std::collections::BTreeMap;
use std::fmt::{self, Write as FmtWrite};

/// Comparison operators of a custom filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    LessThan,
    Equal,
    LessThanOrEqual,
    GreaterThan,
    NotEqual,
    GreaterThanOrEqual,
    /// Equality containing `*` or `?` wildcards.
    EqualMatch,
    Top,
    TopPercent,
    Bottom,
    BottomPercent,
}

impl FilterOperator {
    /// Numeric operator code as used by the binary file formats.
    pub fn code(&self) -> u8 {
        match self {
            Self::LessThan => 1,
            Self::Equal => 2,
            Self::LessThanOrEqual => 3,
            Self::GreaterThan => 4,
            Self::NotEqual => 5,
            Self::GreaterThanOrEqual => 6,
            Self::EqualMatch => 22,
            Self::Top => 30,
            Self::TopPercent => 31,
            Self::Bottom => 32,
            Self::BottomPercent => 33,
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "==" | "=" | "=~" | "eq" => Self::Equal,
            "!=" | "!~" | "ne" | "<>" => Self::NotEqual,
            "<" => Self::LessThan,
            "<=" => Self::LessThanOrEqual,
            ">" => Self::GreaterThan,
            ">=" => Self::GreaterThanOrEqual,
            _ => return None,
        })
    }

    /// `operator` attribute of `<customFilter>`; equality is the default
    /// and has none.
    fn as_attr(&self) -> Option<&'static str> {
        match self {
            Self::LessThan => Some("lessThan"),
            Self::LessThanOrEqual => Some("lessThanOrEqual"),
            Self::GreaterThan => Some("greaterThan"),
            Self::NotEqual => Some("notEqual"),
            Self::GreaterThanOrEqual => Some("greaterThanOrEqual"),
            _ => None,
        }
    }

    fn is_top_bottom(&self) -> bool {
        matches!(
            self,
            Self::Top | Self::TopPercent | Self::Bottom | Self::BottomPercent
        )
    }
}

/// Right operand of a filter condition.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Number(f64),
    Text(String),
}

impl FilterValue {
    fn from_token(token: String) -> Self {
        if crate::common::number::is_numeric(&token) {
            if let Ok(n) = fast_float2::parse::<f64, _>(&token) {
                return Self::Number(n);
            }
        }
        Self::Text(token)
    }

    fn text(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => f.write_str(&fmt_num(*n)),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// One `operator value` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCondition {
    pub operator: FilterOperator,
    pub value: FilterValue,
}

/// How two conditions combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterJoin {
    And,
    Or,
}

/// The compiled filter for one column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnFilter {
    /// Show rows whose value is one of the listed strings.
    List(Vec<String>),
    /// One or two custom conditions.
    Custom {
        first: FilterCondition,
        second: Option<(FilterJoin, FilterCondition)>,
    },
}

/// Split an expression into tokens, keeping quoted strings together.
///
/// Quotes are stripped and doubled quotes inside them are unescaped.
fn extract_tokens(expression: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut rest = expression.trim_start();

    while !rest.is_empty() {
        let (token, remainder) = match quoted_prefix(rest) {
            Some((inner, len)) => (inner.replace("\"\"", "\""), &rest[len..]),
            None => {
                let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
                let raw = &rest[..end];
                let raw = raw.strip_prefix('"').unwrap_or(raw);
                let raw = raw.strip_suffix('"').unwrap_or(raw);
                (raw.replace("\"\"", "\""), &rest[end..])
            },
        };
        tokens.push(token);
        rest = remainder.trim_start();
    }
    tokens
}

/// Inner text and total length of a leading `"..."` string.
fn quoted_prefix(s: &str) -> Option<(&str, usize)> {
    let body = s.strip_prefix('"')?;
    let bytes = body.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'"' {
            if bytes.get(i + 1) == Some(&b'"') {
                i += 2;
                continue;
            }
            return Some((&body[..i], i + 2));
        }
        i += 1;
    }
    None
}

/// Compile three tokens `lhs op rhs` into a condition.
fn parse_condition(expression: &str, tokens: &[String]) -> Result<FilterCondition> {
    let lhs = &tokens[0];
    let op = &tokens[1];
    let rhs = &tokens[2];

    let lower = lhs.to_ascii_lowercase();
    if lower == "top" || lower == "bottom" {
        let count = op
            .parse::<u32>()
            .ok()
            .filter(|n| (1..=500).contains(n) && op.bytes().all(|b| b.is_ascii_digit()))
            .ok_or_else(|| {
                Error::Limit(format!(
                    "The value '{}' in expression '{}' must be in the range 1 to 500",
                    op, expression
                ))
            })?;
        let kind = rhs.to_ascii_lowercase();
        if kind != "items" && kind != "%" {
            return Err(Error::Limit(format!(
                "The type '{}' in expression '{}' must be either 'items' or '%'",
                rhs, expression
            )));
        }
        let operator = match (lower.as_str(), kind.as_str()) {
            ("top", "%") => FilterOperator::TopPercent,
            ("top", _) => FilterOperator::Top,
            (_, "%") => FilterOperator::BottomPercent,
            _ => FilterOperator::Bottom,
        };
        return Ok(FilterCondition {
            operator,
            value: FilterValue::Number(count as f64),
        });
    }

    let mut operator = FilterOperator::from_token(op).ok_or_else(|| {
        Error::Limit(format!(
            "Token '{}' is not a valid operator in filter expression '{}'",
            op, expression
        ))
    })?;
    let mut value = FilterValue::from_token(rhs.clone());

    let blank_kind = match &value {
        FilterValue::Text(t) if t.eq_ignore_ascii_case("blanks") => Some(true),
        FilterValue::Text(t) if t.eq_ignore_ascii_case("nonblanks") => Some(false),
        _ => None,
    };
    if let Some(blanks) = blank_kind {
        if operator != FilterOperator::Equal && operator != FilterOperator::NotEqual {
            return Err(Error::Limit(format!(
                "The operator '{}' in expression '{}' is not valid in relation to Blanks/NonBlanks",
                op, expression
            )));
        }
        // Blank tests are expressed as equality with a sentinel.
        (operator, value) = match (blanks, operator) {
            (true, FilterOperator::Equal) => (FilterOperator::Equal, FilterValue::text("blanks")),
            (true, _) => (FilterOperator::NotEqual, FilterValue::text(" ")),
            (false, FilterOperator::NotEqual) => {
                (FilterOperator::Equal, FilterValue::text("blanks"))
            },
            (false, _) => (FilterOperator::NotEqual, FilterValue::text(" ")),
        };
    }

    if operator == FilterOperator::Equal
        && matches!(&value, FilterValue::Text(t) if t.contains(['*', '?']))
    {
        operator = FilterOperator::EqualMatch;
    }

    Ok(FilterCondition { operator, value })
}

/// Compile a filter expression.
///
/// # Examples
///
/// ```
/// use litchi_xlsxwriter::xlsx::writer::filter::{parse_filter_expression, ColumnFilter};
///
/// let filter = parse_filter_expression("x == 2000 or x == 5000").unwrap();
/// assert_eq!(filter, ColumnFilter::List(vec!["2000".into(), "5000".into()]));
/// ```
pub fn parse_filter_expression(expression: &str) -> Result<ColumnFilter> {
    let tokens = extract_tokens(expression);
    if tokens.len() != 3 && tokens.len() != 7 {
        return Err(Error::Limit(format!(
            "Incorrect number of tokens in expression '{}'",
            expression
        )));
    }

    let first = parse_condition(expression, &tokens[0..3])?;
    let second = if tokens.len() == 7 {
        let join = match tokens[3].as_str() {
            "and" | "&&" => FilterJoin::And,
            "or" | "||" => FilterJoin::Or,
            other => {
                return Err(Error::Limit(format!(
                    "Token '{}' is not a valid conditional in filter expression '{}'",
                    other, expression
                )));
            },
        };
        let condition = parse_condition(expression, &tokens[4..7])?;
        // `<top10>` holds a single condition.
        if first.operator.is_top_bottom() || condition.operator.is_top_bottom() {
            return Err(Error::Limit(format!(
                "Top/bottom filters can't be combined with another condition in expression '{}'",
                expression
            )));
        }
        Some((join, condition))
    } else {
        None
    };

    // Plain equality tests are stored as a value list.
    let collapsed = match (&first, &second) {
        (c, None) if c.operator == FilterOperator::Equal => Some(vec![c.value.to_string()]),
        (a, Some((FilterJoin::Or, b)))
            if a.operator == FilterOperator::Equal && b.operator == FilterOperator::Equal =>
        {
            Some(vec![a.value.to_string(), b.value.to_string()])
        },
        _ => None,
    };

    Ok(match collapsed {
        Some(list) => ColumnFilter::List(list),
        None => ColumnFilter::Custom { first, second },
    })
}

/// The worksheet autofilter: a header range plus per-column filters.
#[derive(Debug, Clone, PartialEq)]
pub struct AutoFilter {
    range: CellRange,
    defined_name: String,
    columns: BTreeMap<u32, ColumnFilter>,
}

impl AutoFilter {
    pub fn new(sheet_name: &str, range: CellRange) -> Self {
        let defined_name = name_area(
            sheet_name,
            range.first_row,
            range.first_col,
            range.last_row,
            range.last_col,
        );
        Self {
            range,
            defined_name,
            columns: BTreeMap::new(),
        }
    }

    pub fn range(&self) -> &CellRange {
        &self.range
    }

    /// The `_xlnm._FilterDatabase` defined name value.
    pub fn defined_name(&self) -> &str {
        &self.defined_name
    }

    /// Whether any column carries an active filter.
    pub fn is_filtering(&self) -> bool {
        !self.columns.is_empty()
    }

    pub fn column(&self, col: u32) -> Option<&ColumnFilter> {
        self.columns.get(&col)
    }

    fn check_column(&self, col: u32) -> Result<()> {
        if col < self.range.first_col || col > self.range.last_col {
            return Err(Error::Limit(format!(
                "Column '{}' outside autofilter column range ({} .. {})",
                col, self.range.first_col, self.range.last_col
            )));
        }
        Ok(())
    }

    /// Compile and attach an expression filter to a column.
    pub fn filter_column(&mut self, col: u32, expression: &str) -> Result<()> {
        self.check_column(col)?;
        let filter = parse_filter_expression(expression)?;
        self.columns.insert(col, filter);
        Ok(())
    }

    /// Attach a list of values to show for a column.
    pub fn filter_column_list<S: AsRef<str>>(&mut self, col: u32, values: &[S]) -> Result<()> {
        if values.is_empty() {
            return Err(Error::InsufficientArgument(
                "filter_column_list requires at least one value".into(),
            ));
        }
        self.check_column(col)?;
        self.columns.insert(
            col,
            ColumnFilter::List(values.iter().map(|v| v.as_ref().to_string()).collect()),
        );
        Ok(())
    }

    /// Write the `<autoFilter>` element.
    pub fn write_xml(&self, xml: &mut String) -> Result<()> {
        let r = &self.range;
        let reference = range(r.first_row, r.first_col, r.last_row, r.last_col);

        if self.columns.is_empty() {
            write!(xml, r#"<autoFilter ref="{}"/>"#, reference)?;
            return Ok(());
        }

        write!(xml, r#"<autoFilter ref="{}">"#, reference)?;
        for (col, filter) in &self.columns {
            write!(xml, r#"<filterColumn colId="{}">"#, col - r.first_col)?;
            match filter {
                ColumnFilter::List(values) => write_filters(xml, values)?,
                ColumnFilter::Custom { first, second } => {
                    if first.operator.is_top_bottom() {
                        write_top10(xml, first)?;
                    } else {
                        write_custom_filters(xml, first, second.as_ref())?;
                    }
                },
            }
            xml.push_str("</filterColumn>");
        }
        xml.push_str("</autoFilter>");
        Ok(())
    }
}

fn write_filters(xml: &mut String, values: &[String]) -> Result<()> {
    if values.len() == 1 && values[0] == "blanks" {
        xml.push_str(r#"<filters blank="1"/>"#);
        return Ok(());
    }
    xml.push_str("<filters>");
    for value in values {
        write!(xml, r#"<filter val="{}"/>"#, escape_attr(value))?;
    }
    xml.push_str("</filters>");
    Ok(())
}

fn write_custom_filters(
    xml: &mut String,
    first: &FilterCondition,
    second: Option<&(FilterJoin, FilterCondition)>,
) -> Result<()> {
    match second {
        None => {
            xml.push_str("<customFilters>");
            write_custom_filter(xml, first)?;
        },
        Some((join, cond)) => {
            let and = if *join == FilterJoin::And { 1 } else { 0 };
            write!(xml, r#"<customFilters and="{}">"#, and)?;
            write_custom_filter(xml, first)?;
            write_custom_filter(xml, cond)?;
        },
    }
    xml.push_str("</customFilters>");
    Ok(())
}

fn write_custom_filter(xml: &mut String, cond: &FilterCondition) -> Result<()> {
    xml.push_str("<customFilter");
    if let Some(op) = cond.operator.as_attr() {
        write!(xml, r#" operator="{}""#, op)?;
    }
    write!(xml, r#" val="{}"/>"#, escape_attr(&cond.value.to_string()))?;
    Ok(())
}

fn write_top10(xml: &mut String, cond: &FilterCondition) -> Result<()> {
    xml.push_str("<top10");
    if matches!(
        cond.operator,
        FilterOperator::Bottom | FilterOperator::BottomPercent
    ) {
        xml.push_str(r#" top="0""#);
    }
    if matches!(
        cond.operator,
        FilterOperator::TopPercent | FilterOperator::BottomPercent
    ) {
        xml.push_str(r#" percent="1""#);
    }
    write!(xml, r#" val="{}"/>"#, cond.value)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn custom(filter: ColumnFilter) -> (FilterCondition, Option<(FilterJoin, FilterCondition)>) {
        match filter {
            ColumnFilter::Custom { first, second } => (first, second),
            other => panic!("expected a custom filter, got {other:?}"),
        }
    }

    #[test]
    fn tokenizer_keeps_quoted_strings() {
        assert_eq!(
            extract_tokens(r#"x == "East Coast""#),
            vec!["x", "==", "East Coast"]
        );
        assert_eq!(
            extract_tokens(r#"x == "say ""hi""""#),
            vec!["x", "==", r#"say "hi""#]
        );
        assert_eq!(extract_tokens("  x   >  1  "), vec!["x", ">", "1"]);
        assert_eq!(extract_tokens(r#"x == "open"#), vec!["x", "==", "open"]);
    }

    #[test]
    fn single_comparison_is_custom() {
        let (first, second) = custom(parse_filter_expression("x > 2000").unwrap());
        assert_eq!(first.operator, FilterOperator::GreaterThan);
        assert_eq!(first.operator.code(), 4);
        assert_eq!(first.value, FilterValue::Number(2000.0));
        assert!(second.is_none());
    }

    #[test]
    fn equalities_collapse_to_lists() {
        assert_eq!(
            parse_filter_expression("x == East").unwrap(),
            ColumnFilter::List(vec!["East".into()])
        );
        assert_eq!(
            parse_filter_expression("x == 2000 or x == 5000").unwrap(),
            ColumnFilter::List(vec!["2000".into(), "5000".into()])
        );
        // `and` joins stay custom.
        let (_, second) = custom(parse_filter_expression("x == 1 and x == 2").unwrap());
        assert_eq!(second.unwrap().0, FilterJoin::And);
    }

    #[test]
    fn wildcards_use_match_operator() {
        let (first, _) = custom(parse_filter_expression("x =~ b*").unwrap());
        assert_eq!(first.operator, FilterOperator::EqualMatch);
        assert_eq!(first.operator.code(), 22);
        assert_eq!(first.value, FilterValue::Text("b*".into()));
    }

    #[test]
    fn blanks_and_nonblanks() {
        assert_eq!(
            parse_filter_expression("x == Blanks").unwrap(),
            ColumnFilter::List(vec!["blanks".into()])
        );
        let (first, _) = custom(parse_filter_expression("x != blanks").unwrap());
        assert_eq!(first.operator, FilterOperator::NotEqual);
        assert_eq!(first.value, FilterValue::Text(" ".into()));
        let (first, _) = custom(parse_filter_expression("x == NonBlanks").unwrap());
        assert_eq!(first.operator, FilterOperator::NotEqual);
        assert_eq!(
            parse_filter_expression("x != nonblanks").unwrap(),
            ColumnFilter::List(vec!["blanks".into()])
        );
        assert!(parse_filter_expression("x > blanks").is_err());
    }

    #[test]
    fn top_and_bottom() {
        let (first, _) = custom(parse_filter_expression("top 10 items").unwrap());
        assert_eq!(first.operator, FilterOperator::Top);
        assert_eq!(first.value, FilterValue::Number(10.0));
        let (first, _) = custom(parse_filter_expression("Bottom 5 %").unwrap());
        assert_eq!(first.operator.code(), 33);
        assert!(parse_filter_expression("top 501 items").is_err());
        assert!(parse_filter_expression("top 10 rows").is_err());
    }

    #[test]
    fn top_and_bottom_stand_alone() {
        for expression in [
            "x > 5 or top 10 items",
            "top 10 items and x > 5",
            "bottom 5 % or top 10 items",
        ] {
            assert!(matches!(
                parse_filter_expression(expression),
                Err(Error::Limit(_))
            ));
        }

        let mut filter = AutoFilter::new("Sheet1", CellRange::new(0, 0, 10, 0));
        assert!(filter.filter_column(0, "x > 5 or top 10 items").is_err());
        assert!(!filter.is_filtering());
    }

    #[test]
    fn malformed_expressions() {
        assert!(parse_filter_expression("x >").is_err());
        assert!(parse_filter_expression("x > 1 xor x < 5").is_err());
        assert!(parse_filter_expression("x ~~ 1").is_err());
    }

    #[test]
    fn columns_must_be_inside_the_range() {
        let mut filter = AutoFilter::new("Sheet1", CellRange::new(0, 1, 50, 3));
        assert_eq!(filter.defined_name(), "Sheet1!$B$1:$D$51");
        assert!(filter.filter_column(0, "x > 1").is_err());
        assert!(filter.filter_column(4, "x > 1").is_err());
        assert!(filter.filter_column(2, "x > 1").is_ok());
        assert!(filter.is_filtering());
    }

    #[test]
    fn autofilter_xml() {
        let mut filter = AutoFilter::new("Sheet1", CellRange::new(0, 0, 50, 3));
        let mut xml = String::new();
        filter.write_xml(&mut xml).unwrap();
        assert_eq!(xml, r#"<autoFilter ref="A1:D51"/>"#);

        filter.filter_column(3, "x > 3000 and x < 8000").unwrap();
        filter.filter_column_list(0, &["East", "North"]).unwrap();
        filter.filter_column(1, "x == blanks").unwrap();
        let mut xml = String::new();
        filter.write_xml(&mut xml).unwrap();
        assert_eq!(
            xml,
            concat!(
                r#"<autoFilter ref="A1:D51">"#,
                r#"<filterColumn colId="0"><filters><filter val="East"/><filter val="North"/></filters></filterColumn>"#,
                r#"<filterColumn colId="1"><filters blank="1"/></filterColumn>"#,
                r#"<filterColumn colId="3"><customFilters and="1">"#,
                r#"<customFilter operator="greaterThan" val="3000"/>"#,
                r#"<customFilter operator="lessThan" val="8000"/>"#,
                r#"</customFilters></filterColumn>"#,
                r#"</autoFilter>"#
            )
        );
    }

    #[test]
    fn match_filter_omits_equal_operator() {
        let mut filter = AutoFilter::new("Sheet1", CellRange::new(0, 0, 10, 0));
        filter.filter_column(0, "x == b* or x != c").unwrap();
        let mut xml = String::new();
        filter.write_xml(&mut xml).unwrap();
        assert!(xml.contains(
            r#"<customFilters and="0"><customFilter val="b*"/><customFilter operator="notEqual" val="c"/></customFilters>"#
        ));
    }
}
