//! Values and lookup tables shared by the rule-based registries.

use crate::common::number::write_num;
use crate::common::{Error, Result};
use crate::xlsx::date_time::{convert_date_time, has_date_time_marker};
use phf::phf_map;
use serde::{Deserialize, Serialize};

/// A rule operand: a number, or text holding a formula or literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Number(f64),
    Text(String),
}

impl OptionValue {
    /// Convert an ISO 8601 date-time string to a serial date.
    ///
    /// Only text with a `T` next to a digit is treated as a date-time;
    /// anything else is returned unchanged.
    pub(crate) fn to_serial_date(&self, date_1904: bool) -> Result<Self> {
        match self {
            Self::Text(s) if has_date_time_marker(s) => convert_date_time(s, date_1904)
                .map(Self::Number)
                .ok_or_else(|| Error::InvalidDateTime(s.clone())),
            other => Ok(other.clone()),
        }
    }

    /// Text for a `<formula>` element, without a leading `=`.
    pub(crate) fn to_formula(&self) -> String {
        match self {
            Self::Number(n) => {
                let mut s = String::new();
                write_num(&mut s, *n);
                s
            },
            Self::Text(s) => s.strip_prefix('=').unwrap_or(s).to_string(),
        }
    }
}

impl std::fmt::Display for OptionValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => {
                let mut s = String::new();
                write_num(&mut s, *n);
                f.write_str(&s)
            },
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for OptionValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for OptionValue {
    fn from(n: i32) -> Self {
        Self::Number(n as f64)
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// Comparison, text and time-period criteria synonyms.
static CRITERIA: phf::Map<&'static str, &'static str> = phf_map! {
    "between" => "between",
    "not between" => "notBetween",
    "equal to" => "equal",
    "=" => "equal",
    "==" => "equal",
    "not equal to" => "notEqual",
    "!=" => "notEqual",
    "<>" => "notEqual",
    "greater than" => "greaterThan",
    ">" => "greaterThan",
    "less than" => "lessThan",
    "<" => "lessThan",
    "greater than or equal to" => "greaterThanOrEqual",
    ">=" => "greaterThanOrEqual",
    "less than or equal to" => "lessThanOrEqual",
    "<=" => "lessThanOrEqual",
    "containing" => "containsText",
    "not containing" => "notContains",
    "begins with" => "beginsWith",
    "ends with" => "endsWith",
    "yesterday" => "yesterday",
    "today" => "today",
    "last 7 days" => "last7Days",
    "last week" => "lastWeek",
    "this week" => "thisWeek",
    "next week" => "nextWeek",
    "last month" => "lastMonth",
    "this month" => "thisMonth",
    "next month" => "nextMonth",
};

/// Map a user criteria string to its schema name.
///
/// Unrecognized criteria are passed through unchanged for the rule types
/// that interpret them freely (averages, formulas).
pub(crate) fn normalize_criteria(criteria: &str) -> String {
    CRITERIA
        .get(criteria.to_lowercase().as_str())
        .map_or_else(|| criteria.to_string(), |c| c.to_string())
}

/// Whether the criteria names a schema comparison operator.
pub(crate) fn is_comparison(criteria: &str) -> bool {
    matches!(
        criteria,
        "between"
            | "notBetween"
            | "equal"
            | "notEqual"
            | "greaterThan"
            | "lessThan"
            | "greaterThanOrEqual"
            | "lessThanOrEqual"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn criteria_synonyms() {
        assert_eq!(normalize_criteria(">="), "greaterThanOrEqual");
        assert_eq!(normalize_criteria("Not Between"), "notBetween");
        assert_eq!(normalize_criteria("last 7 days"), "last7Days");
        assert_eq!(normalize_criteria("1 std dev above"), "1 std dev above");
        assert!(is_comparison("notEqual"));
        assert!(!is_comparison("containsText"));
    }

    #[test]
    fn formula_text() {
        assert_eq!(OptionValue::from("=$B$1").to_formula(), "$B$1");
        assert_eq!(OptionValue::from(50).to_formula(), "50");
        assert_eq!(OptionValue::from(0.5).to_formula(), "0.5");
    }

    #[test]
    fn date_values_convert() {
        let v = OptionValue::from("2008-07-24T").to_serial_date(false).unwrap();
        assert_eq!(v, OptionValue::Number(39653.0));
        assert!(matches!(
            OptionValue::from("2008-13-01T").to_serial_date(false),
            Err(Error::InvalidDateTime(_))
        ));
        assert_eq!(
            OptionValue::from("=A1").to_serial_date(false).unwrap(),
            OptionValue::from("=A1")
        );
    }

    #[test]
    fn text_with_capital_t_is_not_a_date() {
        for text in ["Total", "=Tax!$A$1", "TRUE"] {
            assert_eq!(
                OptionValue::from(text).to_serial_date(false).unwrap(),
                OptionValue::from(text)
            );
        }
        assert_eq!(
            OptionValue::from("T12:00").to_serial_date(false).unwrap(),
            OptionValue::Number(0.5)
        );
        assert!(matches!(
            OptionValue::from("2011-01-01T25:00").to_serial_date(false),
            Err(Error::InvalidDateTime(_))
        ));
    }

    #[test]
    fn untagged_serde() {
        let v: OptionValue = serde_json::from_str("50").unwrap();
        assert_eq!(v, OptionValue::Number(50.0));
        let v: OptionValue = serde_json::from_str("\"=A1\"").unwrap();
        assert_eq!(v, OptionValue::Text("=A1".into()));
    }
}
