//! Data validation rules.

use super::options::{OptionValue, is_comparison, normalize_criteria};
use crate::common::xml::{escape_attr, escape_data};
use crate::common::{Error, Result};
use crate::xlsx::utility::CellRange;
use phf::phf_map;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt::Write as FmtWrite;

static VALIDATION_TYPES: phf::Map<&'static str, &'static str> = phf_map! {
    "any" => "none",
    "any value" => "none",
    "whole number" => "whole",
    "whole" => "whole",
    "integer" => "whole",
    "decimal" => "decimal",
    "list" => "list",
    "date" => "date",
    "time" => "time",
    "text length" => "textLength",
    "length" => "textLength",
    "custom" => "custom",
};

/// Alert style shown when invalid data is entered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorStyle {
    #[default]
    Stop,
    Warning,
    Information,
}

impl ErrorStyle {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "stop" => Some(Self::Stop),
            "warning" => Some(Self::Warning),
            "information" => Some(Self::Information),
            _ => None,
        }
    }

    fn as_attr(&self) -> Option<&'static str> {
        match self {
            Self::Stop => None,
            Self::Warning => Some("warning"),
            Self::Information => Some("information"),
        }
    }
}

/// The first operand of a validation: a literal list or a single value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValidationValue {
    List(Vec<String>),
    Value(OptionValue),
}

impl From<OptionValue> for ValidationValue {
    fn from(v: OptionValue) -> Self {
        Self::Value(v)
    }
}

impl From<f64> for ValidationValue {
    fn from(n: f64) -> Self {
        Self::Value(n.into())
    }
}

impl From<i32> for ValidationValue {
    fn from(n: i32) -> Self {
        Self::Value(n.into())
    }
}

impl From<&str> for ValidationValue {
    fn from(s: &str) -> Self {
        Self::Value(s.into())
    }
}

/// Options for [`Worksheet::data_validation`](crate::xlsx::Worksheet::data_validation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataValidation {
    pub validate: String,
    pub criteria: Option<String>,
    pub value: Option<ValidationValue>,
    /// Alias of `value`, conventionally used for list sources.
    pub source: Option<ValidationValue>,
    /// Alias of `value`, conventionally used with `between`.
    pub minimum: Option<ValidationValue>,
    pub maximum: Option<OptionValue>,
    pub ignore_blank: bool,
    pub dropdown: bool,
    pub show_input: bool,
    pub input_title: Option<String>,
    pub input_message: Option<String>,
    pub show_error: bool,
    pub error_title: Option<String>,
    pub error_message: Option<String>,
    pub error_type: Option<String>,
    /// Further ranges in A1 notation that share the rule.
    pub other_cells: Vec<String>,
}

impl Default for DataValidation {
    fn default() -> Self {
        Self {
            validate: String::new(),
            criteria: None,
            value: None,
            source: None,
            minimum: None,
            maximum: None,
            ignore_blank: true,
            dropdown: true,
            show_input: true,
            input_title: None,
            input_message: None,
            show_error: true,
            error_title: None,
            error_message: None,
            error_type: None,
            other_cells: Vec::new(),
        }
    }
}

impl DataValidation {
    pub fn new(validate: &str) -> Self {
        Self {
            validate: validate.to_string(),
            ..Default::default()
        }
    }

    pub fn with_criteria(mut self, criteria: &str) -> Self {
        self.criteria = Some(criteria.to_string());
        self
    }

    pub fn with_value(mut self, value: impl Into<ValidationValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_list<S: AsRef<str>>(mut self, items: &[S]) -> Self {
        self.source = Some(ValidationValue::List(
            items.iter().map(|s| s.as_ref().to_string()).collect(),
        ));
        self
    }

    pub fn with_range(mut self, minimum: impl Into<OptionValue>, maximum: impl Into<OptionValue>) -> Self {
        self.minimum = Some(ValidationValue::Value(minimum.into()));
        self.maximum = Some(maximum.into());
        self
    }

    pub fn with_input_message(mut self, title: Option<&str>, message: &str) -> Self {
        self.input_title = title.map(str::to_string);
        self.input_message = Some(message.to_string());
        self
    }

    pub fn with_error_message(mut self, title: Option<&str>, message: &str) -> Self {
        self.error_title = title.map(str::to_string);
        self.error_message = Some(message.to_string());
        self
    }
}

/// A validated rule ready for serialization.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationRule {
    kind: &'static str,
    operator: String,
    error_style: ErrorStyle,
    ignore_blank: bool,
    dropdown: bool,
    show_input: bool,
    show_error: bool,
    error_title: Option<String>,
    error_message: Option<String>,
    input_title: Option<String>,
    input_message: Option<String>,
    ranges: SmallVec<[CellRange; 1]>,
    formula1: ValidationValue,
    formula2: Option<OptionValue>,
}

impl ValidationRule {
    /// Build a rule over `range` from user options.
    ///
    /// Returns `Ok(None)` for the "any value" type, which carries no rule.
    pub fn compile(range: CellRange, options: &DataValidation, date_1904: bool) -> Result<Option<Self>> {
        const METHOD: &str = "data_validation";
        let missing = |param| Error::MissingParameter {
            method: METHOD,
            param,
        };

        range.check()?;

        if options.validate.is_empty() {
            return Err(missing("validate"));
        }
        let kind = VALIDATION_TYPES
            .get(options.validate.to_lowercase().as_str())
            .copied()
            .ok_or_else(|| Error::option(METHOD, "validate", options.validate.as_str()))?;
        let error_style = match &options.error_type {
            Some(t) => ErrorStyle::parse(t).ok_or_else(|| Error::option(METHOD, "error_type", t.as_str()))?,
            None => ErrorStyle::Stop,
        };

        let mut ranges: SmallVec<[CellRange; 1]> = SmallVec::new();
        ranges.push(range);
        for other in &options.other_cells {
            let r = CellRange::parse(other)?;
            r.check()?;
            ranges.push(r);
        }

        if kind == "none" {
            return Ok(None);
        }

        let value = options
            .minimum
            .as_ref()
            .or(options.source.as_ref())
            .or(options.value.as_ref())
            .ok_or_else(|| missing("value"))?;

        let (operator, maximum) = if kind == "list" || kind == "custom" {
            ("between".to_string(), None)
        } else {
            let criteria = options.criteria.as_deref().ok_or_else(|| missing("criteria"))?;
            let operator = normalize_criteria(criteria);
            if !is_comparison(&operator) {
                return Err(Error::option(METHOD, "criteria", criteria));
            }
            let maximum = if operator == "between" || operator == "notBetween" {
                Some(options.maximum.clone().ok_or_else(|| missing("maximum"))?)
            } else {
                None
            };
            (operator, maximum)
        };

        let (formula1, formula2) = if kind == "date" || kind == "time" {
            let first = match value {
                ValidationValue::Value(v) => ValidationValue::Value(v.to_serial_date(date_1904)?),
                list => list.clone(),
            };
            let second = maximum.map(|m| m.to_serial_date(date_1904)).transpose()?;
            (first, second)
        } else {
            (value.clone(), maximum)
        };

        Ok(Some(Self {
            kind,
            operator,
            error_style,
            ignore_blank: options.ignore_blank,
            dropdown: options.dropdown,
            show_input: options.show_input,
            show_error: options.show_error,
            error_title: options.error_title.clone(),
            error_message: options.error_message.clone(),
            input_title: options.input_title.clone(),
            input_message: options.input_message.clone(),
            ranges,
            formula1,
            formula2,
        }))
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn ranges(&self) -> &[CellRange] {
        &self.ranges
    }

    fn sqref(&self) -> String {
        self.ranges
            .iter()
            .map(CellRange::to_sqref)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Write one `<dataValidation>` element.
    pub fn write_xml(&self, xml: &mut String) -> Result<()> {
        write!(xml, r#"<dataValidation type="{}""#, self.kind)?;
        if self.operator != "between" {
            write!(xml, r#" operator="{}""#, self.operator)?;
        }
        if let Some(style) = self.error_style.as_attr() {
            write!(xml, r#" errorStyle="{}""#, style)?;
        }
        if self.ignore_blank {
            xml.push_str(r#" allowBlank="1""#);
        }
        if !self.dropdown {
            xml.push_str(r#" showDropDown="1""#);
        }
        if self.show_input {
            xml.push_str(r#" showInputMessage="1""#);
        }
        if self.show_error {
            xml.push_str(r#" showErrorMessage="1""#);
        }
        for (name, value) in [
            ("errorTitle", &self.error_title),
            ("error", &self.error_message),
            ("promptTitle", &self.input_title),
            ("prompt", &self.input_message),
        ] {
            if let Some(v) = value {
                write!(xml, r#" {}="{}""#, name, escape_attr(v))?;
            }
        }
        write!(xml, r#" sqref="{}">"#, self.sqref())?;

        let formula1 = match &self.formula1 {
            ValidationValue::List(items) => format!("\"{}\"", items.join(",")),
            ValidationValue::Value(v) => v.to_formula(),
        };
        write!(xml, "<formula1>{}</formula1>", escape_data(&formula1))?;
        if let Some(max) = &self.formula2 {
            write!(xml, "<formula2>{}</formula2>", escape_data(&max.to_formula()))?;
        }
        xml.push_str("</dataValidation>");
        Ok(())
    }
}

/// Write the `<dataValidations>` container; nothing when empty.
pub(crate) fn write_data_validations(xml: &mut String, rules: &[ValidationRule]) -> Result<()> {
    if rules.is_empty() {
        return Ok(());
    }
    write!(xml, r#"<dataValidations count="{}">"#, rules.len())?;
    for rule in rules {
        rule.write_xml(xml)?;
    }
    xml.push_str("</dataValidations>");
    Ok(())
}
