//! Conditional formatting rules.
//!
//! Rules are compiled once at registration: synonyms are resolved, date-time
//! operands converted, formulas synthesized for the rule types that the file
//! format only stores as a formula, and color-scale defaults filled in.
//! Serialization then walks the compiled rules without further checks.

use super::options::{OptionValue, is_comparison, normalize_criteria};
use crate::common::xml::{escape_attr, escape_data};
use crate::common::{Error, Result};
use crate::xlsx::color::{Color, Palette};
use crate::xlsx::format::Format;
use crate::xlsx::utility::CellRange;
use phf::phf_map;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as FmtWrite;

/// User-facing rule types and the schema types they start as.
static RULE_TYPES: phf::Map<&'static str, &'static str> = phf_map! {
    "cell" => "cellIs",
    "date" => "date",
    "time" => "time",
    "average" => "aboveAverage",
    "duplicate" => "duplicateValues",
    "unique" => "uniqueValues",
    "top" => "top10",
    "bottom" => "top10",
    "text" => "text",
    "time_period" => "timePeriod",
    "blanks" => "containsBlanks",
    "no_blanks" => "notContainsBlanks",
    "errors" => "containsErrors",
    "no_errors" => "notContainsErrors",
    "2_color_scale" => "2_color_scale",
    "3_color_scale" => "3_color_scale",
    "data_bar" => "dataBar",
    "formula" => "expression",
};

/// Options for one conditional format rule.
///
/// `kind` is required; which other fields apply depends on it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConditionalFormat {
    #[serde(rename = "type")]
    pub kind: String,
    /// Differential format applied when the rule matches.
    #[serde(skip)]
    pub format: Option<Format>,
    pub criteria: Option<String>,
    pub value: Option<OptionValue>,
    pub minimum: Option<OptionValue>,
    pub maximum: Option<OptionValue>,
    pub min_type: Option<String>,
    pub mid_type: Option<String>,
    pub max_type: Option<String>,
    pub min_value: Option<OptionValue>,
    pub mid_value: Option<OptionValue>,
    pub max_value: Option<OptionValue>,
    pub min_color: Option<String>,
    pub mid_color: Option<String>,
    pub max_color: Option<String>,
    pub bar_color: Option<String>,
}

impl ConditionalFormat {
    pub fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            ..Default::default()
        }
    }

    pub fn with_criteria(mut self, criteria: &str) -> Self {
        self.criteria = Some(criteria.to_string());
        self
    }

    pub fn with_value(mut self, value: impl Into<OptionValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_range(mut self, minimum: impl Into<OptionValue>, maximum: impl Into<OptionValue>) -> Self {
        self.minimum = Some(minimum.into());
        self.maximum = Some(maximum.into());
        self
    }

    pub fn with_format(mut self, format: &Format) -> Self {
        self.format = Some(format.clone());
        self
    }
}

/// One `<cfvo>` entry of a color scale or data bar.
#[derive(Debug, Clone, PartialEq)]
struct Cfvo {
    kind: String,
    value: OptionValue,
}

#[derive(Debug, Clone, PartialEq)]
enum RuleBody {
    CellIs {
        operator: String,
        formulas: Vec<String>,
    },
    AboveAverage {
        criteria: String,
    },
    Top10 {
        percent: bool,
        bottom: bool,
        rank: String,
    },
    /// Duplicate or unique values: no children.
    Empty,
    Text {
        operator: String,
        text: String,
        formula: String,
    },
    TimePeriod {
        period: String,
        formula: String,
    },
    Formula(String),
    ColorScale {
        cfvos: Vec<Cfvo>,
        colors: Vec<String>,
    },
    DataBar {
        min: Cfvo,
        max: Cfvo,
        color: String,
    },
}

/// A compiled rule.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalRule {
    rule_type: &'static str,
    dxf_id: Option<u32>,
    priority: u32,
    body: RuleBody,
}

impl ConditionalRule {
    pub fn rule_type(&self) -> &'static str {
        self.rule_type
    }

    pub fn priority(&self) -> u32 {
        self.priority
    }

    /// The synthesized or user formula, for rule types that carry one.
    pub fn formula(&self) -> Option<&str> {
        match &self.body {
            RuleBody::Text { formula, .. }
            | RuleBody::TimePeriod { formula, .. }
            | RuleBody::Formula(formula) => Some(formula),
            _ => None,
        }
    }
}

/// Formula for a time-period rule anchored at `cell`.
fn time_period_formula(period: &str, cell: &str) -> Option<String> {
    let c = cell;
    Some(match period {
        "yesterday" => format!("FLOOR({c},1)=TODAY()-1"),
        "today" => format!("FLOOR({c},1)=TODAY()"),
        "tomorrow" => format!("FLOOR({c},1)=TODAY()+1"),
        "last7Days" => format!("AND(TODAY()-FLOOR({c},1)<=6,FLOOR({c},1)<=TODAY())"),
        "lastWeek" => format!(
            "AND(TODAY()-ROUNDDOWN({c},0)>=(WEEKDAY(TODAY())),TODAY()-ROUNDDOWN({c},0)<(WEEKDAY(TODAY())+7))"
        ),
        "thisWeek" => format!(
            "AND(TODAY()-ROUNDDOWN({c},0)<=WEEKDAY(TODAY())-1,ROUNDDOWN({c},0)-TODAY()<=7-WEEKDAY(TODAY()))"
        ),
        "nextWeek" => format!(
            "AND(ROUNDDOWN({c},0)-TODAY()>(7-WEEKDAY(TODAY())),ROUNDDOWN({c},0)-TODAY()<(15-WEEKDAY(TODAY())))"
        ),
        // Excel's own formula checks the year of A1 regardless of the anchor.
        "lastMonth" => format!(
            "AND(MONTH({c})=MONTH(TODAY())-1,OR(YEAR({c})=YEAR(TODAY()),AND(MONTH({c})=1,YEAR(A1)=YEAR(TODAY())-1)))"
        ),
        "thisMonth" => format!("AND(MONTH({c})=MONTH(TODAY()),YEAR({c})=YEAR(TODAY()))"),
        "nextMonth" => format!(
            "AND(MONTH({c})=MONTH(TODAY())+1,OR(YEAR({c})=YEAR(TODAY()),AND(MONTH({c})=12,YEAR({c})=YEAR(TODAY())+1)))"
        ),
        _ => return None,
    })
}

fn cfvo(kind: &Option<String>, default_kind: &str, value: &Option<OptionValue>, default_value: f64) -> Cfvo {
    Cfvo {
        kind: kind.clone().unwrap_or_else(|| default_kind.to_string()),
        value: value.clone().unwrap_or(OptionValue::Number(default_value)),
    }
}

fn resolve_color(palette: &Palette, color: &Option<String>, default: &str) -> Result<String> {
    let text = color.as_deref().unwrap_or(default);
    palette.argb(Color::parse(text)?)
}

/// Compile user options into a rule anchored at `start_cell`.
fn compile(
    options: &ConditionalFormat,
    start_cell: &str,
    priority: u32,
    palette: &Palette,
    date_1904: bool,
) -> Result<ConditionalRule> {
    const METHOD: &str = "conditional_formatting";

    let user_type = options.kind.to_lowercase();
    let base_type = RULE_TYPES
        .get(user_type.as_str())
        .copied()
        .ok_or_else(|| Error::option(METHOD, "type", options.kind.as_str()))?;

    let criteria = options.criteria.as_deref().map(normalize_criteria);
    let dxf_id = options.format.as_ref().and_then(Format::dxf_index);
    let missing = |param| Error::MissingParameter {
        method: METHOD,
        param,
    };

    let (rule_type, dxf_id, body) = match base_type {
        "cellIs" | "date" | "time" => {
            let operator = criteria.ok_or_else(|| missing("criteria"))?;
            if !is_comparison(&operator) {
                return Err(Error::option(METHOD, "criteria", operator));
            }
            let formulas = if operator == "between" || operator == "notBetween" {
                let min = options.minimum.as_ref().ok_or_else(|| missing("minimum"))?;
                let max = options.maximum.as_ref().ok_or_else(|| missing("maximum"))?;
                vec![
                    min.to_serial_date(date_1904)?.to_formula(),
                    max.to_serial_date(date_1904)?.to_formula(),
                ]
            } else {
                let value = options.value.as_ref().ok_or_else(|| missing("value"))?;
                vec![value.to_serial_date(date_1904)?.to_formula()]
            };
            ("cellIs", dxf_id, RuleBody::CellIs { operator, formulas })
        },
        "aboveAverage" => (
            "aboveAverage",
            dxf_id,
            RuleBody::AboveAverage {
                criteria: criteria.unwrap_or_default(),
            },
        ),
        "top10" => (
            "top10",
            dxf_id,
            RuleBody::Top10 {
                percent: criteria.as_deref() == Some("%"),
                bottom: user_type == "bottom",
                rank: options
                    .value
                    .as_ref()
                    .map_or_else(|| "10".to_string(), OptionValue::to_string),
            },
        ),
        "duplicateValues" | "uniqueValues" => (base_type, dxf_id, RuleBody::Empty),
        "text" => {
            let operator = criteria.ok_or_else(|| missing("criteria"))?;
            let text = options.value.as_ref().ok_or_else(|| missing("value"))?.to_string();
            let (rule_type, formula) = match operator.as_str() {
                "containsText" => (
                    "containsText",
                    format!(r#"NOT(ISERROR(SEARCH("{}",{})))"#, text, start_cell),
                ),
                "notContains" => (
                    "notContainsText",
                    format!(r#"ISERROR(SEARCH("{}",{}))"#, text, start_cell),
                ),
                "beginsWith" => ("beginsWith", format!(r#"LEFT({},1)="{}""#, start_cell, text)),
                "endsWith" => ("endsWith", format!(r#"RIGHT({},1)="{}""#, start_cell, text)),
                _ => return Err(Error::option(METHOD, "criteria", operator)),
            };
            (
                rule_type,
                dxf_id,
                RuleBody::Text {
                    operator,
                    text,
                    formula,
                },
            )
        },
        "timePeriod" => {
            let period = criteria.ok_or_else(|| missing("criteria"))?;
            let formula = time_period_formula(&period, start_cell)
                .ok_or_else(|| Error::option(METHOD, "criteria", period.as_str()))?;
            ("timePeriod", dxf_id, RuleBody::TimePeriod { period, formula })
        },
        "containsBlanks" => (
            base_type,
            dxf_id,
            RuleBody::Formula(format!("LEN(TRIM({}))=0", start_cell)),
        ),
        "notContainsBlanks" => (
            base_type,
            dxf_id,
            RuleBody::Formula(format!("LEN(TRIM({}))>0", start_cell)),
        ),
        "containsErrors" => (
            base_type,
            dxf_id,
            RuleBody::Formula(format!("ISERROR({})", start_cell)),
        ),
        "notContainsErrors" => (
            base_type,
            dxf_id,
            RuleBody::Formula(format!("NOT(ISERROR({}))", start_cell)),
        ),
        "2_color_scale" => {
            let cfvos = vec![
                cfvo(&options.min_type, "min", &options.min_value, 0.0),
                cfvo(&options.max_type, "max", &options.max_value, 0.0),
            ];
            let colors = vec![
                resolve_color(palette, &options.min_color, "#FF7128")?,
                resolve_color(palette, &options.max_color, "#FFEF9C")?,
            ];
            ("colorScale", None, RuleBody::ColorScale { cfvos, colors })
        },
        "3_color_scale" => {
            let cfvos = vec![
                cfvo(&options.min_type, "min", &options.min_value, 0.0),
                cfvo(&options.mid_type, "percentile", &options.mid_value, 50.0),
                cfvo(&options.max_type, "max", &options.max_value, 0.0),
            ];
            let colors = vec![
                resolve_color(palette, &options.min_color, "#F8696B")?,
                resolve_color(palette, &options.mid_color, "#FFEB84")?,
                resolve_color(palette, &options.max_color, "#63BE7B")?,
            ];
            ("colorScale", None, RuleBody::ColorScale { cfvos, colors })
        },
        "dataBar" => (
            "dataBar",
            None,
            RuleBody::DataBar {
                min: cfvo(&options.min_type, "min", &options.min_value, 0.0),
                max: cfvo(&options.max_type, "max", &options.max_value, 0.0),
                color: resolve_color(palette, &options.bar_color, "#638EC6")?,
            },
        ),
        _ => {
            // `formula`: the criteria holds the user's expression.
            let formula = options
                .criteria
                .as_deref()
                .ok_or_else(|| missing("criteria"))?;
            (
                "expression",
                dxf_id,
                RuleBody::Formula(formula.strip_prefix('=').unwrap_or(formula).to_string()),
            )
        },
    };

    Ok(ConditionalRule {
        rule_type,
        dxf_id,
        priority,
        body,
    })
}

/// Conditional formats of a worksheet, keyed by their `sqref` text.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalFormats {
    rules: BTreeMap<String, Vec<ConditionalRule>>,
    next_priority: u32,
}

impl Default for ConditionalFormats {
    fn default() -> Self {
        Self {
            rules: BTreeMap::new(),
            next_priority: 1,
        }
    }
}

impl ConditionalFormats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules registered for an `sqref`, in priority order.
    pub fn rules(&self, sqref: &str) -> Option<&[ConditionalRule]> {
        self.rules.get(sqref).map(Vec::as_slice)
    }

    /// Register a rule over one or more ranges.
    ///
    /// `ranges` holds the rectangles in user order; the first one anchors
    /// synthesized formulas.
    pub fn add(
        &mut self,
        ranges: &[CellRange],
        options: &ConditionalFormat,
        palette: &Palette,
        date_1904: bool,
    ) -> Result<()> {
        let first = ranges.first().ok_or_else(|| {
            Error::InsufficientArgument("conditional_formatting requires a range".into())
        })?;
        for r in ranges {
            r.check()?;
        }

        let start_cell = first.first_cell();
        let rule = compile(options, &start_cell, self.next_priority, palette, date_1904)?;

        let sqref = ranges
            .iter()
            .map(CellRange::to_sqref)
            .collect::<Vec<_>>()
            .join(" ");
        self.next_priority += 1;
        self.rules.entry(sqref).or_default().push(rule);
        Ok(())
    }

    /// Write every `<conditionalFormatting>` element.
    pub fn write_xml(&self, xml: &mut String) -> Result<()> {
        for (sqref, rules) in &self.rules {
            write!(xml, r#"<conditionalFormatting sqref="{}">"#, sqref)?;
            for rule in rules {
                write_cf_rule(xml, rule)?;
            }
            xml.push_str("</conditionalFormatting>");
        }
        Ok(())
    }
}

fn write_formula_tag(xml: &mut String, formula: &str) -> Result<()> {
    let formula = formula.strip_prefix('=').unwrap_or(formula);
    write!(xml, "<formula>{}</formula>", escape_data(formula))?;
    Ok(())
}

fn write_cfvo(xml: &mut String, cfvo: &Cfvo) -> Result<()> {
    write!(
        xml,
        r#"<cfvo type="{}" val="{}"/>"#,
        escape_attr(&cfvo.kind),
        escape_attr(&cfvo.value.to_string())
    )?;
    Ok(())
}

fn write_cf_rule(xml: &mut String, rule: &ConditionalRule) -> Result<()> {
    write!(xml, r#"<cfRule type="{}""#, rule.rule_type)?;
    if let Some(dxf) = rule.dxf_id {
        write!(xml, r#" dxfId="{}""#, dxf)?;
    }
    write!(xml, r#" priority="{}""#, rule.priority)?;

    match &rule.body {
        RuleBody::CellIs { operator, formulas } => {
            write!(xml, r#" operator="{}">"#, operator)?;
            for f in formulas {
                write_formula_tag(xml, f)?;
            }
        },
        RuleBody::AboveAverage { criteria } => {
            if criteria.contains("below") {
                xml.push_str(r#" aboveAverage="0""#);
            }
            if criteria.contains("equal") {
                xml.push_str(r#" equalAverage="1""#);
            }
            if let Some(dev) = std_dev(criteria) {
                write!(xml, r#" stdDev="{}""#, dev)?;
            }
            xml.push_str("/>");
            return Ok(());
        },
        RuleBody::Top10 {
            percent,
            bottom,
            rank,
        } => {
            if *percent {
                xml.push_str(r#" percent="1""#);
            }
            if *bottom {
                xml.push_str(r#" bottom="1""#);
            }
            write!(xml, r#" rank="{}"/>"#, escape_attr(rank))?;
            return Ok(());
        },
        RuleBody::Empty => {
            xml.push_str("/>");
            return Ok(());
        },
        RuleBody::Text {
            operator,
            text,
            formula,
        } => {
            write!(
                xml,
                r#" operator="{}" text="{}">"#,
                operator,
                escape_attr(text)
            )?;
            write_formula_tag(xml, formula)?;
        },
        RuleBody::TimePeriod { period, formula } => {
            write!(xml, r#" timePeriod="{}">"#, period)?;
            write_formula_tag(xml, formula)?;
        },
        RuleBody::Formula(formula) => {
            xml.push('>');
            write_formula_tag(xml, formula)?;
        },
        RuleBody::ColorScale { cfvos, colors } => {
            xml.push_str("><colorScale>");
            for c in cfvos {
                write_cfvo(xml, c)?;
            }
            for color in colors {
                write!(xml, r#"<color rgb="{}"/>"#, color)?;
            }
            xml.push_str("</colorScale>");
        },
        RuleBody::DataBar { min, max, color } => {
            xml.push_str("><dataBar>");
            write_cfvo(xml, min)?;
            write_cfvo(xml, max)?;
            write!(xml, r#"<color rgb="{}"/>"#, color)?;
            xml.push_str("</dataBar>");
        },
    }
    xml.push_str("</cfRule>");
    Ok(())
}

/// The `N` of an `"N std dev"` average criteria, for N in 1..=3.
fn std_dev(criteria: &str) -> Option<char> {
    let idx = criteria.find(" std dev")?;
    let digit = criteria[..idx].chars().last()?;
    ('1'..='3').contains(&digit).then_some(digit)
}
