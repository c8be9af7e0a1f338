//! Typed validation and conditional-format rule specs.
//!
//! Each rule kind is a closed tagged variant carrying only the fields
//! its kind needs; arity and completeness are checked when the wire
//! payload is built, not left for the remote service to reject.

use crate::requests::{
    CellFormat, ConditionPayload, ConditionalFormatRuleKind, ConditionalFormatRulePayload,
    DataValidationRulePayload, GridRange, InterpolationPoint,
};
use anyhow::{Result, bail};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CompareCondition {
    #[serde(alias = "GREATER_THAN")]
    GreaterThan,
    #[serde(alias = "GREATER_THAN_OR_EQUAL")]
    GreaterThanOrEqual,
    #[serde(alias = "LESS_THAN")]
    LessThan,
    #[serde(alias = "LESS_THAN_OR_EQUAL")]
    LessThanOrEqual,
    #[serde(alias = "EQUAL")]
    Equal,
    #[serde(alias = "NOT_EQUAL")]
    NotEqual,
    #[serde(alias = "BETWEEN")]
    Between,
    #[serde(alias = "NOT_BETWEEN")]
    NotBetween,
}

impl CompareCondition {
    fn is_pair(self) -> bool {
        matches!(self, Self::Between | Self::NotBetween)
    }

    fn expected_arity(self) -> usize {
        if self.is_pair() { 2 } else { 1 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationRule {
    /// Dropdown from an inline list of values.
    List { values: Vec<String> },
    /// Dropdown sourced from another range.
    ListFromRange { source_range: String },
    Number {
        condition: CompareCondition,
        values: Vec<f64>,
    },
    Date {
        condition: CompareCondition,
        values: Vec<String>,
    },
    /// No native text-length condition exists on the wire; compiled to
    /// a CUSTOM_FORMULA over LEN() of the range's anchor cell.
    TextLength {
        condition: CompareCondition,
        values: Vec<u64>,
    },
    CustomFormula { formula: String },
    Checkbox,
}

impl ValidationRule {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::List { .. } | Self::ListFromRange { .. } => "LIST",
            Self::Number { .. } => "NUMBER",
            Self::Date { .. } => "DATE",
            Self::TextLength { .. } => "TEXT_LENGTH",
            Self::CustomFormula { .. } => "CUSTOM",
            Self::Checkbox => "CHECKBOX",
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Self::List { .. } | Self::ListFromRange { .. })
    }

    /// Build the wire condition. `default_sheet` qualifies an
    /// unqualified list source range; `target_range` supplies the
    /// anchor cell for the text-length formula.
    pub fn to_condition(&self, default_sheet: &str, target_range: &str) -> Result<ConditionPayload> {
        match self {
            Self::List { values } => {
                if values.is_empty() {
                    bail!("list validation requires at least one value");
                }
                Ok(ConditionPayload::new("ONE_OF_LIST", values.clone()))
            }
            Self::ListFromRange { source_range } => {
                let mut source = source_range.trim().to_string();
                if source.is_empty() {
                    bail!("list validation source_range is empty");
                }
                if !source.contains('!') {
                    source = format!("{default_sheet}!{source}");
                }
                if !source.starts_with('=') {
                    source = format!("={source}");
                }
                Ok(ConditionPayload::new("ONE_OF_RANGE", vec![source]))
            }
            Self::Number { condition, values } => {
                check_arity("number", *condition, values.len())?;
                let kind = match condition {
                    CompareCondition::GreaterThan => "NUMBER_GREATER",
                    CompareCondition::GreaterThanOrEqual => "NUMBER_GREATER_THAN_EQ",
                    CompareCondition::LessThan => "NUMBER_LESS",
                    CompareCondition::LessThanOrEqual => "NUMBER_LESS_THAN_EQ",
                    CompareCondition::Equal => "NUMBER_EQ",
                    CompareCondition::NotEqual => "NUMBER_NOT_EQ",
                    CompareCondition::Between => "NUMBER_BETWEEN",
                    CompareCondition::NotBetween => "NUMBER_NOT_BETWEEN",
                };
                Ok(ConditionPayload::new(
                    kind,
                    values.iter().map(|v| v.to_string()).collect(),
                ))
            }
            Self::Date { condition, values } => {
                check_arity("date", *condition, values.len())?;
                let kind = match condition {
                    CompareCondition::GreaterThan => "DATE_AFTER",
                    CompareCondition::LessThan => "DATE_BEFORE",
                    CompareCondition::Equal => "DATE_EQ",
                    CompareCondition::Between => "DATE_BETWEEN",
                    other => bail!("date validation does not support condition {other:?}"),
                };
                Ok(ConditionPayload::new(kind, values.clone()))
            }
            Self::TextLength { condition, values } => {
                check_arity("text_length", *condition, values.len())?;
                let anchor = anchor_cell(target_range);
                let formula = match condition {
                    CompareCondition::LessThan => format!("=LEN({anchor})<{}", values[0]),
                    CompareCondition::LessThanOrEqual => format!("=LEN({anchor})<={}", values[0]),
                    CompareCondition::GreaterThan => format!("=LEN({anchor})>{}", values[0]),
                    CompareCondition::GreaterThanOrEqual => format!("=LEN({anchor})>={}", values[0]),
                    CompareCondition::Between => format!(
                        "=AND(LEN({anchor})>={},LEN({anchor})<={})",
                        values[0], values[1]
                    ),
                    other => bail!("text_length validation does not support condition {other:?}"),
                };
                Ok(ConditionPayload::new("CUSTOM_FORMULA", vec![formula]))
            }
            Self::CustomFormula { formula } => {
                if formula.trim().is_empty() {
                    bail!("custom validation formula is empty");
                }
                Ok(ConditionPayload::new("CUSTOM_FORMULA", vec![formula.clone()]))
            }
            Self::Checkbox => Ok(ConditionPayload::new("BOOLEAN", Vec::new())),
        }
    }

    pub fn to_payload(
        &self,
        default_sheet: &str,
        target_range: &str,
        input_message: Option<&str>,
        reject_invalid: bool,
        show_dropdown: bool,
    ) -> Result<DataValidationRulePayload> {
        Ok(DataValidationRulePayload {
            condition: self.to_condition(default_sheet, target_range)?,
            input_message: input_message.unwrap_or_default().to_string(),
            strict: reject_invalid,
            show_custom_ui: if self.is_list() { show_dropdown } else { true },
        })
    }
}

fn check_arity(kind: &str, condition: CompareCondition, got: usize) -> Result<()> {
    let want = condition.expected_arity();
    if got != want {
        bail!("{kind} validation with condition {condition:?} requires {want} value(s), got {got}");
    }
    Ok(())
}

/// The cell the original anchors LEN() formulas on: the last corner
/// token of the range text, sheet qualifier stripped.
fn anchor_cell(range_text: &str) -> &str {
    let corner = range_text.rsplit(':').next().unwrap_or(range_text);
    corner.rsplit('!').next().unwrap_or(corner)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConditionKind {
    #[serde(alias = "NUMBER_GREATER")]
    NumberGreater,
    #[serde(alias = "NUMBER_GREATER_THAN_EQ")]
    NumberGreaterThanEq,
    #[serde(alias = "NUMBER_LESS")]
    NumberLess,
    #[serde(alias = "NUMBER_LESS_THAN_EQ")]
    NumberLessThanEq,
    #[serde(alias = "NUMBER_EQ")]
    NumberEq,
    #[serde(alias = "NUMBER_NOT_EQ")]
    NumberNotEq,
    #[serde(alias = "NUMBER_BETWEEN")]
    NumberBetween,
    #[serde(alias = "NUMBER_NOT_BETWEEN")]
    NumberNotBetween,
    #[serde(alias = "TEXT_CONTAINS")]
    TextContains,
    #[serde(alias = "TEXT_NOT_CONTAINS")]
    TextNotContains,
    #[serde(alias = "TEXT_STARTS_WITH")]
    TextStartsWith,
    #[serde(alias = "TEXT_ENDS_WITH")]
    TextEndsWith,
    #[serde(alias = "TEXT_EQ")]
    TextEq,
    #[serde(alias = "BLANK")]
    Blank,
    #[serde(alias = "NOT_BLANK")]
    NotBlank,
}

impl ConditionKind {
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::NumberGreater => "NUMBER_GREATER",
            Self::NumberGreaterThanEq => "NUMBER_GREATER_THAN_EQ",
            Self::NumberLess => "NUMBER_LESS",
            Self::NumberLessThanEq => "NUMBER_LESS_THAN_EQ",
            Self::NumberEq => "NUMBER_EQ",
            Self::NumberNotEq => "NUMBER_NOT_EQ",
            Self::NumberBetween => "NUMBER_BETWEEN",
            Self::NumberNotBetween => "NUMBER_NOT_BETWEEN",
            Self::TextContains => "TEXT_CONTAINS",
            Self::TextNotContains => "TEXT_NOT_CONTAINS",
            Self::TextStartsWith => "TEXT_STARTS_WITH",
            Self::TextEndsWith => "TEXT_ENDS_WITH",
            Self::TextEq => "TEXT_EQ",
            Self::Blank => "BLANK",
            Self::NotBlank => "NOT_BLANK",
        }
    }

    fn expected_arity(self) -> usize {
        match self {
            Self::NumberBetween | Self::NumberNotBetween => 2,
            Self::Blank | Self::NotBlank => 0,
            _ => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PointType {
    #[serde(alias = "MIN")]
    Min,
    #[serde(alias = "MAX")]
    Max,
    #[serde(alias = "MEDIAN")]
    Median,
    #[serde(alias = "NUMBER")]
    Number,
    #[serde(alias = "PERCENT")]
    Percent,
    #[serde(alias = "PERCENTILE")]
    Percentile,
}

impl PointType {
    fn wire_name(self) -> &'static str {
        match self {
            Self::Min => "MIN",
            Self::Max => "MAX",
            Self::Median => "MEDIAN",
            Self::Number => "NUMBER",
            Self::Percent => "PERCENT",
            Self::Percentile => "PERCENTILE",
        }
    }

    fn requires_value(self) -> bool {
        matches!(self, Self::Number | Self::Percent | Self::Percentile)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GradientPoint {
    #[serde(rename = "type")]
    pub kind: PointType,
    #[serde(default)]
    pub value: Option<String>,
    pub color: crate::requests::Color,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DataBarPoint {
    #[serde(rename = "type")]
    pub kind: PointType,
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BarDirection {
    #[default]
    #[serde(alias = "LEFT_TO_RIGHT")]
    LeftToRight,
    #[serde(alias = "RIGHT_TO_LEFT")]
    RightToLeft,
}

impl BarDirection {
    fn wire_name(self) -> &'static str {
        match self {
            Self::LeftToRight => "LEFT_TO_RIGHT",
            Self::RightToLeft => "RIGHT_TO_LEFT",
        }
    }
}

fn interpolation(label: &str, kind: PointType, value: Option<&str>) -> Result<(String, Option<String>)> {
    match (kind.requires_value(), value) {
        (true, None) => bail!("{label} point of type {} requires a value", kind.wire_name()),
        (false, Some(_)) => bail!(
            "{label} point of type {} does not take a value",
            kind.wire_name()
        ),
        _ => Ok((kind.wire_name().to_string(), value.map(str::to_string))),
    }
}

fn gradient_point(label: &str, point: &GradientPoint) -> Result<InterpolationPoint> {
    let (kind, value) = interpolation(label, point.kind, point.value.as_deref())?;
    Ok(InterpolationPoint {
        kind,
        value,
        color: Some(point.color),
    })
}

fn data_bar_point(label: &str, point: &DataBarPoint) -> Result<InterpolationPoint> {
    let (kind, value) = interpolation(label, point.kind, point.value.as_deref())?;
    Ok(InterpolationPoint {
        kind,
        value,
        color: None,
    })
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConditionalFormatRule {
    /// Format cells whose value matches a boolean condition.
    SingleColor {
        condition: ConditionKind,
        #[serde(default)]
        values: Vec<String>,
        format: CellFormat,
    },
    /// Two- or three-color gradient over the range's values.
    ColorScale {
        min_point: GradientPoint,
        #[serde(default)]
        mid_point: Option<GradientPoint>,
        max_point: GradientPoint,
    },
    DataBar {
        #[serde(default)]
        min_point: Option<DataBarPoint>,
        #[serde(default)]
        max_point: Option<DataBarPoint>,
        #[serde(default)]
        color: Option<crate::requests::Color>,
        #[serde(default)]
        direction: Option<BarDirection>,
        #[serde(default)]
        show_value: Option<bool>,
    },
    CustomFormula { formula: String, format: CellFormat },
}

impl ConditionalFormatRule {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::SingleColor { .. } => "SINGLE_COLOR",
            Self::ColorScale { .. } => "COLOR_SCALE",
            Self::DataBar { .. } => "DATA_BAR",
            Self::CustomFormula { .. } => "CUSTOM_FORMULA",
        }
    }

    pub fn to_payload(&self, ranges: Vec<GridRange>) -> Result<ConditionalFormatRulePayload> {
        let kind = match self {
            Self::SingleColor {
                condition,
                values,
                format,
            } => {
                let want = condition.expected_arity();
                if values.len() != want {
                    bail!(
                        "condition {} requires {want} value(s), got {}",
                        condition.wire_name(),
                        values.len()
                    );
                }
                ConditionalFormatRuleKind::BooleanRule {
                    condition: ConditionPayload::new(condition.wire_name(), values.clone()),
                    format: format.clone(),
                }
            }
            Self::ColorScale {
                min_point,
                mid_point,
                max_point,
            } => ConditionalFormatRuleKind::GradientRule {
                min_point: gradient_point("min", min_point)?,
                mid_point: mid_point
                    .as_ref()
                    .map(|p| gradient_point("mid", p))
                    .transpose()?,
                max_point: gradient_point("max", max_point)?,
            },
            Self::DataBar {
                min_point,
                max_point,
                color,
                direction,
                show_value,
            } => {
                let min_default = DataBarPoint {
                    kind: PointType::Min,
                    value: None,
                };
                let max_default = DataBarPoint {
                    kind: PointType::Max,
                    value: None,
                };
                ConditionalFormatRuleKind::DataBarRule {
                    min_point: data_bar_point("min", min_point.as_ref().unwrap_or(&min_default))?,
                    max_point: data_bar_point("max", max_point.as_ref().unwrap_or(&max_default))?,
                    color: color.unwrap_or(crate::requests::Color {
                        red: 0.2,
                        green: 0.5,
                        blue: 1.0,
                    }),
                    direction: direction.unwrap_or_default().wire_name().to_string(),
                    show_value: show_value.unwrap_or(true),
                }
            }
            Self::CustomFormula { formula, format } => {
                if formula.trim().is_empty() {
                    bail!("custom formula rule requires a formula");
                }
                ConditionalFormatRuleKind::BooleanRule {
                    condition: ConditionPayload::new("CUSTOM_FORMULA", vec![formula.clone()]),
                    format: format.clone(),
                }
            }
        };
        Ok(ConditionalFormatRulePayload { ranges, kind })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridRect;
    use serde_json::json;

    #[test]
    fn number_between_requires_two_values() {
        let rule = ValidationRule::Number {
            condition: CompareCondition::Between,
            values: vec![10.0],
        };
        assert!(rule.to_condition("Sheet1", "A1:A10").is_err());

        let rule = ValidationRule::Number {
            condition: CompareCondition::Between,
            values: vec![10.0, 100.0],
        };
        let cond = rule.to_condition("Sheet1", "A1:A10").unwrap();
        assert_eq!(cond.kind, "NUMBER_BETWEEN");
        assert_eq!(cond.values.len(), 2);
    }

    #[test]
    fn list_source_range_is_qualified_and_prefixed() {
        let rule = ValidationRule::ListFromRange {
            source_range: "A1:A10".to_string(),
        };
        let cond = rule.to_condition("Lists", "B1:B5").unwrap();
        assert_eq!(cond.kind, "ONE_OF_RANGE");
        assert_eq!(cond.values[0].user_entered_value, "=Lists!A1:A10");

        let rule = ValidationRule::ListFromRange {
            source_range: "Other!C1:C3".to_string(),
        };
        let cond = rule.to_condition("Lists", "B1:B5").unwrap();
        assert_eq!(cond.values[0].user_entered_value, "=Other!C1:C3");
    }

    #[test]
    fn text_length_compiles_to_len_formula_on_anchor_cell() {
        let rule = ValidationRule::TextLength {
            condition: CompareCondition::LessThan,
            values: vec![100],
        };
        let cond = rule.to_condition("Sheet1", "Sheet1!A1:A10").unwrap();
        assert_eq!(cond.kind, "CUSTOM_FORMULA");
        assert_eq!(cond.values[0].user_entered_value, "=LEN(A10)<100");

        let rule = ValidationRule::TextLength {
            condition: CompareCondition::Between,
            values: vec![2, 8],
        };
        let cond = rule.to_condition("Sheet1", "A1").unwrap();
        assert_eq!(
            cond.values[0].user_entered_value,
            "=AND(LEN(A1)>=2,LEN(A1)<=8)"
        );
    }

    #[test]
    fn date_rejects_unsupported_conditions() {
        let rule = ValidationRule::Date {
            condition: CompareCondition::NotEqual,
            values: vec!["2026-01-01".to_string()],
        };
        assert!(rule.to_condition("Sheet1", "A1").is_err());
    }

    #[test]
    fn checkbox_has_a_bare_boolean_condition() {
        let cond = ValidationRule::Checkbox.to_condition("Sheet1", "A1").unwrap();
        assert_eq!(cond.kind, "BOOLEAN");
        assert!(cond.values.is_empty());
    }

    #[test]
    fn dropdown_visibility_only_applies_to_lists() {
        let list = ValidationRule::List {
            values: vec!["a".to_string()],
        };
        let payload = list.to_payload("S", "A1", None, true, false).unwrap();
        assert!(!payload.show_custom_ui);

        let number = ValidationRule::Number {
            condition: CompareCondition::GreaterThan,
            values: vec![0.0],
        };
        let payload = number.to_payload("S", "A1", None, true, false).unwrap();
        assert!(payload.show_custom_ui);
    }

    #[test]
    fn gradient_points_check_value_completeness() {
        let color = crate::requests::Color {
            red: 1.0,
            green: 0.0,
            blue: 0.0,
        };
        let bad = ConditionalFormatRule::ColorScale {
            min_point: GradientPoint {
                kind: PointType::Percentile,
                value: None,
                color,
            },
            mid_point: None,
            max_point: GradientPoint {
                kind: PointType::Max,
                value: None,
                color,
            },
        };
        assert!(bad.to_payload(Vec::new()).is_err());

        let bad = ConditionalFormatRule::ColorScale {
            min_point: GradientPoint {
                kind: PointType::Min,
                value: Some("5".to_string()),
                color,
            },
            mid_point: None,
            max_point: GradientPoint {
                kind: PointType::Max,
                value: None,
                color,
            },
        };
        assert!(bad.to_payload(Vec::new()).is_err());
    }

    #[test]
    fn data_bar_defaults_match_the_wire_contract() {
        let rule = ConditionalFormatRule::DataBar {
            min_point: None,
            max_point: None,
            color: None,
            direction: None,
            show_value: None,
        };
        let ranges = vec![GridRange::new(3, GridRect::new(0, 5, 0, 1))];
        let payload = rule.to_payload(ranges).unwrap();
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value["dataBarRule"],
            json!({
                "minPoint": {"type": "MIN"},
                "maxPoint": {"type": "MAX"},
                "color": {"red": 0.2, "green": 0.5, "blue": 1.0},
                "direction": "LEFT_TO_RIGHT",
                "showValue": true
            })
        );
    }

    #[test]
    fn single_color_arity_is_enforced() {
        let rule = ConditionalFormatRule::SingleColor {
            condition: ConditionKind::NumberBetween,
            values: vec!["1".to_string()],
            format: CellFormat::default(),
        };
        assert!(rule.to_payload(Vec::new()).is_err());

        let rule = ConditionalFormatRule::SingleColor {
            condition: ConditionKind::NotBlank,
            values: Vec::new(),
            format: CellFormat::default(),
        };
        assert!(rule.to_payload(Vec::new()).is_ok());
    }
}
