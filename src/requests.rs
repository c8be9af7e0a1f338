//! Typed construction of batchUpdate request payloads.
//!
//! Every mutation variant embeds a [`GridRange`]: the resolved numeric
//! sheet id plus zero-based half-open bounds, serialized in the exact
//! camelCase field shape the batch-mutation protocol expects.

use crate::grid::GridRect;
use schemars::JsonSchema;
use serde::de;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GridRange {
    pub sheet_id: i64,
    pub start_row_index: u32,
    pub end_row_index: u32,
    pub start_column_index: u32,
    pub end_column_index: u32,
}

impl GridRange {
    pub fn new(sheet_id: i64, rect: GridRect) -> Self {
        Self {
            sheet_id,
            start_row_index: rect.start_row,
            end_row_index: rect.end_row,
            start_column_index: rect.start_col,
            end_column_index: rect.end_col,
        }
    }

    pub fn rect(&self) -> GridRect {
        GridRect::new(
            self.start_row_index,
            self.end_row_index,
            self.start_column_index,
            self.end_column_index,
        )
    }
}

/// A single anchor cell, used as the cutPaste destination.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GridCoordinate {
    pub sheet_id: i64,
    pub row_index: u32,
    pub column_index: u32,
}

/// RGB color with channels in 0.0..=1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TextFormat {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreground_color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strikethrough: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all(serialize = "SCREAMING_SNAKE_CASE", deserialize = "snake_case"))]
pub enum BorderStyle {
    #[serde(alias = "SOLID")]
    Solid,
    #[serde(alias = "SOLID_MEDIUM")]
    SolidMedium,
    #[serde(alias = "SOLID_THICK")]
    SolidThick,
    #[serde(alias = "DASHED")]
    Dashed,
    #[serde(alias = "DOTTED")]
    Dotted,
    #[serde(alias = "DOUBLE")]
    Double,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Border {
    pub style: BorderStyle,
    #[serde(default = "default_border_width")]
    pub width: u32,
    #[serde(default = "default_border_color")]
    pub color: Color,
}

fn default_border_width() -> u32 {
    1
}

fn default_border_color() -> Color {
    Color {
        red: 0.0,
        green: 0.0,
        blue: 0.0,
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct Borders {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<Border>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom: Option<Border>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<Border>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<Border>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all(serialize = "SCREAMING_SNAKE_CASE", deserialize = "snake_case"))]
pub enum NumberFormatType {
    #[serde(alias = "NUMBER")]
    Number,
    #[serde(alias = "CURRENCY")]
    Currency,
    #[serde(alias = "PERCENT")]
    Percent,
    #[serde(alias = "DATE")]
    Date,
    #[serde(alias = "TIME")]
    Time,
    #[serde(alias = "DATE_TIME")]
    DateTime,
    #[serde(alias = "SCIENTIFIC")]
    Scientific,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NumberFormat {
    #[serde(rename = "type")]
    pub kind: NumberFormatType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all(serialize = "SCREAMING_SNAKE_CASE", deserialize = "snake_case"))]
pub enum HorizontalAlignment {
    #[serde(alias = "LEFT")]
    Left,
    #[serde(alias = "CENTER")]
    Center,
    #[serde(alias = "RIGHT")]
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all(serialize = "SCREAMING_SNAKE_CASE", deserialize = "snake_case"))]
pub enum VerticalAlignment {
    #[serde(alias = "TOP")]
    Top,
    #[serde(alias = "MIDDLE")]
    Middle,
    #[serde(alias = "BOTTOM")]
    Bottom,
}

/// Serializes into the `userEnteredFormat` wire shape. Also reused as
/// the "format" object of a boolean conditional-format rule, which has
/// the same field layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CellFormat {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_format: Option<TextFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizontal_alignment: Option<HorizontalAlignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical_alignment: Option<VerticalAlignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub borders: Option<Borders>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_format: Option<NumberFormat>,
}

impl CellFormat {
    pub fn is_empty(&self) -> bool {
        self.background_color.is_none()
            && self.text_format.is_none()
            && self.horizontal_alignment.is_none()
            && self.vertical_alignment.is_none()
            && self.borders.is_none()
            && self.number_format.is_none()
    }

    /// Human-readable list of the aspects this format touches.
    pub fn applied_aspects(&self) -> Vec<&'static str> {
        let mut parts = Vec::new();
        if self.background_color.is_some() {
            parts.push("background color");
        }
        if self.text_format.is_some() {
            parts.push("text format");
        }
        if self.horizontal_alignment.is_some() || self.vertical_alignment.is_some() {
            parts.push("alignment");
        }
        if self.borders.is_some() {
            parts.push("borders");
        }
        if self.number_format.is_some() {
            parts.push("number format");
        }
        parts
    }
}

macro_rules! lowercase_param_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: de::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                match s.to_ascii_lowercase().as_str() {
                    $($text => Ok(Self::$variant),)+
                    other => Err(de::Error::unknown_variant(other, &[$($text),+])),
                }
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MergeType {
    #[default]
    MergeAll,
    MergeColumns,
    MergeRows,
}

lowercase_param_enum!(MergeType {
    MergeAll => "merge_all",
    MergeColumns => "merge_columns",
    MergeRows => "merge_rows",
});

impl MergeType {
    pub fn describe(self, rect: GridRect) -> String {
        let rows = rect.row_count();
        let cols = rect.col_count();
        match self {
            MergeType::MergeAll => {
                format!("Merged all {} cells into one", rect.cell_count())
            }
            MergeType::MergeColumns => {
                format!("Merged {rows} rows in each of {cols} columns")
            }
            MergeType::MergeRows => {
                format!("Merged {cols} columns in each of {rows} rows")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueInputOption {
    Raw,
    #[default]
    UserEntered,
}

lowercase_param_enum!(ValueInputOption {
    Raw => "raw",
    UserEntered => "user_entered",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PasteType {
    #[default]
    PasteNormal,
    PasteValues,
    PasteFormat,
    PasteFormula,
}

lowercase_param_enum!(PasteType {
    PasteNormal => "paste_normal",
    PasteValues => "paste_values",
    PasteFormat => "paste_format",
    PasteFormula => "paste_formula",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PasteOrientation {
    #[default]
    Normal,
    Transpose,
}

lowercase_param_enum!(PasteOrientation {
    Normal => "normal",
    Transpose => "transpose",
});

/// One boolean condition in the wire shape:
/// `{"type": "...", "values": [{"userEnteredValue": "..."}]}`.
#[derive(Debug, Clone, Serialize)]
pub struct ConditionPayload {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<ConditionValue>,
}

impl ConditionPayload {
    pub fn new(kind: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            kind: kind.into(),
            values: values.into_iter().map(ConditionValue::new).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionValue {
    pub user_entered_value: String,
}

impl ConditionValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            user_entered_value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataValidationRulePayload {
    pub condition: ConditionPayload,
    pub input_message: String,
    pub strict: bool,
    pub show_custom_ui: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterpolationPoint {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

/// The rule object inside addConditionalFormatRule: a list of ranges
/// plus exactly one of booleanRule / gradientRule / dataBarRule.
#[derive(Debug, Clone, Serialize)]
pub struct ConditionalFormatRulePayload {
    pub ranges: Vec<GridRange>,
    #[serde(flatten)]
    pub kind: ConditionalFormatRuleKind,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ConditionalFormatRuleKind {
    BooleanRule {
        condition: ConditionPayload,
        format: CellFormat,
    },
    GradientRule {
        // Wire keys are lowercase, not camelCase.
        #[serde(rename = "minpoint")]
        min_point: InterpolationPoint,
        #[serde(rename = "midpoint", skip_serializing_if = "Option::is_none")]
        mid_point: Option<InterpolationPoint>,
        #[serde(rename = "maxpoint")]
        max_point: InterpolationPoint,
    },
    DataBarRule {
        #[serde(rename = "minPoint")]
        min_point: InterpolationPoint,
        #[serde(rename = "maxPoint")]
        max_point: InterpolationPoint,
        color: Color,
        direction: String,
        #[serde(rename = "showValue")]
        show_value: bool,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedRangePayload {
    pub name: String,
    pub range: GridRange,
}

#[derive(Debug, Clone, Serialize)]
pub struct SheetTitlePayload {
    pub title: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellDataPayload {
    pub user_entered_format: CellFormat,
}

/// One batchUpdate request. External tagging yields the envelope the
/// protocol expects, e.g. `{"mergeCells": {"range": ..., "mergeType": ...}}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum BatchRequest {
    RepeatCell {
        range: GridRange,
        cell: CellDataPayload,
        fields: String,
    },
    MergeCells {
        range: GridRange,
        merge_type: MergeType,
    },
    UnmergeCells {
        range: GridRange,
    },
    SetDataValidation {
        range: GridRange,
        // Omitting the rule clears validation from the range.
        #[serde(skip_serializing_if = "Option::is_none")]
        rule: Option<DataValidationRulePayload>,
    },
    AddConditionalFormatRule {
        rule: ConditionalFormatRulePayload,
        index: u32,
    },
    DeleteConditionalFormatRule {
        sheet_id: i64,
        index: u32,
    },
    AddNamedRange {
        named_range: NamedRangePayload,
    },
    DeleteNamedRange {
        named_range_id: String,
    },
    AddSheet {
        properties: SheetTitlePayload,
    },
    CopyPaste {
        source: GridRange,
        destination: GridRange,
        paste_type: PasteType,
        paste_orientation: PasteOrientation,
    },
    CutPaste {
        source: GridRange,
        destination: GridCoordinate,
        paste_type: PasteType,
    },
}

impl BatchRequest {
    pub fn repeat_cell_format(range: GridRange, format: CellFormat) -> Self {
        BatchRequest::RepeatCell {
            range,
            cell: CellDataPayload {
                user_entered_format: format,
            },
            fields: "userEnteredFormat".to_string(),
        }
    }
}
