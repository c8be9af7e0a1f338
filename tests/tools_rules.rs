use serde_json::json;
use sheets_mcp::requests::{CellFormat, Color};
use sheets_mcp::rules::{
    CompareCondition, ConditionKind, ConditionalFormatRule, DataBarPoint, PointType,
    ValidationRule,
};
use sheets_mcp::service::SpreadsheetService;
use sheets_mcp::tools::{
    AddConditionalFormattingParams, AddDataValidationParams, ClearConditionalFormattingParams,
    ClearDataValidationParams, CreateNamedRangeParams, DeleteNamedRangeParams,
    ListNamedRangesParams, add_conditional_formatting, add_data_validation,
    clear_conditional_formatting, clear_data_validation, create_named_range, delete_named_range,
    list_named_ranges,
};

mod support;
use support::TEST_USER;

#[tokio::test(flavor = "current_thread")]
async fn list_validation_sends_one_of_list_condition() {
    let (ctx, id) = support::seeded_context().await;

    let response = add_data_validation(
        ctx.state.clone(),
        AddDataValidationParams {
            user_email: None,
            spreadsheet_id: id,
            range_name: "Data!B2:B3".to_string(),
            rule: ValidationRule::List {
                values: vec!["Yes".to_string(), "No".to_string()],
            },
            input_message: Some("Pick one".to_string()),
            reject_invalid: true,
            show_dropdown: true,
        },
    )
    .await
    .unwrap();

    assert_eq!(response.kind, "LIST");
    assert_eq!(response.cells_validated, 2);

    let recorded = ctx.service.recorded_requests();
    assert_eq!(
        recorded[0],
        json!({
            "setDataValidation": {
                "range": {
                    "sheetId": 0,
                    "startRowIndex": 1,
                    "endRowIndex": 3,
                    "startColumnIndex": 1,
                    "endColumnIndex": 2
                },
                "rule": {
                    "condition": {
                        "type": "ONE_OF_LIST",
                        "values": [
                            {"userEnteredValue": "Yes"},
                            {"userEnteredValue": "No"}
                        ]
                    },
                    "inputMessage": "Pick one",
                    "strict": true,
                    "showCustomUi": true
                }
            }
        })
    );
}

#[tokio::test(flavor = "current_thread")]
async fn list_from_range_qualifies_unprefixed_source() {
    let (ctx, id) = support::seeded_context().await;

    add_data_validation(
        ctx.state.clone(),
        AddDataValidationParams {
            user_email: None,
            spreadsheet_id: id,
            range_name: "Data!B2:B10".to_string(),
            rule: ValidationRule::ListFromRange {
                source_range: "A1:A10".to_string(),
            },
            input_message: None,
            reject_invalid: true,
            show_dropdown: false,
        },
    )
    .await
    .unwrap();

    let recorded = ctx.service.recorded_requests();
    let condition = recorded[0]
        .pointer("/setDataValidation/rule/condition")
        .unwrap();
    assert_eq!(condition["type"], "ONE_OF_RANGE");
    assert_eq!(
        condition["values"][0]["userEnteredValue"],
        "=Data!A1:A10"
    );
    assert_eq!(
        recorded[0].pointer("/setDataValidation/rule/showCustomUi"),
        Some(&json!(false))
    );
}

#[tokio::test(flavor = "current_thread")]
async fn number_validation_arity_is_checked() {
    let (ctx, id) = support::seeded_context().await;

    let err = add_data_validation(
        ctx.state.clone(),
        AddDataValidationParams {
            user_email: None,
            spreadsheet_id: id,
            range_name: "Data!B2:B3".to_string(),
            rule: ValidationRule::Number {
                condition: CompareCondition::Between,
                values: vec![10.0],
            },
            input_message: None,
            reject_invalid: true,
            show_dropdown: true,
        },
    )
    .await
    .unwrap_err();

    assert!(err.to_string().contains("requires 2 value(s)"));
    assert!(ctx.service.recorded_requests().is_empty());
}

#[tokio::test(flavor = "current_thread")]
async fn text_length_compiles_to_len_formula() {
    let (ctx, id) = support::seeded_context().await;

    add_data_validation(
        ctx.state.clone(),
        AddDataValidationParams {
            user_email: None,
            spreadsheet_id: id,
            range_name: "Data!C2:C10".to_string(),
            rule: ValidationRule::TextLength {
                condition: CompareCondition::LessThan,
                values: vec![100],
            },
            input_message: None,
            reject_invalid: false,
            show_dropdown: true,
        },
    )
    .await
    .unwrap();

    let recorded = ctx.service.recorded_requests();
    let condition = recorded[0]
        .pointer("/setDataValidation/rule/condition")
        .unwrap();
    assert_eq!(condition["type"], "CUSTOM_FORMULA");
    assert_eq!(condition["values"][0]["userEnteredValue"], "=LEN(C10)<100");
    assert_eq!(
        recorded[0].pointer("/setDataValidation/rule/strict"),
        Some(&json!(false))
    );
}

#[tokio::test(flavor = "current_thread")]
async fn clear_data_validation_omits_the_rule() {
    let (ctx, id) = support::seeded_context().await;

    let response = clear_data_validation(
        ctx.state.clone(),
        ClearDataValidationParams {
            user_email: None,
            spreadsheet_id: id,
            range_name: "Data!B2:B10".to_string(),
        },
    )
    .await
    .unwrap();

    assert!(response.text.contains("Successfully cleared data validation"));

    let recorded = ctx.service.recorded_requests();
    assert_eq!(
        recorded[0],
        json!({
            "setDataValidation": {
                "range": {
                    "sheetId": 0,
                    "startRowIndex": 1,
                    "endRowIndex": 10,
                    "startColumnIndex": 1,
                    "endColumnIndex": 2
                }
            }
        })
    );
}

#[tokio::test(flavor = "current_thread")]
async fn single_color_rule_lands_at_index_zero() {
    let (ctx, id) = support::seeded_context().await;

    let response = add_conditional_formatting(
        ctx.state.clone(),
        AddConditionalFormattingParams {
            user_email: None,
            spreadsheet_id: id,
            range_name: "Data!B2:B3".to_string(),
            rule: ConditionalFormatRule::SingleColor {
                condition: ConditionKind::NumberGreater,
                values: vec!["100".to_string()],
                format: CellFormat {
                    background_color: Some(Color {
                        red: 0.0,
                        green: 1.0,
                        blue: 0.0,
                    }),
                    ..CellFormat::default()
                },
            },
        },
    )
    .await
    .unwrap();

    assert_eq!(response.kind, "SINGLE_COLOR");
    assert_eq!(response.cells_formatted, 2);

    let recorded = ctx.service.recorded_requests();
    assert_eq!(
        recorded[0]
            .pointer("/addConditionalFormatRule/index")
            .unwrap(),
        &json!(0)
    );
    let rule = recorded[0]
        .pointer("/addConditionalFormatRule/rule")
        .unwrap();
    assert_eq!(rule["booleanRule"]["condition"]["type"], "NUMBER_GREATER");
    assert_eq!(
        rule["booleanRule"]["format"]["backgroundColor"]["green"],
        1.0
    );
}

#[tokio::test(flavor = "current_thread")]
async fn data_bar_rule_fills_in_defaults() {
    let (ctx, id) = support::seeded_context().await;

    add_conditional_formatting(
        ctx.state.clone(),
        AddConditionalFormattingParams {
            user_email: None,
            spreadsheet_id: id,
            range_name: "Data!B2:B3".to_string(),
            rule: ConditionalFormatRule::DataBar {
                min_point: None,
                max_point: Some(DataBarPoint {
                    kind: PointType::Number,
                    value: Some("200".to_string()),
                }),
                color: None,
                direction: None,
                show_value: None,
            },
        },
    )
    .await
    .unwrap();

    let recorded = ctx.service.recorded_requests();
    let bar = recorded[0]
        .pointer("/addConditionalFormatRule/rule/dataBarRule")
        .unwrap();
    assert_eq!(bar["minPoint"], json!({"type": "MIN"}));
    assert_eq!(
        bar["maxPoint"],
        json!({"type": "NUMBER", "value": "200"})
    );
    assert_eq!(bar["direction"], "LEFT_TO_RIGHT");
    assert_eq!(bar["showValue"], true);
    assert_eq!(bar["color"], json!({"red": 0.2, "green": 0.5, "blue": 1.0}));
}

#[tokio::test(flavor = "current_thread")]
async fn clear_conditional_formatting_scopes_and_counts() {
    let (ctx, id) = support::seeded_context().await;

    for range in ["Data!B2:B3", "Data!C2:C3", "Target!A1:A5"] {
        add_conditional_formatting(
            ctx.state.clone(),
            AddConditionalFormattingParams {
                user_email: None,
                spreadsheet_id: id.clone(),
                range_name: range.to_string(),
                rule: ConditionalFormatRule::CustomFormula {
                    formula: "=$B2>100".to_string(),
                    format: CellFormat::default(),
                },
            },
        )
        .await
        .unwrap();
    }

    let response = clear_conditional_formatting(
        ctx.state.clone(),
        ClearConditionalFormattingParams {
            user_email: None,
            spreadsheet_id: id.clone(),
            sheet_name: Some("Data".to_string()),
        },
    )
    .await
    .unwrap();

    assert_eq!(response.rules_cleared, 2);
    assert!(response.text.contains("from sheet 'Data'"));

    let meta = ctx.service.get_metadata(TEST_USER, &id).await.unwrap();
    assert_eq!(meta.sheets[0].conditional_format_count, 0);
    assert_eq!(meta.sheets[1].conditional_format_count, 1);
}

#[tokio::test(flavor = "current_thread")]
async fn clear_conditional_formatting_with_nothing_to_clear() {
    let (ctx, id) = support::seeded_context().await;

    let response = clear_conditional_formatting(
        ctx.state.clone(),
        ClearConditionalFormattingParams {
            user_email: None,
            spreadsheet_id: id,
            sheet_name: None,
        },
    )
    .await
    .unwrap();

    assert_eq!(response.rules_cleared, 0);
    assert!(response.text.starts_with("No conditional formatting rules"));
    assert!(ctx.service.recorded_requests().is_empty());
}

#[tokio::test(flavor = "current_thread")]
async fn named_range_lifecycle() {
    let (ctx, id) = support::seeded_context().await;

    create_named_range(
        ctx.state.clone(),
        CreateNamedRangeParams {
            user_email: None,
            spreadsheet_id: id.clone(),
            name: "SalesData".to_string(),
            range_name: "Data!A1:C3".to_string(),
        },
    )
    .await
    .unwrap();

    let listed = list_named_ranges(
        ctx.state.clone(),
        ListNamedRangesParams {
            user_email: None,
            spreadsheet_id: id.clone(),
        },
    )
    .await
    .unwrap();

    assert_eq!(listed.named_ranges.len(), 1);
    assert_eq!(listed.named_ranges[0].name, "SalesData");
    assert_eq!(listed.named_ranges[0].range, "Data!A1:C3");
    assert!(listed.text.contains("Found 1 named ranges"));

    delete_named_range(
        ctx.state.clone(),
        DeleteNamedRangeParams {
            user_email: None,
            spreadsheet_id: id.clone(),
            named_range_id: listed.named_ranges[0].named_range_id.clone(),
        },
    )
    .await
    .unwrap();

    let empty = list_named_ranges(
        ctx.state.clone(),
        ListNamedRangesParams {
            user_email: None,
            spreadsheet_id: id,
        },
    )
    .await
    .unwrap();
    assert!(empty.named_ranges.is_empty());
    assert!(empty.text.starts_with("No named ranges found"));
}
