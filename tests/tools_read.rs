use sheets_mcp::requests::{BatchRequest, GridRange, MergeType};
use sheets_mcp::service::SpreadsheetService;
use sheets_mcp::grid::GridRect;
use sheets_mcp::tools::{
    GetSpreadsheetInfoParams, ListSpreadsheetsParams, ReadSheetValuesParams,
    get_spreadsheet_info, list_spreadsheets, read_sheet_values,
};

mod support;
use support::TEST_USER;

#[tokio::test(flavor = "current_thread")]
async fn list_spreadsheets_renders_drive_listing() {
    let (ctx, _id) = support::seeded_context().await;

    let response = list_spreadsheets(
        ctx.state.clone(),
        ListSpreadsheetsParams {
            user_email: None,
            max_results: None,
        },
    )
    .await
    .unwrap();

    assert_eq!(response.count, 1);
    assert_eq!(response.user_email, TEST_USER);
    assert!(response.text.contains("\"Quarterly\""));
}

#[tokio::test(flavor = "current_thread")]
async fn list_spreadsheets_empty_store() {
    let ctx = support::context();
    let response = list_spreadsheets(
        ctx.state.clone(),
        ListSpreadsheetsParams {
            user_email: None,
            max_results: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(response.count, 0);
    assert_eq!(
        response.text,
        format!("No spreadsheets found for {TEST_USER}.")
    );
}

#[tokio::test(flavor = "current_thread")]
async fn read_sheet_values_detects_header_and_rows() {
    let (ctx, id) = support::seeded_context().await;

    let response = read_sheet_values(
        ctx.state.clone(),
        ReadSheetValuesParams {
            user_email: None,
            spreadsheet_id: id,
            range_name: Some("Data!A1:C3".to_string()),
            handle_merged_cells: true,
        },
    )
    .await
    .unwrap();

    assert_eq!(response.row_count, 3);
    assert!(response.text.contains("Header Row:"));
    assert!(response.text.contains("North"));
    assert!(response.merged_regions.is_empty());
}

#[tokio::test(flavor = "current_thread")]
async fn read_sheet_values_annotates_overlapping_merges() {
    let (ctx, id) = support::seeded_context().await;
    ctx.service
        .batch_update(
            TEST_USER,
            &id,
            vec![BatchRequest::MergeCells {
                range: GridRange::new(0, GridRect::new(1, 3, 0, 2)),
                merge_type: MergeType::MergeAll,
            }],
        )
        .await
        .unwrap();

    let response = read_sheet_values(
        ctx.state.clone(),
        ReadSheetValuesParams {
            user_email: None,
            spreadsheet_id: id,
            range_name: Some("Data!A1:C3".to_string()),
            handle_merged_cells: true,
        },
    )
    .await
    .unwrap();

    assert_eq!(response.merged_regions.len(), 1);
    assert_eq!(response.merged_regions[0].a1, "A2:B3");
    assert!(response.text.contains("MERGED CELLS DETECTED:"));
    assert!(response.text.contains("[MERGED: A2:B3]"));
}

#[tokio::test(flavor = "current_thread")]
async fn read_sheet_values_merge_detection_can_be_disabled() {
    let (ctx, id) = support::seeded_context().await;
    ctx.service
        .batch_update(
            TEST_USER,
            &id,
            vec![BatchRequest::MergeCells {
                range: GridRange::new(0, GridRect::new(0, 2, 0, 2)),
                merge_type: MergeType::MergeAll,
            }],
        )
        .await
        .unwrap();

    let response = read_sheet_values(
        ctx.state.clone(),
        ReadSheetValuesParams {
            user_email: None,
            spreadsheet_id: id,
            range_name: Some("Data!A1:C3".to_string()),
            handle_merged_cells: false,
        },
    )
    .await
    .unwrap();

    assert!(response.merged_regions.is_empty());
    assert!(!response.text.contains("MERGED CELLS DETECTED:"));
}

#[tokio::test(flavor = "current_thread")]
async fn read_sheet_values_defaults_to_configured_window() {
    let (ctx, id) = support::seeded_context().await;

    let response = read_sheet_values(
        ctx.state.clone(),
        ReadSheetValuesParams {
            user_email: None,
            spreadsheet_id: id,
            range_name: None,
            handle_merged_cells: true,
        },
    )
    .await
    .unwrap();

    assert_eq!(response.range, "A1:Z1000");
    assert_eq!(response.row_count, 3);
}

#[tokio::test(flavor = "current_thread")]
async fn read_sheet_values_empty_range() {
    let (ctx, id) = support::seeded_context().await;

    let response = read_sheet_values(
        ctx.state.clone(),
        ReadSheetValuesParams {
            user_email: None,
            spreadsheet_id: id,
            range_name: Some("Target!A1:B5".to_string()),
            handle_merged_cells: true,
        },
    )
    .await
    .unwrap();

    assert_eq!(response.row_count, 0);
    assert!(response.text.starts_with("No data found in range"));
}

#[tokio::test(flavor = "current_thread")]
async fn get_spreadsheet_info_lists_sheets_and_preview() {
    let (ctx, id) = support::seeded_context().await;

    let response = get_spreadsheet_info(
        ctx.state.clone(),
        GetSpreadsheetInfoParams {
            user_email: None,
            spreadsheet_id: id.clone(),
            include_data_preview: true,
        },
    )
    .await
    .unwrap();

    assert_eq!(response.sheet_count, 2);
    assert_eq!(response.sheets[0].title, "Data");
    assert!(response.text.contains(&format!("\"Quarterly\" (ID: {id})")));
    assert!(response.text.contains("Data Preview:"));
    assert!(response.text.contains("Non-empty rows in preview: 3"));
}

#[tokio::test(flavor = "current_thread")]
async fn get_spreadsheet_info_without_preview() {
    let (ctx, id) = support::seeded_context().await;

    let response = get_spreadsheet_info(
        ctx.state.clone(),
        GetSpreadsheetInfoParams {
            user_email: None,
            spreadsheet_id: id,
            include_data_preview: false,
        },
    )
    .await
    .unwrap();

    assert!(!response.text.contains("Data Preview:"));
}
