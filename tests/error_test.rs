//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use drive_around::config::Config;
use drive_around::error::DriveAroundError;
use drive_around::fetcher::{self, excel};
use drive_around::source::SourceKind;
use std::path::Path;
use tempfile::tempdir;

/// 存在しないExcelファイル
#[test]
fn test_read_nonexistent_workbook() {
    let result = excel::read_sheet(Path::new("/nonexistent/path/12345.xlsx"), "Inventory_Drive_Around");
    assert!(matches!(result, Err(DriveAroundError::FileNotFound(_))));
}

/// Excelファイル未設定で読み込み
#[tokio::test]
async fn test_excel_source_without_path() {
    let config = Config::default();
    let err = fetcher::fetch_tables(&config, SourceKind::Excel).await.unwrap_err();
    assert!(matches!(err, DriveAroundError::Config(_)));
}

/// スプレッドシートID未設定で読み込み
#[tokio::test]
async fn test_csv_source_without_id() {
    let config = Config::default();
    let err = fetcher::fetch_tables(&config, SourceKind::Csv).await.unwrap_err();
    assert!(matches!(err, DriveAroundError::MissingSpreadsheetId));
    assert!(err.to_string().contains("config --set-spreadsheet-id"));
}

/// 共通ライブラリのエラーはそのまま表示される
#[test]
fn test_common_error_transparent() {
    let err: DriveAroundError = drive_around_common::Error::Conflict("A1 @ L1".into()).into();
    assert!(matches!(err, DriveAroundError::Common(_)));
    assert!(err.to_string().contains("競合"));
    assert!(err.to_string().contains("A1 @ L1"));
}

/// IO・JSONエラーの変換
#[test]
fn test_io_and_json_conversion() {
    let dir = tempdir().expect("Failed to create temp dir");
    let missing = dir.path().join("missing.txt");

    let io: DriveAroundError = std::fs::read_to_string(&missing).unwrap_err().into();
    assert!(matches!(io, DriveAroundError::Io(_)));

    let json: DriveAroundError = serde_json::from_str::<Config>("{ invalid").unwrap_err().into();
    assert!(matches!(json, DriveAroundError::JsonParse(_)));
}

/// DriveAroundErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        DriveAroundError::Config("テスト設定エラー".to_string()),
        DriveAroundError::FileNotFound("inventory.xlsx".to_string()),
        DriveAroundError::SheetNotFound("Sales_Notes".to_string()),
        DriveAroundError::Fetch("timeout".to_string()),
        DriveAroundError::ExcelRead("読み込み失敗".to_string()),
        DriveAroundError::ExcelWrite("書き込み失敗".to_string()),
        DriveAroundError::ImageLoad("壊れた画像".to_string()),
        DriveAroundError::ReadOnly("CSVエクスポートは読み取り専用".to_string()),
        DriveAroundError::Prompt("中断".to_string()),
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "エラーメッセージが空: {:?}", err);
    }
}
