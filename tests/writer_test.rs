//! Excel書き戻しテスト
//!
//! 実際のブックを作成し、パッチの適用・競合検出・他シートの保持を検証

use drive_around::config::Config;
use drive_around::error::DriveAroundError;
use drive_around::fetcher::excel;
use drive_around::loader::Dataset;
use drive_around::writer::{self, SaveOutcome, WriteMode};
use drive_around_common::columns::{CALIPER, STATUS};
use drive_around_common::{normalize, EditForm, EditPatch, RawTable, RowKey, Table};
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn raw(headers: &[&str], rows: &[&[&str]]) -> RawTable {
    RawTable::new(
        headers.iter().map(|h| h.to_string()).collect(),
        rows.iter()
            .map(|r| {
                r.iter()
                    .map(|c| if c.is_empty() { None } else { Some(c.to_string()) })
                    .collect()
            })
            .collect(),
    )
}

fn inventory() -> Table {
    normalize(&raw(
        &["ItemCode", "LocationCode", "CommonName", "ContSize", "Caliper"],
        &[&["A1", "L1", "RED MAPLE", "#7", "1.5"], &["B2", "L2", "PIN OAK", "#3", ""]],
    ))
}

fn notes() -> RawTable {
    raw(&["ITEMCODE", "NOTE"], &[&["A1", "call buyer"], &["A1", "tag later"]])
}

/// テスト用のブックを作成
fn setup(dir: &Path) -> (Config, PathBuf) {
    let path = dir.join("inventory.xlsx");
    let config = Config {
        local_path: Some(path.clone()),
        ..Default::default()
    };
    writer::create_workbook(&path, &config, &inventory(), &notes()).expect("ブック作成失敗");
    (config, path)
}

fn reload(config: &Config) -> Table {
    let path = config.local_path().unwrap();
    normalize(&excel::read_sheet(path, &config.inventory_sheet).unwrap())
}

/// 作成したブックを読み戻せる
#[test]
fn test_create_workbook_round_trip() {
    let dir = tempdir().expect("Failed to create temp dir");
    let (config, path) = setup(dir.path());

    let table = reload(&config);
    assert_eq!(table.len(), 2);
    let row = table.find(&RowKey::new("A1", "L1")).expect("行が見つからない");
    assert_eq!(row.get(CALIPER), "1.5");
    assert_eq!(row.common_name(), "RED MAPLE");

    let notes = excel::read_sheet(&path, &config.notes_sheet).unwrap();
    assert_eq!(notes.len(), 2);
}

/// パッチを書き戻すと対象行だけが変わり、メモシートは残る
#[test]
fn test_write_patch_updates_row() {
    let dir = tempdir().expect("Failed to create temp dir");
    let (config, path) = setup(dir.path());

    let current = reload(&config);
    let mut form = EditForm::from_row(current.find(&RowKey::new("B2", "L2")).unwrap());
    form.set(CALIPER, "2").unwrap();
    form.mark_complete();

    let table = writer::write_patch(&path, &config.inventory_sheet, &form.into_patch()).unwrap();
    assert_eq!(table.find(&RowKey::new("B2", "L2")).unwrap().get(STATUS), "COMPLETE");

    let reread = reload(&config);
    let b2 = reread.find(&RowKey::new("B2", "L2")).unwrap();
    assert_eq!(b2.get(CALIPER), "2");
    assert!(b2.is_complete());
    let a1 = reread.find(&RowKey::new("A1", "L1")).unwrap();
    assert_eq!(a1.get(CALIPER), "1.5");
    assert!(!a1.is_complete());

    let notes = excel::read_sheet(&path, &config.notes_sheet).unwrap();
    assert_eq!(notes.rows[1][1].as_deref(), Some("tag later"));
    assert!(!path.with_extension("xlsx.tmp").exists());
}

/// 他の更新があった行への古いパッチは競合になる
#[test]
fn test_write_patch_detects_conflict() {
    let dir = tempdir().expect("Failed to create temp dir");
    let (config, path) = setup(dir.path());

    // 2人が同じ状態から編集を始める
    let snapshot = reload(&config);
    let row = snapshot.find(&RowKey::new("A1", "L1")).unwrap();
    let mut first = EditForm::from_row(row);
    let mut second = EditForm::from_row(row);
    first.set(CALIPER, "2").unwrap();
    second.set(CALIPER, "3").unwrap();

    writer::write_patch(&path, &config.inventory_sheet, &first.into_patch()).unwrap();
    let err = writer::write_patch(&path, &config.inventory_sheet, &second.into_patch()).unwrap_err();
    assert!(matches!(
        err,
        DriveAroundError::Common(drive_around_common::Error::Conflict(_))
    ));

    // 先の変更が残っている
    let reread = reload(&config);
    assert_eq!(reread.find(&RowKey::new("A1", "L1")).unwrap().get(CALIPER), "2");

    // バージョン無しのパッチは後勝ち
    let forced = EditPatch::unchecked(RowKey::new("A1", "L1"))
        .with_change(CALIPER, "3")
        .unwrap();
    writer::write_patch(&path, &config.inventory_sheet, &forced).unwrap();
    assert_eq!(reload(&config).find(&RowKey::new("A1", "L1")).unwrap().get(CALIPER), "3");
}

/// 存在しない行・シート
#[test]
fn test_write_patch_missing_targets() {
    let dir = tempdir().expect("Failed to create temp dir");
    let (config, path) = setup(dir.path());

    let patch = EditPatch::unchecked(RowKey::new("ZZ", "L9"))
        .with_change(CALIPER, "1")
        .unwrap();
    let err = writer::write_patch(&path, &config.inventory_sheet, &patch).unwrap_err();
    assert!(matches!(
        err,
        DriveAroundError::Common(drive_around_common::Error::RowNotFound(_))
    ));

    let err = writer::write_patch(&path, "NoSuchSheet", &patch).unwrap_err();
    assert!(matches!(err, DriveAroundError::SheetNotFound(_)));
}

/// 保存先ごとの動作
#[test]
fn test_save_patch_modes() {
    let dir = tempdir().expect("Failed to create temp dir");
    let (config, path) = setup(dir.path());

    let raw_inventory = excel::read_sheet(&path, &config.inventory_sheet).unwrap();
    let mut dataset = Dataset::build(&raw_inventory, &notes(), chrono::Utc::now(), "excel".into(), Vec::new());
    let patch = EditPatch::unchecked(RowKey::new("B2", "L2"))
        .with_change(CALIPER, "4")
        .unwrap();

    // 書き込み無効: メモリ上のみ
    let disabled = WriteMode::for_source(&Config::default(), drive_around::source::SourceKind::Csv);
    assert!(!disabled.is_enabled());
    let outcome = writer::save_patch(&mut dataset, &patch, &disabled).unwrap();
    assert_eq!(outcome, SaveOutcome::InMemory);
    assert_eq!(dataset.table.find(&RowKey::new("B2", "L2")).unwrap().get(CALIPER), "4");
    assert_eq!(reload(&config).find(&RowKey::new("B2", "L2")).unwrap().get(CALIPER), "");

    // ローカルExcel: ファイルに書き戻す
    let local = WriteMode::for_source(&config, drive_around::source::SourceKind::Excel);
    let outcome = writer::save_patch(&mut dataset, &patch, &local).unwrap();
    assert_eq!(outcome, SaveOutcome::Written(path.clone()));
    assert_eq!(reload(&config).find(&RowKey::new("B2", "L2")).unwrap().get(CALIPER), "4");
}

/// 見出しが重複・空の列も書き戻しで失われない
#[test]
fn test_write_patch_keeps_unnormalized_columns() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("yard.xlsx");

    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Inventory_Drive_Around").unwrap();
    for (c, h) in ["ITEMCODE", "LOCATIONCODE", "Notes", "notes"].iter().enumerate() {
        sheet.write_string(0, c as u16, *h).unwrap();
    }
    for (c, v) in ["A1", "L1", "first", "second-notes-col", "unheaded-data"].iter().enumerate() {
        sheet.write_string(1, c as u16, *v).unwrap();
    }
    workbook.save(&path).unwrap();

    let patch = EditPatch::unchecked(RowKey::new("A1", "L1"))
        .with_change(CALIPER, "2")
        .unwrap();
    writer::write_patch(&path, "Inventory_Drive_Around", &patch).unwrap();

    let reread = excel::read_sheet(&path, "Inventory_Drive_Around").unwrap();
    assert_eq!(reread.headers, vec!["ITEMCODE", "LOCATIONCODE", "Notes", "notes", "", "CALIPER"]);
    let cells: Vec<Option<&str>> = reread.rows[0].iter().map(|c| c.as_deref()).collect();
    assert_eq!(
        cells,
        vec![
            Some("A1"),
            Some("L1"),
            Some("first"),
            Some("second-notes-col"),
            Some("unheaded-data"),
            Some("2"),
        ]
    );
}

/// 表の開始位置がA1でなくても位置を保って書き戻す
#[test]
fn test_write_patch_keeps_sheet_origin() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("offset.xlsx");

    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Inventory_Drive_Around").unwrap();
    // B3 から表が始まる
    for (c, h) in ["ITEMCODE", "LOCATIONCODE", "CALIPER"].iter().enumerate() {
        sheet.write_string(2, 1 + c as u16, *h).unwrap();
    }
    sheet.write_string(3, 1, "A1").unwrap();
    sheet.write_string(3, 2, "L1").unwrap();
    sheet.write_string(3, 3, "1").unwrap();
    workbook.save(&path).unwrap();

    let patch = EditPatch::unchecked(RowKey::new("A1", "L1"))
        .with_change(CALIPER, "1.25")
        .unwrap();
    writer::write_patch(&path, "Inventory_Drive_Around", &patch).unwrap();

    let sheets = excel::read_workbook(&path).unwrap();
    assert_eq!(sheets.len(), 1);
    assert_eq!(sheets[0].origin, (2, 1));
    assert_eq!(sheets[0].table.headers, vec!["ITEMCODE", "LOCATIONCODE", "CALIPER"]);
    assert_eq!(sheets[0].table.rows[0][2].as_deref(), Some("1.25"));
}

/// 在庫シートとメモシートが同名ならエラー
#[test]
fn test_create_workbook_rejects_same_sheet_names() {
    let dir = tempdir().expect("Failed to create temp dir");
    let config = Config {
        notes_sheet: "inventory_drive_around".into(),
        ..Default::default()
    };
    let err = writer::create_workbook(&dir.path().join("x.xlsx"), &config, &inventory(), &notes()).unwrap_err();
    assert!(matches!(err, DriveAroundError::Config(_)));
}
