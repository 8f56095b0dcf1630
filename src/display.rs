//! 端末表示用の整形

use drive_around_common::columns::{
    BLOCKALPHA, COMMONNAME, CONTSIZE, CURRENT_SALESNOTE, EDITABLE_COLUMNS, ITEMCODE, LOCATIONCODE,
    LOTCODE, PRIORITY, PTRAVAILABLE, SEASON, STATUS, S_LTS,
};
use drive_around_common::filter::distinct_values;
use drive_around_common::InventoryRow;
use std::fmt::Write;

/// 詳細表示で編集対象列の前に出す列
const INFO_COLUMNS: &[&str] = &[
    ITEMCODE,
    COMMONNAME,
    CONTSIZE,
    BLOCKALPHA,
    LOCATIONCODE,
    LOTCODE,
    SEASON,
    PRIORITY,
    PTRAVAILABLE,
    S_LTS,
    CURRENT_SALESNOTE,
];

pub fn status_label(row: &InventoryRow) -> &str {
    if row.is_complete() {
        "完了"
    } else {
        "未完了"
    }
}

/// 1行の要約
pub fn row_summary(row: &InventoryRow) -> String {
    let mut line = format!("{} {} {}", row.item_code(), row.common_name(), row.container_size());
    if !row.location().is_empty() {
        let _ = write!(line, " @ {}", row.location());
    }
    let _ = write!(line, " [{}]", status_label(row));
    line
}

/// 1行の詳細（値のある列のみ）とメモ
pub fn row_details(row: &InventoryRow, notes: &[String]) -> String {
    let mut out = String::new();
    for col in INFO_COLUMNS.iter().chain(EDITABLE_COLUMNS.iter()) {
        let value = row.get(col).trim();
        if value.is_empty() || *col == STATUS {
            continue;
        }
        let _ = writeln!(out, "  {:<18} {}", col, value);
    }
    let _ = writeln!(out, "  {:<18} {}", STATUS, status_label(row));

    if !notes.is_empty() {
        let _ = writeln!(out, "  メモ:");
        for note in notes {
            let _ = writeln!(out, "    - {}", note);
        }
    }
    out
}

/// ブロック → ロケーション → 品目 の順に整形したタスク一覧
pub fn task_list(rows: &[&InventoryRow]) -> String {
    let mut out = String::new();
    for block in distinct_values(rows.iter().copied(), BLOCKALPHA) {
        let in_block: Vec<&InventoryRow> = rows.iter().copied().filter(|r| r.block() == block).collect();
        let _ = writeln!(out, "■ ブロック {} ({}件)", block, in_block.len());

        for location in distinct_values(in_block.iter().copied(), LOCATIONCODE) {
            let _ = writeln!(out, "  ▸ {}", location);
            for row in in_block.iter().filter(|r| r.location() == location) {
                let _ = writeln!(out, "      {}", row_summary(row));
            }
        }
    }

    let unblocked: Vec<&&InventoryRow> = rows.iter().filter(|r| r.block().is_empty()).collect();
    if !unblocked.is_empty() {
        let _ = writeln!(out, "■ ブロック未設定 ({}件)", unblocked.len());
        for row in unblocked {
            let _ = writeln!(out, "      {}", row_summary(row));
        }
    }
    out
}
