//! 正規化モジュール
//!
//! 取得した表を以下のルールで整える:
//! 1. 列名を trim + 大文字化（重複した列名は先勝ち）
//! 2. 必須列が無ければ空文字の列を追加
//! 3. セルはすべてテキスト（欠損は空文字）
//!
//! 数値・日付の型は保持しない。比較・並び替えは文字列として行う。

use crate::columns::REQUIRED_COLUMNS;
use crate::types::{InventoryRow, RawTable, Table};
use std::collections::HashSet;

/// 列名の正規化
pub fn normalize_header(name: &str) -> String {
    name.trim().to_uppercase()
}

/// 取得した表を正規化する
pub fn normalize(raw: &RawTable) -> Table {
    let mut columns: Vec<String> = Vec::with_capacity(raw.headers.len() + REQUIRED_COLUMNS.len());
    // (元の列番号, 正規化後の列名)
    let mut sources: Vec<(usize, String)> = Vec::with_capacity(raw.headers.len());
    let mut seen = HashSet::new();

    for (idx, header) in raw.headers.iter().enumerate() {
        let name = normalize_header(header);
        if name.is_empty() || !seen.insert(name.clone()) {
            continue;
        }
        sources.push((idx, name.clone()));
        columns.push(name);
    }

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|col| !seen.contains(*col))
        .collect();
    columns.extend(missing.iter().map(|c| c.to_string()));

    let rows = raw
        .rows
        .iter()
        .map(|cells| {
            let mut row = InventoryRow::new();
            for (idx, name) in &sources {
                let value = cells.get(*idx).cloned().flatten().unwrap_or_default();
                row.set(name, value);
            }
            for col in &missing {
                row.set(col, "");
            }
            row
        })
        .collect();

    Table { columns, rows }
}

/// Excelの数値セルをテキスト化する（整数値は小数点なし）
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return String::new();
    }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
