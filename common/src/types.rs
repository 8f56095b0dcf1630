//! 在庫テーブルの型定義
//!
//! - RawTable: 取得直後の表（ヘッダー + 欠損ありのセル）
//! - InventoryRow: 正規化済みの1行（列名 → テキスト）
//! - Table: 正規化済みの表全体

use crate::columns::{
    BLOCKALPHA, COMMONNAME, CONTSIZE, ITEMCODE, LOCATIONCODE, SALES_ASSIGNEDTO, SEASON, STATUS,
    STATUS_COMPLETE,
};
use crate::key::RowKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 取得直後の表
///
/// セルの `None` は空セル・欠損値を表す。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        Self { headers, rows }
    }

    /// ヘッダーも行もない空の表
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// 正規化済みの在庫1行
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InventoryRow {
    cells: BTreeMap<String, String>,
}

impl InventoryRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// 列の値を取得（列がなければ空文字）
    pub fn get(&self, column: &str) -> &str {
        self.cells.get(column).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, column: &str, value: impl Into<String>) {
        self.cells.insert(column.to_string(), value.into());
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.cells.contains_key(column)
    }

    pub fn item_code(&self) -> &str {
        self.get(ITEMCODE).trim()
    }

    pub fn location(&self) -> &str {
        self.get(LOCATIONCODE).trim()
    }

    pub fn block(&self) -> &str {
        self.get(BLOCKALPHA).trim()
    }

    pub fn common_name(&self) -> &str {
        self.get(COMMONNAME).trim()
    }

    pub fn container_size(&self) -> &str {
        self.get(CONTSIZE).trim()
    }

    pub fn season(&self) -> &str {
        self.get(SEASON).trim()
    }

    pub fn assigned_to(&self) -> &str {
        self.get(SALES_ASSIGNEDTO).trim()
    }

    /// STATUSが COMPLETE なら完了、それ以外は未完了
    pub fn is_complete(&self) -> bool {
        self.get(STATUS).trim().eq_ignore_ascii_case(STATUS_COMPLETE)
    }

    pub fn key(&self) -> RowKey {
        RowKey::new(self.item_code(), self.location())
    }

    /// (列名, 値) を列名順に列挙
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for InventoryRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// 正規化済みの在庫テーブル
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// 列名（表示・書き戻し時の列順）
    pub columns: Vec<String>,
    pub rows: Vec<InventoryRow>,
}

impl Table {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// キーに一致する最初の行の位置
    pub fn position(&self, key: &RowKey) -> Option<usize> {
        self.rows.iter().position(|row| row.key() == *key)
    }

    pub fn find(&self, key: &RowKey) -> Option<&InventoryRow> {
        self.position(key).map(|i| &self.rows[i])
    }

    pub fn find_mut(&mut self, key: &RowKey) -> Option<&mut InventoryRow> {
        let idx = self.position(key)?;
        self.rows.get_mut(idx)
    }

    /// 2行以上に現れるキーを出現順で返す
    pub fn duplicate_keys(&self) -> Vec<RowKey> {
        let mut counts: BTreeMap<RowKey, usize> = BTreeMap::new();
        let mut order = Vec::new();
        for row in &self.rows {
            let key = row.key();
            let count = counts.entry(key.clone()).or_insert(0);
            *count += 1;
            if *count == 2 {
                order.push(key);
            }
        }
        order
    }

    /// 行を列順のセル列に変換（書き戻し用）
    pub fn row_cells<'a>(&'a self, row: &'a InventoryRow) -> impl Iterator<Item = &'a str> + 'a {
        self.columns.iter().map(move |col| row.get(col))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(item: &str, loc: &str) -> InventoryRow {
        [(ITEMCODE, item), (LOCATIONCODE, loc)].into_iter().collect()
    }

    #[test]
    fn test_missing_column_reads_empty() {
        let r = row("A1", "L1");
        assert_eq!(r.get("NOPE"), "");
        assert!(!r.has_column("NOPE"));
    }

    #[test]
    fn test_is_complete_case_insensitive() {
        let mut r = row("A1", "L1");
        assert!(!r.is_complete());
        r.set(STATUS, " complete ");
        assert!(r.is_complete());
        r.set(STATUS, "IN PROGRESS");
        assert!(!r.is_complete());
    }

    #[test]
    fn test_find_by_key_first_match() {
        let mut first = row("A1", "L1");
        first.set(STATUS, "first");
        let mut second = row("A1", "L1");
        second.set(STATUS, "second");
        let table = Table {
            columns: vec![ITEMCODE.into(), LOCATIONCODE.into(), STATUS.into()],
            rows: vec![row("B2", "L1"), first, second],
        };

        let found = table.find(&RowKey::new("A1", "L1")).unwrap();
        assert_eq!(found.get(STATUS), "first");
        assert_eq!(table.duplicate_keys(), vec![RowKey::new("A1", "L1")]);
        assert!(table.find(&RowKey::new("A1", "L9")).is_none());
    }
}
