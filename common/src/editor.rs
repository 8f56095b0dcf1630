//! 編集フォームと差分パッチ
//!
//! フォームは行の現在値から作り、変更された列だけをパッチにする。
//! パッチはキーで行を特定し、作成時の行バージョンと現在の行バージョンが
//! 異なれば競合として適用しない。

use crate::columns::{is_editable, EDITABLE_COLUMNS, STATUS, STATUS_COMPLETE};
use crate::error::{Error, Result};
use crate::key::{row_version, RowKey};
use crate::types::{InventoryRow, Table};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 1行分の編集フォーム
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditForm {
    key: RowKey,
    base_version: String,
    original: BTreeMap<String, String>,
    values: BTreeMap<String, String>,
}

impl EditForm {
    pub fn from_row(row: &InventoryRow) -> Self {
        let original: BTreeMap<String, String> = EDITABLE_COLUMNS
            .iter()
            .map(|col| (col.to_string(), row.get(col).to_string()))
            .collect();
        Self {
            key: row.key(),
            base_version: row_version(row),
            values: original.clone(),
            original,
        }
    }

    pub fn key(&self) -> &RowKey {
        &self.key
    }

    pub fn get(&self, column: &str) -> &str {
        self.values.get(column).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, column: &str, value: impl Into<String>) -> Result<()> {
        let column = column.trim().to_uppercase();
        if !is_editable(&column) {
            return Err(Error::NotEditable(column));
        }
        self.values.insert(column, value.into());
        Ok(())
    }

    pub fn mark_complete(&mut self) {
        self.values.insert(STATUS.to_string(), STATUS_COMPLETE.to_string());
    }

    /// 変更された列（列名順）
    pub fn changes(&self) -> BTreeMap<String, String> {
        self.values
            .iter()
            .filter(|(col, value)| self.original.get(*col) != Some(*value))
            .map(|(col, value)| (col.clone(), value.clone()))
            .collect()
    }

    pub fn is_dirty(&self) -> bool {
        !self.changes().is_empty()
    }

    pub fn into_patch(self) -> EditPatch {
        let changes = self.changes();
        EditPatch {
            key: self.key,
            base_version: Some(self.base_version),
            changes,
        }
    }
}

/// キー指定の差分更新
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditPatch {
    pub key: RowKey,
    /// 編集開始時の行バージョン（None は後勝ち）
    pub base_version: Option<String>,
    pub changes: BTreeMap<String, String>,
}

impl EditPatch {
    /// バージョン確認なしのパッチ
    pub fn unchecked(key: RowKey) -> Self {
        Self {
            key,
            base_version: None,
            changes: BTreeMap::new(),
        }
    }

    pub fn with_change(mut self, column: &str, value: impl Into<String>) -> Result<Self> {
        let column = column.trim().to_uppercase();
        if !is_editable(&column) {
            return Err(Error::NotEditable(column));
        }
        self.changes.insert(column, value.into());
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// パッチをテーブルに適用する
pub fn apply_patch(table: &mut Table, patch: &EditPatch) -> Result<()> {
    let row = table
        .find_mut(&patch.key)
        .ok_or_else(|| Error::RowNotFound(patch.key.to_string()))?;

    if let Some(base) = &patch.base_version {
        if *base != row_version(row) {
            return Err(Error::Conflict(patch.key.to_string()));
        }
    }

    for (column, value) in &patch.changes {
        row.set(column, value.clone());
    }

    for column in patch.changes.keys() {
        if !table.columns.iter().any(|c| c == column) {
            table.columns.push(column.clone());
        }
    }

    Ok(())
}
