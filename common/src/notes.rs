//! 営業メモ索引
//!
//! メモシートを ITEMCODE ごとにまとめ、品目コード → メモ一覧（行順）を作る。
//! メモ列は「NOTE を含む最初の列」、無ければ ITEMCODE 以外の最初の列。
//! 索引が作れない場合はエラーにせず空の索引を返す。

use crate::columns::ITEMCODE;
use crate::normalizer::normalize_header;
use crate::types::RawTable;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotesIndex {
    notes: HashMap<String, Vec<String>>,
}

/// メモ列の位置を推定する
pub fn detect_note_column(headers: &[String]) -> Option<usize> {
    let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();

    if let Some(idx) = normalized.iter().position(|h| h.contains("NOTE")) {
        return Some(idx);
    }

    let fallback = normalized
        .iter()
        .position(|h| h != ITEMCODE && !h.is_empty())?;
    log::warn!(
        "メモ列（NOTEを含む列）が見つかりません。'{}' をメモ列として使用します",
        headers[fallback].trim()
    );
    Some(fallback)
}

impl NotesIndex {
    /// メモシートから索引を構築
    pub fn build(raw: &RawTable) -> Self {
        let Some(item_col) = raw
            .headers
            .iter()
            .position(|h| normalize_header(h) == ITEMCODE)
        else {
            if !raw.headers.is_empty() {
                log::warn!("メモシートに ITEMCODE 列がありません。メモ索引は空になります");
            }
            return Self::default();
        };

        let Some(note_col) = detect_note_column(&raw.headers) else {
            return Self::default();
        };

        let mut notes: HashMap<String, Vec<String>> = HashMap::new();
        for cells in &raw.rows {
            let item = match cells.get(item_col).and_then(|c| c.as_deref()) {
                Some(item) if !item.trim().is_empty() => item.trim(),
                _ => continue,
            };
            let note = match cells.get(note_col).and_then(|c| c.as_deref()) {
                Some(note) if !note.trim().is_empty() => note,
                _ => continue,
            };
            notes.entry(item.to_string()).or_default().push(note.to_string());
        }

        Self { notes }
    }

    /// 品目コードのメモ一覧（無ければ空）
    pub fn get(&self, item_code: &str) -> &[String] {
        self.notes
            .get(item_code.trim())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// メモがある品目数
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}
