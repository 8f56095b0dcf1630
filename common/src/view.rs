//! 画面状態から表示内容を求める
//!
//! どの関数もテーブルを変更しない。

use crate::columns::{BLOCKALPHA, COMMONNAME, CONTSIZE, LOCATIONCODE};
use crate::filter::{distinct_values, matches_search, AssignmentRule};
use crate::navigation::ViewState;
use crate::types::{InventoryRow, Table};

/// ドライブアラウンド: シーズン条件を満たす行
fn season_rows<'a>(table: &'a Table, state: &'a ViewState) -> impl Iterator<Item = &'a InventoryRow> + 'a {
    table.rows.iter().filter(move |row| state.seasons.matches(row))
}

/// 品種一覧（検索文字列で絞り込み）
pub fn varieties(table: &Table, state: &ViewState) -> Vec<String> {
    distinct_values(season_rows(table, state), COMMONNAME)
        .into_iter()
        .filter(|name| matches_search(name, &state.search))
        .collect()
}

/// 選択中の品種のサイズ一覧
pub fn sizes(table: &Table, state: &ViewState) -> Vec<String> {
    let Some(variety) = state.variety.as_deref() else {
        return Vec::new();
    };
    distinct_values(
        season_rows(table, state).filter(|row| row.common_name() == variety),
        CONTSIZE,
    )
}

/// 選択中の品種・サイズの行
pub fn drive_rows<'a>(table: &'a Table, state: &'a ViewState) -> Vec<&'a InventoryRow> {
    let (Some(variety), Some(size)) = (state.variety.as_deref(), state.size.as_deref()) else {
        return Vec::new();
    };
    season_rows(table, state)
        .filter(|row| row.common_name() == variety && row.container_size() == size)
        .collect()
}

/// 担当タスク: 担当者 → 完了状態 → シーズンの順で絞り込んだ行
pub fn task_rows<'a>(
    table: &'a Table,
    state: &ViewState,
    rule: &AssignmentRule,
) -> Vec<&'a InventoryRow> {
    let Some(user) = state.user.as_deref() else {
        return Vec::new();
    };
    table
        .rows
        .iter()
        .filter(|row| rule.is_assigned_to(row, user))
        .filter(|row| state.status.matches(row))
        .filter(|row| state.seasons.matches(row))
        .collect()
}

pub fn task_blocks(table: &Table, state: &ViewState, rule: &AssignmentRule) -> Vec<String> {
    distinct_values(task_rows(table, state, rule), BLOCKALPHA)
}

pub fn task_locations(table: &Table, state: &ViewState, rule: &AssignmentRule) -> Vec<String> {
    let Some(block) = state.block.as_deref() else {
        return Vec::new();
    };
    distinct_values(
        task_rows(table, state, rule)
            .into_iter()
            .filter(|row| row.block() == block),
        LOCATIONCODE,
    )
}

/// 選択中のロケーションの行（詳細表示・品目一覧共通）
pub fn task_items<'a>(
    table: &'a Table,
    state: &ViewState,
    rule: &AssignmentRule,
) -> Vec<&'a InventoryRow> {
    let (Some(block), Some(location)) = (state.block.as_deref(), state.location.as_deref()) else {
        return Vec::new();
    };
    task_rows(table, state, rule)
        .into_iter()
        .filter(|row| row.block() == block && row.location() == location)
        .collect()
}

/// 編集中の行
pub fn selected_item<'a>(table: &'a Table, state: &ViewState) -> Option<&'a InventoryRow> {
    state.item.as_ref().and_then(|key| table.find(key))
}
