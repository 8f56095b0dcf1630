//! 編集内容の保存
//!
//! - LocalExcel: 保存直前にブックを読み直し、最新の在庫シートにパッチを適用して書き戻す
//!   （他のシートはそのまま残す）
//! - Disabled: メモリ上のテーブルにのみ適用する

use crate::config::Config;
use crate::error::{DriveAroundError, Result};
use crate::fetcher::excel::{self, Sheet};
use crate::loader::Dataset;
use crate::source::SourceKind;
use drive_around_common::{apply_patch, normalize, normalizer::normalize_header, EditPatch, RawTable, Table};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// 保存先
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteMode {
    /// 書き込み無効（理由）
    Disabled(String),
    LocalExcel { path: PathBuf, sheet: String },
}

/// 保存結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Written(PathBuf),
    InMemory,
}

impl WriteMode {
    pub fn for_source(config: &Config, kind: SourceKind) -> Self {
        if !kind.is_writable() {
            return WriteMode::Disabled(format!("{} は読み取り専用", kind));
        }
        match config.local_path.as_ref() {
            Some(path) => WriteMode::LocalExcel {
                path: path.clone(),
                sheet: config.inventory_sheet.clone(),
            },
            None => WriteMode::Disabled("Excelファイル未設定".into()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, WriteMode::LocalExcel { .. })
    }
}

/// パッチを保存し、データセットに反映する
pub fn save_patch(dataset: &mut Dataset, patch: &EditPatch, mode: &WriteMode) -> Result<SaveOutcome> {
    if patch.is_empty() {
        return Ok(SaveOutcome::InMemory);
    }

    match mode {
        WriteMode::Disabled(reason) => {
            log::info!("書き込み無効 ({})、メモリ上のみ更新: {}", reason, patch.key);
            apply_patch(&mut dataset.table, patch)?;
            Ok(SaveOutcome::InMemory)
        }
        WriteMode::LocalExcel { path, sheet } => {
            let fresh = write_patch(path, sheet, patch)?;
            dataset.table = fresh;
            Ok(SaveOutcome::Written(path.clone()))
        }
    }
}

/// ブックを読み直してパッチを適用し、書き戻す
///
/// 競合判定は正規化した表で行い、書き戻しは読み込んだ生の表に
/// 変更セルだけを反映する（列の並び・見出し・開始位置はそのまま）。
/// 適用後の在庫テーブルを返す。
pub fn write_patch(path: &Path, sheet: &str, patch: &EditPatch) -> Result<Table> {
    let mut sheets = excel::read_workbook(path)?;

    let inventory = sheets
        .iter_mut()
        .find(|s| s.name == sheet)
        .ok_or_else(|| DriveAroundError::SheetNotFound(sheet.to_string()))?;

    let mut table = normalize(&inventory.table);
    let row_idx = table
        .position(&patch.key)
        .ok_or_else(|| drive_around_common::Error::RowNotFound(patch.key.to_string()))?;
    apply_patch(&mut table, patch)?;

    // 正規化後の行は元の行と1対1
    patch_raw(&mut inventory.table, row_idx, &patch.changes);

    write_workbook(path, &sheets)?;
    log::debug!("{} を書き戻しました: {}", path.display(), patch.key);
    Ok(table)
}

/// 生の表の1行に変更を反映する
///
/// 列は正規化後の名前が一致する最初の列。無い列は末尾に追加する。
fn patch_raw(raw: &mut RawTable, row_idx: usize, changes: &BTreeMap<String, String>) {
    for (column, value) in changes {
        let col = match raw.headers.iter().position(|h| normalize_header(h) == *column) {
            Some(col) => col,
            None => {
                raw.headers.push(column.clone());
                raw.headers.len() - 1
            }
        };

        let Some(cells) = raw.rows.get_mut(row_idx) else {
            return;
        };
        if cells.len() <= col {
            cells.resize(col + 1, None);
        }
        cells[col] = (!value.is_empty()).then(|| value.clone());
    }
}

fn excel_error(e: XlsxError) -> DriveAroundError {
    DriveAroundError::ExcelWrite(e.to_string())
}

/// ブック全体を書き出す（一時ファイルに書いてから置き換え）
fn write_workbook(path: &Path, sheets: &[Sheet]) -> Result<()> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    for sheet in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&sheet.name).map_err(excel_error)?;
        write_raw(worksheet, sheet, &header)?;
    }

    let tmp_path = path.with_extension("xlsx.tmp");
    workbook.save(&tmp_path).map_err(excel_error)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

fn write_raw(worksheet: &mut Worksheet, sheet: &Sheet, header: &Format) -> Result<()> {
    let (row0, col0) = sheet.origin;
    let col_at = |c: usize| -> Result<u16> {
        u16::try_from(col0 as usize + c)
            .map_err(|_| DriveAroundError::ExcelWrite(format!("列数が多すぎます: {}", sheet.name)))
    };

    for (c, name) in sheet.table.headers.iter().enumerate() {
        if name.is_empty() {
            continue;
        }
        worksheet
            .write_string_with_format(row0, col_at(c)?, name, header)
            .map_err(excel_error)?;
    }

    for (r, cells) in sheet.table.rows.iter().enumerate() {
        for (c, cell) in cells.iter().enumerate() {
            if let Some(value) = cell {
                worksheet
                    .write_string(row0 + r as u32 + 1, col_at(c)?, value)
                    .map_err(excel_error)?;
            }
        }
    }
    Ok(())
}

/// 正規化済みテーブルを生の表に戻す（スナップショット用）
fn table_to_raw(table: &Table) -> RawTable {
    let rows = table
        .rows
        .iter()
        .map(|row| {
            table
                .row_cells(row)
                .map(|v| (!v.is_empty()).then(|| v.to_string()))
                .collect()
        })
        .collect();
    RawTable::new(table.columns.clone(), rows)
}

/// テーブルを新しいブックとして書き出す（在庫シート + メモシート）
pub fn create_workbook(path: &Path, config: &Config, inventory: &Table, notes: &RawTable) -> Result<()> {
    if normalize_header(&config.inventory_sheet) == normalize_header(&config.notes_sheet) {
        return Err(DriveAroundError::Config("在庫シートとメモシートの名前が同じです".into()));
    }
    let sheets = vec![
        Sheet {
            name: config.inventory_sheet.clone(),
            origin: (0, 0),
            table: table_to_raw(inventory),
        },
        Sheet {
            name: config.notes_sheet.clone(),
            origin: (0, 0),
            table: notes.clone(),
        },
    ];
    write_workbook(path, &sheets)
}
