//! シート取得モジュール
//!
//! 在庫シートとメモシートを並列に取得する。片方が失敗しても
//! もう片方の結果は返し、失敗した側は空の表と警告に置き換える。

pub mod csv_export;
pub mod excel;

use crate::config::Config;
use crate::error::{DriveAroundError, Result};
use crate::source::SourceKind;
use drive_around_common::RawTable;
use std::future::Future;
use std::time::Duration;

/// 取得結果
#[derive(Debug, Clone, Default)]
pub struct FetchedTables {
    pub inventory: RawTable,
    pub notes: RawTable,
    /// 取得に失敗したシートの警告
    pub warnings: Vec<String>,
}

impl FetchedTables {
    pub fn is_complete(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// 失敗した側を空の表に置き換える
fn degrade(label: &str, result: Result<RawTable>, warnings: &mut Vec<String>) -> RawTable {
    match result {
        Ok(table) => table,
        Err(e) => {
            let message = format!("{}の取得に失敗しました: {}", label, e);
            log::warn!("{}", message);
            warnings.push(message);
            RawTable::empty()
        }
    }
}

/// 2つの取得処理を同時に実行して両方を待つ
pub async fn join_tables<P, S>(primary: P, secondary: S) -> FetchedTables
where
    P: Future<Output = Result<RawTable>>,
    S: Future<Output = Result<RawTable>>,
{
    let (inventory, notes) = tokio::join!(primary, secondary);
    combine(inventory, notes)
}

fn combine(inventory: Result<RawTable>, notes: Result<RawTable>) -> FetchedTables {
    let mut warnings = Vec::new();
    let inventory = degrade("在庫シート", inventory, &mut warnings);
    let notes = degrade("メモシート", notes, &mut warnings);
    FetchedTables { inventory, notes, warnings }
}

/// 設定された取得元から両シートを取得
pub async fn fetch_tables(config: &Config, kind: SourceKind) -> Result<FetchedTables> {
    match kind {
        SourceKind::Csv => {
            let id = config.spreadsheet_id()?;
            let client = reqwest::Client::builder()
                .timeout(Duration::from_secs(config.timeout_seconds))
                .build()?;

            Ok(join_tables(
                csv_export::fetch_sheet(&client, id, &config.inventory_sheet),
                csv_export::fetch_sheet(&client, id, &config.notes_sheet),
            )
            .await)
        }
        SourceKind::Excel => {
            let path = config.local_path()?.to_path_buf();
            // ファイルが無ければ読み込み全体を中止
            if !path.exists() {
                return Err(DriveAroundError::FileNotFound(path.display().to_string()));
            }

            let inventory_sheet = config.inventory_sheet.clone();
            let notes_sheet = config.notes_sheet.clone();
            let (inventory, notes) = tokio::task::spawn_blocking(move || {
                rayon::join(
                    || excel::read_sheet(&path, &inventory_sheet),
                    || excel::read_sheet(&path, &notes_sheet),
                )
            })
            .await
            .map_err(|e| DriveAroundError::ExcelRead(format!("読み込みタスクエラー: {}", e)))?;

            Ok(combine(inventory, notes))
        }
    }
}
