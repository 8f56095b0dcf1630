//! 接続診断
//!
//! 認証情報と在庫シートの取得を順に確認する。失敗しても中断せず結果を表示する。

use crate::config::Config;
use crate::display;
use crate::error::{DriveAroundError, Result};
use crate::fetcher::{csv_export, excel};
use crate::source::SourceKind;
use drive_around_common::normalize;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

const PREVIEW_ROWS: usize = 5;

/// サービスアカウント認証情報（必要な項目のみ）
#[derive(Debug, Deserialize)]
pub struct ServiceAccount {
    pub client_email: String,
    #[serde(default)]
    pub project_id: Option<String>,
}

pub fn read_credentials(path: &Path) -> Result<ServiceAccount> {
    if !path.exists() {
        return Err(DriveAroundError::FileNotFound(path.display().to_string()));
    }
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

pub async fn run_check(config: &Config, kind: SourceKind) -> Result<()> {
    println!("🔎 drive-around - 接続診断\n");

    println!("[1/2] 認証情報を確認中...");
    match config.credentials_path.as_deref() {
        Some(path) => match read_credentials(path) {
            Ok(account) => {
                println!("✔ サービスアカウント: {}", account.client_email);
                if let Some(project) = &account.project_id {
                    println!("  プロジェクト: {}", project);
                }
                println!(
                    "  スプレッドシートを {} と共有（編集者）してください",
                    account.client_email
                );
            }
            Err(e) => println!("⛔ 認証情報を読み込めません: {}", e),
        },
        None => println!("- 認証情報は未設定です（`config --set-credentials FILE`）"),
    }
    println!();

    println!("[2/2] {} を試し読み中 ({})...", config.inventory_sheet, kind);
    match fetch_inventory(config, kind).await {
        Ok(raw) => {
            let table = normalize(&raw);
            println!("✔ {}行 / {}列", table.len(), table.columns.len());
            for row in table.rows.iter().take(PREVIEW_ROWS) {
                println!("  {}", display::row_summary(row));
            }
            println!("\n✅ 接続できました");
        }
        Err(e) => {
            println!("⛔ 取得に失敗しました: {}", e);
            for hint in failure_hints(&e, kind, &config.inventory_sheet) {
                println!("  {}", hint);
            }
        }
    }

    Ok(())
}

/// 取得失敗時の確認事項
pub fn failure_hints(err: &DriveAroundError, kind: SourceKind, sheet: &str) -> Vec<String> {
    let mut hints = Vec::new();
    match err {
        DriveAroundError::Fetch(_) => {
            if kind == SourceKind::Csv {
                hints.push("シートが「リンクを知っている全員」に公開されているか確認してください".to_string());
            }
            hints.push(format!("タブ名が「{}」と完全に一致しているか確認してください", sheet));
        }
        DriveAroundError::SheetNotFound(_) => {
            hints.push(format!("タブ名が「{}」と完全に一致しているか確認してください", sheet));
        }
        _ => {}
    }
    hints
}

async fn fetch_inventory(config: &Config, kind: SourceKind) -> Result<drive_around_common::RawTable> {
    match kind {
        SourceKind::Csv => {
            let id = config.spreadsheet_id()?;
            let client = reqwest::Client::builder()
                .timeout(Duration::from_secs(config.timeout_seconds))
                .build()?;
            csv_export::fetch_sheet(&client, id, &config.inventory_sheet).await
        }
        SourceKind::Excel => {
            let path = config.local_path()?.to_path_buf();
            let sheet = config.inventory_sheet.clone();
            tokio::task::spawn_blocking(move || excel::read_sheet(&path, &sheet))
                .await
                .map_err(|e| DriveAroundError::ExcelRead(format!("読み込みタスクエラー: {}", e)))?
        }
    }
}
