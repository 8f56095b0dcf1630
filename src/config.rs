use crate::error::{DriveAroundError, Result};
use crate::source::SourceKind;
use drive_around_common::AssignmentRule;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const SPREADSHEET_ID_ENV: &str = "DRIVE_AROUND_SPREADSHEET_ID";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceKind,
    pub spreadsheet_id: Option<String>,
    pub inventory_sheet: String,
    pub notes_sheet: String,
    /// ローカルExcelファイル（source = excel のとき）
    pub local_path: Option<PathBuf>,
    pub photo_dir: PathBuf,
    /// シート取得結果のキャッシュ有効期間（秒）
    pub cache_ttl_seconds: u64,
    pub timeout_seconds: u64,
    /// 担当タスクを表示するユーザー
    pub user: Option<String>,
    pub assignment: AssignmentRule,
    /// サービスアカウントの認証情報JSON（接続診断用）
    pub credentials_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: SourceKind::Csv,
            spreadsheet_id: None,
            inventory_sheet: "Inventory_Drive_Around".into(),
            notes_sheet: "Sales_Notes".into(),
            local_path: None,
            photo_dir: PathBuf::from("photos"),
            cache_ttl_seconds: 600,
            timeout_seconds: 30,
            user: None,
            assignment: AssignmentRule::default(),
            credentials_path: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            serde_json::from_str(&content)?
        } else {
            Self::default()
        };

        // 環境変数を優先
        if let Ok(id) = std::env::var(SPREADSHEET_ID_ENV) {
            if !id.trim().is_empty() {
                config.spreadsheet_id = Some(id.trim().to_string());
            }
        }

        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| DriveAroundError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("drive-around").join("config.json"))
    }

    /// キャッシュファイルを置くディレクトリ
    pub fn cache_dir() -> Result<PathBuf> {
        let base = dirs::cache_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".cache")))
            .ok_or_else(|| DriveAroundError::Config("キャッシュディレクトリが見つかりません".into()))?;
        Ok(base.join("drive-around"))
    }

    pub fn spreadsheet_id(&self) -> Result<&str> {
        self.spreadsheet_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(DriveAroundError::MissingSpreadsheetId)
    }

    pub fn local_path(&self) -> Result<&std::path::Path> {
        self.local_path.as_deref().ok_or_else(|| {
            DriveAroundError::Config(
                "Excelファイルが設定されていません。`drive-around config --set-local-path FILE` で設定してください".into(),
            )
        })
    }
}
