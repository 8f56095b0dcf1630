//! データ読み込み
//!
//! 取得（またはキャッシュ）→ 正規化 → メモ索引構築 を行い `Dataset` を作る。
//! テーブルと索引は毎回まるごと作り直す。

use crate::cache::{CacheEntry, CacheFile};
use crate::config::Config;
use crate::error::Result;
use crate::fetcher::{self, FetchedTables};
use crate::source::SourceKind;
use chrono::{DateTime, Utc};
use drive_around_common::{normalize, NotesIndex, RawTable, Table};
use std::path::Path;

/// 1回の読み込み結果
#[derive(Debug, Clone)]
pub struct Dataset {
    pub table: Table,
    pub notes: NotesIndex,
    pub fetched_at: DateTime<Utc>,
    /// 取得元の表示名
    pub source: String,
    pub warnings: Vec<String>,
    pub from_cache: bool,
}

impl Dataset {
    pub fn build(
        inventory: &RawTable,
        notes: &RawTable,
        fetched_at: DateTime<Utc>,
        source: String,
        warnings: Vec<String>,
    ) -> Self {
        let table = normalize(inventory);

        let duplicates = table.duplicate_keys();
        if !duplicates.is_empty() {
            let list: Vec<String> = duplicates.iter().map(|k| k.to_string()).collect();
            log::warn!(
                "ITEMCODE + LOCATIONCODE が重複しています（先頭の行を使用）: {}",
                list.join(", ")
            );
        }

        Self {
            table,
            notes: NotesIndex::build(notes),
            fetched_at,
            source,
            warnings,
            from_cache: false,
        }
    }
}

/// 取得元を識別するキャッシュキー
pub fn source_key(config: &Config, kind: SourceKind) -> String {
    let location = match kind {
        SourceKind::Csv => config.spreadsheet_id.clone().unwrap_or_default(),
        SourceKind::Excel => config
            .local_path
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_default(),
    };
    format!(
        "{}:{}:{}:{}",
        kind.label(),
        location.trim(),
        config.inventory_sheet,
        config.notes_sheet
    )
}

/// データを読み込む
///
/// `refresh` が false なら有効期間内のキャッシュを使う。
/// 両シートとも取得できた場合のみキャッシュに保存する。
pub async fn load_dataset(config: &Config, kind: SourceKind, refresh: bool) -> Result<Dataset> {
    let cache_dir = Config::cache_dir()?;
    load_dataset_with_cache(config, kind, refresh, &cache_dir).await
}

pub async fn load_dataset_with_cache(
    config: &Config,
    kind: SourceKind,
    refresh: bool,
    cache_dir: &Path,
) -> Result<Dataset> {
    let key = source_key(config, kind);
    let mut cache = CacheFile::load(cache_dir);

    if !refresh {
        if let Some(entry) = cache.get_fresh(&key, config.cache_ttl_seconds, Utc::now()) {
            log::debug!("キャッシュを使用: {} ({})", key, entry.fetched_at);
            let mut dataset = Dataset::build(
                &entry.inventory,
                &entry.notes,
                entry.fetched_at,
                kind.label().to_string(),
                Vec::new(),
            );
            dataset.from_cache = true;
            return Ok(dataset);
        }
    }

    let FetchedTables { inventory, notes, warnings } = fetcher::fetch_tables(config, kind).await?;
    let fetched_at = Utc::now();

    if warnings.is_empty() {
        cache.insert(
            key,
            CacheEntry {
                fetched_at,
                inventory: inventory.clone(),
                notes: notes.clone(),
            },
        );
        if let Err(e) = cache.save(cache_dir) {
            log::warn!("キャッシュ保存に失敗しました: {}", e);
        }
    }

    Ok(Dataset::build(
        &inventory,
        &notes,
        fetched_at,
        kind.label().to_string(),
        warnings,
    ))
}

/// 取得元のキャッシュを破棄（書き戻し後に使用）
pub fn invalidate(config: &Config, kind: SourceKind) -> Result<()> {
    let cache_dir = Config::cache_dir()?;
    invalidate_in(config, kind, &cache_dir)
}

pub fn invalidate_in(config: &Config, kind: SourceKind, cache_dir: &Path) -> Result<()> {
    let mut cache = CacheFile::load(cache_dir);
    if cache.remove(&source_key(config, kind)) {
        cache.save(cache_dir)?;
    }
    Ok(())
}
