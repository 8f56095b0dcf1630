//! シート取得結果キャッシュモジュール
//!
//! 取得元ごとに取得済みの表と取得時刻を保存し、
//! 有効期間内であれば再取得をスキップする。

use crate::error::Result;
use chrono::{DateTime, Utc};
use drive_around_common::RawTable;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

const CACHE_FILE_NAME: &str = ".drive-around-cache.json";

/// キャッシュファイルの構造
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheFile {
    /// バージョン（互換性チェック用）
    version: u32,
    /// 取得元キー → 取得結果のマップ
    entries: HashMap<String, CacheEntry>,
}

/// キャッシュエントリ
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// 取得時刻
    pub fetched_at: DateTime<Utc>,
    pub inventory: RawTable,
    pub notes: RawTable,
}

impl CacheEntry {
    /// 有効期間内か
    pub fn is_fresh(&self, ttl_seconds: u64, now: DateTime<Utc>) -> bool {
        if now < self.fetched_at {
            return false;
        }
        u64::try_from((now - self.fetched_at).num_seconds()).map_or(false, |age| age < ttl_seconds)
    }
}

impl CacheFile {
    const CURRENT_VERSION: u32 = 1;

    pub fn cache_path(dir: &Path) -> PathBuf {
        dir.join(CACHE_FILE_NAME)
    }

    /// キャッシュファイルを読み込み（無い・壊れている場合は空）
    pub fn load(dir: &Path) -> Self {
        let cache_path = Self::cache_path(dir);
        if !cache_path.exists() {
            return Self::default();
        }

        let file = match File::open(&cache_path) {
            Ok(f) => f,
            Err(_) => return Self::default(),
        };

        let reader = BufReader::new(file);
        match serde_json::from_reader::<_, CacheFile>(reader) {
            Ok(cache) => {
                // バージョンチェック
                if cache.version != Self::CURRENT_VERSION {
                    log::warn!("キャッシュバージョン不一致、再生成します");
                    return Self::default();
                }
                cache
            }
            Err(e) => {
                log::debug!("キャッシュ読み込み失敗 ({}): {}", cache_path.display(), e);
                Self::default()
            }
        }
    }

    /// キャッシュファイルを保存
    pub fn save(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)?;
        let file = File::create(Self::cache_path(dir))?;
        let writer = BufWriter::new(file);
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    /// キャッシュファイルを削除（削除した場合 true）
    pub fn clear(dir: &Path) -> Result<bool> {
        let cache_path = Self::cache_path(dir);
        if !cache_path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(cache_path)?;
        Ok(true)
    }

    pub fn get(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    /// 有効期間内のエントリのみ返す
    pub fn get_fresh(&self, key: &str, ttl_seconds: u64, now: DateTime<Utc>) -> Option<&CacheEntry> {
        self.get(key).filter(|entry| entry.is_fresh(ttl_seconds, now))
    }

    pub fn insert(&mut self, key: String, entry: CacheEntry) {
        self.entries.insert(key, entry);
    }

    pub fn remove(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    /// キャッシュ件数
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// (取得元キー, 取得時刻) の一覧
    pub fn summaries(&self) -> Vec<(&str, DateTime<Utc>)> {
        let mut items: Vec<_> = self
            .entries
            .iter()
            .map(|(k, e)| (k.as_str(), e.fetched_at))
            .collect();
        items.sort_by(|a, b| a.0.cmp(b.0));
        items
    }
}

impl Default for CacheFile {
    fn default() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            entries: HashMap::new(),
        }
    }
}
