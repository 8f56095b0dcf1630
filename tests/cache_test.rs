//! キャッシュ機能テスト
//!
//! シート取得結果キャッシュの動作を検証

use chrono::{Duration, TimeZone, Utc};
use drive_around::cache::{CacheEntry, CacheFile};
use drive_around_common::RawTable;
use tempfile::tempdir;

fn entry(item: &str, fetched_at: chrono::DateTime<Utc>) -> CacheEntry {
    CacheEntry {
        fetched_at,
        inventory: RawTable::new(vec!["ITEMCODE".to_string()], vec![vec![Some(item.to_string())]]),
        notes: RawTable::empty(),
    }
}

/// 空のキャッシュファイル
#[test]
fn test_cache_file_empty() {
    let dir = tempdir().expect("Failed to create temp dir");
    let cache = CacheFile::load(dir.path());

    assert_eq!(cache.len(), 0);
    assert!(cache.is_empty());
}

/// キャッシュの保存と読み込み
#[test]
fn test_cache_save_and_load() {
    let dir = tempdir().expect("Failed to create temp dir");

    let mut cache = CacheFile::load(dir.path());
    cache.insert("csv:sheet".to_string(), entry("A1", Utc::now()));
    cache.save(dir.path()).expect("キャッシュ保存失敗");

    let loaded = CacheFile::load(dir.path());
    assert_eq!(loaded.len(), 1);

    let cached = loaded.get("csv:sheet").expect("キャッシュが見つからない");
    assert_eq!(cached.inventory.headers, vec!["ITEMCODE"]);
    assert_eq!(cached.inventory.rows[0][0].as_deref(), Some("A1"));
}

/// 有効期間の判定
#[test]
fn test_cache_freshness() {
    let fetched_at = Utc.with_ymd_and_hms(2025, 3, 14, 9, 0, 0).unwrap();
    let e = entry("A1", fetched_at);

    assert!(e.is_fresh(600, fetched_at + Duration::seconds(599)));
    assert!(!e.is_fresh(600, fetched_at + Duration::seconds(600)));
    // 時計が戻った場合は期限切れ扱い
    assert!(!e.is_fresh(600, fetched_at - Duration::seconds(1)));

    let mut cache = CacheFile::default();
    cache.insert("k".to_string(), e);
    assert!(cache.get_fresh("k", 600, fetched_at + Duration::seconds(10)).is_some());
    assert!(cache.get_fresh("k", 600, fetched_at + Duration::hours(1)).is_none());
    assert!(cache.get("k").is_some());
}

/// 非常に大きい有効期間は無期限として扱う
#[test]
fn test_cache_huge_ttl_never_expires() {
    let fetched_at = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    let e = entry("A1", fetched_at);
    let later = fetched_at + Duration::days(365 * 50);

    assert!(e.is_fresh(u64::MAX, later));
    assert!(e.is_fresh(i64::MAX as u64 / 500, later));
    assert!(!e.is_fresh(0, fetched_at));

    let mut cache = CacheFile::default();
    cache.insert("k".to_string(), e);
    assert!(cache.get_fresh("k", u64::MAX, later).is_some());
}

/// キャッシュの上書きと削除
#[test]
fn test_cache_overwrite_and_remove() {
    let mut cache = CacheFile::default();
    cache.insert("k".to_string(), entry("first", Utc::now()));
    cache.insert("k".to_string(), entry("second", Utc::now()));

    assert_eq!(cache.len(), 1);
    let cached = cache.get("k").expect("キャッシュが見つからない");
    assert_eq!(cached.inventory.rows[0][0].as_deref(), Some("second"));

    assert!(cache.remove("k"));
    assert!(!cache.remove("k"));
    assert!(cache.is_empty());
}

/// 一覧はキー順
#[test]
fn test_cache_summaries_sorted() {
    let mut cache = CacheFile::default();
    cache.insert("excel:b".to_string(), entry("B", Utc::now()));
    cache.insert("csv:a".to_string(), entry("A", Utc::now()));

    let keys: Vec<&str> = cache.summaries().into_iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec!["csv:a", "excel:b"]);
}

/// キャッシュファイルが破損している場合
#[test]
fn test_cache_corrupted_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::write(CacheFile::cache_path(dir.path()), "{ invalid json }").unwrap();

    let cache = CacheFile::load(dir.path());
    assert!(cache.is_empty());
}

/// バージョン不一致は空として扱う
#[test]
fn test_cache_version_mismatch() {
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::write(
        CacheFile::cache_path(dir.path()),
        r#"{"version": 99, "entries": {}}"#,
    )
    .unwrap();

    let cache = CacheFile::load(dir.path());
    assert!(cache.is_empty());

    // 保存し直すと現在のバージョンで読める
    let mut cache = cache;
    cache.insert("k".to_string(), entry("A1", Utc::now()));
    cache.save(dir.path()).expect("保存失敗");
    assert_eq!(CacheFile::load(dir.path()).len(), 1);
}

/// キャッシュの削除
#[test]
fn test_cache_clear() {
    let dir = tempdir().expect("Failed to create temp dir");
    assert!(!CacheFile::clear(dir.path()).unwrap());

    let mut cache = CacheFile::default();
    cache.insert("k".to_string(), entry("A1", Utc::now()));
    cache.save(dir.path()).unwrap();

    assert!(CacheFile::clear(dir.path()).unwrap());
    assert!(!CacheFile::cache_path(dir.path()).exists());
}
