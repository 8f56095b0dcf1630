//! 写真の取り込み
//!
//! 写真フォルダに `{ロケーション}_{品名}_{撮影日時}.{拡張子}` でコピーする。

mod exif;

use crate::error::{DriveAroundError, Result};
use chrono::NaiveDateTime;
use regex::Regex;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];
const MAX_NAME_LEN: usize = 40;

lazy_static::lazy_static! {
    static ref NON_ALNUM: Regex = Regex::new(r"[^A-Za-z0-9]+").unwrap();
    static ref NON_LOCATION: Regex = Regex::new(r"[^A-Za-z0-9-]+").unwrap();
}

fn is_image_extension(ext: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str())
}

/// 品名をファイル名に使える形にする
pub fn sanitize_name(name: &str) -> String {
    let replaced = NON_ALNUM.replace_all(name.trim(), "_");
    let trimmed: String = replaced.trim_matches('_').chars().take(MAX_NAME_LEN).collect();
    let trimmed = trimmed.trim_end_matches('_');
    if trimmed.is_empty() {
        "ITEM".to_string()
    } else {
        trimmed.to_string()
    }
}

fn sanitize_location(location: &str) -> String {
    let replaced = NON_LOCATION.replace_all(location.trim(), "_");
    let trimmed = replaced.trim_matches('_');
    if trimmed.is_empty() {
        "NOLOC".to_string()
    } else {
        trimmed.to_string()
    }
}

/// ロケーションの写真ファイル名の接頭辞
pub fn photo_prefix(location: &str) -> String {
    format!("{}_", sanitize_location(location))
}

pub fn photo_file_name(location: &str, item_name: &str, taken_at: NaiveDateTime, ext: &str) -> String {
    format!(
        "{}{}_{}.{}",
        photo_prefix(location),
        sanitize_name(item_name),
        taken_at.format("%Y%m%d_%H%M%S"),
        ext.to_lowercase()
    )
}

/// 写真を写真フォルダにコピーし、保存先パスを返す
///
/// 撮影日時はEXIFを優先し、無ければ `now` を使う。
pub fn save_photo(
    src: &Path,
    photo_dir: &Path,
    location: &str,
    item_name: &str,
    now: NaiveDateTime,
) -> Result<PathBuf> {
    if !src.is_file() {
        return Err(DriveAroundError::FileNotFound(src.display().to_string()));
    }

    let ext = src
        .extension()
        .map(|e| e.to_string_lossy().to_string())
        .filter(|e| is_image_extension(e))
        .ok_or_else(|| {
            DriveAroundError::ImageLoad(format!("対応していない形式です（jpg/png）: {}", src.display()))
        })?;

    image::image_dimensions(src)
        .map_err(|e| DriveAroundError::ImageLoad(format!("{}: {}", src.display(), e)))?;

    let taken_at = exif::extract_datetime(src).unwrap_or(now);
    std::fs::create_dir_all(photo_dir)?;

    let file_name = photo_file_name(location, item_name, taken_at, &ext);
    let mut dest = photo_dir.join(&file_name);
    // 同名ファイルがあれば連番を付ける
    let mut n = 2;
    while dest.exists() {
        let stem = file_name.trim_end_matches(&format!(".{}", ext.to_lowercase()));
        dest = photo_dir.join(format!("{}_{}.{}", stem, n, ext.to_lowercase()));
        n += 1;
    }

    std::fs::copy(src, &dest)?;
    log::debug!("写真を保存: {} → {}", src.display(), dest.display());
    Ok(dest)
}

/// ロケーションの写真一覧（直下のみ、ファイル名順）
pub fn list_photos(photo_dir: &Path, location: &str) -> Vec<PathBuf> {
    if !photo_dir.is_dir() {
        return Vec::new();
    }

    let prefix = photo_prefix(location);
    let mut photos: Vec<PathBuf> = WalkDir::new(photo_dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.file_name().to_string_lossy().starts_with(&prefix))
        .filter(|e| {
            e.path()
                .extension()
                .map(|ext| is_image_extension(&ext.to_string_lossy()))
                .unwrap_or(false)
        })
        .map(|e| e.into_path())
        .collect();

    photos.sort();
    photos
}
