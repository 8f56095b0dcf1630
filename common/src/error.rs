//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("行が見つかりません: {0}")]
    RowNotFound(String),

    #[error("他の更新と競合しました（再読み込みしてください）: {0}")]
    Conflict(String),

    #[error("編集できない列です: {0}")]
    NotEditable(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_io() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = Error::Io(io_error);
        let display = format!("{}", error);
        assert!(display.contains("IO error"));
        assert!(display.contains("file not found"));
    }

    #[test]
    fn test_error_display_conflict() {
        let error = Error::Conflict("A1 @ L1".to_string());
        let display = format!("{}", error);
        assert!(display.contains("競合"));
        assert!(display.contains("A1 @ L1"));
    }

    #[test]
    fn test_error_from_json() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: Error = json_error.into();
        assert!(matches!(error, Error::Json(_)));
    }

    #[test]
    fn test_error_debug() {
        let error = Error::NotEditable("COMMONNAME".to_string());
        let debug = format!("{:?}", error);
        assert!(debug.contains("NotEditable"));
        assert!(debug.contains("COMMONNAME"));
    }
}
