use thiserror::Error;

#[derive(Error, Debug)]
pub enum DriveAroundError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("スプレッドシートIDが設定されていません。`drive-around config --set-spreadsheet-id ID` で設定してください")]
    MissingSpreadsheetId,

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("シートが見つかりません: {0}")]
    SheetNotFound(String),

    #[error("シート取得エラー: {0}")]
    Fetch(String),

    #[error("CSV解析エラー: {0}")]
    CsvParse(#[from] csv::Error),

    #[error("Excel読み込みエラー: {0}")]
    ExcelRead(String),

    #[error("Excel書き込みエラー: {0}")]
    ExcelWrite(String),

    #[error("画像読み込みエラー: {0}")]
    ImageLoad(String),

    #[error("書き込みは無効です（{0}）")]
    ReadOnly(String),

    #[error("入力エラー: {0}")]
    Prompt(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] drive_around_common::Error),
}

impl From<reqwest::Error> for DriveAroundError {
    fn from(err: reqwest::Error) -> Self {
        DriveAroundError::Fetch(err.to_string())
    }
}

impl From<dialoguer::Error> for DriveAroundError {
    fn from(err: dialoguer::Error) -> Self {
        DriveAroundError::Prompt(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DriveAroundError>;
