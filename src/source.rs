use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// シートの取得元
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// 公開CSVエクスポート（読み取り専用）
    #[default]
    Csv,
    /// ローカルのExcelファイル（書き戻し可）
    Excel,
}

impl SourceKind {
    pub fn label(&self) -> &'static str {
        match self {
            SourceKind::Csv => "csv",
            SourceKind::Excel => "excel",
        }
    }

    pub fn is_writable(&self) -> bool {
        matches!(self, SourceKind::Excel)
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
