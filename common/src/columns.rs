//! 在庫シートの列名定義
//!
//! 列名はすべて正規化後（trim + 大文字）の表記。

pub const LOC_SALESNOTE: &str = "LOC_SALESNOTE";
pub const CALIPER: &str = "CALIPER";
pub const SPEC: &str = "SPEC";
pub const LOC_COMMENTS: &str = "LOC_COMMENTS";
pub const MATCH_PCT: &str = "MATCH_PCT";
pub const PIC_NOTE: &str = "PIC_NOTE";
pub const PRIME_QTY: &str = "PRIME_QTY";
pub const PHOTO: &str = "PHOTO";
pub const STATUS: &str = "STATUS";
pub const ITEMCODE: &str = "ITEMCODE";
pub const SALES_ASSIGNEDTO: &str = "SALES_ASSIGNEDTO";
pub const SEASON: &str = "SEASON";
pub const COMMONNAME: &str = "COMMONNAME";
pub const CONTSIZE: &str = "CONTSIZE";
pub const BLOCKALPHA: &str = "BLOCKALPHA";
pub const LOCATIONCODE: &str = "LOCATIONCODE";
pub const LOTCODE: &str = "LOTCODE";
pub const PRIORITY: &str = "PRIORITY";
pub const CURRENT_SALESNOTE: &str = "CURRENT_SALESNOTE";
pub const PTRAVAILABLE: &str = "PTRAVAILABLE";
pub const S_LTS: &str = "S_LTS";

/// 読み込み時に必ず存在させる列（欠けていれば空文字で補完）
pub const REQUIRED_COLUMNS: &[&str] = &[
    LOC_SALESNOTE,
    CALIPER,
    SPEC,
    LOC_COMMENTS,
    MATCH_PCT,
    PIC_NOTE,
    PRIME_QTY,
    PHOTO,
    STATUS,
    ITEMCODE,
    SALES_ASSIGNEDTO,
    SEASON,
    COMMONNAME,
    CONTSIZE,
    BLOCKALPHA,
    LOCATIONCODE,
    LOTCODE,
    PRIORITY,
    CURRENT_SALESNOTE,
    PTRAVAILABLE,
    S_LTS,
];

/// 編集フォームで変更できる列
pub const EDITABLE_COLUMNS: &[&str] = &[
    CALIPER,
    SPEC,
    MATCH_PCT,
    PRIME_QTY,
    LOC_SALESNOTE,
    LOC_COMMENTS,
    PIC_NOTE,
    PHOTO,
    STATUS,
];

/// 完了を表すSTATUS値
pub const STATUS_COMPLETE: &str = "COMPLETE";

pub fn is_editable(column: &str) -> bool {
    EDITABLE_COLUMNS.contains(&column)
}
