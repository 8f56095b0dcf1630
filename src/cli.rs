use clap::{Parser, Subcommand};
use crate::source::SourceKind;
use drive_around_common::StatusFilter;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "drive-around")]
#[command(about = "苗圃在庫ドライブアラウンド入力ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// キャッシュを無視して再取得
    #[arg(long, global = true)]
    pub refresh: bool,

    /// 取得元 (csv/excel)。省略時は設定ファイルの値
    #[arg(long, global = true)]
    pub source: Option<SourceKind>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 接続診断（認証情報の確認と在庫シートの試し読み）
    Check,

    /// 読み込み結果の概要を表示
    Summary,

    /// 対話式ドライブアラウンド
    Drive,

    /// 担当タスク一覧を表示
    Tasks {
        /// ユーザー（省略時は設定ファイルの値）
        #[arg(short, long)]
        user: Option<String>,

        /// 完了状態 (pending/complete/all)
        #[arg(short, long, default_value = "pending")]
        status: StatusFilter,

        /// ブロックで絞り込み
        #[arg(short, long)]
        block: Option<String>,
    },

    /// 品目のメモを表示
    Notes {
        /// ITEMCODE
        #[arg(required = true)]
        item_code: String,
    },

    /// 行を編集して保存
    Edit {
        /// ITEMCODE
        #[arg(required = true)]
        item_code: String,

        /// LOCATIONCODE
        #[arg(required = true)]
        location: String,

        /// 列の値（COL=VALUE、複数指定可）
        #[arg(long = "set", value_parser = parse_assignment)]
        set: Vec<(String, String)>,

        /// STATUS を COMPLETE にする
        #[arg(long)]
        complete: bool,

        /// 競合チェックをせずに上書き
        #[arg(long)]
        force: bool,
    },

    /// 写真を取り込んで PHOTO 列に記録
    Photo {
        /// ITEMCODE
        #[arg(required = true)]
        item_code: String,

        /// LOCATIONCODE
        #[arg(required = true)]
        location: String,

        /// 写真ファイル
        #[arg(required = true)]
        file: PathBuf,
    },

    /// 設定を表示・変更
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// スプレッドシートIDを設定
        #[arg(long)]
        set_spreadsheet_id: Option<String>,

        /// ローカルExcelファイルを設定
        #[arg(long)]
        set_local_path: Option<PathBuf>,

        /// 既定の取得元を設定
        #[arg(long)]
        set_source: Option<SourceKind>,

        /// 既定のユーザーを設定
        #[arg(long)]
        set_user: Option<String>,

        /// 写真フォルダを設定
        #[arg(long)]
        set_photo_dir: Option<PathBuf>,

        /// サービスアカウント認証情報JSONを設定
        #[arg(long)]
        set_credentials: Option<PathBuf>,
    },

    /// キャッシュ管理
    Cache {
        /// キャッシュを削除
        #[arg(long)]
        clear: bool,

        /// キャッシュ情報を表示
        #[arg(long)]
        info: bool,
    },

    /// 読み込んだシートをローカルのExcelファイルに書き出す
    Snapshot {
        /// 出力ファイル
        #[arg(short, long, required = true)]
        output: PathBuf,
    },
}

/// `COL=VALUE` を分解（列名は大文字化）
pub fn parse_assignment(s: &str) -> Result<(String, String), String> {
    let (column, value) = s
        .split_once('=')
        .ok_or_else(|| format!("COL=VALUE の形式で指定してください: {}", s))?;
    let column = column.trim().to_uppercase();
    if column.is_empty() {
        return Err(format!("列名が空です: {}", s));
    }
    Ok((column, value.to_string()))
}
