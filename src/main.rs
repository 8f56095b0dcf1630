use clap::Parser;
use drive_around::{cache, check, cli, config, display, error, fetcher, loader, photo, session, writer};
use drive_around::source::SourceKind;
use cli::{Cli, Commands};
use config::Config;
use drive_around_common::columns::PHOTO;
use drive_around_common::{normalize, view, EditForm, RowKey, ViewState};
use error::{DriveAroundError, Result};
use indicatif::{ProgressBar, ProgressStyle};
use loader::Dataset;
use std::time::Duration;
use writer::{SaveOutcome, WriteMode};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();

    let config = Config::load()?;
    let kind = cli.source.unwrap_or(config.source);

    match cli.command {
        Commands::Check => {
            check::run_check(&config, kind).await?;
        }

        Commands::Summary => {
            println!("📊 drive-around - 概要\n");
            let dataset = load_with_spinner(&config, kind, cli.refresh).await?;

            println!("取得元: {}{}", dataset.source, if dataset.from_cache { " (キャッシュ)" } else { "" });
            println!("取得時刻: {}", dataset.fetched_at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M:%S"));
            println!("在庫: {}行 / {}列", dataset.table.len(), dataset.table.columns.len());
            println!("メモ: {}品目", dataset.notes.len());

            let duplicates = dataset.table.duplicate_keys();
            if !duplicates.is_empty() {
                println!("重複キー: {}件", duplicates.len());
            }
            let complete = dataset.table.rows.iter().filter(|r| r.is_complete()).count();
            println!("完了: {} / {}", complete, dataset.table.len());
        }

        Commands::Drive => {
            println!("🚗 drive-around - ドライブアラウンド\n");
            let dataset = load_with_spinner(&config, kind, cli.refresh).await?;
            let mode = WriteMode::for_source(&config, kind);
            session::Session::new(config, kind, dataset, mode).run().await?;
        }

        Commands::Tasks { user, status, block } => {
            let user = user
                .or_else(|| config.user.clone())
                .ok_or_else(|| DriveAroundError::Config(
                    "ユーザーが指定されていません。`--user` または `config --set-user` で指定してください".into(),
                ))?;
            println!("📋 drive-around - {} のタスク ({})\n", user, status);

            let dataset = load_with_spinner(&config, kind, cli.refresh).await?;
            let state = ViewState {
                status,
                ..ViewState::for_user(&user)
            };
            let rows: Vec<_> = view::task_rows(&dataset.table, &state, &config.assignment)
                .into_iter()
                .filter(|row| block.as_deref().map_or(true, |b| row.block().eq_ignore_ascii_case(b.trim())))
                .collect();

            if rows.is_empty() {
                println!("該当するタスクはありません");
            } else {
                print!("{}", display::task_list(&rows));
                println!("\n✔ {}件", rows.len());
            }
        }

        Commands::Notes { item_code } => {
            let dataset = load_with_spinner(&config, kind, cli.refresh).await?;
            let notes = dataset.notes.get(item_code.trim());
            if notes.is_empty() {
                println!("{} のメモはありません", item_code.trim());
            } else {
                println!("{} のメモ:", item_code.trim());
                for note in notes {
                    println!("  - {}", note);
                }
            }
        }

        Commands::Edit { item_code, location, set, complete, force } => {
            println!("✏ drive-around - 編集\n");
            let mode = WriteMode::for_source(&config, kind);
            if let WriteMode::Disabled(reason) = &mode {
                return Err(DriveAroundError::ReadOnly(reason.clone()));
            }

            // 競合判定のため常に最新を取得
            let mut dataset = load_with_spinner(&config, kind, true).await?;
            let key = RowKey::new(&item_code, &location);
            let row = dataset
                .table
                .find(&key)
                .ok_or_else(|| drive_around_common::Error::RowNotFound(key.to_string()))?;

            let mut form = EditForm::from_row(row);
            for (column, value) in &set {
                form.set(column, value.clone())?;
            }
            if complete {
                form.mark_complete();
            }

            let mut patch = form.into_patch();
            if force {
                patch.base_version = None;
            }
            if patch.is_empty() {
                println!("変更はありません");
                return Ok(());
            }

            for (column, value) in &patch.changes {
                println!("  {} = {}", column, value);
            }
            save(&config, kind, &mut dataset, &patch, &mode)?;
        }

        Commands::Photo { item_code, location, file } => {
            println!("📷 drive-around - 写真取り込み\n");
            let mode = WriteMode::for_source(&config, kind);

            println!("[1/2] 写真をコピー中...");
            let mut dataset = load_with_spinner(&config, kind, mode.is_enabled()).await?;
            let key = RowKey::new(&item_code, &location);
            let row = dataset
                .table
                .find(&key)
                .ok_or_else(|| drive_around_common::Error::RowNotFound(key.to_string()))?;

            let now = chrono::Local::now().naive_local();
            let dest = photo::save_photo(&file, &config.photo_dir, &key.location, row.common_name(), now)?;
            println!("✔ 保存: {}\n", dest.display());

            println!("[2/2] PHOTO 列を更新中...");
            let file_name = dest
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            let mut form = EditForm::from_row(row);
            form.set(PHOTO, file_name)?;
            let patch = form.into_patch();

            match &mode {
                WriteMode::Disabled(reason) => {
                    println!("⚠ 書き込みは無効です（{}）。PHOTO 列には記録していません", reason);
                }
                WriteMode::LocalExcel { .. } => save(&config, kind, &mut dataset, &patch, &mode)?,
            }

            let photos = photo::list_photos(&config.photo_dir, &key.location);
            println!("\n{} の写真: {}枚", key.location, photos.len());
        }

        Commands::Config {
            show,
            set_spreadsheet_id,
            set_local_path,
            set_source,
            set_user,
            set_photo_dir,
            set_credentials,
        } => {
            let mut config = config;
            let mut changed = false;

            if let Some(id) = set_spreadsheet_id {
                config.spreadsheet_id = Some(id.trim().to_string());
                changed = true;
            }
            if let Some(path) = set_local_path {
                config.local_path = Some(path);
                changed = true;
            }
            if let Some(source) = set_source {
                config.source = source;
                changed = true;
            }
            if let Some(user) = set_user {
                config.user = Some(user.trim().to_string()).filter(|u| !u.is_empty());
                changed = true;
            }
            if let Some(dir) = set_photo_dir {
                config.photo_dir = dir;
                changed = true;
            }
            if let Some(path) = set_credentials {
                config.credentials_path = Some(path);
                changed = true;
            }

            if changed {
                config.save()?;
                println!("✔ 設定を保存しました: {}", Config::config_path()?.display());
            }

            if show || !changed {
                println!("設定:");
                println!("  取得元: {}", config.source);
                println!("  スプレッドシートID: {}", config.spreadsheet_id.as_deref().unwrap_or("未設定"));
                println!("  在庫シート: {}", config.inventory_sheet);
                println!("  メモシート: {}", config.notes_sheet);
                println!(
                    "  Excelファイル: {}",
                    config.local_path.as_deref().map(|p| p.display().to_string()).unwrap_or_else(|| "未設定".into())
                );
                println!("  写真フォルダ: {}", config.photo_dir.display());
                println!("  ユーザー: {}", config.user.as_deref().unwrap_or("未設定"));
                println!(
                    "  固定担当: {} ({})",
                    config.assignment.bucket_user,
                    config.assignment.bucket_sizes.join(", ")
                );
                println!("  キャッシュ有効期間: {}秒", config.cache_ttl_seconds);
                println!("  認証情報: {}", if config.credentials_path.is_some() { "設定済み" } else { "未設定" });
            }
        }

        Commands::Cache { clear, info } => {
            let cache_dir = Config::cache_dir()?;
            let cache_path = cache::CacheFile::cache_path(&cache_dir);

            if info || !clear {
                if cache_path.exists() {
                    let cache = cache::CacheFile::load(&cache_dir);
                    println!("キャッシュ情報:");
                    println!("  パス: {}", cache_path.display());
                    println!("  件数: {}", cache.len());
                    if let Ok(meta) = std::fs::metadata(&cache_path) {
                        println!("  サイズ: {} bytes", meta.len());
                    }
                    for (key, fetched_at) in cache.summaries() {
                        let fresh = cache
                            .get_fresh(key, config.cache_ttl_seconds, chrono::Utc::now())
                            .is_some();
                        println!(
                            "  - {} ({}{})",
                            key,
                            fetched_at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M:%S"),
                            if fresh { "" } else { ", 期限切れ" }
                        );
                    }
                } else {
                    println!("キャッシュファイルが存在しません: {}", cache_path.display());
                }
            }

            if clear {
                match cache::CacheFile::clear(&cache_dir) {
                    Ok(true) => println!("✔ キャッシュを削除しました: {}", cache_path.display()),
                    Ok(false) => println!("キャッシュファイルが存在しません"),
                    Err(e) => println!("キャッシュ削除エラー: {}", e),
                }
            }
        }

        Commands::Snapshot { output } => {
            println!("💾 drive-around - スナップショット\n");

            println!("[1/2] シートを取得中 ({})...", kind);
            let fetched = fetcher::fetch_tables(&config, kind).await?;
            for w in &fetched.warnings {
                println!("⚠ {}", w);
            }
            let inventory = normalize(&fetched.inventory);
            println!("✔ 在庫 {}行 / メモ {}行\n", inventory.len(), fetched.notes.len());

            println!("[2/2] 書き出し中...");
            writer::create_workbook(&output, &config, &inventory, &fetched.notes)?;
            println!("✔ 保存: {}", output.display());
            println!("\n✅ `config --set-source excel --set-local-path {}` で取得元にできます", output.display());
        }
    }

    Ok(())
}

/// スピナーを表示しながら読み込む
async fn load_with_spinner(config: &Config, kind: SourceKind, refresh: bool) -> Result<Dataset> {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(format!("シートを読み込み中 ({})...", kind));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = loader::load_dataset(config, kind, refresh).await;
    spinner.finish_and_clear();

    let dataset = result?;
    for w in &dataset.warnings {
        println!("⚠ {}", w);
    }
    println!(
        "✔ {}行を読み込みました{}\n",
        dataset.table.len(),
        if dataset.from_cache { " (キャッシュ)" } else { "" }
    );
    Ok(dataset)
}

fn save(
    config: &Config,
    kind: SourceKind,
    dataset: &mut Dataset,
    patch: &drive_around_common::EditPatch,
    mode: &WriteMode,
) -> Result<()> {
    match writer::save_patch(dataset, patch, mode)? {
        SaveOutcome::Written(path) => {
            if let Err(e) = loader::invalidate(config, kind) {
                log::warn!("キャッシュ破棄に失敗: {}", e);
            }
            println!("💾 保存しました: {}", path.display());
        }
        SaveOutcome::InMemory => println!("✔ メモリ上に反映しました"),
    }
    Ok(())
}
