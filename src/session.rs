//! 対話式ドライブアラウンド
//!
//! 画面状態は `ViewState` で持ち、選択ごとに `reduce` で次の状態を作る。

use crate::config::Config;
use crate::display;
use crate::error::Result;
use crate::loader::{self, Dataset};
use crate::photo;
use crate::source::SourceKind;
use crate::writer::{self, SaveOutcome, WriteMode};
use dialoguer::{Confirm, Input, MultiSelect, Select};
use drive_around_common::columns::{EDITABLE_COLUMNS, PHOTO, SEASON};
use drive_around_common::filter::distinct_values;
use drive_around_common::navigation::{reduce, Action, DriveStep, Page, TaskStep, ViewState};
use drive_around_common::{view, EditForm, RowKey};

/// メニュー項目の選択結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    Act(Action),
    Search,
    Seasons,
    ToggleStatus,
    ChangeUser,
    Edit(RowKey),
    Reload,
    Quit,
}

pub struct Session {
    config: Config,
    kind: SourceKind,
    dataset: Dataset,
    mode: WriteMode,
    state: ViewState,
}

impl Session {
    pub fn new(config: Config, kind: SourceKind, dataset: Dataset, mode: WriteMode) -> Self {
        let state = ViewState::for_user(config.user.as_deref().unwrap_or(""));
        Self { config, kind, dataset, mode, state }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// 操作を適用
    pub fn dispatch(&mut self, action: Action) {
        self.state = reduce(&self.state, action);
    }

    /// 現在の画面のタイトルとメニュー
    pub fn menu(&self) -> (String, Vec<(String, Choice)>) {
        let table = &self.dataset.table;
        let rule = &self.config.assignment;
        let state = &self.state;
        let mut items: Vec<(String, Choice)> = Vec::new();

        let title = match state.page {
            Page::DriveAround => match state.drive_step {
                DriveStep::Variety => {
                    for v in view::varieties(table, state) {
                        items.push((v.clone(), Choice::Act(Action::SelectVariety(v))));
                    }
                    items.push(("🔍 検索".into(), Choice::Search));
                    if state.search.is_empty() {
                        "品種を選択".to_string()
                    } else {
                        format!("品種を選択（検索: {}）", state.search)
                    }
                }
                DriveStep::Size => {
                    for s in view::sizes(table, state) {
                        items.push((s.clone(), Choice::Act(Action::SelectSize(s))));
                    }
                    items.push(("← 戻る".into(), Choice::Act(Action::Back)));
                    format!("{} のサイズを選択", state.variety.as_deref().unwrap_or(""))
                }
                DriveStep::Data => {
                    for row in view::drive_rows(table, state) {
                        items.push((format!("✏ {}", display::row_summary(row)), Choice::Edit(row.key())));
                    }
                    items.push(("← 戻る".into(), Choice::Act(Action::Back)));
                    format!(
                        "{} / {}",
                        state.variety.as_deref().unwrap_or(""),
                        state.size.as_deref().unwrap_or("")
                    )
                }
            },
            Page::MyTasks => match state.task_step {
                TaskStep::Block => {
                    for b in view::task_blocks(table, state, rule) {
                        items.push((format!("ブロック {}", b), Choice::Act(Action::SelectBlock(b))));
                    }
                    items.push((format!("状態: {}", state.status), Choice::ToggleStatus));
                    items.push(("👤 ユーザー変更".into(), Choice::ChangeUser));
                    format!("{} のタスク", state.user.as_deref().unwrap_or("（未設定）"))
                }
                TaskStep::Location => {
                    for l in view::task_locations(table, state, rule) {
                        items.push((l.clone(), Choice::Act(Action::SelectLocation(l))));
                    }
                    items.push(("← 戻る".into(), Choice::Act(Action::Back)));
                    format!("ブロック {} のロケーション", state.block.as_deref().unwrap_or(""))
                }
                TaskStep::ListItems => {
                    for row in view::task_items(table, state, rule) {
                        items.push((display::row_summary(row), Choice::Act(Action::SelectItem(row.key()))));
                    }
                    items.push(("📄 詳細表示".into(), Choice::Act(Action::ShowDetails)));
                    items.push(("← 戻る".into(), Choice::Act(Action::Back)));
                    format!("{} の品目", state.location.as_deref().unwrap_or(""))
                }
                TaskStep::Details => {
                    items.push(("📋 品目一覧".into(), Choice::Act(Action::ListItems)));
                    items.push(("← 戻る".into(), Choice::Act(Action::Back)));
                    format!("{} の詳細", state.location.as_deref().unwrap_or(""))
                }
                TaskStep::EditItem => {
                    if let Some(key) = &state.item {
                        items.push(("✏ 編集".into(), Choice::Edit(key.clone())));
                    }
                    items.push(("← 戻る".into(), Choice::Act(Action::Back)));
                    match view::selected_item(table, state) {
                        Some(row) => display::row_summary(row),
                        None => "品目の編集".to_string(),
                    }
                }
            },
        };

        let season_label = if state.seasons.is_active() {
            format!("🌱 シーズン: {}", state.seasons.seasons().collect::<Vec<_>>().join(", "))
        } else {
            "🌱 シーズン: すべて".to_string()
        };
        items.push((season_label, Choice::Seasons));

        match state.page {
            Page::DriveAround => items.push(("📋 担当タスクへ".into(), Choice::Act(Action::Navigate(Page::MyTasks)))),
            Page::MyTasks => items.push(("🚗 ドライブアラウンドへ".into(), Choice::Act(Action::Navigate(Page::DriveAround)))),
        }
        items.push(("🔄 再読み込み".into(), Choice::Reload));
        items.push(("終了".into(), Choice::Quit));

        (title, items)
    }

    /// 対話ループ
    pub async fn run(mut self) -> Result<()> {
        if !self.mode.is_enabled() {
            if let WriteMode::Disabled(reason) = &self.mode {
                println!("⚠ 書き込みは無効です（{}）。編集はこのセッション中のみ保持されます\n", reason);
            }
        }

        loop {
            self.print_context();
            let (title, items) = self.menu();
            let labels: Vec<&str> = items.iter().map(|(label, _)| label.as_str()).collect();

            let picked = Select::new()
                .with_prompt(title)
                .items(&labels)
                .default(0)
                .interact_opt()?;

            // Esc は戻る
            let choice = match picked {
                Some(idx) => items[idx].1.clone(),
                None => Choice::Act(Action::Back),
            };

            match choice {
                Choice::Act(action) => self.dispatch(action),
                Choice::Search => {
                    let text: String = Input::new()
                        .with_prompt("品種の検索（空でクリア）")
                        .with_initial_text(self.state.search.clone())
                        .allow_empty(true)
                        .interact_text()?;
                    self.dispatch(Action::Search(text.trim().to_string()));
                }
                Choice::Seasons => self.pick_seasons()?,
                Choice::ToggleStatus => {
                    use drive_around_common::StatusFilter;
                    let next = match self.state.status {
                        StatusFilter::Pending => StatusFilter::Complete,
                        StatusFilter::Complete => StatusFilter::All,
                        StatusFilter::All => StatusFilter::Pending,
                    };
                    self.dispatch(Action::SetStatus(next));
                }
                Choice::ChangeUser => {
                    let user: String = Input::new()
                        .with_prompt("ユーザー名")
                        .with_initial_text(self.state.user.clone().unwrap_or_default())
                        .interact_text()?;
                    self.dispatch(Action::SetUser(user));
                }
                Choice::Edit(key) => {
                    self.edit_item(&key)?;
                    if self.state.task_step == TaskStep::EditItem {
                        self.dispatch(Action::Back);
                    }
                }
                Choice::Reload => {
                    println!("🔄 再読み込み中...");
                    match loader::load_dataset(&self.config, self.kind, true).await {
                        Ok(dataset) => {
                            for w in &dataset.warnings {
                                println!("⚠ {}", w);
                            }
                            println!("✔ {}行を読み込みました\n", dataset.table.len());
                            self.dataset = dataset;
                        }
                        Err(e) => println!("⛔ 再読み込みに失敗: {}\n", e),
                    }
                }
                Choice::Quit => break,
            }
        }

        Ok(())
    }

    /// 詳細表示・データ表示の画面では行を出力
    fn print_context(&self) {
        let table = &self.dataset.table;
        let rows = match (self.state.page, self.state.drive_step, self.state.task_step) {
            (Page::DriveAround, DriveStep::Data, _) => view::drive_rows(table, &self.state),
            (Page::MyTasks, _, TaskStep::Details) => {
                view::task_items(table, &self.state, &self.config.assignment)
            }
            _ => return,
        };

        println!();
        if rows.is_empty() {
            println!("（該当する行がありません）");
        }
        for row in rows {
            println!("{}", display::row_summary(row));
            print!("{}", display::row_details(row, self.dataset.notes.get(row.item_code())));
            println!();
        }
    }

    fn pick_seasons(&mut self) -> Result<()> {
        let seasons = distinct_values(&self.dataset.table.rows, SEASON);
        if seasons.is_empty() {
            println!("SEASON 列に値がありません");
            return Ok(());
        }

        let defaults: Vec<bool> = seasons.iter().map(|s| self.state.seasons.contains(s)).collect();
        let chosen = MultiSelect::new()
            .with_prompt("シーズン（未選択ですべて）")
            .items(&seasons)
            .defaults(&defaults)
            .interact()?;

        self.dispatch(Action::ToggleSeason("CLEAR".into()));
        for idx in chosen {
            self.dispatch(Action::ToggleSeason(seasons[idx].clone()));
        }
        Ok(())
    }

    fn edit_item(&mut self, key: &RowKey) -> Result<()> {
        let Some(row) = self.dataset.table.find(key) else {
            println!("⛔ 行が見つかりません: {}", key);
            return Ok(());
        };

        println!("\n{}", display::row_summary(row));
        print!("{}", display::row_details(row, self.dataset.notes.get(row.item_code())));
        let item_name = row.common_name().to_string();
        let mut form = EditForm::from_row(row);

        loop {
            let mut labels: Vec<String> = EDITABLE_COLUMNS
                .iter()
                .map(|col| format!("{:<14} {}", col, form.get(col)))
                .collect();
            labels.push("✔ 完了にする".into());
            labels.push("📷 写真を追加".into());
            labels.push("💾 保存".into());
            labels.push("← 戻る".into());

            let picked = Select::new()
                .with_prompt(format!("編集: {}", key))
                .items(&labels)
                .default(0)
                .interact_opt()?;

            let n = EDITABLE_COLUMNS.len();
            match picked {
                Some(idx) if idx < n => {
                    let col = EDITABLE_COLUMNS[idx];
                    let value: String = Input::new()
                        .with_prompt(col)
                        .with_initial_text(form.get(col).to_string())
                        .allow_empty(true)
                        .interact_text()?;
                    form.set(col, value)?;
                }
                Some(idx) if idx == n => form.mark_complete(),
                Some(idx) if idx == n + 1 => {
                    let path: String = Input::new().with_prompt("写真ファイルのパス").interact_text()?;
                    let now = chrono::Local::now().naive_local();
                    match photo::save_photo(
                        std::path::Path::new(path.trim()),
                        &self.config.photo_dir,
                        &key.location,
                        &item_name,
                        now,
                    ) {
                        Ok(dest) => {
                            let file_name = dest
                                .file_name()
                                .map(|n| n.to_string_lossy().to_string())
                                .unwrap_or_default();
                            println!("✔ 写真を保存: {}", dest.display());
                            form.set(PHOTO, file_name)?;
                        }
                        Err(e) => println!("⛔ {}", e),
                    }
                }
                Some(idx) if idx == n + 2 => {
                    if !form.is_dirty() {
                        println!("変更はありません");
                        return Ok(());
                    }
                    let patch = form.clone().into_patch();
                    match writer::save_patch(&mut self.dataset, &patch, &self.mode) {
                        Ok(SaveOutcome::Written(path)) => {
                            if let Err(e) = loader::invalidate(&self.config, self.kind) {
                                log::warn!("キャッシュ破棄に失敗: {}", e);
                            }
                            println!("💾 保存しました: {}\n", path.display());
                        }
                        Ok(SaveOutcome::InMemory) => println!("✔ メモリ上に反映しました\n"),
                        Err(e) => println!("⛔ 保存に失敗: {}\n", e),
                    }
                    return Ok(());
                }
                _ => {
                    if form.is_dirty()
                        && !Confirm::new()
                            .with_prompt("変更を破棄しますか？")
                            .default(false)
                            .interact()?
                    {
                        continue;
                    }
                    return Ok(());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use drive_around_common::columns::{
        BLOCKALPHA, COMMONNAME, CONTSIZE, ITEMCODE, LOCATIONCODE, SALES_ASSIGNEDTO,
    };
    use drive_around_common::RawTable;

    fn session() -> Session {
        let headers = [ITEMCODE, COMMONNAME, CONTSIZE, BLOCKALPHA, LOCATIONCODE, SALES_ASSIGNEDTO, SEASON]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let cells = |v: &[&str]| v.iter().map(|s| Some(s.to_string())).collect::<Vec<_>>();
        let inventory = RawTable::new(
            headers,
            vec![
                cells(&["1", "RED MAPLE", "#7", "A", "A-01", "ZOE", "F1"]),
                cells(&["2", "PIN OAK", "#3", "B", "B-01", "ZOE", "S1"]),
            ],
        );
        let dataset = Dataset::build(&inventory, &RawTable::empty(), Utc::now(), "csv".into(), Vec::new());
        let config = Config {
            user: Some("DYLAN".into()),
            ..Default::default()
        };
        Session::new(config, SourceKind::Csv, dataset, WriteMode::Disabled("test".into()))
    }

    #[test]
    fn test_initial_menu_lists_varieties() {
        let s = session();
        let (title, items) = s.menu();
        assert_eq!(title, "品種を選択");
        assert_eq!(items[0].1, Choice::Act(Action::SelectVariety("PIN OAK".into())));
        assert_eq!(items[1].1, Choice::Act(Action::SelectVariety("RED MAPLE".into())));
        assert!(items.iter().any(|(_, c)| *c == Choice::Quit));
    }

    #[test]
    fn test_data_menu_offers_edit() {
        let mut s = session();
        s.dispatch(Action::SelectVariety("RED MAPLE".into()));
        s.dispatch(Action::SelectSize("#7".into()));
        let (_, items) = s.menu();
        assert_eq!(items[0].1, Choice::Edit(RowKey::new("1", "A-01")));
    }

    #[test]
    fn test_task_menu_uses_assignment_rule() {
        let mut s = session();
        s.dispatch(Action::Navigate(Page::MyTasks));
        assert_eq!(s.state().user.as_deref(), Some("DYLAN"));

        let (title, items) = s.menu();
        assert_eq!(title, "DYLAN のタスク");
        let blocks: Vec<&Choice> = items
            .iter()
            .map(|(_, c)| c)
            .filter(|c| matches!(c, Choice::Act(Action::SelectBlock(_))))
            .collect();
        assert_eq!(blocks, vec![&Choice::Act(Action::SelectBlock("A".into()))]);
    }
}
