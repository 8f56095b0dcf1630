//! 画面遷移の状態機械
//!
//! 状態は不変の `ViewState` 値で、操作（`Action`）ごとに `reduce` が新しい値を返す。
//!
//! ## ドライブアラウンド
//! `Variety → Size → Data`（Back で1段戻る、Variety に戻ると検索文字列もクリア）
//!
//! ## 担当タスク
//! `Block → Location → (Details | ListItems → EditItem)`

use crate::filter::{SeasonFilter, StatusFilter};
use crate::key::RowKey;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Page {
    #[default]
    DriveAround,
    MyTasks,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriveStep {
    #[default]
    Variety,
    Size,
    Data,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStep {
    #[default]
    Block,
    Location,
    Details,
    ListItems,
    EditItem,
}

/// 画面状態
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub page: Page,
    pub drive_step: DriveStep,
    pub task_step: TaskStep,
    /// 品種リストの検索文字列
    pub search: String,
    pub variety: Option<String>,
    pub size: Option<String>,
    pub block: Option<String>,
    pub location: Option<String>,
    pub item: Option<RowKey>,
    pub seasons: SeasonFilter,
    pub status: StatusFilter,
    /// 担当タスクを表示するユーザー
    pub user: Option<String>,
}

/// ユーザー操作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Navigate(Page),
    Search(String),
    SelectVariety(String),
    SelectSize(String),
    SelectBlock(String),
    SelectLocation(String),
    ShowDetails,
    ListItems,
    SelectItem(RowKey),
    Back,
    ToggleSeason(String),
    SetStatus(StatusFilter),
    SetUser(String),
}

impl ViewState {
    /// 指定ユーザーの初期状態
    pub fn for_user(user: &str) -> Self {
        Self {
            user: Some(user.trim().to_string()).filter(|u| !u.is_empty()),
            ..Default::default()
        }
    }
}

/// 操作を適用した新しい状態を返す
///
/// 現在のステップで無効な操作は状態を変えない。
pub fn reduce(state: &ViewState, action: Action) -> ViewState {
    let mut next = state.clone();

    match action {
        Action::Navigate(page) => {
            return ViewState {
                page,
                seasons: state.seasons.clone(),
                user: state.user.clone(),
                ..Default::default()
            };
        }
        Action::ToggleSeason(season) => {
            next.seasons = state.seasons.toggled(&season);
        }
        Action::SetUser(user) => {
            let user = user.trim().to_string();
            next = ViewState {
                page: state.page,
                seasons: state.seasons.clone(),
                status: state.status,
                user: Some(user).filter(|u| !u.is_empty()),
                ..Default::default()
            };
        }
        Action::SetStatus(status) => {
            if state.page == Page::MyTasks {
                next.status = status;
                next.task_step = TaskStep::Block;
                next.block = None;
                next.location = None;
                next.item = None;
            }
        }
        Action::Back => back(&mut next),
        other => match state.page {
            Page::DriveAround => drive(&mut next, other),
            Page::MyTasks => tasks(&mut next, other),
        },
    }

    next
}

fn drive(state: &mut ViewState, action: Action) {
    match (state.drive_step, action) {
        (DriveStep::Variety, Action::Search(text)) => {
            state.search = text;
        }
        (DriveStep::Variety, Action::SelectVariety(variety)) => {
            state.variety = Some(variety);
            state.drive_step = DriveStep::Size;
        }
        (DriveStep::Size, Action::SelectSize(size)) => {
            state.size = Some(size);
            state.drive_step = DriveStep::Data;
        }
        _ => {}
    }
}

fn tasks(state: &mut ViewState, action: Action) {
    match (state.task_step, action) {
        (TaskStep::Block, Action::SelectBlock(block)) => {
            state.block = Some(block);
            state.task_step = TaskStep::Location;
        }
        (TaskStep::Location, Action::SelectLocation(location)) => {
            state.location = Some(location);
            state.task_step = TaskStep::ListItems;
        }
        (TaskStep::ListItems, Action::ShowDetails) => {
            state.task_step = TaskStep::Details;
        }
        (TaskStep::Details, Action::ListItems) => {
            state.task_step = TaskStep::ListItems;
        }
        (TaskStep::ListItems, Action::SelectItem(key)) => {
            state.item = Some(key);
            state.task_step = TaskStep::EditItem;
        }
        _ => {}
    }
}

fn back(state: &mut ViewState) {
    match state.page {
        Page::DriveAround => match state.drive_step {
            DriveStep::Data => {
                state.size = None;
                state.drive_step = DriveStep::Size;
            }
            DriveStep::Size => {
                state.variety = None;
                state.search.clear();
                state.drive_step = DriveStep::Variety;
            }
            DriveStep::Variety => {}
        },
        Page::MyTasks => match state.task_step {
            TaskStep::EditItem => {
                state.item = None;
                state.task_step = TaskStep::ListItems;
            }
            TaskStep::Details | TaskStep::ListItems => {
                state.location = None;
                state.task_step = TaskStep::Location;
            }
            TaskStep::Location => {
                state.block = None;
                state.task_step = TaskStep::Block;
            }
            TaskStep::Block => {}
        },
    }
}
