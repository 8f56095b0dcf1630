//! Drive-around Common Library
//!
//! 在庫テーブルの正規化・メモ索引・画面遷移・編集パッチ

pub mod columns;
pub mod types;
pub mod key;
pub mod error;
pub mod normalizer;
pub mod notes;
pub mod filter;
pub mod navigation;
pub mod view;
pub mod editor;

pub use types::{InventoryRow, RawTable, Table};
pub use key::{row_version, RowKey};
pub use error::{Error, Result};
pub use normalizer::{normalize, normalize_header};
pub use notes::NotesIndex;
pub use filter::{AssignmentRule, SeasonFilter, StatusFilter};
pub use navigation::{reduce, Action, DriveStep, Page, TaskStep, ViewState};
pub use editor::{apply_patch, EditForm, EditPatch};
