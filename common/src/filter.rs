//! 絞り込みルール
//!
//! - SeasonFilter: シーズンの複数選択（空なら絞り込まない）
//! - AssignmentRule: 担当者の決定（特定コンテナサイズは固定担当者）
//! - StatusFilter: 完了/未完了

use crate::types::InventoryRow;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// シーズン選択をリセットするトークン
pub const SEASON_ALL: &str = "ALL";
pub const SEASON_CLEAR: &str = "CLEAR";

/// シーズンの複数選択
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonFilter {
    active: BTreeSet<String>,
}

impl SeasonFilter {
    /// トグル適用後のフィルタを返す
    ///
    /// `ALL` / `CLEAR` は選択を空に戻す。それ以外は選択/解除を切り替える。
    pub fn toggled(&self, season: &str) -> Self {
        let season = season.trim().to_uppercase();
        if season.is_empty() || season == SEASON_ALL || season == SEASON_CLEAR {
            return Self::default();
        }

        let mut active = self.active.clone();
        if !active.remove(&season) {
            active.insert(season);
        }
        Self { active }
    }

    pub fn is_active(&self) -> bool {
        !self.active.is_empty()
    }

    pub fn seasons(&self) -> impl Iterator<Item = &str> {
        self.active.iter().map(String::as_str)
    }

    pub fn contains(&self, season: &str) -> bool {
        self.active.contains(&season.trim().to_uppercase())
    }

    pub fn matches(&self, row: &InventoryRow) -> bool {
        !self.is_active() || self.contains(row.season())
    }
}

/// 担当者の決定ルール
///
/// 指定サイズのコンテナは SALES_ASSIGNEDTO に関係なく固定担当者に割り当てる。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssignmentRule {
    pub bucket_user: String,
    pub bucket_sizes: Vec<String>,
}

impl Default for AssignmentRule {
    fn default() -> Self {
        Self {
            bucket_user: "DYLAN".into(),
            bucket_sizes: ["#7", "#10", "#15", "#20", "#25"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl AssignmentRule {
    fn in_bucket(&self, row: &InventoryRow) -> bool {
        let size = row.container_size();
        self.bucket_sizes
            .iter()
            .any(|s| s.trim().eq_ignore_ascii_case(size))
    }

    /// 行の担当者
    pub fn owner<'a>(&'a self, row: &'a InventoryRow) -> &'a str {
        if self.in_bucket(row) {
            self.bucket_user.trim()
        } else {
            row.assigned_to()
        }
    }

    pub fn is_assigned_to(&self, row: &InventoryRow, user: &str) -> bool {
        let owner = self.owner(row);
        !owner.is_empty() && owner.eq_ignore_ascii_case(user.trim())
    }
}

/// 完了状態による絞り込み
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusFilter {
    #[default]
    Pending,
    Complete,
    All,
}

impl StatusFilter {
    pub fn matches(&self, row: &InventoryRow) -> bool {
        match self {
            StatusFilter::Pending => !row.is_complete(),
            StatusFilter::Complete => row.is_complete(),
            StatusFilter::All => true,
        }
    }
}

impl std::str::FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" | "todo" => Ok(StatusFilter::Pending),
            "complete" | "done" => Ok(StatusFilter::Complete),
            "all" => Ok(StatusFilter::All),
            _ => Err(format!("Unknown status: {}. Use pending, complete, or all", s)),
        }
    }
}

impl std::fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusFilter::Pending => write!(f, "pending"),
            StatusFilter::Complete => write!(f, "complete"),
            StatusFilter::All => write!(f, "all"),
        }
    }
}

/// 空でない値を重複なしでソートして返す
pub fn distinct_values<'a>(
    rows: impl IntoIterator<Item = &'a InventoryRow>,
    column: &str,
) -> Vec<String> {
    rows.into_iter()
        .map(|row| row.get(column).trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// 大文字小文字を無視した部分一致
pub fn matches_search(value: &str, search: &str) -> bool {
    let search = search.trim();
    search.is_empty() || value.to_lowercase().contains(&search.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::{CONTSIZE, SALES_ASSIGNEDTO, SEASON, STATUS};

    fn row(pairs: &[(&str, &str)]) -> InventoryRow {
        pairs.iter().map(|(k, v)| (*k, *v)).collect()
    }

    #[test]
    fn test_season_toggle_then_clear() {
        let filter = SeasonFilter::default()
            .toggled("F1")
            .toggled("S1");
        assert!(filter.contains("F1"));
        assert!(filter.contains("S1"));

        let cleared = filter.toggled("CLEAR");
        assert!(!cleared.is_active());
        assert_eq!(cleared.seasons().count(), 0);
    }

    #[test]
    fn test_season_toggle_twice_removes() {
        let filter = SeasonFilter::default().toggled("f1").toggled("F1");
        assert!(!filter.is_active());
        assert!(!SeasonFilter::default().toggled("S1").toggled("ALL").is_active());
    }

    #[test]
    fn test_season_matches() {
        let f1 = row(&[(SEASON, "F1")]);
        let s1 = row(&[(SEASON, "S1")]);

        let none = SeasonFilter::default();
        assert!(none.matches(&f1) && none.matches(&s1));

        let only_f1 = none.toggled("F1");
        assert!(only_f1.matches(&f1));
        assert!(!only_f1.matches(&s1));
    }

    #[test]
    fn test_bucket_size_overrides_assignment() {
        let rule = AssignmentRule::default();
        let r = row(&[(CONTSIZE, "#7"), (SALES_ASSIGNEDTO, "ZOE")]);

        assert_eq!(rule.owner(&r), "DYLAN");
        assert!(rule.is_assigned_to(&r, "dylan"));
        assert!(!rule.is_assigned_to(&r, "ZOE"));
    }

    #[test]
    fn test_assignment_field_used_outside_bucket() {
        let rule = AssignmentRule::default();
        let r = row(&[(CONTSIZE, "#3"), (SALES_ASSIGNEDTO, " Zoe ")]);
        assert!(rule.is_assigned_to(&r, "ZOE"));
        assert!(!rule.is_assigned_to(&r, "DYLAN"));

        let unassigned = row(&[(CONTSIZE, "#3")]);
        assert!(!rule.is_assigned_to(&unassigned, ""));
    }

    #[test]
    fn test_status_filter() {
        let done = row(&[(STATUS, "COMPLETE")]);
        let open = row(&[(STATUS, "")]);
        assert!(StatusFilter::Pending.matches(&open));
        assert!(!StatusFilter::Pending.matches(&done));
        assert!(StatusFilter::Complete.matches(&done));
        assert!(StatusFilter::All.matches(&open));
        assert_eq!("done".parse::<StatusFilter>(), Ok(StatusFilter::Complete));
        assert!("later".parse::<StatusFilter>().is_err());
    }

    #[test]
    fn test_distinct_values_sorted_non_empty() {
        let rows = vec![
            row(&[(CONTSIZE, "#7")]),
            row(&[(CONTSIZE, "#15")]),
            row(&[(CONTSIZE, "")]),
            row(&[(CONTSIZE, "#7")]),
        ];
        assert_eq!(distinct_values(&rows, CONTSIZE), vec!["#15", "#7"]);
    }

    #[test]
    fn test_matches_search() {
        assert!(matches_search("Red Maple", "maple"));
        assert!(matches_search("Red Maple", ""));
        assert!(!matches_search("Oak", "maple"));
    }
}
