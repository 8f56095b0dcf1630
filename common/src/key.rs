//! 行の識別キーとバージョン
//!
//! 行番号ではなく ITEMCODE + LOCATIONCODE で行を特定する。
//! バージョンは編集対象列のハッシュで、保存時の競合検出に使う。

use crate::columns::EDITABLE_COLUMNS;
use crate::types::InventoryRow;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// ITEMCODE + LOCATIONCODE の複合キー
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RowKey {
    pub item_code: String,
    pub location: String,
}

impl RowKey {
    pub fn new(item_code: &str, location: &str) -> Self {
        Self {
            item_code: item_code.trim().to_string(),
            location: location.trim().to_string(),
        }
    }
}

impl std::fmt::Display for RowKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} @ {}", self.item_code, self.location)
    }
}

/// 編集対象列の値から行バージョンを計算
pub fn row_version(row: &InventoryRow) -> String {
    let mut hasher = Sha256::new();
    for column in EDITABLE_COLUMNS {
        hasher.update(column.as_bytes());
        hasher.update([0x1f]);
        hasher.update(row.get(column).as_bytes());
        hasher.update([0x1e]);
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::{CALIPER, COMMONNAME, ITEMCODE};

    #[test]
    fn test_key_is_trimmed() {
        assert_eq!(RowKey::new(" A1 ", "L1 "), RowKey::new("A1", "L1"));
        assert_eq!(RowKey::new("A1", "L1").to_string(), "A1 @ L1");
    }

    #[test]
    fn test_version_tracks_editable_columns_only() {
        let mut row: InventoryRow = [(ITEMCODE, "A1"), (CALIPER, "2")].into_iter().collect();
        let base = row_version(&row);

        row.set(COMMONNAME, "MAPLE");
        assert_eq!(row_version(&row), base);

        row.set(CALIPER, "3");
        assert_ne!(row_version(&row), base);
    }
}
