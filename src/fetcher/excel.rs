//! ローカルExcelファイルからの読み込み

use crate::error::{DriveAroundError, Result};
use calamine::{open_workbook_auto, Data, Range, Reader};
use drive_around_common::normalizer::format_number;
use drive_around_common::RawTable;
use std::path::Path;

/// 1ワークシートを読み込む（1行目をヘッダーとする）
pub fn read_sheet(path: &Path, sheet: &str) -> Result<RawTable> {
    if !path.exists() {
        return Err(DriveAroundError::FileNotFound(path.display().to_string()));
    }

    let mut workbook = open_workbook_auto(path)
        .map_err(|e| DriveAroundError::ExcelRead(format!("{}: {}", path.display(), e)))?;

    if !workbook.sheet_names().iter().any(|name| name == sheet) {
        return Err(DriveAroundError::SheetNotFound(sheet.to_string()));
    }

    let range = workbook
        .worksheet_range(sheet)
        .map_err(|e| DriveAroundError::ExcelRead(format!("{}: {}", sheet, e)))?;

    Ok(range_to_table(&range))
}

/// 書き戻し用のワークシート
#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: String,
    /// 表の左上セル（行, 列）
    pub origin: (u32, u32),
    pub table: RawTable,
}

/// 全ワークシートをシート順に読み込む（書き戻し用）
pub fn read_workbook(path: &Path) -> Result<Vec<Sheet>> {
    if !path.exists() {
        return Err(DriveAroundError::FileNotFound(path.display().to_string()));
    }

    let mut workbook = open_workbook_auto(path)
        .map_err(|e| DriveAroundError::ExcelRead(format!("{}: {}", path.display(), e)))?;

    let mut sheets = Vec::new();
    for name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| DriveAroundError::ExcelRead(format!("{}: {}", name, e)))?;
        sheets.push(Sheet {
            origin: range.start().unwrap_or((0, 0)),
            table: range_to_table(&range),
            name,
        });
    }
    Ok(sheets)
}

fn range_to_table(range: &Range<Data>) -> RawTable {
    let mut rows = range.rows();

    let headers = match rows.next() {
        Some(first) => first
            .iter()
            .map(|cell| cell_text(cell).unwrap_or_default())
            .collect(),
        None => return RawTable::empty(),
    };

    let rows = rows
        .map(|row| row.iter().map(cell_text).collect())
        .collect();

    RawTable::new(headers, rows)
}

/// セルをテキスト化（空・エラーは欠損）
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::String(s) if s.is_empty() => None,
        Data::String(s) => Some(s.clone()),
        Data::Float(v) => Some(format_number(*v)),
        Data::Int(v) => Some(v.to_string()),
        Data::Bool(b) => Some(if *b { "TRUE".into() } else { "FALSE".into() }),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(dt) => Some(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
            None => Some(format_number(dt.as_f64())),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
        Data::Error(_) | Data::Empty => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&Data::Float(12.0)), Some("12".into()));
        assert_eq!(cell_text(&Data::Float(0.5)), Some("0.5".into()));
        assert_eq!(cell_text(&Data::Int(7)), Some("7".into()));
        assert_eq!(cell_text(&Data::Bool(true)), Some("TRUE".into()));
        assert_eq!(cell_text(&Data::String(String::new())), None);
        assert_eq!(cell_text(&Data::Empty), None);
    }

    #[test]
    fn test_missing_file() {
        let err = read_sheet(Path::new("/nonexistent/inventory.xlsx"), "Sheet1").unwrap_err();
        assert!(matches!(err, DriveAroundError::FileNotFound(_)));
    }
}
