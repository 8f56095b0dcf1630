//! 公開CSVエクスポートからの取得
//!
//! 認証なしの `gviz/tq?tqx=out:csv` エンドポイントをワークシート名で呼び出す。

use crate::error::{DriveAroundError, Result};
use drive_around_common::RawTable;
use reqwest::Url;

const EXPORT_BASE: &str = "https://docs.google.com/spreadsheets/d";

/// ワークシートのCSVエクスポートURL
pub fn export_url(spreadsheet_id: &str, sheet: &str) -> Result<Url> {
    let base = format!("{}/{}/gviz/tq", EXPORT_BASE, spreadsheet_id.trim());
    Url::parse_with_params(&base, &[("tqx", "out:csv"), ("sheet", sheet)])
        .map_err(|e| DriveAroundError::Fetch(format!("URL生成エラー: {}", e)))
}

/// CSVテキストを表に変換（空セルは欠損扱い）
pub fn parse_csv(text: &str) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(
            record
                .iter()
                .map(|cell| (!cell.is_empty()).then(|| cell.to_string()))
                .collect(),
        );
    }

    Ok(RawTable::new(headers, rows))
}

/// 1ワークシートを取得
pub async fn fetch_sheet(client: &reqwest::Client, spreadsheet_id: &str, sheet: &str) -> Result<RawTable> {
    let url = export_url(spreadsheet_id, sheet)?;
    log::debug!("GET {}", url);

    let started = std::time::Instant::now();
    let response = client.get(url).send().await?.error_for_status()?;
    let body = response.text().await?;
    let table = parse_csv(&body)?;

    log::debug!(
        "シート '{}' を取得: {}行 ({} ms)",
        sheet,
        table.len(),
        started.elapsed().as_millis()
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_url_encodes_sheet_name() {
        let url = export_url("abc123", "Sales Notes").unwrap();
        let s = url.as_str();
        assert!(s.starts_with("https://docs.google.com/spreadsheets/d/abc123/gviz/tq?"));
        assert!(s.contains("tqx=out%3Acsv"));
        assert!(s.contains("sheet=Sales+Notes"));
    }

    #[test]
    fn test_parse_csv_empty_cells_are_missing() {
        let text = "\"ITEMCODE\",\"STATUS\",\"CALIPER\"\n\"A1\",\"\",\"2.5\"\n\"B2\",\"COMPLETE\"\n";
        let table = parse_csv(text).unwrap();

        assert_eq!(table.headers, vec!["ITEMCODE", "STATUS", "CALIPER"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0], vec![Some("A1".to_string()), None, Some("2.5".to_string())]);
        // 列数が足りない行も読み込む
        assert_eq!(table.rows[1].len(), 2);
    }

    #[test]
    fn test_parse_csv_header_only() {
        let table = parse_csv("ITEMCODE,NOTE\n").unwrap();
        assert_eq!(table.headers.len(), 2);
        assert!(table.is_empty());
    }
}
