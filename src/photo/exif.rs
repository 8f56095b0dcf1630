use chrono::NaiveDateTime;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// EXIFの撮影日時を取得
pub fn extract_datetime(path: &Path) -> Option<NaiveDateTime> {
    let file = File::open(path).ok()?;
    let mut bufreader = BufReader::new(file);
    let exif = exif::Reader::new().read_from_container(&mut bufreader).ok()?;

    // DateTimeOriginal → DateTime の順に探す
    [exif::Tag::DateTimeOriginal, exif::Tag::DateTime]
        .iter()
        .filter_map(|tag| exif.get_field(*tag, exif::In::PRIMARY))
        .find_map(|field| match field.value {
            exif::Value::Ascii(ref vec) if !vec.is_empty() => {
                let dt = exif::DateTime::from_ascii(&vec[0]).ok()?;
                chrono::NaiveDate::from_ymd_opt(dt.year as i32, dt.month as u32, dt.day as u32)?
                    .and_hms_opt(dt.hour as u32, dt.minute as u32, dt.second as u32)
            }
            _ => None,
        })
}
