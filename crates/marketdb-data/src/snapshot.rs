//! 스냅샷 파일 리더.
//!
//! 수집 단계가 남긴 스냅샷 파일을 읽습니다. 스냅샷 하나는 레코드 튜플의
//! JSON 배열이며, 전체를 메모리에 올립니다. 다운스트림 배치가 결정적인
//! 청크 경계를 계산할 수 있도록 시퀀스는 완전히 구체화됩니다.

use std::path::Path;

use serde_json::Value;
use tracing::debug;

use marketdb_core::RawRecord;

use crate::error::{LoadError, Result};

/// 스냅샷 파일을 읽어 순서 있는 레코드 시퀀스를 반환합니다.
///
/// 파일이 없거나 읽을 수 없으면 `SourceUnavailable`, 내용이 레코드 배열
/// 형태가 아니면 `Format` 에러입니다.
pub fn read_snapshot(path: &Path) -> Result<Vec<RawRecord>> {
    let text = std::fs::read_to_string(path).map_err(|e| LoadError::SourceUnavailable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let value: Value = serde_json::from_str(&text).map_err(|e| LoadError::Format {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(LoadError::Format {
                path: path.to_path_buf(),
                reason: format!("expected a top-level array, got {}", json_kind(&other)),
            })
        }
    };

    let mut records = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        match RawRecord::from_value(item) {
            Ok(record) => records.push(record),
            Err(_) => {
                return Err(LoadError::Format {
                    path: path.to_path_buf(),
                    reason: format!("element {} is not a record tuple", i),
                })
            }
        }
    }

    debug!(path = %path.display(), records = records.len(), "Snapshot loaded");
    Ok(records)
}

/// 로그와 요약에 쓸 스냅샷 라벨을 파일 이름에서 얻습니다.
///
/// 수집기의 명명 규칙 `data(<항목>_<날짜>)`를 인식해 괄호 안을 반환하고,
/// 그 외에는 확장자를 뗀 파일 이름을 그대로 씁니다.
pub fn snapshot_label(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    if let (Some(open), Some(close)) = (stem.find('('), stem.rfind(')')) {
        if open < close {
            return stem[open + 1..close].to_string();
        }
    }
    stem
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_snapshot(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data(cur_20241126).json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn test_read_valid_snapshot() {
        let (_dir, path) =
            write_snapshot(r#"[["2024-11-26", "USD", 1390.5], ["2024-11-26", "EUR", 1455.2]]"#);
        let records = read_snapshot(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].len(), 3);
    }

    #[test]
    fn test_missing_file() {
        let err = read_snapshot(Path::new("no/such/file.json")).unwrap_err();
        assert!(matches!(err, LoadError::SourceUnavailable { .. }));
    }

    #[test]
    fn test_not_an_array() {
        let (_dir, path) = write_snapshot(r#"{"records": []}"#);
        let err = read_snapshot(&path).unwrap_err();
        assert!(matches!(err, LoadError::Format { .. }));
    }

    #[test]
    fn test_non_tuple_element() {
        let (_dir, path) = write_snapshot(r#"[["2024-11-26", "USD", 1390.5], "oops"]"#);
        let err = read_snapshot(&path).unwrap_err();
        match err {
            LoadError::Format { reason, .. } => assert!(reason.contains("element 1")),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_snapshot_label() {
        assert_eq!(
            snapshot_label(Path::new("data/data(stock_네이버_20241126).json")),
            "stock_네이버_20241126"
        );
        assert_eq!(snapshot_label(Path::new("data/currency.json")), "currency");
    }
}
