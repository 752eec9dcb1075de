//! 스냅샷 레코드 및 행 타입.
//!
//! 스냅샷 파일에서 읽은 원시 레코드(`RawRecord`)와 변환을 거쳐 삽입 준비가
//! 끝난 행(`Row`)을 정의합니다. 원시 레코드는 외부에서 생성되며 절대 변경되지
//! 않습니다. 행은 대상 스키마의 컬럼 순서와 정확히 일치합니다.

use chrono::NaiveDate;
use serde_json::Value;

use crate::error::{RecordError, RecordResult};
use crate::schema::{SchemaVersion, TableSchema};

/// 도메인별 고정 위치 필드를 가진 원시 관측 레코드.
///
/// 스냅샷 파일의 JSON 배열 하나에 해당합니다. 필드 접근자는 수집 과정에서
/// 숫자가 문자열로 저장된 경우("1390.5", "1,390")도 허용합니다.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord(Vec<Value>);

impl RawRecord {
    pub fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    /// JSON 값에서 레코드를 생성합니다. 배열이 아니면 실패합니다.
    pub fn from_value(value: Value) -> RecordResult<Self> {
        match value {
            Value::Array(values) => Ok(Self(values)),
            _ => Err(RecordError::NotATuple),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 필드 개수가 기대치와 일치하는지 확인합니다.
    pub fn expect_arity(&self, expected: usize) -> RecordResult<()> {
        if self.0.len() != expected {
            return Err(RecordError::Arity {
                expected,
                got: self.0.len(),
            });
        }
        Ok(())
    }

    fn get(&self, idx: usize, field: &'static str) -> RecordResult<&Value> {
        self.0.get(idx).ok_or(RecordError::Parse {
            field,
            value: format!("missing index {}", idx),
        })
    }

    /// `YYYY-MM-DD` 형식의 날짜 필드를 읽습니다.
    pub fn date(&self, idx: usize, field: &'static str) -> RecordResult<NaiveDate> {
        let value = self.get(idx, field)?;
        let text = value.as_str().ok_or_else(|| RecordError::Parse {
            field,
            value: value.to_string(),
        })?;
        NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|_| RecordError::Parse {
            field,
            value: text.to_string(),
        })
    }

    /// 필수 문자열 필드를 읽습니다.
    pub fn text(&self, idx: usize, field: &'static str) -> RecordResult<String> {
        let value = self.get(idx, field)?;
        match value {
            Value::String(s) => Ok(s.clone()),
            _ => Err(RecordError::Parse {
                field,
                value: value.to_string(),
            }),
        }
    }

    /// 선택적 문자열 필드를 읽습니다. null 또는 빈 문자열은 None입니다.
    pub fn opt_text(&self, idx: usize, field: &'static str) -> RecordResult<Option<String>> {
        let value = self.get(idx, field)?;
        match value {
            Value::Null => Ok(None),
            Value::String(s) if s.is_empty() => Ok(None),
            Value::String(s) => Ok(Some(s.clone())),
            _ => Err(RecordError::Parse {
                field,
                value: value.to_string(),
            }),
        }
    }

    /// 필수 실수 필드를 읽습니다. JSON 숫자와 숫자 문자열 모두 허용합니다.
    pub fn float(&self, idx: usize, field: &'static str) -> RecordResult<f64> {
        let value = self.get(idx, field)?;
        parse_float(value).ok_or_else(|| RecordError::Parse {
            field,
            value: value.to_string(),
        })
    }

    /// 선택적 실수 필드를 읽습니다. null / "" / "-"는 None입니다.
    pub fn opt_float(&self, idx: usize, field: &'static str) -> RecordResult<Option<f64>> {
        let value = self.get(idx, field)?;
        if is_missing(value) {
            return Ok(None);
        }
        parse_float(value)
            .map(Some)
            .ok_or_else(|| RecordError::Parse {
                field,
                value: value.to_string(),
            })
    }

    /// 필수 정수 필드를 읽습니다.
    pub fn int(&self, idx: usize, field: &'static str) -> RecordResult<i64> {
        let value = self.get(idx, field)?;
        parse_int(value).ok_or_else(|| RecordError::Parse {
            field,
            value: value.to_string(),
        })
    }
}

fn is_missing(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty() || s == "-",
        _ => false,
    }
}

fn parse_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        // 수집 단계가 "1,390.50" 같은 천 단위 구분 기호를 남기는 경우가 있음
        Value::String(s) => s.replace(',', "").parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn parse_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.replace(',', "").parse::<i64>().ok(),
        _ => None,
    }
}

/// 삽입 준비가 끝난 행의 셀 하나.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Date(NaiveDate),
    Text(String),
    Float(f64),
    Int(i64),
    Null,
}

/// 검증을 통과한 타입 있는 행.
///
/// 어떤 스키마(이름 + 버전)를 대상으로 만들어졌는지 태그를 가지고 있어서,
/// 로더가 삽입 전에 대상 테이블과의 불일치를 잡아낼 수 있습니다.
#[derive(Debug, Clone)]
pub struct Row {
    schema_name: &'static str,
    schema_version: SchemaVersion,
    values: Vec<FieldValue>,
}

impl Row {
    pub fn new(schema: &TableSchema, values: Vec<FieldValue>) -> Self {
        Self {
            schema_name: schema.name(),
            schema_version: schema.version(),
            values,
        }
    }

    pub fn schema_name(&self) -> &'static str {
        self.schema_name
    }

    pub fn schema_version(&self) -> SchemaVersion {
        self.schema_version
    }

    pub fn values(&self) -> &[FieldValue] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_rejects_non_array() {
        let err = RawRecord::from_value(json!({"a": 1})).unwrap_err();
        assert!(matches!(err, RecordError::NotATuple));
    }

    #[test]
    fn test_arity_check() {
        let record = RawRecord::from_value(json!(["2024-11-26", "USD", 1390.5])).unwrap();
        assert!(record.expect_arity(3).is_ok());
        assert!(matches!(
            record.expect_arity(4),
            Err(RecordError::Arity { expected: 4, got: 3 })
        ));
    }

    #[test]
    fn test_date_parsing() {
        let record = RawRecord::from_value(json!(["2024-11-26"])).unwrap();
        let date = record.date(0, "cur_date").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 11, 26).unwrap());

        let bad = RawRecord::from_value(json!(["26/11/2024"])).unwrap();
        assert!(bad.date(0, "cur_date").is_err());
    }

    #[test]
    fn test_float_accepts_numeric_strings() {
        let record = RawRecord::from_value(json!([1390.5, "1455.2", "1,390"])).unwrap();
        assert_eq!(record.float(0, "rate").unwrap(), 1390.5);
        assert_eq!(record.float(1, "rate").unwrap(), 1455.2);
        assert_eq!(record.float(2, "rate").unwrap(), 1390.0);
    }

    #[test]
    fn test_opt_float_missing_markers() {
        let record = RawRecord::from_value(json!([null, "", "-", "3.2"])).unwrap();
        assert_eq!(record.opt_float(0, "change").unwrap(), None);
        assert_eq!(record.opt_float(1, "change").unwrap(), None);
        assert_eq!(record.opt_float(2, "change").unwrap(), None);
        assert_eq!(record.opt_float(3, "change").unwrap(), Some(3.2));
    }

    #[test]
    fn test_int_rejects_garbage() {
        let record = RawRecord::from_value(json!(["abc"])).unwrap();
        assert!(record.int(0, "stock_rate").is_err());
    }
}
