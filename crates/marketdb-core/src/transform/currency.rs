//! 환율 레코드 변환기.

use crate::domain::Domain;
use crate::error::{RecordError, RecordResult};
use crate::record::{FieldValue, RawRecord, Row};
use crate::schema::TableSchema;
use crate::transform::RecordTransformer;

/// 환율 레코드 변환기.
///
/// 원시 레코드가 이미 대상 형태(날짜, 통화명, 환율)와 일치하므로 구조 변환
/// 없이 검증만 수행합니다. 환율은 0 이상의 실수여야 합니다.
pub struct CurrencyTransformer {
    schema: TableSchema,
}

impl CurrencyTransformer {
    pub fn new() -> Self {
        Self {
            schema: TableSchema::currency(),
        }
    }
}

impl Default for CurrencyTransformer {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordTransformer for CurrencyTransformer {
    fn domain(&self) -> Domain {
        Domain::Currency
    }

    fn schema(&self) -> &TableSchema {
        &self.schema
    }

    fn transform(&self, record: &RawRecord) -> RecordResult<Row> {
        record.expect_arity(self.schema.arity())?;

        let date = record.date(0, "cur_date")?;
        let name = record.text(1, "cur_name")?;
        let rate = record.float(2, "cur_rate")?;
        if rate < 0.0 {
            return Err(RecordError::Invalid {
                field: "cur_rate",
                reason: format!("negative rate {}", rate),
            });
        }

        Ok(Row::new(
            &self.schema,
            vec![
                FieldValue::Date(date),
                FieldValue::Text(name),
                FieldValue::Float(rate),
            ],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_record() {
        let t = CurrencyTransformer::new();
        let record = RawRecord::from_value(json!(["2024-11-26", "USD", 1390.5])).unwrap();
        let row = t.transform(&record).unwrap();
        assert_eq!(row.len(), 3);
        assert_eq!(row.values()[2], FieldValue::Float(1390.5));
        assert!(t.schema().validate_row(&row).is_ok());
    }

    #[test]
    fn test_zero_rate_allowed() {
        let t = CurrencyTransformer::new();
        let record = RawRecord::from_value(json!(["2024-11-26", "ZWL", 0.0])).unwrap();
        assert!(t.transform(&record).is_ok());
    }

    #[test]
    fn test_negative_rate_rejected() {
        let t = CurrencyTransformer::new();
        let record = RawRecord::from_value(json!(["2024-11-26", "USD", -1.0])).unwrap();
        assert!(matches!(
            t.transform(&record),
            Err(RecordError::Invalid { field: "cur_rate", .. })
        ));
    }

    #[test]
    fn test_wrong_arity_rejected() {
        let t = CurrencyTransformer::new();
        let record = RawRecord::from_value(json!(["2024-11-26", "USD"])).unwrap();
        assert!(matches!(
            t.transform(&record),
            Err(RecordError::Arity { expected: 3, got: 2 })
        ));
    }
}
