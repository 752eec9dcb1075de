//! 주식 시세 레코드 변환기.

use crate::domain::Domain;
use crate::error::RecordResult;
use crate::record::{FieldValue, RawRecord, Row};
use crate::schema::{SchemaVersion, TableSchema};
use crate::transform::RecordTransformer;

/// 주식 시세 레코드 변환기.
///
/// 원시 레코드는 이미 대상 형태와 일치하며 검증만 수행합니다. 필드 수는
/// 스키마 버전을 따릅니다: V1은 10필드, V2는 배당이 포함된 11필드.
pub struct StockTransformer {
    schema: TableSchema,
}

impl StockTransformer {
    pub fn new(version: SchemaVersion) -> Self {
        Self {
            schema: TableSchema::stock(version),
        }
    }
}

impl RecordTransformer for StockTransformer {
    fn domain(&self) -> Domain {
        Domain::Stock
    }

    fn schema(&self) -> &TableSchema {
        &self.schema
    }

    fn transform(&self, record: &RawRecord) -> RecordResult<Row> {
        record.expect_arity(self.schema.arity())?;

        let mut values = vec![
            FieldValue::Date(record.date(0, "stock_date")?),
            FieldValue::Text(record.text(1, "stock_name")?),
            FieldValue::Text(record.text(2, "stock_name_origin")?),
            FieldValue::Text(record.text(3, "stock_state")?),
            FieldValue::Int(record.int(4, "stock_rate")?),
            FieldValue::Text(record.text(5, "stock_change")?),
            FieldValue::Int(record.int(6, "stock_low")?),
            FieldValue::Int(record.int(7, "stock_high")?),
            FieldValue::Int(record.int(8, "stock_volume")?),
        ];

        if self.schema.version() == SchemaVersion::V2 {
            values.push(FieldValue::Int(record.int(9, "stock_dividend")?));
            values.push(FieldValue::Float(record.float(10, "stock_change_rate")?));
        } else {
            values.push(FieldValue::Float(record.float(9, "stock_change_rate")?));
        }

        Ok(Row::new(&self.schema, values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RecordError;
    use serde_json::json;

    #[test]
    fn test_v2_record() {
        let t = StockTransformer::new(SchemaVersion::V2);
        let record = RawRecord::from_value(json!([
            "2024-11-26",
            "네이버",
            "NAVER",
            "상승",
            195000,
            "▲",
            193000,
            197500,
            "423,511",
            120,
            1.25
        ]))
        .unwrap();
        let row = t.transform(&record).unwrap();
        assert_eq!(row.len(), 11);
        assert_eq!(row.values()[8], FieldValue::Int(423511));
        assert_eq!(row.values()[9], FieldValue::Int(120));
        assert!(t.schema().validate_row(&row).is_ok());
    }

    #[test]
    fn test_v1_record() {
        let t = StockTransformer::new(SchemaVersion::V1);
        let record = RawRecord::from_value(json!([
            "2024-11-26",
            "삼성전자",
            "SamsungElec",
            "하락",
            56800,
            "▼",
            56500,
            57400,
            11023450,
            -0.87
        ]))
        .unwrap();
        let row = t.transform(&record).unwrap();
        assert_eq!(row.len(), 10);
        assert_eq!(row.values()[9], FieldValue::Float(-0.87));
    }

    #[test]
    fn test_v1_record_rejected_by_v2_transformer() {
        let t = StockTransformer::new(SchemaVersion::V2);
        let record = RawRecord::from_value(json!([
            "2024-11-26",
            "삼성전자",
            "SamsungElec",
            "하락",
            56800,
            "▼",
            56500,
            57400,
            11023450,
            -0.87
        ]))
        .unwrap();
        assert!(matches!(
            t.transform(&record),
            Err(RecordError::Arity { expected: 11, got: 10 })
        ));
    }
}
