//! 현물 시세 레코드 변환기.

use crate::domain::Domain;
use crate::error::RecordResult;
use crate::record::{FieldValue, RawRecord, Row};
use crate::schema::TableSchema;
use crate::transform::RecordTransformer;

/// 현물 시세 레코드 변환기.
///
/// 6필드 레코드(날짜, 품목명, 거래 상태, 시세, 등락, 등락률)를 파싱합니다.
/// 시세는 필수 실수이고, 상태/등락/등락률은 수집 결과에 따라 비어 있을 수
/// 있습니다. 숫자 파싱에 실패한 레코드는 건너뜁니다.
pub struct MaterialTransformer {
    schema: TableSchema,
}

impl MaterialTransformer {
    pub fn new() -> Self {
        Self {
            schema: TableSchema::material(),
        }
    }
}

impl Default for MaterialTransformer {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordTransformer for MaterialTransformer {
    fn domain(&self) -> Domain {
        Domain::Material
    }

    fn schema(&self) -> &TableSchema {
        &self.schema
    }

    fn transform(&self, record: &RawRecord) -> RecordResult<Row> {
        record.expect_arity(self.schema.arity())?;

        let date = record.date(0, "material_date")?;
        let name = record.text(1, "material_name")?;
        let state = record.opt_text(2, "material_state")?;
        let rate = record.float(3, "material_rate")?;
        let change = record.opt_float(4, "material_change")?;
        let change_rate = record.opt_float(5, "material_change_rate")?;

        Ok(Row::new(
            &self.schema,
            vec![
                FieldValue::Date(date),
                FieldValue::Text(name),
                state.map_or(FieldValue::Null, FieldValue::Text),
                FieldValue::Float(rate),
                change.map_or(FieldValue::Null, FieldValue::Float),
                change_rate.map_or(FieldValue::Null, FieldValue::Float),
            ],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RecordError;
    use serde_json::json;

    #[test]
    fn test_full_record() {
        let t = MaterialTransformer::new();
        let record = RawRecord::from_value(json!([
            "2024-11-26", "휘발유", "상승", "1652.41", "3.2", "0.19"
        ]))
        .unwrap();
        let row = t.transform(&record).unwrap();
        assert_eq!(row.values()[3], FieldValue::Float(1652.41));
        assert!(t.schema().validate_row(&row).is_ok());
    }

    #[test]
    fn test_missing_optionals() {
        let t = MaterialTransformer::new();
        let record =
            RawRecord::from_value(json!(["2024-11-26", "금", null, 86.3, "-", ""])).unwrap();
        let row = t.transform(&record).unwrap();
        assert_eq!(row.values()[2], FieldValue::Null);
        assert_eq!(row.values()[4], FieldValue::Null);
        assert_eq!(row.values()[5], FieldValue::Null);
    }

    #[test]
    fn test_non_numeric_rate_rejected() {
        let t = MaterialTransformer::new();
        let record =
            RawRecord::from_value(json!(["2024-11-26", "은", "보합", "N/A", 0.0, 0.0])).unwrap();
        assert!(matches!(
            t.transform(&record),
            Err(RecordError::Parse { field: "material_rate", .. })
        ));
    }

    #[test]
    fn test_wrong_arity_rejected() {
        let t = MaterialTransformer::new();
        let record = RawRecord::from_value(json!(["2024-11-26", "금", 86.3])).unwrap();
        assert!(matches!(t.transform(&record), Err(RecordError::Arity { .. })));
    }
}
