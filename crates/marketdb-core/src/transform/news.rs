//! 뉴스 기사 레코드 변환기.

use crate::domain::Domain;
use crate::error::RecordResult;
use crate::record::{FieldValue, RawRecord, Row};
use crate::schema::TableSchema;
use crate::transform::RecordTransformer;

/// 뉴스 기사 레코드 변환기.
///
/// 4필드 레코드(날짜, 원본 종목명, 표시 이름, 본문)를 검증합니다. 같은
/// 기사의 중복은 여기서 거르지 않고, 적재 시 뉴스 테이블의 유니크 인덱스와
/// ON CONFLICT DO NOTHING으로 행 단위 거부됩니다.
pub struct NewsTransformer {
    schema: TableSchema,
}

impl NewsTransformer {
    pub fn new() -> Self {
        Self {
            schema: TableSchema::news(),
        }
    }
}

impl Default for NewsTransformer {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordTransformer for NewsTransformer {
    fn domain(&self) -> Domain {
        Domain::News
    }

    fn schema(&self) -> &TableSchema {
        &self.schema
    }

    fn transform(&self, record: &RawRecord) -> RecordResult<Row> {
        record.expect_arity(self.schema.arity())?;

        Ok(Row::new(
            &self.schema,
            vec![
                FieldValue::Date(record.date(0, "news_date")?),
                FieldValue::Text(record.text(1, "news_name_origin")?),
                FieldValue::Text(record.text(2, "news_name")?),
                FieldValue::Text(record.text(3, "news_content")?),
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
        let t = NewsTransformer::new();
        let record = RawRecord::from_value(json!([
            "2024-12-03",
            "네이버",
            "naver",
            "네이버, 신규 AI 검색 서비스 출시"
        ]))
        .unwrap();
        let row = t.transform(&record).unwrap();
        assert_eq!(row.len(), 4);
        assert!(t.schema().validate_row(&row).is_ok());
    }

    #[test]
    fn test_wrong_arity_rejected() {
        let t = NewsTransformer::new();
        let record = RawRecord::from_value(json!(["2024-12-03", "네이버"])).unwrap();
        assert!(t.transform(&record).is_err());
    }
}
