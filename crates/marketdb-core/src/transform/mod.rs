//! 도메인별 레코드 변환기.
//!
//! 원시 레코드를 대상 스키마와 일치하는 행으로 변환합니다. 변환 실패는
//! 레코드 단위로 복구됩니다: 실패한 레코드는 건너뛰고 집계하며, 적재 전체를
//! 중단하지 않습니다.

pub mod currency;
pub mod material;
pub mod news;
pub mod stock;

use tracing::warn;

use crate::domain::Domain;
use crate::error::RecordResult;
use crate::record::{RawRecord, Row};
use crate::schema::{SchemaVersion, TableSchema};

pub use currency::CurrencyTransformer;
pub use material::MaterialTransformer;
pub use news::NewsTransformer;
pub use stock::StockTransformer;

/// 원시 레코드를 삽입 가능한 행으로 바꾸는 능력.
pub trait RecordTransformer: Send + Sync {
    /// 이 변환기가 담당하는 도메인
    fn domain(&self) -> Domain;

    /// 출력 행이 일치해야 하는 대상 스키마
    fn schema(&self) -> &TableSchema;

    /// 레코드 하나를 변환합니다. 실패는 복구 가능하며 레코드를 건너뜁니다.
    fn transform(&self, record: &RawRecord) -> RecordResult<Row>;
}

/// 도메인에 맞는 변환기를 생성합니다.
pub fn transformer_for(domain: Domain, stock_version: SchemaVersion) -> Box<dyn RecordTransformer> {
    match domain {
        Domain::Currency => Box::new(CurrencyTransformer::new()),
        Domain::Material => Box::new(MaterialTransformer::new()),
        Domain::Stock => Box::new(StockTransformer::new(stock_version)),
        Domain::News => Box::new(NewsTransformer::new()),
    }
}

/// 파일 하나의 변환 결과.
#[derive(Debug, Default)]
pub struct TransformOutcome {
    /// 삽입 준비가 끝난 행
    pub rows: Vec<Row>,
    /// 건너뛴 레코드 수
    pub skipped: usize,
}

/// 레코드 시퀀스 전체를 변환합니다.
///
/// 실패한 레코드는 경고 로그와 함께 건너뛰고 나머지를 계속 처리합니다.
pub fn transform_all(
    transformer: &dyn RecordTransformer,
    records: &[RawRecord],
) -> TransformOutcome {
    let mut outcome = TransformOutcome {
        rows: Vec::with_capacity(records.len()),
        skipped: 0,
    };

    for (i, record) in records.iter().enumerate() {
        match transformer.transform(record) {
            Ok(row) => outcome.rows.push(row),
            Err(e) => {
                warn!(
                    domain = %transformer.domain(),
                    record = i,
                    error = %e,
                    "Skipping malformed record"
                );
                outcome.skipped += 1;
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> RawRecord {
        RawRecord::from_value(value).unwrap()
    }

    #[test]
    fn test_transformer_for_schema_match() {
        for domain in Domain::ALL {
            let t = transformer_for(domain, SchemaVersion::V2);
            assert_eq!(t.domain(), domain);
            assert_eq!(t.schema().name(), domain.table_name());
        }
    }

    #[test]
    fn test_transform_all_skips_bad_neighbors() {
        // 5개 중 3번째 레코드의 환율이 숫자가 아님: 정확히 4행 + 1 스킵
        let records = vec![
            record(json!(["2024-11-26", "USD", 1390.5])),
            record(json!(["2024-11-26", "EUR", 1455.2])),
            record(json!(["2024-11-26", "JPY", "not-a-number"])),
            record(json!(["2024-11-26", "CNY", 191.9])),
            record(json!(["2024-11-26", "GBP", 1752.0])),
        ];
        let transformer = CurrencyTransformer::new();
        let outcome = transform_all(&transformer, &records);
        assert_eq!(outcome.rows.len(), 4);
        assert_eq!(outcome.skipped, 1);
    }
}
