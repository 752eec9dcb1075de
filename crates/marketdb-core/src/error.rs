//! 레코드 수준 에러 타입.
//!
//! 스냅샷 레코드 하나를 변환하는 과정에서 발생하는 에러를 정의합니다.
//! 레코드 에러는 항상 복구 가능합니다: 해당 레코드를 건너뛰고 집계한 뒤
//! 적재를 계속합니다.

use thiserror::Error;

/// 단일 레코드 변환 에러.
#[derive(Debug, Error)]
pub enum RecordError {
    /// 필드 개수 불일치
    #[error("Arity mismatch: expected {expected} fields, got {got}")]
    Arity { expected: usize, got: usize },

    /// 필드 파싱 실패
    #[error("Failed to parse field '{field}': {value:?}")]
    Parse { field: &'static str, value: String },

    /// 필드 값 검증 실패
    #[error("Invalid value for field '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },

    /// 레코드가 튜플(배열) 형태가 아님
    #[error("Record is not an array of values")]
    NotATuple,
}

/// 레코드 변환 작업을 위한 Result 타입.
pub type RecordResult<T> = Result<T, RecordError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity_message() {
        let err = RecordError::Arity {
            expected: 6,
            got: 4,
        };
        assert_eq!(err.to_string(), "Arity mismatch: expected 6 fields, got 4");
    }
}
