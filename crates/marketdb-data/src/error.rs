//! 적재 파이프라인 에러 타입.

use std::path::PathBuf;
use thiserror::Error;

/// 적재 관련 에러.
///
/// 레코드 단위 에러(`marketdb_core::RecordError`)는 변환 단계에서 이미
/// 복구되므로 여기에 나타나지 않습니다. 이 타입은 파일, 배치, 테이블,
/// 스크립트 수준의 실패를 다룹니다.
#[derive(Debug, Error)]
pub enum LoadError {
    /// 스냅샷 파일을 찾거나 읽을 수 없음
    #[error("Source unavailable: {path}: {reason}")]
    SourceUnavailable { path: PathBuf, reason: String },

    /// 스냅샷 내용이 레코드 시퀀스 형태가 아님
    #[error("Format error in {path}: {reason}")]
    Format { path: PathBuf, reason: String },

    /// 잘못된 설정 (I/O 시작 전에 실패)
    #[error("Configuration error: {0}")]
    Config(String),

    /// 데이터베이스 연결 에러
    #[error("Database connection error: {0}")]
    Connection(String),

    /// 테이블 생성/삭제 실패 (해당 도메인에 치명적)
    #[error("Schema error on table '{table}': {reason}")]
    Schema { table: String, reason: String },

    /// 배치 INSERT 실패. 실패한 청크와 행 범위를 보고하고 그 파일의 남은
    /// 청크는 시도하지 않습니다.
    #[error("Insert failed on table '{table}', chunk {chunk} (rows {first_row}..={last_row}): {reason}")]
    Insert {
        table: String,
        chunk: usize,
        first_row: usize,
        last_row: usize,
        reason: String,
    },

    /// 행이 대상 스키마와 일치하지 않음
    #[error("Row does not match table '{table}': {reason}")]
    RowMismatch { table: String, reason: String },

    /// 보조 스크립트 문 실행 실패
    #[error("Aux script statement {index} failed: {reason}")]
    AuxScript { index: usize, reason: String },

    /// 중복 레코드 (유니크 제약 위반)
    #[error("Duplicate record: {0}")]
    Duplicate(String),

    /// 쿼리 실행 에러
    #[error("Query error: {0}")]
    Query(String),

    /// 작업 데드라인 초과
    #[error("Operation timeout: {0}")]
    Timeout(String),
}

impl From<sqlx::Error> for LoadError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => LoadError::Connection("connection pool timed out".to_string()),
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().unwrap_or_default();
                if code == "23505" {
                    // PostgreSQL 고유 제약 조건 위반
                    LoadError::Duplicate(db_err.message().to_string())
                } else {
                    LoadError::Query(db_err.message().to_string())
                }
            }
            _ => LoadError::Query(err.to_string()),
        }
    }
}

/// 적재 작업을 위한 Result 타입.
pub type Result<T> = std::result::Result<T, LoadError>;
