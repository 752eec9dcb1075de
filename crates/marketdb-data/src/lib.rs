//! 스냅샷 읽기 및 데이터베이스 적재.
//!
//! 이 crate는 다음을 제공합니다:
//! - 스냅샷 파일 리더
//! - PostgreSQL 연결 풀 래퍼
//! - 파괴적 테이블 프로비저너
//! - 청크 단위 배치 로더
//! - 보조 스크립트 실행기
//! - 도메인별 작업을 조율하는 파이프라인 드라이버

pub mod error;
pub mod pipeline;
pub mod snapshot;
pub mod storage;

pub use error::{LoadError, Result};
pub use pipeline::{DomainReport, Pipeline, PipelineConfig, RunSummary};
pub use snapshot::{read_snapshot, snapshot_label};
pub use storage::{
    validate_batch_size, AuxScriptReport, AuxScriptRunner, BatchedLoader, Database,
    TableProvisioner, DEFAULT_BATCH_SIZE, MAX_BIND_PARAMS,
};
