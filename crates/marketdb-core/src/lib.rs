//! # Marketdb Core
//!
//! 스냅샷 적재 파이프라인의 핵심 도메인 모델 및 타입을 제공합니다:
//! - 데이터 도메인 정의 (환율, 현물, 주식, 뉴스)
//! - 원시 레코드와 타입 있는 행
//! - 대상 테이블 스키마와 버전
//! - 도메인별 레코드 변환기
//! - 설정 및 실행 매니페스트
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod manifest;
pub mod record;
pub mod schema;
pub mod transform;

pub use config::{AppConfig, DatabaseSettings, LoadSettings, LoggingSettings};
pub use domain::Domain;
pub use error::{RecordError, RecordResult};
pub use logging::{init_logging, LogFormat};
pub use manifest::{DomainJob, ManifestError, RunManifest};
pub use record::{FieldValue, RawRecord, Row};
pub use schema::{ColumnDef, ColumnType, ConflictTarget, SchemaVersion, TableSchema};
pub use transform::{
    transform_all, transformer_for, CurrencyTransformer, MaterialTransformer, NewsTransformer,
    RecordTransformer, StockTransformer, TransformOutcome,
};
