//! 데이터베이스 스토리지 구성 요소.

pub mod aux_scripts;
pub mod loader;
pub mod postgres;
pub mod provision;

pub use aux_scripts::{AuxScriptReport, AuxScriptRunner};
pub use loader::{validate_batch_size, BatchedLoader, DEFAULT_BATCH_SIZE, MAX_BIND_PARAMS};
pub use postgres::Database;
pub use provision::TableProvisioner;
