//! 실행 매니페스트.
//!
//! 실행 한 번이 어떤 스냅샷 파일을 어떤 도메인으로 적재하고, 적재 후 어떤
//! 보조 스크립트를 실행할지 기술합니다. 예전에는 이 목록이 스크립트 본문에
//! 호출 나열로 하드코딩되어 있었고, 매니페스트가 그 역할을 대신합니다.
//!
//! ```toml
//! stock_schema_version = 2
//! aux_scripts = ["sql/db_processing.sql"]
//!
//! [[domain]]
//! domain = "currency"
//! files = ["data/cur_20241126.json"]
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::Domain;
use crate::schema::SchemaVersion;

/// 매니페스트 로드/검증 에러.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Failed to read manifest {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse manifest: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid manifest: {0}")]
    Invalid(String),
}

/// 도메인 하나의 적재 작업: 같은 대상 테이블로 들어가는 스냅샷 파일 목록.
///
/// 첫 파일 적재 전에만 테이블을 재생성하고, 이후 파일은 이어서 적재합니다.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DomainJob {
    pub domain: Domain,
    pub files: Vec<PathBuf>,
}

/// 실행 한 번의 전체 계획.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunManifest {
    /// 주식 테이블 스키마 버전 (기본: 2)
    #[serde(default = "default_stock_version")]
    pub stock_schema_version: SchemaVersion,
    /// 적재 완료 후 순서대로 실행할 보조 스크립트
    #[serde(default)]
    pub aux_scripts: Vec<PathBuf>,
    /// 도메인별 작업, 기재된 순서대로 (병렬 모드에서는 순서 무관)
    #[serde(rename = "domain", default)]
    pub domains: Vec<DomainJob>,
}

fn default_stock_version() -> SchemaVersion {
    SchemaVersion::V2
}

impl RunManifest {
    /// TOML 파일에서 매니페스트를 로드하고 검증합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ManifestError> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|source| ManifestError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// TOML 텍스트에서 매니페스트를 파싱하고 검증합니다.
    pub fn parse(text: &str) -> Result<Self, ManifestError> {
        let manifest: Self = toml::from_str(text)?;
        manifest.validate()?;
        Ok(manifest)
    }

    fn validate(&self) -> Result<(), ManifestError> {
        if self.domains.is_empty() {
            return Err(ManifestError::Invalid("no domain jobs defined".to_string()));
        }
        for job in &self.domains {
            if job.files.is_empty() {
                return Err(ManifestError::Invalid(format!(
                    "domain '{}' has no snapshot files",
                    job.domain
                )));
            }
        }
        let mut seen = std::collections::HashSet::new();
        for job in &self.domains {
            // 같은 도메인이 두 번 나오면 두 번째 작업이 첫 작업의 결과를
            // 재생성 단계에서 지워버림
            if !seen.insert(job.domain) {
                return Err(ManifestError::Invalid(format!(
                    "domain '{}' listed more than once",
                    job.domain
                )));
            }
        }
        Ok(())
    }
}
