//! 단일 테이블 프로비저닝 명령어.

use anyhow::{anyhow, Result};
use tracing::info;

use marketdb_core::{AppConfig, Domain, SchemaVersion, TableSchema};
use marketdb_data::{Database, TableProvisioner};

/// 프로비저닝 설정.
#[derive(Debug, Clone)]
pub struct ProvisionConfig {
    /// 대상 도메인 (currency, material, stock, news)
    pub domain: String,
    /// 주식 테이블 스키마 버전
    pub stock_version: u8,
}

/// 도메인의 대상 테이블을 적재 없이 재생성합니다. 기존 내용은 삭제됩니다.
pub async fn provision_table(app: &AppConfig, config: ProvisionConfig) -> Result<()> {
    let domain = Domain::from_str(&config.domain).ok_or_else(|| {
        anyhow!(
            "Invalid domain: {}. Supported: currency, material, stock, news",
            config.domain
        )
    })?;
    let version = SchemaVersion::try_from(config.stock_version).map_err(|e| anyhow!(e))?;
    let schema = TableSchema::for_domain(domain, version);

    let db = Database::connect(&app.database).await?;
    TableProvisioner::new(db).provision(&schema).await?;

    info!(table = schema.name(), "Provisioned");
    println!("테이블 재생성 완료: {} ({})", schema.name(), schema.version());
    Ok(())
}
