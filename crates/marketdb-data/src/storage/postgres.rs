//! PostgreSQL 연결 풀 래퍼.

use std::future::Future;
use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use marketdb_core::DatabaseSettings;

use crate::error::{LoadError, Result};

/// 데이터베이스 연결 풀 래퍼.
///
/// 모든 데이터베이스 왕복은 설정된 문 데드라인의 적용을 받습니다.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
    statement_timeout: Duration,
}

impl Database {
    /// 새로운 데이터베이스 연결 풀을 생성합니다.
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self> {
        info!("Connecting to database...");

        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .connect(&settings.url)
            .await
            .map_err(|e| LoadError::Connection(e.to_string()))?;

        info!("Database connection established");

        Ok(Self {
            pool,
            statement_timeout: Duration::from_secs(settings.statement_timeout_secs),
        })
    }

    /// 기존 연결 풀에서 Database 인스턴스를 생성합니다.
    pub fn from_pool(pool: PgPool, statement_timeout: Duration) -> Self {
        Self {
            pool,
            statement_timeout,
        }
    }

    /// 내부 연결 풀을 반환합니다.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// 데이터베이스 상태를 확인합니다.
    pub async fn health_check(&self) -> Result<bool> {
        self.with_deadline(sqlx::query("SELECT 1").execute(&self.pool), "health check")
            .await?;
        Ok(true)
    }

    /// 문 데드라인을 적용해 데이터베이스 왕복을 실행합니다.
    pub(crate) async fn with_deadline<T>(
        &self,
        fut: impl Future<Output = sqlx::Result<T>>,
        what: &str,
    ) -> Result<T> {
        match tokio::time::timeout(self.statement_timeout, fut).await {
            Ok(result) => result.map_err(Into::into),
            Err(_) => Err(LoadError::Timeout(format!(
                "{} exceeded {}s deadline",
                what,
                self.statement_timeout.as_secs()
            ))),
        }
    }
}
