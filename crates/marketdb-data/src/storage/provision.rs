//! 대상 테이블 프로비저닝.

use tracing::{info, instrument};

use marketdb_core::TableSchema;

use crate::error::{LoadError, Result};
use crate::storage::postgres::Database;

/// 대상 테이블을 파괴적으로 (재)생성합니다.
///
/// 기존 내용은 삭제됩니다. 두 번 실행해도 같은 빈 테이블 상태가 됩니다.
/// 새로 적재하기 전 도메인당 한 번만 호출해야 하며, 여러 파일을 같은
/// 테이블에 이어 적재할 때는 첫 파일 전에만 호출합니다.
pub struct TableProvisioner {
    db: Database,
}

impl TableProvisioner {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// 테이블을 삭제 후 고정 스키마대로 다시 만듭니다.
    ///
    /// 실패는 `SchemaError`이며 해당 도메인의 적재에 치명적입니다: 삽입할
    /// 대상이 존재하지 않기 때문입니다.
    #[instrument(skip(self, schema), fields(table = schema.name()))]
    pub async fn provision(&self, schema: &TableSchema) -> Result<()> {
        self.exec_ddl(&schema.drop_sql(), schema.name()).await?;
        self.exec_ddl(&schema.create_sql(), schema.name()).await?;
        if let Some(index_sql) = schema.index_sql() {
            self.exec_ddl(&index_sql, schema.name()).await?;
        }

        info!(
            table = schema.name(),
            version = %schema.version(),
            "Table provisioned"
        );
        Ok(())
    }

    async fn exec_ddl(&self, sql: &str, table: &str) -> Result<()> {
        self.db
            .with_deadline(sqlx::query(sql).execute(self.db.pool()), "DDL statement")
            .await
            .map(|_| ())
            .map_err(|e| LoadError::Schema {
                table: table.to_string(),
                reason: e.to_string(),
            })
    }
}
