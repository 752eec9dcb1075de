//! 배치 로더.
//!
//! 변환된 행을 고정 크기 청크로 나누어 청크당 파라미터화된 다중 행 INSERT
//! 한 문으로 적재합니다. 원래 SQL 텍스트를 문자열로 이어 붙이던 방식을
//! 대체합니다: 모든 값은 바인드 파라미터로 전달됩니다.

use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::Postgres;
use tracing::{debug, instrument};

use marketdb_core::{ColumnDef, ColumnType, FieldValue, Row, TableSchema};

use crate::error::{LoadError, Result};
use crate::storage::postgres::Database;

/// 최대 배치 크기 기본값.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// PostgreSQL이 문 하나에 허용하는 최대 바인드 파라미터 수 (u16 한계).
pub const MAX_BIND_PARAMS: usize = 65535;

/// 행 시퀀스를 청크 단위로 삽입하는 로더.
pub struct BatchedLoader {
    db: Database,
}

impl BatchedLoader {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// 행을 순서대로, 최대 `batch_size`개씩 끊어 삽입합니다.
    ///
    /// 청크는 순차적으로 실행되며, 청크 `i`는 청크 `i-1`의 문이 끝난 뒤에만
    /// 시도됩니다. 한 청크가 실패하면 남은 청크는 시도하지 않습니다: 이전
    /// 청크는 자동 커밋으로 이미 반영됐고, 청크 실패는 대개 스키마/데이터
    /// 불일치라서 이후 청크도 같은 이유로 실패합니다. 반환값은 실제 삽입된
    /// 행 수입니다 (충돌 정책으로 거부된 행은 제외).
    #[instrument(skip(self, schema, rows), fields(table = schema.name(), rows = rows.len()))]
    pub async fn load(
        &self,
        schema: &TableSchema,
        rows: &[Row],
        batch_size: usize,
    ) -> Result<usize> {
        validate_batch_size(batch_size, schema.arity())?;

        // 삽입 전에 모든 행의 스키마 태그/형태를 검증.
        // 컬럼 순서 불일치는 런타임 에러가 아니라 조용한 데이터 오염으로
        // 이어지므로 여기서 전부 걸러냅니다.
        for row in rows {
            schema.validate_row(row).map_err(|reason| LoadError::RowMismatch {
                table: schema.name().to_string(),
                reason,
            })?;
        }

        if rows.is_empty() {
            return Ok(0);
        }

        let mut inserted = 0;

        for (chunk_idx, chunk) in rows.chunks(batch_size).enumerate() {
            let sql = build_insert_sql(schema, chunk.len());
            let mut query = sqlx::query(&sql);

            for row in chunk {
                for (col, value) in schema.columns().iter().zip(row.values()) {
                    query = bind_value(query, col, value);
                }
            }

            let (first_row, last_row) = chunk_bounds(chunk_idx, batch_size, chunk.len());
            let result = self
                .db
                .with_deadline(query.execute(self.db.pool()), "batch insert")
                .await
                .map_err(|e| LoadError::Insert {
                    table: schema.name().to_string(),
                    chunk: chunk_idx,
                    first_row,
                    last_row,
                    reason: e.to_string(),
                })?;

            inserted += result.rows_affected() as usize;
            debug!(
                table = schema.name(),
                chunk = chunk_idx,
                rows = chunk.len(),
                "Chunk inserted"
            );
        }

        Ok(inserted)
    }
}

/// 배치 크기를 검증합니다. I/O가 시작되기 전에 호출됩니다.
///
/// 청크 하나의 바인드 파라미터 수는 `batch_size * arity`이고 프로토콜 한계를
/// 넘으면 모든 꽉 찬 청크가 실행 단계에서 실패하므로, 여기서 먼저
/// 거부합니다.
pub fn validate_batch_size(batch_size: usize, arity: usize) -> Result<()> {
    if batch_size == 0 {
        return Err(LoadError::Config(
            "batch_size must be at least 1".to_string(),
        ));
    }
    if batch_size * arity > MAX_BIND_PARAMS {
        return Err(LoadError::Config(format!(
            "batch_size {} needs {} bind parameters per statement for {} columns, \
             exceeding the PostgreSQL limit of {} (max batch_size here: {})",
            batch_size,
            batch_size * arity,
            arity,
            MAX_BIND_PARAMS,
            MAX_BIND_PARAMS / arity.max(1)
        )));
    }
    Ok(())
}

/// 청크가 덮는 행 인덱스 범위 (양 끝 포함).
fn chunk_bounds(chunk_idx: usize, batch_size: usize, chunk_len: usize) -> (usize, usize) {
    let first = chunk_idx * batch_size;
    (first, first + chunk_len - 1)
}

/// 청크 하나에 대한 다중 행 INSERT 문을 생성합니다.
fn build_insert_sql(schema: &TableSchema, nrows: usize) -> String {
    let ncols = schema.arity();
    let cols: Vec<&str> = schema.columns().iter().map(|c| c.name).collect();

    let mut sql = format!("INSERT INTO {} ({}) VALUES ", schema.name(), cols.join(", "));
    for i in 0..nrows {
        if i > 0 {
            sql.push_str(", ");
        }
        sql.push('(');
        for j in 0..ncols {
            if j > 0 {
                sql.push_str(", ");
            }
            sql.push_str(&format!("${}", i * ncols + j + 1));
        }
        sql.push(')');
    }

    if let Some(clause) = schema.conflict_clause() {
        sql.push(' ');
        sql.push_str(&clause);
    }
    sql
}

/// 셀 하나를 컬럼 타입에 맞게 바인드합니다. null은 컬럼 타입으로 타입을
/// 지정해 바인드해야 합니다.
fn bind_value<'q>(
    query: Query<'q, Postgres, PgArguments>,
    col: &ColumnDef,
    value: &'q FieldValue,
) -> Query<'q, Postgres, PgArguments> {
    match value {
        FieldValue::Date(d) => query.bind(*d),
        FieldValue::Text(s) => query.bind(s.as_str()),
        FieldValue::Float(f) => query.bind(*f),
        FieldValue::Int(i) => query.bind(*i),
        FieldValue::Null => match col.ty {
            ColumnType::Date => query.bind(None::<chrono::NaiveDate>),
            ColumnType::Float => query.bind(None::<f64>),
            ColumnType::BigInt => query.bind(None::<i64>),
            ColumnType::Varchar(_) | ColumnType::Text => query.bind(None::<String>),
        },
    }
}
