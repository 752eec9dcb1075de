//! 대상 테이블 스키마 정의.
//!
//! 네 개의 대상 테이블에 대한 고정 스키마를 제공합니다. 스키마는 컴파일
//! 타임에 고정되며, 변환기의 출력 컬럼 순서와 정확히 일치해야 합니다.
//! 주식 테이블은 수집기 개정판에서 배당 컬럼이 추가되어 두 버전이 존재하며,
//! 명시적인 `SchemaVersion`으로 구분합니다.

use serde::{Deserialize, Serialize};

use crate::domain::Domain;
use crate::record::{FieldValue, Row};

/// 테이블 스키마 버전.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SchemaVersion {
    /// 초기 스키마 (주식: 10컬럼, 배당 없음)
    V1,
    /// 개정 스키마 (주식: 11컬럼, stock_dividend 포함)
    V2,
}

impl TryFrom<u8> for SchemaVersion {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::V1),
            2 => Ok(Self::V2),
            other => Err(format!("Unknown schema version: {}", other)),
        }
    }
}

impl From<SchemaVersion> for u8 {
    fn from(version: SchemaVersion) -> u8 {
        match version {
            SchemaVersion::V1 => 1,
            SchemaVersion::V2 => 2,
        }
    }
}

impl std::fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", u8::from(*self))
    }
}

/// 컬럼의 의미론적 타입.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Date,
    Varchar(u16),
    Float,
    BigInt,
    Text,
}

impl ColumnType {
    /// PostgreSQL 타입 표기를 반환합니다.
    pub fn sql_type(&self) -> String {
        match self {
            Self::Date => "DATE".to_string(),
            Self::Varchar(n) => format!("VARCHAR({})", n),
            Self::Float => "DOUBLE PRECISION".to_string(),
            Self::BigInt => "BIGINT".to_string(),
            Self::Text => "TEXT".to_string(),
        }
    }
}

/// 컬럼 정의 (이름, 타입, null 허용 여부).
#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub name: &'static str,
    pub ty: ColumnType,
    pub nullable: bool,
}

impl ColumnDef {
    const fn required(name: &'static str, ty: ColumnType) -> Self {
        Self {
            name,
            ty,
            nullable: false,
        }
    }

    const fn nullable(name: &'static str, ty: ColumnType) -> Self {
        Self {
            name,
            ty,
            nullable: true,
        }
    }
}

/// 중복 방지를 위한 충돌 대상 (뉴스 테이블 전용).
#[derive(Debug, Clone)]
pub struct ConflictTarget {
    /// 유니크 인덱스 이름
    pub index_name: &'static str,
    /// 인덱스 및 ON CONFLICT 절에 쓰이는 컬럼/표현식 목록
    pub expression: &'static str,
}

/// 대상 테이블의 이름, 버전, 순서 있는 컬럼 정의.
#[derive(Debug, Clone)]
pub struct TableSchema {
    name: &'static str,
    version: SchemaVersion,
    columns: Vec<ColumnDef>,
    conflict: Option<ConflictTarget>,
}

impl TableSchema {
    /// 도메인에 대한 스키마를 반환합니다. 주식만 버전에 따라 달라집니다.
    pub fn for_domain(domain: Domain, stock_version: SchemaVersion) -> Self {
        match domain {
            Domain::Currency => Self::currency(),
            Domain::Material => Self::material(),
            Domain::Stock => Self::stock(stock_version),
            Domain::News => Self::news(),
        }
    }

    /// 환율 테이블 스키마.
    pub fn currency() -> Self {
        Self {
            name: "currency",
            version: SchemaVersion::V1,
            columns: vec![
                ColumnDef::required("cur_date", ColumnType::Date),
                ColumnDef::required("cur_name", ColumnType::Varchar(50)),
                ColumnDef::required("cur_rate", ColumnType::Float),
            ],
            conflict: None,
        }
    }

    /// 현물 시세 테이블 스키마.
    pub fn material() -> Self {
        Self {
            name: "material_origin",
            version: SchemaVersion::V1,
            columns: vec![
                ColumnDef::required("material_date", ColumnType::Date),
                ColumnDef::required("material_name", ColumnType::Varchar(100)),
                ColumnDef::nullable("material_state", ColumnType::Varchar(50)),
                ColumnDef::required("material_rate", ColumnType::Float),
                ColumnDef::nullable("material_change", ColumnType::Float),
                ColumnDef::nullable("material_change_rate", ColumnType::Float),
            ],
            conflict: None,
        }
    }

    /// 주식 시세 테이블 스키마. V2는 stock_dividend 컬럼을 포함합니다.
    pub fn stock(version: SchemaVersion) -> Self {
        let mut columns = vec![
            ColumnDef::required("stock_date", ColumnType::Date),
            ColumnDef::required("stock_name", ColumnType::Varchar(50)),
            ColumnDef::required("stock_name_origin", ColumnType::Varchar(50)),
            ColumnDef::required("stock_state", ColumnType::Varchar(10)),
            ColumnDef::required("stock_rate", ColumnType::BigInt),
            ColumnDef::required("stock_change", ColumnType::Varchar(10)),
            ColumnDef::required("stock_low", ColumnType::BigInt),
            ColumnDef::required("stock_high", ColumnType::BigInt),
            ColumnDef::required("stock_volume", ColumnType::BigInt),
        ];
        if version == SchemaVersion::V2 {
            columns.push(ColumnDef::required("stock_dividend", ColumnType::BigInt));
        }
        columns.push(ColumnDef::required("stock_change_rate", ColumnType::Float));

        Self {
            name: "stock_crawl",
            version,
            columns,
            conflict: None,
        }
    }

    /// 뉴스 테이블 스키마. 같은 기사(날짜 + 종목 + 본문 접두)를 중복 삽입하지
    /// 않도록 표현식 유니크 인덱스를 가집니다.
    pub fn news() -> Self {
        Self {
            name: "news_origin",
            version: SchemaVersion::V1,
            columns: vec![
                ColumnDef::required("news_date", ColumnType::Date),
                ColumnDef::required("news_name_origin", ColumnType::Varchar(50)),
                ColumnDef::required("news_name", ColumnType::Varchar(50)),
                ColumnDef::required("news_content", ColumnType::Text),
            ],
            conflict: Some(ConflictTarget {
                index_name: "news_origin_dedup_idx",
                expression: "news_date, news_name_origin, left(news_content, 255)",
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn version(&self) -> SchemaVersion {
        self.version
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    /// 컬럼 수 (= 변환기가 생성해야 하는 행의 필드 수).
    pub fn arity(&self) -> usize {
        self.columns.len()
    }

    pub fn conflict(&self) -> Option<&ConflictTarget> {
        self.conflict.as_ref()
    }

    /// DROP TABLE IF EXISTS 문을 반환합니다.
    pub fn drop_sql(&self) -> String {
        format!("DROP TABLE IF EXISTS {}", self.name)
    }

    /// CREATE TABLE 문을 반환합니다.
    pub fn create_sql(&self) -> String {
        let cols: Vec<String> = self
            .columns
            .iter()
            .map(|c| {
                if c.nullable {
                    format!("    {} {}", c.name, c.ty.sql_type())
                } else {
                    format!("    {} {} NOT NULL", c.name, c.ty.sql_type())
                }
            })
            .collect();
        format!("CREATE TABLE {} (\n{}\n)", self.name, cols.join(",\n"))
    }

    /// 충돌 대상이 있으면 유니크 인덱스 생성문을 반환합니다.
    pub fn index_sql(&self) -> Option<String> {
        self.conflict.as_ref().map(|c| {
            format!(
                "CREATE UNIQUE INDEX IF NOT EXISTS {} ON {} ({})",
                c.index_name, self.name, c.expression
            )
        })
    }

    /// 충돌 대상이 있으면 INSERT에 붙일 ON CONFLICT 절을 반환합니다.
    pub fn conflict_clause(&self) -> Option<String> {
        self.conflict
            .as_ref()
            .map(|c| format!("ON CONFLICT ({}) DO NOTHING", c.expression))
    }

    /// 행이 이 스키마에 삽입 가능한 형태인지 검증합니다.
    ///
    /// 스키마 태그(이름 + 버전), 필드 수, 셀 타입을 모두 확인합니다. 변환기와
    /// 스키마 사이의 암묵적 컬럼 순서 결합이 조용히 깨지는 것을 막기 위한
    /// 마지막 방어선입니다.
    pub fn validate_row(&self, row: &Row) -> Result<(), String> {
        if row.schema_name() != self.name {
            return Err(format!(
                "row targets table '{}', destination is '{}'",
                row.schema_name(),
                self.name
            ));
        }
        if row.schema_version() != self.version {
            return Err(format!(
                "row targets schema {}, destination is {}",
                row.schema_version(),
                self.version
            ));
        }
        if row.len() != self.columns.len() {
            return Err(format!(
                "row has {} fields, table '{}' has {} columns",
                row.len(),
                self.name,
                self.columns.len()
            ));
        }
        for (col, value) in self.columns.iter().zip(row.values()) {
            let ok = match (col.ty, value) {
                (_, FieldValue::Null) => col.nullable,
                (ColumnType::Date, FieldValue::Date(_)) => true,
                (ColumnType::Varchar(_), FieldValue::Text(_)) => true,
                (ColumnType::Text, FieldValue::Text(_)) => true,
                (ColumnType::Float, FieldValue::Float(_)) => true,
                (ColumnType::BigInt, FieldValue::Int(_)) => true,
                _ => false,
            };
            if !ok {
                return Err(format!(
                    "column '{}' ({:?}) does not accept {:?}",
                    col.name, col.ty, value
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_stock_schema_versions() {
        assert_eq!(TableSchema::stock(SchemaVersion::V1).arity(), 10);
        assert_eq!(TableSchema::stock(SchemaVersion::V2).arity(), 11);
        let v2 = TableSchema::stock(SchemaVersion::V2);
        assert_eq!(v2.columns()[9].name, "stock_dividend");
        assert_eq!(v2.columns()[10].name, "stock_change_rate");
    }

    #[test]
    fn test_currency_create_sql() {
        let sql = TableSchema::currency().create_sql();
        assert!(sql.starts_with("CREATE TABLE currency ("));
        assert!(sql.contains("cur_date DATE NOT NULL"));
        assert!(sql.contains("cur_rate DOUBLE PRECISION NOT NULL"));
    }

    #[test]
    fn test_material_nullable_columns() {
        let sql = TableSchema::material().create_sql();
        assert!(sql.contains("material_state VARCHAR(50),"));
        assert!(!sql.contains("material_state VARCHAR(50) NOT NULL"));
        assert!(sql.contains("material_rate DOUBLE PRECISION NOT NULL"));
    }

    #[test]
    fn test_news_conflict_clause() {
        let schema = TableSchema::news();
        let index = schema.index_sql().unwrap();
        assert!(index.contains("news_origin_dedup_idx"));
        assert!(index.contains("left(news_content, 255)"));
        let clause = schema.conflict_clause().unwrap();
        assert!(clause.ends_with("DO NOTHING"));
        assert!(TableSchema::currency().conflict_clause().is_none());
    }

    #[test]
    fn test_validate_row_shape() {
        let schema = TableSchema::currency();
        let good = Row::new(
            &schema,
            vec![
                FieldValue::Date(NaiveDate::from_ymd_opt(2024, 11, 26).unwrap()),
                FieldValue::Text("USD".to_string()),
                FieldValue::Float(1390.5),
            ],
        );
        assert!(schema.validate_row(&good).is_ok());

        // 다른 테이블을 겨냥한 행은 거부됨
        let news = TableSchema::news();
        assert!(news.validate_row(&good).is_err());

        // null은 nullable 컬럼에만 허용됨
        let bad = Row::new(
            &schema,
            vec![
                FieldValue::Date(NaiveDate::from_ymd_opt(2024, 11, 26).unwrap()),
                FieldValue::Text("USD".to_string()),
                FieldValue::Null,
            ],
        );
        assert!(schema.validate_row(&bad).is_err());
    }

    #[test]
    fn test_validate_row_version_mismatch() {
        let v1 = TableSchema::stock(SchemaVersion::V1);
        let v2 = TableSchema::stock(SchemaVersion::V2);
        let row = Row::new(
            &v1,
            vec![
                FieldValue::Date(NaiveDate::from_ymd_opt(2024, 11, 26).unwrap()),
                FieldValue::Text("네이버".to_string()),
                FieldValue::Text("NAVER".to_string()),
                FieldValue::Text("상승".to_string()),
                FieldValue::Int(195000),
                FieldValue::Text("▲".to_string()),
                FieldValue::Int(193000),
                FieldValue::Int(197000),
                FieldValue::Int(423511),
                FieldValue::Float(1.2),
            ],
        );
        assert!(v1.validate_row(&row).is_ok());
        assert!(v2.validate_row(&row).is_err());
    }
}
