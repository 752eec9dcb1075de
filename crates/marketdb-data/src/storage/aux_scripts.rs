//! 보조 설정 스크립트 실행기.
//!
//! 적재 완료 후 파생 뷰/집계를 만드는 외부 작성 SQL 스크립트를 실행합니다.
//! 세미콜론으로 구분된 문을 하나씩 독립적으로 실행하며, 한 문의 실패는
//! 기록만 하고 같은 스크립트의 다음 문을 계속합니다.

use std::path::Path;

use tracing::{error, info};

use crate::error::{LoadError, Result};
use crate::storage::postgres::Database;

/// 스크립트 하나의 실행 결과.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuxScriptReport {
    pub executed: usize,
    pub failed: usize,
}

/// 보조 스크립트 실행기.
pub struct AuxScriptRunner {
    db: Database,
}

impl AuxScriptRunner {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// 스크립트 파일을 읽어 실행합니다. 파일을 읽지 못하면
    /// `SourceUnavailable`입니다.
    pub async fn run_script(&self, path: &Path) -> Result<AuxScriptReport> {
        let text = std::fs::read_to_string(path).map_err(|e| LoadError::SourceUnavailable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let report = self.run_statements(&text).await;
        info!(
            script = %path.display(),
            executed = report.executed,
            failed = report.failed,
            "Aux script finished"
        );
        Ok(report)
    }

    /// 스크립트 텍스트의 문을 순서대로 실행합니다.
    pub async fn run_statements(&self, script: &str) -> AuxScriptReport {
        let mut report = AuxScriptReport::default();

        for (index, statement) in split_statements(script).into_iter().enumerate() {
            let outcome = self
                .db
                .with_deadline(
                    sqlx::query(statement).execute(self.db.pool()),
                    "aux statement",
                )
                .await;

            match outcome {
                Ok(_) => report.executed += 1,
                Err(e) => {
                    let err = LoadError::AuxScript {
                        index,
                        reason: e.to_string(),
                    };
                    error!(statement = index, error = %err, "Aux script statement failed");
                    report.failed += 1;
                }
            }
        }

        report
    }
}

/// 스크립트를 개별 문으로 나눕니다.
///
/// 단순 세미콜론 분리입니다: 문자열 리터럴 안의 세미콜론은 지원하지
/// 않습니다. 빈 문과 공백만 있는 문은 버립니다.
pub(crate) fn split_statements(script: &str) -> Vec<&str> {
    script
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_statements() {
        let script = r#"
DROP VIEW IF EXISTS stock_daily;

CREATE VIEW stock_daily AS
SELECT stock_date, stock_name, stock_rate FROM stock_crawl;
"#;
        let statements = split_statements(script);
        assert_eq!(statements.len(), 2);
        assert!(statements[0].starts_with("DROP VIEW"));
        assert!(statements[1].starts_with("CREATE VIEW"));
    }

    #[test]
    fn test_split_drops_empty_statements() {
        assert!(split_statements("  ;;  ;\n;").is_empty());
        assert_eq!(split_statements("SELECT 1;").len(), 1);
    }
}
