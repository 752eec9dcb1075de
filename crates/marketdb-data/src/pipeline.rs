//! 파이프라인 드라이버.
//!
//! 도메인별로 프로비저닝 → (파일마다) 읽기 → 변환 → 배치 적재를 수행하고,
//! 모든 도메인이 끝난 뒤 보조 스크립트를 실행합니다. 도메인은 상호 상태를
//! 공유하지 않으므로 기본적으로 병렬 실행하며, 보조 스크립트 전에 전부
//! 합류합니다.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn};

use marketdb_core::{
    transform_all, transformer_for, Domain, DomainJob, RunManifest, SchemaVersion, TableSchema,
};

use crate::error::{LoadError, Result};
use crate::snapshot::{read_snapshot, snapshot_label};
use crate::storage::{AuxScriptRunner, BatchedLoader, Database, TableProvisioner};

/// 파이프라인 동작 설정.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// 한 INSERT 문에 담을 최대 행 수
    pub batch_size: usize,
    /// 도메인 병렬 처리 여부
    pub parallel: bool,
    /// 전체 실행 타임아웃
    pub run_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: crate::storage::DEFAULT_BATCH_SIZE,
            parallel: true,
            run_timeout: Duration::from_secs(1800),
        }
    }
}

/// 도메인 하나의 적재 결과.
#[derive(Debug, Clone)]
pub struct DomainReport {
    pub domain: Domain,
    /// 처리를 시도한 파일 수
    pub files: usize,
    /// 읽은 레코드 수
    pub records: usize,
    /// 변환 실패로 건너뛴 레코드 수
    pub skipped: usize,
    /// 실제 삽입된 행 수
    pub inserted: usize,
    /// 도메인을 중단시킨 치명적 에러
    pub error: Option<String>,
}

impl DomainReport {
    fn new(domain: Domain) -> Self {
        Self {
            domain,
            files: 0,
            records: 0,
            skipped: 0,
            inserted: 0,
            error: None,
        }
    }

    /// 이 도메인이 치명적 에러로 끝났는지 여부.
    pub fn failed(&self) -> bool {
        self.error.is_some()
    }

    /// 충돌 정책(중복 등)으로 거부된 행 수.
    pub fn rejected(&self) -> usize {
        (self.records - self.skipped).saturating_sub(self.inserted)
    }
}

/// 실행 한 번의 요약.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub domains: Vec<DomainReport>,
    /// 보조 스크립트에서 성공한 문 수
    pub aux_executed: usize,
    /// 보조 스크립트에서 실패한 문 수 (스크립트 자체를 못 읽은 경우 포함)
    pub aux_failed: usize,
}

impl RunSummary {
    /// 어느 도메인이라도 치명적 에러를 겪었는지 여부. 프로세스 종료 코드를
    /// 결정합니다.
    pub fn has_failures(&self) -> bool {
        self.domains.iter().any(DomainReport::failed)
    }
}

/// 적재 파이프라인.
pub struct Pipeline {
    db: Database,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(db: Database, config: PipelineConfig) -> Self {
        Self { db, config }
    }

    /// 매니페스트 전체를 실행합니다.
    ///
    /// 전역 실행 타임아웃이 적용됩니다. 도메인 단위 실패는 요약에 기록되고
    /// 다른 도메인은 계속 진행합니다.
    pub async fn run(&self, manifest: &RunManifest) -> Result<RunSummary> {
        for job in &manifest.domains {
            let schema = TableSchema::for_domain(job.domain, manifest.stock_schema_version);
            crate::storage::validate_batch_size(self.config.batch_size, schema.arity())?;
        }

        match tokio::time::timeout(self.config.run_timeout, self.run_inner(manifest)).await {
            Ok(summary) => Ok(summary),
            Err(_) => Err(LoadError::Timeout(format!(
                "run exceeded {}s deadline",
                self.config.run_timeout.as_secs()
            ))),
        }
    }

    async fn run_inner(&self, manifest: &RunManifest) -> RunSummary {
        let mut summary = RunSummary::default();
        let stock_version = manifest.stock_schema_version;

        if self.config.parallel {
            let mut handles = Vec::with_capacity(manifest.domains.len());
            for job in manifest.domains.clone() {
                let db = self.db.clone();
                let batch_size = self.config.batch_size;
                let domain = job.domain;
                let handle =
                    tokio::spawn(async move { load_domain(db, batch_size, stock_version, job).await });
                handles.push((domain, handle));
            }
            summary.domains = join_domain_tasks(handles).await;
        } else {
            for job in &manifest.domains {
                let report = load_domain(
                    self.db.clone(),
                    self.config.batch_size,
                    stock_version,
                    job.clone(),
                )
                .await;
                summary.domains.push(report);
            }
        }

        // 모든 도메인 합류 후에만 보조 스크립트 실행: 파생 뷰는 적재된
        // 테이블에 의존함
        let aux = AuxScriptRunner::new(self.db.clone());
        for path in &manifest.aux_scripts {
            match aux.run_script(path).await {
                Ok(report) => {
                    summary.aux_executed += report.executed;
                    summary.aux_failed += report.failed;
                }
                Err(e) => {
                    error!(script = %path.display(), error = %e, "Aux script unavailable");
                    summary.aux_failed += 1;
                }
            }
        }

        summary
    }
}

/// 도메인 태스크를 전부 합류시켜 보고서를 모읍니다. 핸들 순서(= 매니페스트
/// 순서)가 보고 순서입니다.
///
/// 합류에 실패한 태스크(패닉 등)는 보고서를 남기지 못하므로, 해당 도메인을
/// 치명적 에러로 기록한 보고서로 대신합니다. 요약에서 도메인이 누락되면
/// `has_failures`가 실패를 보지 못하고 실행이 성공으로 끝나버립니다.
async fn join_domain_tasks(
    handles: Vec<(Domain, JoinHandle<DomainReport>)>,
) -> Vec<DomainReport> {
    let mut reports = Vec::with_capacity(handles.len());
    for (domain, handle) in handles {
        match handle.await {
            Ok(report) => reports.push(report),
            Err(e) => {
                error!(domain = %domain, error = %e, "Domain load task aborted");
                let mut report = DomainReport::new(domain);
                report.error = Some(format!("load task aborted: {}", e));
                reports.push(report);
            }
        }
    }
    reports
}

/// 도메인 하나를 적재합니다.
///
/// 첫 파일 전에 한 번만 프로비저닝하고 이후 파일은 이어서 적재합니다.
/// 파일 읽기 실패나 배치 실패는 이 도메인의 남은 파일을 중단시키지만 다른
/// 도메인에는 영향을 주지 않습니다.
#[instrument(skip(db, job), fields(domain = %job.domain))]
async fn load_domain(
    db: Database,
    batch_size: usize,
    stock_version: SchemaVersion,
    job: DomainJob,
) -> DomainReport {
    let mut report = DomainReport::new(job.domain);
    let transformer = transformer_for(job.domain, stock_version);
    let schema = transformer.schema();

    let provisioner = TableProvisioner::new(db.clone());
    if let Err(e) = provisioner.provision(schema).await {
        error!(domain = %job.domain, error = %e, "Provisioning failed, skipping domain");
        report.error = Some(e.to_string());
        return report;
    }

    let loader = BatchedLoader::new(db);

    for path in &job.files {
        report.files += 1;

        let records = match read_snapshot(path) {
            Ok(records) => records,
            Err(e) => {
                error!(domain = %job.domain, error = %e, "Snapshot unreadable, aborting domain");
                report.error = Some(e.to_string());
                return report;
            }
        };
        report.records += records.len();

        let outcome = transform_all(transformer.as_ref(), &records);
        report.skipped += outcome.skipped;
        if outcome.skipped > 0 {
            warn!(
                domain = %job.domain,
                file = %snapshot_label(path),
                skipped = outcome.skipped,
                total = records.len(),
                "Some records were skipped"
            );
        }

        match loader.load(schema, &outcome.rows, batch_size).await {
            Ok(inserted) => {
                report.inserted += inserted;
                info!(
                    domain = %job.domain,
                    file = %snapshot_label(path),
                    inserted,
                    "Snapshot loaded"
                );
            }
            Err(e) => {
                // 청크 실패는 체계적 불일치: 이 도메인의 남은 파일 중단
                error!(domain = %job.domain, error = %e, "Batch insert failed, aborting domain");
                report.error = Some(e.to_string());
                return report;
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_rejected_accounting() {
        let mut report = DomainReport::new(Domain::News);
        report.records = 100;
        report.skipped = 3;
        report.inserted = 90;
        // 97개 시도, 90개 삽입: 7개가 중복으로 거부됨
        assert_eq!(report.rejected(), 7);
        assert!(!report.failed());
    }

    #[test]
    fn test_summary_failure_detection() {
        let mut summary = RunSummary::default();
        summary.domains.push(DomainReport::new(Domain::Currency));
        assert!(!summary.has_failures());

        let mut failed = DomainReport::new(Domain::Stock);
        failed.error = Some("schema error".to_string());
        summary.domains.push(failed);
        assert!(summary.has_failures());
    }

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.batch_size, 1000);
        assert!(config.parallel);
    }

    #[tokio::test]
    async fn test_aborted_domain_task_counts_as_failure() {
        let ok: JoinHandle<DomainReport> =
            tokio::spawn(async { DomainReport::new(Domain::Currency) });
        // 드라이버가 태스크 내부 패닉(예: 드라이버 라이브러리의 패닉)을
        // 겪어도 해당 도메인은 요약에서 빠지지 않고 실패로 기록돼야 함
        let dead: JoinHandle<DomainReport> =
            tokio::spawn(async { panic!("connection state corrupted") });

        let reports =
            join_domain_tasks(vec![(Domain::Currency, ok), (Domain::Stock, dead)]).await;
        assert_eq!(reports.len(), 2);
        assert!(!reports[0].failed());
        assert_eq!(reports[1].domain, Domain::Stock);
        assert!(reports[1].failed());

        let summary = RunSummary {
            domains: reports,
            ..Default::default()
        };
        assert!(summary.has_failures());
    }
}
