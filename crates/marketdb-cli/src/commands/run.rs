//! 적재 실행 명령어.
//!
//! 매니페스트에 기재된 스냅샷 파일을 도메인별 대상 테이블로 적재하고,
//! 적재가 끝나면 보조 스크립트를 실행합니다.

use std::time::Duration;

use anyhow::Result;
use tracing::info;

use marketdb_core::{transform_all, transformer_for, AppConfig, RunManifest};
use marketdb_data::{read_snapshot, snapshot_label, Database, DomainReport, Pipeline, PipelineConfig, RunSummary};

/// 적재 실행 설정.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// 실행 매니페스트 경로
    pub manifest_path: String,
    /// 배치 크기 오버라이드
    pub batch_size: Option<usize>,
    /// 도메인을 순차 처리 (기본: 병렬)
    pub sequential: bool,
    /// 읽기/변환만 수행하고 데이터베이스에 쓰지 않음
    pub dry_run: bool,
}

/// 매니페스트를 실행하고 요약을 반환합니다.
pub async fn run_load(app: &AppConfig, config: RunConfig) -> Result<RunSummary> {
    let manifest = RunManifest::load(&config.manifest_path)?;
    info!(
        manifest = %config.manifest_path,
        domains = manifest.domains.len(),
        "Run manifest loaded"
    );

    let summary = if config.dry_run {
        println!("\n드라이런 모드: 데이터베이스에 쓰지 않습니다.");
        dry_run(&manifest)?
    } else {
        let batch_size = config.batch_size.unwrap_or(app.load.batch_size);
        let pipeline_config = PipelineConfig {
            batch_size,
            parallel: app.load.parallel && !config.sequential,
            run_timeout: Duration::from_secs(app.load.run_timeout_secs),
        };

        let db = Database::connect(&app.database).await?;
        let pipeline = Pipeline::new(db, pipeline_config);
        pipeline.run(&manifest).await?
    };

    print_summary(&summary, config.dry_run);
    Ok(summary)
}

/// 데이터베이스 없이 읽기와 변환만 수행합니다.
fn dry_run(manifest: &RunManifest) -> Result<RunSummary> {
    let mut summary = RunSummary::default();

    for job in &manifest.domains {
        let transformer = transformer_for(job.domain, manifest.stock_schema_version);
        let mut report = DomainReport {
            domain: job.domain,
            files: 0,
            records: 0,
            skipped: 0,
            inserted: 0,
            error: None,
        };

        for path in &job.files {
            report.files += 1;
            match read_snapshot(path) {
                Ok(records) => {
                    report.records += records.len();
                    let outcome = transform_all(transformer.as_ref(), &records);
                    report.skipped += outcome.skipped;
                    info!(
                        domain = %job.domain,
                        file = %snapshot_label(path),
                        records = records.len(),
                        valid = outcome.rows.len(),
                        "Dry-run checked snapshot"
                    );
                }
                Err(e) => {
                    report.error = Some(e.to_string());
                    break;
                }
            }
        }
        summary.domains.push(report);
    }

    Ok(summary)
}

/// 실행 요약을 출력합니다.
fn print_summary(summary: &RunSummary, dry_run: bool) {
    println!("\n적재 요약:");
    for report in &summary.domains {
        let status = match &report.error {
            Some(e) => format!("실패 ({})", e),
            None => "완료".to_string(),
        };
        if dry_run {
            println!(
                "  {:<8} | 파일 {} | 레코드 {} | 스킵 {} | {}",
                report.domain, report.files, report.records, report.skipped, status
            );
        } else {
            println!(
                "  {:<8} | 파일 {} | 레코드 {} | 스킵 {} | 삽입 {} | 거부 {} | {}",
                report.domain,
                report.files,
                report.records,
                report.skipped,
                report.inserted,
                report.rejected(),
                status
            );
        }
    }
    if !dry_run {
        println!(
            "보조 스크립트: {}문 성공, {}문 실패",
            summary.aux_executed, summary.aux_failed
        );
    }
}
