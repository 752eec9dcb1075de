//! 시장 스냅샷 적재 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 매니페스트에 기재된 스냅샷 전체를 적재
//! marketdb run -m config/manifest.toml
//!
//! # 데이터베이스에 쓰지 않고 스냅샷 검증만
//! marketdb run -m config/manifest.toml --dry-run
//!
//! # 주식 테이블만 스키마 v2로 재생성
//! marketdb provision -d stock --stock-version 2
//!
//! # 연결 확인
//! marketdb health
//! ```

use clap::{Parser, Subcommand};
use tracing::{error, info};

mod commands;

use commands::provision::{provision_table, ProvisionConfig};
use commands::run::{run_load, RunConfig};

use marketdb_core::{init_logging, AppConfig};

#[derive(Parser)]
#[command(name = "marketdb")]
#[command(about = "Market snapshot bulk loader - 수집된 시장 데이터 스냅샷을 DB에 적재", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 경로
    #[arg(short, long, default_value = "config/default.toml", global = true)]
    config: String,

    /// 데이터베이스 URL (기본: 설정 파일 또는 DATABASE_URL 환경변수)
    #[arg(long, global = true)]
    db_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 매니페스트의 스냅샷 파일 전체를 적재하고 보조 스크립트 실행
    Run {
        /// 실행 매니페스트 경로 (TOML)
        #[arg(short, long)]
        manifest: String,

        /// 배치 크기 (기본: 설정 파일의 load.batch_size)
        #[arg(short, long)]
        batch_size: Option<usize>,

        /// 도메인을 순차 처리 (기본: 병렬)
        #[arg(long, default_value = "false")]
        sequential: bool,

        /// 읽기/변환만 수행하고 데이터베이스에 쓰지 않음
        #[arg(long, default_value = "false")]
        dry_run: bool,
    },

    /// 도메인의 대상 테이블을 적재 없이 재생성 (기존 내용 삭제)
    Provision {
        /// 대상 도메인 (currency, material, stock, news)
        #[arg(short, long)]
        domain: String,

        /// 주식 테이블 스키마 버전 (1: 배당 없음, 2: 배당 포함)
        #[arg(long, default_value = "2")]
        stock_version: u8,
    },

    /// 데이터베이스 연결 상태 확인
    Health,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut app = AppConfig::load(&cli.config)?;
    if let Some(url) = cli.db_url {
        app.database.url = url;
    } else if let Ok(url) = std::env::var("DATABASE_URL") {
        app.database.url = url;
    }

    init_logging(&app.logging).map_err(|e| anyhow::anyhow!("logging init failed: {}", e))?;

    match cli.command {
        Commands::Run {
            manifest,
            batch_size,
            sequential,
            dry_run,
        } => {
            let config = RunConfig {
                manifest_path: manifest,
                batch_size,
                sequential,
                dry_run,
            };

            match run_load(&app, config).await {
                Ok(summary) if summary.has_failures() => {
                    error!("Run finished with domain failures");
                    std::process::exit(1);
                }
                Ok(_) => {
                    info!("✅ Run completed successfully");
                }
                Err(e) => {
                    error!("Run failed: {}", e);
                    return Err(e);
                }
            }
        }

        Commands::Provision {
            domain,
            stock_version,
        } => {
            let config = ProvisionConfig {
                domain,
                stock_version,
            };

            if let Err(e) = provision_table(&app, config).await {
                error!("Provisioning failed: {}", e);
                return Err(e);
            }
        }

        Commands::Health => {
            if let Err(e) = commands::health::health_check(&app).await {
                error!("Health check failed: {}", e);
                return Err(e);
            }
        }
    }

    Ok(())
}
