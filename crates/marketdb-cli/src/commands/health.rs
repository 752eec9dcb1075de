//! 데이터베이스 상태 확인 명령어.

use anyhow::Result;

use marketdb_core::AppConfig;
use marketdb_data::Database;

/// 데이터베이스 연결을 확인합니다.
pub async fn health_check(app: &AppConfig) -> Result<()> {
    println!("\n데이터베이스 상태 확인 중...");

    let db = Database::connect(&app.database).await?;
    db.health_check().await?;

    println!("✅ 데이터베이스: 정상");
    Ok(())
}
