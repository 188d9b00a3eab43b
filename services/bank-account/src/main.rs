//! bank-account Service - 账户库初始化
//!
//! 加载配置、建立连接池、应用账户表迁移，并通过账户查询路径自检后退出。

use std::sync::Arc;

use bank_account::application::{AllocationPolicy, ServiceHandler};
use bank_account::domain::services::{RandomUniqueIdGenerator, UniqueIdGenerator};
use bank_account::infrastructure::persistence::{
    PostgresBankAccountRepository, PostgresUserDirectory, account_migrations,
};
use bank_adapter_postgres::MigrationManager;
use bank_bootstrap::{Infrastructure, RuntimeConfig, init_runtime, shutdown_signal};
use bank_config::AppConfig;
use bank_errors::AppError;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let runtime = RuntimeConfig::default();
    let config = AppConfig::load(&runtime.config_dir)?;
    init_runtime(&config)?;
    let _metrics = bank_telemetry::init_metrics()?;

    let infra = tokio::select! {
        infra = Infrastructure::from_config(config) => infra?,
        _ = shutdown_signal() => {
            info!("Startup cancelled");
            return Ok(());
        }
    };

    let pool = infra.postgres_pool();
    let report = MigrationManager::new(pool.clone())
        .migrate(&account_migrations())
        .await?;
    info!(
        applied = ?report.applied,
        skipped = report.skipped.len(),
        "Account schema migrated"
    );

    infra.check_database().await?;

    let account_config = &infra.config().account_id;
    let generator = Arc::new(RandomUniqueIdGenerator::from_config(account_config));
    let handler = ServiceHandler::new(
        Arc::new(PostgresBankAccountRepository::new(pool.clone())),
        Arc::new(PostgresUserDirectory::new(pool)),
        generator.clone(),
        AllocationPolicy::from(account_config),
    );

    // 按生成器产出的编号走一次查询，验证表结构与配置的编号格式一致
    let sample = generator.generate();
    match handler.get_account_id(&sample).await {
        Ok(_) | Err(AppError::NotFound(_)) => {
            info!(sample = %sample, "Account lookup path verified");
        }
        Err(e) => return Err(e.into()),
    }

    let status = infra.postgres_pool_status();
    info!(
        app_name = %infra.config().app_name,
        applied = report.applied_count(),
        pool_size = status.size,
        pool_idle = status.idle,
        id_prefix = %account_config.prefix,
        "bank-account ready"
    );

    infra.shutdown().await;
    Ok(())
}
