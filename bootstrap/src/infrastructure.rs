//! 基础设施资源管理

use std::time::Duration;

use bank_adapter_postgres::{PostgresConfig, check_connection, create_pool};
use bank_common::{RetryConfig, is_retryable_error, with_conditional_retry};
use bank_config::AppConfig;
use bank_errors::{AppError, AppResult};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use tracing::info;

/// 基础设施资源容器
pub struct Infrastructure {
    /// 应用配置
    config: AppConfig,
    /// PostgreSQL 连接池
    postgres_pool: PgPool,
}

/// 连接池状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatus {
    pub size: u32,
    pub idle: u32,
    pub active: u32,
}

impl Infrastructure {
    /// 从配置创建基础设施资源
    ///
    /// 只对瞬时故障（连接被拒绝、超时等）重试，认证失败之类的错误立即返回。
    pub async fn from_config(config: AppConfig) -> AppResult<Self> {
        let retry_config = RetryConfig::new(
            config.database.connect_attempts,
            Duration::from_millis(200),
            Duration::from_secs(5),
        );

        let pg_config = PostgresConfig::new(config.database.url.expose_secret())
            .with_max_connections(config.database.max_connections);
        let postgres_pool = with_conditional_retry(
            &retry_config,
            "PostgreSQL connection",
            || {
                let cfg = pg_config.clone();
                async move { create_pool(&cfg).await }
            },
            |e: &AppError| is_retryable_error(&e.to_string()),
        )
        .await?;
        info!(
            max_connections = config.database.max_connections,
            "PostgreSQL connection pool created"
        );

        Ok(Self::from_parts(config, postgres_pool))
    }

    /// 用已有的连接池组装（测试或嵌入场景）
    pub fn from_parts(config: AppConfig, postgres_pool: PgPool) -> Self {
        Self {
            config,
            postgres_pool,
        }
    }

    /// 获取应用配置
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// 获取 PostgreSQL 连接池
    pub fn postgres_pool(&self) -> PgPool {
        self.postgres_pool.clone()
    }

    /// 获取 PostgreSQL 连接池状态
    pub fn postgres_pool_status(&self) -> PoolStatus {
        let size = self.postgres_pool.size();
        let idle = self.postgres_pool.num_idle() as u32;
        PoolStatus {
            size,
            idle,
            active: size.saturating_sub(idle),
        }
    }

    /// 检查数据库是否可用
    pub async fn check_database(&self) -> AppResult<()> {
        check_connection(&self.postgres_pool).await
    }

    /// 关闭连接池，等待已借出的连接归还
    pub async fn shutdown(&self) {
        self.postgres_pool.close().await;
        info!("PostgreSQL connection pool closed");
    }
}
