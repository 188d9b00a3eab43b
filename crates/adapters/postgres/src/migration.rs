//! PostgreSQL 迁移管理模块
//!
//! 按版本顺序应用 SQL 迁移，并用校验和检测已应用迁移被修改的情况

use std::collections::HashMap;

use bank_errors::{AppError, AppResult};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use tracing::{debug, info};

/// 迁移记录
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MigrationRecord {
    pub version: i64,
    pub name: String,
    pub applied_at: chrono::DateTime<chrono::Utc>,
    pub checksum: String,
}

/// 迁移定义
#[derive(Debug, Clone)]
pub struct Migration {
    /// 版本号
    pub version: i64,
    /// 名称
    pub name: String,
    /// 升级 SQL，可包含多条语句
    pub up_sql: String,
    /// SHA-256 校验和（十六进制）
    pub checksum: String,
}

impl Migration {
    pub fn new(version: i64, name: impl Into<String>, up_sql: impl Into<String>) -> Self {
        let up_sql = up_sql.into();
        let checksum = Self::calculate_checksum(&up_sql);
        Self {
            version,
            name: name.into(),
            up_sql,
            checksum,
        }
    }

    fn calculate_checksum(sql: &str) -> String {
        hex::encode(Sha256::digest(sql.as_bytes()))
    }
}

/// 迁移结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// 本次应用的版本
    pub applied: Vec<i64>,
    /// 之前已应用的版本
    pub skipped: Vec<i64>,
}

impl MigrationReport {
    pub fn applied_count(&self) -> usize {
        self.applied.len()
    }
}

/// 检查待应用的迁移：版本不能重复，已应用的迁移内容不能变化
///
/// 返回按版本升序排列、尚未应用的迁移。
pub fn plan_migrations<'a>(
    migrations: &'a [Migration],
    applied: &[MigrationRecord],
) -> AppResult<(Vec<&'a Migration>, Vec<i64>)> {
    let applied: HashMap<i64, &MigrationRecord> =
        applied.iter().map(|r| (r.version, r)).collect();

    let mut sorted: Vec<&Migration> = migrations.iter().collect();
    sorted.sort_by_key(|m| m.version);

    if let Some(pair) = sorted.windows(2).find(|w| w[0].version == w[1].version) {
        return Err(AppError::internal(format!(
            "Duplicate migration version {}",
            pair[0].version
        )));
    }

    let mut pending = Vec::new();
    let mut skipped = Vec::new();
    for migration in sorted {
        match applied.get(&migration.version) {
            Some(record) if record.checksum != migration.checksum => {
                return Err(AppError::internal(format!(
                    "Checksum mismatch for migration {} ({}): applied migration has been modified",
                    migration.version, migration.name
                )));
            }
            Some(_) => skipped.push(migration.version),
            None => pending.push(migration),
        }
    }

    Ok((pending, skipped))
}

/// 迁移记录表
const MIGRATIONS_TABLE: &str = "_migrations";

/// 迁移管理器
pub struct MigrationManager {
    pool: PgPool,
}

impl MigrationManager {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 初始化迁移表
    pub async fn init(&self) -> AppResult<()> {
        let create_sql = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                version BIGINT PRIMARY KEY,
                name VARCHAR(255) NOT NULL,
                applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                checksum VARCHAR(64) NOT NULL
            )
            "#,
            MIGRATIONS_TABLE
        );

        sqlx::query(&create_sql)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to create migration table: {}", e)))?;

        debug!(table = MIGRATIONS_TABLE, "Migration table initialized");
        Ok(())
    }

    /// 获取已应用的迁移
    pub async fn applied_migrations(&self) -> AppResult<Vec<MigrationRecord>> {
        let sql = format!(
            "SELECT version, name, applied_at, checksum FROM {} ORDER BY version ASC",
            MIGRATIONS_TABLE
        );

        sqlx::query_as::<_, MigrationRecord>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get migrations: {}", e)))
    }

    /// 在单个事务中应用一条迁移
    async fn apply(&self, migration: &Migration) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {}", e)))?;

        // 多个实例同时启动时串行化迁移
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(MIGRATIONS_TABLE)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to acquire migration lock: {}", e)))?;

        let check_sql = format!("SELECT version FROM {} WHERE version = $1", MIGRATIONS_TABLE);
        let existing: Option<(i64,)> = sqlx::query_as(&check_sql)
            .bind(migration.version)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to check migration: {}", e)))?;

        if existing.is_some() {
            debug!(version = migration.version, "Migration applied concurrently, skipping");
            return Ok(());
        }

        sqlx::raw_sql(&migration.up_sql)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::database(format!(
                    "Failed to apply migration {}: {}",
                    migration.version, e
                ))
            })?;

        let insert_sql = format!(
            "INSERT INTO {} (version, name, checksum) VALUES ($1, $2, $3)",
            MIGRATIONS_TABLE
        );
        sqlx::query(&insert_sql)
            .bind(migration.version)
            .bind(&migration.name)
            .bind(&migration.checksum)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to record migration: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit migration: {}", e)))?;

        info!(
            version = migration.version,
            name = %migration.name,
            "Migration applied successfully"
        );
        Ok(())
    }

    /// 应用所有待处理的迁移
    pub async fn migrate(&self, migrations: &[Migration]) -> AppResult<MigrationReport> {
        self.init().await?;

        let applied = self.applied_migrations().await?;
        let (pending, skipped) = plan_migrations(migrations, &applied)?;

        let mut report = MigrationReport {
            applied: Vec::with_capacity(pending.len()),
            skipped,
        };
        for migration in pending {
            self.apply(migration).await?;
            report.applied.push(migration.version);
        }

        Ok(report)
    }
}
