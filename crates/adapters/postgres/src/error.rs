//! 数据库错误映射
//!
//! SQLx 错误到 AppError 的统一转换

use bank_errors::AppError;

/// PostgreSQL unique_violation
pub const UNIQUE_VIOLATION: &str = "23505";

/// PostgreSQL foreign_key_violation
pub const FOREIGN_KEY_VIOLATION: &str = "23503";

/// 将 SQLx 错误转换为 AppError，区分不同错误类型
pub fn map_sqlx_error(e: sqlx::Error) -> AppError {
    match e {
        sqlx::Error::RowNotFound => AppError::not_found("Record not found"),
        sqlx::Error::Database(db_err) => match db_err.code() {
            Some(code) => match code.as_ref() {
                UNIQUE_VIOLATION => AppError::conflict(format!(
                    "Duplicate entry violates unique constraint{}",
                    db_err
                        .constraint()
                        .map(|c| format!(" {}", c))
                        .unwrap_or_default()
                )),
                FOREIGN_KEY_VIOLATION => AppError::validation("Foreign key constraint violation"),
                "23514" => AppError::validation("Check constraint violation"),
                "23502" => AppError::validation("Not null constraint violation"),
                "22001" => AppError::validation("String data too long"),
                "22003" => AppError::validation("Numeric value out of range"),
                "22P02" => AppError::validation("Invalid input syntax"),
                other => AppError::database(format!("Database error ({}): {}", other, db_err)),
            },
            None => AppError::database(db_err.to_string()),
        },
        sqlx::Error::PoolTimedOut => AppError::database("Database connection pool timeout"),
        sqlx::Error::PoolClosed => AppError::database("Database connection pool is closed"),
        sqlx::Error::Protocol(msg) => {
            AppError::internal(format!("Database protocol error: {}", msg))
        }
        other => AppError::database(other.to_string()),
    }
}

/// 是否为外键约束冲突（引用的行不存在或已被删除）
pub fn is_foreign_key_violation(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some(FOREIGN_KEY_VIOLATION),
        _ => false,
    }
}
