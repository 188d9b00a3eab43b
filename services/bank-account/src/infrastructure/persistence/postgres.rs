//! PostgreSQL repository implementation

use async_trait::async_trait;
use bank_adapter_postgres::{is_foreign_key_violation, map_sqlx_error};
use bank_common::UserId;
use bank_errors::{AppError, AppResult};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::{BankAccount, NewBankAccount};
use crate::domain::repositories::{BankAccountRepository, InsertOutcome, UserDirectory};
use crate::domain::value_objects::{AccountId, AccountUniqueId};

use super::rows::BankAccountRow;

const SELECT_ACCOUNT: &str = r#"
    SELECT id, unique_id, name, user_id, balance, created_at, updated_at
    FROM bank_accounts
"#;

// ============================================================================
// BankAccountRepository 实现
// ============================================================================

pub struct PostgresBankAccountRepository {
    pool: PgPool,
}

impl PostgresBankAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BankAccountRepository for PostgresBankAccountRepository {
    async fn exists_by_unique_id(&self, unique_id: &AccountUniqueId) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM bank_accounts WHERE unique_id = $1)",
        )
        .bind(unique_id.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(exists)
    }

    async fn insert(&self, account: &NewBankAccount) -> AppResult<InsertOutcome> {
        let result: Result<Option<Uuid>, sqlx::Error> = sqlx::query_scalar(
            r#"
            INSERT INTO bank_accounts (unique_id, name, user_id, balance, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (unique_id) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(account.unique_id.as_str())
        .bind(&account.name)
        .bind(account.user_id.0)
        .bind(account.balance)
        .bind(account.audit_info.created_at)
        .bind(account.audit_info.updated_at)
        .fetch_optional(&self.pool)
        .await;

        // user_id 是表上唯一的外键
        let inserted = match result {
            Ok(inserted) => inserted,
            Err(e) if is_foreign_key_violation(&e) => return Ok(InsertOutcome::UnknownUser),
            Err(e) => return Err(map_sqlx_error(e)),
        };

        Ok(match inserted {
            Some(id) => InsertOutcome::Inserted(AccountId::from_uuid(id)),
            None => InsertOutcome::DuplicateUniqueId,
        })
    }

    async fn find_by_id(&self, id: &AccountId) -> AppResult<Option<BankAccount>> {
        let sql = format!("{SELECT_ACCOUNT} WHERE id = $1");
        let row = sqlx::query_as::<_, BankAccountRow>(&sql)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(BankAccount::try_from).transpose()
    }

    async fn find_by_unique_id(
        &self,
        unique_id: &AccountUniqueId,
    ) -> AppResult<Option<BankAccount>> {
        let sql = format!("{SELECT_ACCOUNT} WHERE unique_id = $1");
        let row = sqlx::query_as::<_, BankAccountRow>(&sql)
            .bind(unique_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(BankAccount::try_from).transpose()
    }

    async fn find_balance(&self, id: &AccountId) -> AppResult<Option<Decimal>> {
        sqlx::query_scalar("SELECT balance FROM bank_accounts WHERE id = $1")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }

    async fn find_unique_id(&self, id: &AccountId) -> AppResult<Option<AccountUniqueId>> {
        let unique_id: Option<String> =
            sqlx::query_scalar("SELECT unique_id FROM bank_accounts WHERE id = $1")
                .bind(id.0)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        unique_id
            .map(|value| {
                AccountUniqueId::new(value)
                    .map_err(|e| AppError::internal(format!("账户 {} 的唯一编号无效: {}", id, e)))
            })
            .transpose()
    }

    async fn find_id_by_unique_id(
        &self,
        unique_id: &AccountUniqueId,
    ) -> AppResult<Option<AccountId>> {
        let id: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM bank_accounts WHERE unique_id = $1")
                .bind(unique_id.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        Ok(id.map(AccountId::from_uuid))
    }

    async fn list_by_user(&self, user_id: &UserId) -> AppResult<Vec<BankAccount>> {
        let sql = format!("{SELECT_ACCOUNT} WHERE user_id = $1 ORDER BY created_at ASC, id ASC");
        let rows = sqlx::query_as::<_, BankAccountRow>(&sql)
            .bind(user_id.0)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        rows.into_iter().map(BankAccount::try_from).collect()
    }
}

// ============================================================================
// UserDirectory 实现
// ============================================================================

pub struct PostgresUserDirectory {
    pool: PgPool,
}

impl PostgresUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PostgresUserDirectory {
    async fn user_exists(&self, user_id: &UserId) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(user_id.0)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(exists)
    }
}
