//! 数据库行结构

use bank_common::{AuditInfo, UserId};
use bank_errors::AppError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::entities::BankAccount;
use crate::domain::value_objects::{AccountId, AccountUniqueId};

#[derive(Debug, sqlx::FromRow)]
pub struct BankAccountRow {
    pub id: Uuid,
    pub unique_id: String,
    pub name: String,
    pub user_id: Uuid,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<BankAccountRow> for BankAccount {
    type Error = AppError;

    fn try_from(row: BankAccountRow) -> Result<Self, Self::Error> {
        let unique_id = AccountUniqueId::new(row.unique_id)
            .map_err(|e| AppError::internal(format!("账户 {} 的唯一编号无效: {}", row.id, e)))?;

        Ok(BankAccount::restore(
            AccountId::from_uuid(row.id),
            unique_id,
            row.name,
            UserId::from_uuid(row.user_id),
            row.balance,
            AuditInfo::restore(row.created_at, row.updated_at),
        ))
    }
}
