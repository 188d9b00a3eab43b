use bank_common::UserId;
use bank_domain_core::{AggregateRoot, Entity};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::entities::BankAccount;
use crate::domain::value_objects::{AccountId, AccountUniqueId};

/// 从账户投影出的只读视图
pub trait BankAccountProjection: Sized + Send {
    fn project(account: &BankAccount) -> Self;
}

impl BankAccountProjection for BankAccount {
    fn project(account: &BankAccount) -> Self {
        account.clone()
    }
}

/// 全部字段
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BankAccountDetailsView {
    pub id: AccountId,
    pub unique_id: AccountUniqueId,
    pub name: String,
    pub user_id: UserId,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BankAccountProjection for BankAccountDetailsView {
    fn project(account: &BankAccount) -> Self {
        Self {
            id: account.id().clone(),
            unique_id: account.unique_id().clone(),
            name: account.name().to_string(),
            user_id: account.user_id().clone(),
            balance: account.balance(),
            created_at: account.audit_info().created_at,
            updated_at: account.audit_info().updated_at,
        }
    }
}

/// 列表视图
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BankAccountIndexView {
    pub id: AccountId,
    pub unique_id: AccountUniqueId,
    pub name: String,
    pub balance: Decimal,
}

impl BankAccountProjection for BankAccountIndexView {
    fn project(account: &BankAccount) -> Self {
        Self {
            id: account.id().clone(),
            unique_id: account.unique_id().clone(),
            name: account.name().to_string(),
            balance: account.balance(),
        }
    }
}

/// 精简视图，不含余额
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BankAccountConciseView {
    pub id: AccountId,
    pub unique_id: AccountUniqueId,
    pub name: String,
}

impl BankAccountProjection for BankAccountConciseView {
    fn project(account: &BankAccount) -> Self {
        Self {
            id: account.id().clone(),
            unique_id: account.unique_id().clone(),
            name: account.name().to_string(),
        }
    }
}

/// 归属视图，用于权限判断
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BankAccountOwnershipView {
    pub id: AccountId,
    pub user_id: UserId,
}

impl BankAccountProjection for BankAccountOwnershipView {
    fn project(account: &BankAccount) -> Self {
        Self {
            id: account.id().clone(),
            user_id: account.user_id().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::NewBankAccount;
    use std::str::FromStr;
    use uuid::Uuid;

    fn sample() -> BankAccount {
        NewBankAccount::new(
            AccountUniqueId::new("ABCJ00000042").unwrap(),
            Some("Savings".to_string()),
            UserId::new(),
            Decimal::from_str("12.50").unwrap(),
        )
        .into_account(AccountId::from_uuid(Uuid::now_v7()))
    }

    #[test]
    fn test_index_view_serializes_balance_as_string() {
        let view = BankAccountIndexView::project(&sample());
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["unique_id"], "ABCJ00000042");
        assert_eq!(json["name"], "Savings");
        assert_eq!(json["balance"], "12.50");
    }

    #[test]
    fn test_concise_view_has_no_balance() {
        let json = serde_json::to_value(BankAccountConciseView::project(&sample())).unwrap();
        assert!(json.get("balance").is_none());
    }

    #[test]
    fn test_ownership_view() {
        let account = sample();
        let view = BankAccountOwnershipView::project(&account);
        assert_eq!(&view.user_id, account.user_id());
        assert_eq!(&view.id, account.id());
    }
}
