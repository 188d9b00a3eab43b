use async_trait::async_trait;
use bank_common::UserId;
use bank_errors::AppResult;
use rust_decimal::Decimal;

use crate::domain::entities::{BankAccount, NewBankAccount};
use crate::domain::value_objects::{AccountId, AccountUniqueId};

/// 插入结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// 插入成功，附带存储分配的 ID
    Inserted(AccountId),
    /// 唯一编号已被其他账户占用，未写入任何数据
    DuplicateUniqueId,
    /// 所属用户不存在（检查之后被删除），未写入任何数据
    UnknownUser,
}

/// 银行账户仓储
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BankAccountRepository: Send + Sync {
    /// 唯一编号是否已被占用
    async fn exists_by_unique_id(&self, unique_id: &AccountUniqueId) -> AppResult<bool>;

    /// 插入新账户
    ///
    /// 唯一编号冲突或用户不存在时返回对应的 [`InsertOutcome`]，不返回错误。
    async fn insert(&self, account: &NewBankAccount) -> AppResult<InsertOutcome>;

    async fn find_by_id(&self, id: &AccountId) -> AppResult<Option<BankAccount>>;

    async fn find_by_unique_id(
        &self,
        unique_id: &AccountUniqueId,
    ) -> AppResult<Option<BankAccount>>;

    async fn find_balance(&self, id: &AccountId) -> AppResult<Option<Decimal>>;

    async fn find_unique_id(&self, id: &AccountId) -> AppResult<Option<AccountUniqueId>>;

    async fn find_id_by_unique_id(
        &self,
        unique_id: &AccountUniqueId,
    ) -> AppResult<Option<AccountId>>;

    /// 用户的全部账户，按创建时间升序
    async fn list_by_user(&self, user_id: &UserId) -> AppResult<Vec<BankAccount>>;
}
