//! Business logic handler

use std::sync::Arc;

use async_trait::async_trait;
use bank_cqrs_core::{CommandHandler, QueryHandler};
use bank_common::UserId;
use bank_errors::{AppError, AppResult};
use rust_decimal::Decimal;
use tracing::{debug, error, info, warn};

use crate::domain::entities::NewBankAccount;
use crate::domain::repositories::{BankAccountRepository, InsertOutcome, UserDirectory};
use crate::domain::services::UniqueIdGenerator;
use crate::domain::value_objects::{AccountId, AccountUniqueId};
use crate::domain::views::BankAccountProjection;
use crate::infrastructure::observability::{
    record_account_created, record_account_failed, record_account_rejected,
    record_unique_id_collision,
};

use super::commands::*;
use super::queries::*;
use super::unique_id_allocator::{AllocationPolicy, UniqueIdAllocator};

pub struct ServiceHandler {
    account_repo: Arc<dyn BankAccountRepository>,
    user_directory: Arc<dyn UserDirectory>,
    allocator: UniqueIdAllocator,
}

impl ServiceHandler {
    pub fn new(
        account_repo: Arc<dyn BankAccountRepository>,
        user_directory: Arc<dyn UserDirectory>,
        generator: Arc<dyn UniqueIdGenerator>,
        policy: AllocationPolicy,
    ) -> Self {
        Self {
            account_repo,
            user_directory,
            allocator: UniqueIdAllocator::new(generator, policy),
        }
    }

    fn reject(reason: RejectionReason) -> CreateAccountOutcome {
        record_account_rejected(reason.as_str());
        CreateAccountOutcome::Rejected(reason)
    }

    /// 创建账户
    ///
    /// 分配唯一编号后插入；插入时编号被并发请求抢先占用则重新分配，
    /// 两者共用一份尝试预算。
    pub async fn create_account(
        &self,
        cmd: CreateBankAccountCommand,
    ) -> AppResult<CreateAccountOutcome> {
        let user_id = cmd.user_id.clone();
        let result = self.try_create_account(cmd).await;

        if let Err(e) = &result {
            record_account_failed(e.kind());
            if e.is_client_error() {
                warn!(
                    user_id = %user_id,
                    kind = e.kind(),
                    error = %e,
                    "Bank account creation failed"
                );
            } else {
                error!(
                    user_id = %user_id,
                    kind = e.kind(),
                    error = %e,
                    "Bank account creation failed"
                );
            }
        }
        result
    }

    async fn try_create_account(
        &self,
        cmd: CreateBankAccountCommand,
    ) -> AppResult<CreateAccountOutcome> {
        info!(user_id = %cmd.user_id, "Creating bank account");

        // 1. 验证命令
        if let Err(reason) = cmd.validate() {
            warn!(user_id = %cmd.user_id, reason = %reason, "Bank account rejected");
            return Ok(Self::reject(reason));
        }

        // 2. 检查用户是否存在
        if !self.user_directory.user_exists(&cmd.user_id).await? {
            warn!(user_id = %cmd.user_id, "Bank account rejected: user not found");
            return Ok(Self::reject(RejectionReason::UserNotFound));
        }

        let balance = cmd.balance.unwrap_or(Decimal::ZERO);

        // 3. 分配编号并插入
        let mut budget = self.allocator.budget();
        loop {
            let unique_id = self
                .allocator
                .allocate(self.account_repo.as_ref(), &mut budget)
                .await?;
            let account =
                NewBankAccount::new(unique_id, cmd.name.clone(), cmd.user_id.clone(), balance);

            match self.account_repo.insert(&account).await? {
                InsertOutcome::Inserted(account_id) => {
                    record_account_created();
                    info!(
                        account_id = %account_id,
                        unique_id = %account.unique_id,
                        attempts = budget.used(),
                        "Bank account created"
                    );
                    return Ok(CreateAccountOutcome::Created(account_id));
                }
                InsertOutcome::DuplicateUniqueId => {
                    record_unique_id_collision();
                    debug!(
                        unique_id = %account.unique_id,
                        attempts = budget.used(),
                        "Unique id taken at insert, reallocating"
                    );
                }
                InsertOutcome::UnknownUser => {
                    warn!(
                        user_id = %cmd.user_id,
                        "Bank account rejected: user removed before insert"
                    );
                    return Ok(Self::reject(RejectionReason::UserNotFound));
                }
            }
        }
    }

    /// 查询余额
    pub async fn get_balance(&self, account_id: &AccountId) -> AppResult<Decimal> {
        self.account_repo
            .find_balance(account_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("账户 {} 不存在", account_id)))
    }

    /// 按内部 ID 查询唯一编号
    pub async fn get_unique_id(&self, account_id: &AccountId) -> AppResult<AccountUniqueId> {
        self.account_repo
            .find_unique_id(account_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("账户 {} 不存在", account_id)))
    }

    /// 按唯一编号查询内部 ID
    pub async fn get_account_id(&self, unique_id: &str) -> AppResult<AccountId> {
        let unique_id = AccountUniqueId::normalize(unique_id)
            .map_err(|e| AppError::validation(e.to_string()))?;

        self.account_repo
            .find_id_by_unique_id(&unique_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("账户编号 {} 不存在", unique_id)))
    }

    /// 查询账户并投影为指定视图
    pub async fn get_account<T: BankAccountProjection>(
        &self,
        account_id: &AccountId,
    ) -> AppResult<T> {
        let account = self
            .account_repo
            .find_by_id(account_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("账户 {} 不存在", account_id)))?;

        Ok(T::project(&account))
    }

    /// 按唯一编号查询账户并投影为指定视图
    pub async fn get_account_by_unique_id<T: BankAccountProjection>(
        &self,
        unique_id: &str,
    ) -> AppResult<T> {
        let unique_id = AccountUniqueId::normalize(unique_id)
            .map_err(|e| AppError::validation(e.to_string()))?;

        let account = self
            .account_repo
            .find_by_unique_id(&unique_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("账户编号 {} 不存在", unique_id)))?;

        Ok(T::project(&account))
    }

    /// 列出用户的全部账户，按创建时间升序
    pub async fn list_user_accounts<T: BankAccountProjection>(
        &self,
        user_id: &UserId,
    ) -> AppResult<Vec<T>> {
        let accounts = self.account_repo.list_by_user(user_id).await?;
        debug!(user_id = %user_id, count = accounts.len(), "Listed user accounts");

        Ok(accounts.iter().map(T::project).collect())
    }
}

// ========== CQRS 入口 ==========

#[async_trait]
impl CommandHandler<CreateBankAccountCommand> for ServiceHandler {
    async fn handle(&self, cmd: CreateBankAccountCommand) -> AppResult<CreateAccountOutcome> {
        self.create_account(cmd).await
    }
}

#[async_trait]
impl QueryHandler<GetAccountBalanceQuery> for ServiceHandler {
    async fn handle(&self, query: GetAccountBalanceQuery) -> AppResult<Decimal> {
        self.get_balance(&query.account_id).await
    }
}

#[async_trait]
impl QueryHandler<GetAccountUniqueIdQuery> for ServiceHandler {
    async fn handle(&self, query: GetAccountUniqueIdQuery) -> AppResult<AccountUniqueId> {
        self.get_unique_id(&query.account_id).await
    }
}

#[async_trait]
impl QueryHandler<GetAccountIdQuery> for ServiceHandler {
    async fn handle(&self, query: GetAccountIdQuery) -> AppResult<AccountId> {
        self.get_account_id(&query.unique_id).await
    }
}

#[async_trait]
impl<T> QueryHandler<GetBankAccountQuery<T>> for ServiceHandler
where
    T: BankAccountProjection + 'static,
{
    async fn handle(&self, query: GetBankAccountQuery<T>) -> AppResult<T> {
        self.get_account(&query.account_id).await
    }
}

#[async_trait]
impl<T> QueryHandler<GetBankAccountByUniqueIdQuery<T>> for ServiceHandler
where
    T: BankAccountProjection + 'static,
{
    async fn handle(&self, query: GetBankAccountByUniqueIdQuery<T>) -> AppResult<T> {
        self.get_account_by_unique_id(&query.unique_id).await
    }
}

#[async_trait]
impl<T> QueryHandler<ListUserAccountsQuery<T>> for ServiceHandler
where
    T: BankAccountProjection + 'static,
{
    async fn handle(&self, query: ListUserAccountsQuery<T>) -> AppResult<Vec<T>> {
        self.list_user_accounts(&query.user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::{MockBankAccountRepository, MockUserDirectory};

    fn handler(repo: MockBankAccountRepository, users: MockUserDirectory) -> ServiceHandler {
        ServiceHandler::new(
            Arc::new(repo),
            Arc::new(users),
            Arc::new(|| "A1".to_string()),
            AllocationPolicy {
                max_attempts: 3,
                widen_after: 10,
            },
        )
    }

    #[tokio::test]
    async fn test_user_directory_error_propagates() {
        let mut users = MockUserDirectory::new();
        users
            .expect_user_exists()
            .returning(|_| Err(AppError::database("connection refused")));
        let repo = MockBankAccountRepository::new();

        let result = handler(repo, users)
            .create_account(CreateBankAccountCommand::new(UserId::new()))
            .await;

        assert!(matches!(result, Err(AppError::Database(_))));
    }

    #[tokio::test]
    async fn test_invalid_input_skips_store() {
        let users = MockUserDirectory::new();
        let repo = MockBankAccountRepository::new();

        let handler = handler(repo, users);
        let cmd = CreateBankAccountCommand::new(UserId::new()).with_name("");
        let outcome = CommandHandler::handle(&handler, cmd).await.unwrap();

        assert_eq!(outcome, CreateAccountOutcome::Rejected(RejectionReason::InvalidName));
    }

    #[tokio::test]
    async fn test_insert_conflicts_share_budget() {
        let mut users = MockUserDirectory::new();
        users.expect_user_exists().returning(|_| Ok(true));
        let mut repo = MockBankAccountRepository::new();
        repo.expect_exists_by_unique_id().returning(|_| Ok(false));
        repo.expect_insert()
            .times(3)
            .returning(|_| Ok(InsertOutcome::DuplicateUniqueId));

        let result = handler(repo, users)
            .create_account(CreateBankAccountCommand::new(UserId::new()))
            .await;

        assert!(matches!(result, Err(AppError::ResourceExhausted(_))));
    }

    #[tokio::test]
    async fn test_user_removed_before_insert_is_rejected() {
        let mut users = MockUserDirectory::new();
        users.expect_user_exists().returning(|_| Ok(true));
        let mut repo = MockBankAccountRepository::new();
        repo.expect_exists_by_unique_id().returning(|_| Ok(false));
        repo.expect_insert()
            .times(1)
            .returning(|_| Ok(InsertOutcome::UnknownUser));

        let outcome = handler(repo, users)
            .create_account(CreateBankAccountCommand::new(UserId::new()))
            .await
            .unwrap();

        assert_eq!(outcome, CreateAccountOutcome::Rejected(RejectionReason::UserNotFound));
    }

    #[tokio::test]
    async fn test_lookup_by_unique_id_normalizes_input() {
        let users = MockUserDirectory::new();
        let mut repo = MockBankAccountRepository::new();
        repo.expect_find_by_unique_id()
            .withf(|id| id.as_str() == "ABCJ00000007")
            .returning(|_| Ok(None));

        let result = handler(repo, users)
            .get_account_by_unique_id::<crate::domain::entities::BankAccount>(" abcj00000007")
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
