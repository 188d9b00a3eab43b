//! 内存实现
//!
//! 与 PostgreSQL 实现语义一致：唯一编号在写锁内检查并插入，未登记的用户
//! 返回 [`InsertOutcome::UnknownUser`]。用于测试和不依赖数据库的嵌入场景。

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use bank_common::UserId;
use bank_domain_core::Entity;
use bank_errors::AppResult;
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::{BankAccount, NewBankAccount};
use crate::domain::repositories::{BankAccountRepository, InsertOutcome, UserDirectory};
use crate::domain::value_objects::{AccountId, AccountUniqueId};

#[derive(Default)]
struct MemoryState {
    /// 按插入顺序保存
    accounts: Vec<BankAccount>,
    by_id: HashMap<AccountId, usize>,
    by_unique_id: HashMap<AccountUniqueId, usize>,
    users: HashSet<UserId>,
}

impl MemoryState {
    fn get(&self, id: &AccountId) -> Option<&BankAccount> {
        self.by_id.get(id).map(|&idx| &self.accounts[idx])
    }
}

/// 内存账户存储
#[derive(Clone, Default)]
pub struct InMemoryBankAccountStore {
    state: Arc<RwLock<MemoryState>>,
}

impl InMemoryBankAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记用户
    pub async fn register_user(&self, user_id: UserId) {
        self.state.write().await.users.insert(user_id);
    }

    /// 全部账户快照（按插入顺序）
    pub async fn accounts(&self) -> Vec<BankAccount> {
        self.state.read().await.accounts.clone()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.accounts.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.accounts.is_empty()
    }
}

#[async_trait]
impl BankAccountRepository for InMemoryBankAccountStore {
    async fn exists_by_unique_id(&self, unique_id: &AccountUniqueId) -> AppResult<bool> {
        Ok(self.state.read().await.by_unique_id.contains_key(unique_id))
    }

    async fn insert(&self, account: &NewBankAccount) -> AppResult<InsertOutcome> {
        let mut state = self.state.write().await;

        if state.by_unique_id.contains_key(&account.unique_id) {
            return Ok(InsertOutcome::DuplicateUniqueId);
        }
        if !state.users.contains(&account.user_id) {
            return Ok(InsertOutcome::UnknownUser);
        }

        let id = AccountId::from_uuid(Uuid::now_v7());
        let idx = state.accounts.len();
        state.accounts.push(account.clone().into_account(id.clone()));
        state.by_id.insert(id.clone(), idx);
        state.by_unique_id.insert(account.unique_id.clone(), idx);

        Ok(InsertOutcome::Inserted(id))
    }

    async fn find_by_id(&self, id: &AccountId) -> AppResult<Option<BankAccount>> {
        Ok(self.state.read().await.get(id).cloned())
    }

    async fn find_by_unique_id(
        &self,
        unique_id: &AccountUniqueId,
    ) -> AppResult<Option<BankAccount>> {
        let state = self.state.read().await;
        Ok(state
            .by_unique_id
            .get(unique_id)
            .map(|&idx| state.accounts[idx].clone()))
    }

    async fn find_balance(&self, id: &AccountId) -> AppResult<Option<Decimal>> {
        Ok(self.state.read().await.get(id).map(BankAccount::balance))
    }

    async fn find_unique_id(&self, id: &AccountId) -> AppResult<Option<AccountUniqueId>> {
        Ok(self
            .state
            .read()
            .await
            .get(id)
            .map(|account| account.unique_id().clone()))
    }

    async fn find_id_by_unique_id(
        &self,
        unique_id: &AccountUniqueId,
    ) -> AppResult<Option<AccountId>> {
        let state = self.state.read().await;
        Ok(state
            .by_unique_id
            .get(unique_id)
            .map(|&idx| state.accounts[idx].id().clone()))
    }

    async fn list_by_user(&self, user_id: &UserId) -> AppResult<Vec<BankAccount>> {
        Ok(self
            .state
            .read()
            .await
            .accounts
            .iter()
            .filter(|account| account.user_id() == user_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl UserDirectory for InMemoryBankAccountStore {
    async fn user_exists(&self, user_id: &UserId) -> AppResult<bool> {
        Ok(self.state.read().await.users.contains(user_id))
    }
}
