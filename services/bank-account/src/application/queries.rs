//! 账户查询

use std::marker::PhantomData;

use bank_common::UserId;
use bank_cqrs_core::Query;
use rust_decimal::Decimal;

use crate::domain::value_objects::{AccountId, AccountUniqueId};
use crate::domain::views::BankAccountProjection;

/// 查询余额
#[derive(Debug, Clone)]
pub struct GetAccountBalanceQuery {
    pub account_id: AccountId,
}

impl Query for GetAccountBalanceQuery {
    type Result = Decimal;
}

/// 按内部 ID 查询唯一编号
#[derive(Debug, Clone)]
pub struct GetAccountUniqueIdQuery {
    pub account_id: AccountId,
}

impl Query for GetAccountUniqueIdQuery {
    type Result = AccountUniqueId;
}

/// 按唯一编号查询内部 ID
///
/// `unique_id` 为用户输入，会去除空白并转为大写。
#[derive(Debug, Clone)]
pub struct GetAccountIdQuery {
    pub unique_id: String,
}

impl Query for GetAccountIdQuery {
    type Result = AccountId;
}

/// 查询单个账户并投影为 `T`
#[derive(Debug)]
pub struct GetBankAccountQuery<T> {
    pub account_id: AccountId,
    _view: PhantomData<fn() -> T>,
}

impl<T> GetBankAccountQuery<T> {
    pub fn new(account_id: AccountId) -> Self {
        Self {
            account_id,
            _view: PhantomData,
        }
    }
}

impl<T: BankAccountProjection> Query for GetBankAccountQuery<T> {
    type Result = T;
}

/// 按唯一编号查询单个账户并投影为 `T`
#[derive(Debug)]
pub struct GetBankAccountByUniqueIdQuery<T> {
    pub unique_id: String,
    _view: PhantomData<fn() -> T>,
}

impl<T> GetBankAccountByUniqueIdQuery<T> {
    pub fn new(unique_id: impl Into<String>) -> Self {
        Self {
            unique_id: unique_id.into(),
            _view: PhantomData,
        }
    }
}

impl<T: BankAccountProjection> Query for GetBankAccountByUniqueIdQuery<T> {
    type Result = T;
}

/// 查询用户的全部账户并投影为 `T`
#[derive(Debug)]
pub struct ListUserAccountsQuery<T> {
    pub user_id: UserId,
    _view: PhantomData<fn() -> T>,
}

impl<T> ListUserAccountsQuery<T> {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            _view: PhantomData,
        }
    }
}

impl<T: BankAccountProjection> Query for ListUserAccountsQuery<T> {
    type Result = Vec<T>;
}
