//! 账户命令

use bank_common::UserId;
use bank_cqrs_core::Command;
use rust_decimal::Decimal;

use crate::domain::entities::{is_valid_balance, is_valid_name};
use crate::domain::value_objects::AccountId;

/// 创建账户命令
#[derive(Debug, Clone)]
pub struct CreateBankAccountCommand {
    pub user_id: UserId,
    /// 为空时使用分配到的唯一编号
    pub name: Option<String>,
    /// 为空时为 0
    pub balance: Option<Decimal>,
}

impl CreateBankAccountCommand {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            name: None,
            balance: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_balance(mut self, balance: Decimal) -> Self {
        self.balance = Some(balance);
        self
    }

    /// 校验输入字段，不访问存储
    pub fn validate(&self) -> Result<(), RejectionReason> {
        if let Some(name) = &self.name {
            if !is_valid_name(name) {
                return Err(RejectionReason::InvalidName);
            }
        }
        if let Some(balance) = &self.balance {
            if !is_valid_balance(balance) {
                return Err(RejectionReason::InvalidBalance);
            }
        }
        Ok(())
    }
}

impl Command for CreateBankAccountCommand {
    type Result = CreateAccountOutcome;
}

/// 拒绝原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    /// 用户不存在
    UserNotFound,
    /// 名称为空白或超过 35 个字符
    InvalidName,
    /// 余额为负、超过两位小数或超出 `NUMERIC(18,2)` 的范围
    InvalidBalance,
}

impl RejectionReason {
    /// 指标标签
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserNotFound => "user_not_found",
            Self::InvalidName => "invalid_name",
            Self::InvalidBalance => "invalid_balance",
        }
    }
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 创建结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateAccountOutcome {
    Created(AccountId),
    Rejected(RejectionReason),
}

impl CreateAccountOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}
