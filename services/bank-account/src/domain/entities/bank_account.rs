//! 银行账户聚合根

use bank_common::{AuditInfo, UserId};
use bank_domain_core::{AggregateRoot, Entity};
use rust_decimal::Decimal;

use crate::domain::value_objects::{AccountId, AccountUniqueId};

/// 账户名称最大长度（字符数）
pub const NAME_MAX_LEN: usize = 35;

/// 余额最多保留的小数位
pub const BALANCE_SCALE: u32 = 2;

/// `NUMERIC(18,2)` 能表示的最大余额：9999999999999999.99
pub const MAX_BALANCE: Decimal =
    Decimal::from_parts(0xA763_FFFF, 0x0DE0_B6B3, 0, false, BALANCE_SCALE);

/// 名称是否合法：非空白且不超过 35 个字符
pub fn is_valid_name(name: &str) -> bool {
    !name.trim().is_empty() && name.chars().count() <= NAME_MAX_LEN
}

/// 余额是否合法：非负、不超过 [`MAX_BALANCE`] 且最多两位小数
///
/// `1.500` 视为合法，按数值判断而不是按 scale 判断。
pub fn is_valid_balance(balance: &Decimal) -> bool {
    *balance >= Decimal::ZERO
        && *balance <= MAX_BALANCE
        && balance.round_dp(BALANCE_SCALE) == *balance
}

/// 银行账户
#[derive(Debug, Clone)]
pub struct BankAccount {
    id: AccountId,
    unique_id: AccountUniqueId,
    name: String,
    user_id: UserId,
    balance: Decimal,
    audit_info: AuditInfo,
}

impl BankAccount {
    /// 从存储还原
    pub fn restore(
        id: AccountId,
        unique_id: AccountUniqueId,
        name: String,
        user_id: UserId,
        balance: Decimal,
        audit_info: AuditInfo,
    ) -> Self {
        Self {
            id,
            unique_id,
            name,
            user_id,
            balance,
            audit_info,
        }
    }

    pub fn unique_id(&self) -> &AccountUniqueId {
        &self.unique_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }
}

impl Entity for BankAccount {
    type Id = AccountId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for BankAccount {
    fn audit_info(&self) -> &AuditInfo {
        &self.audit_info
    }
}

/// 待插入的账户，内部 ID 由存储分配
#[derive(Debug, Clone, PartialEq)]
pub struct NewBankAccount {
    pub unique_id: AccountUniqueId,
    pub name: String,
    pub user_id: UserId,
    pub balance: Decimal,
    pub audit_info: AuditInfo,
}

impl NewBankAccount {
    /// 未提供名称时使用唯一编号作为名称
    pub fn new(
        unique_id: AccountUniqueId,
        name: Option<String>,
        user_id: UserId,
        balance: Decimal,
    ) -> Self {
        let name = name.unwrap_or_else(|| unique_id.as_str().to_string());
        Self {
            unique_id,
            name,
            user_id,
            balance,
            audit_info: AuditInfo::new(),
        }
    }

    /// 附上存储分配的 ID
    pub fn into_account(self, id: AccountId) -> BankAccount {
        BankAccount::restore(
            id,
            self.unique_id,
            self.name,
            self.user_id,
            self.balance,
            self.audit_info,
        )
    }
}
