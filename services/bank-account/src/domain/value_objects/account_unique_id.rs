//! 账户唯一编号值对象

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 唯一编号最大长度
pub const MAX_LENGTH: usize = 32;

/// 唯一编号错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountUniqueIdError {
    #[error("account unique id must not be empty")]
    Empty,
    #[error("account unique id must not exceed {MAX_LENGTH} characters")]
    TooLong,
    #[error("account unique id contains invalid character: {0:?}")]
    InvalidCharacter(char),
}

/// 账户唯一编号
///
/// 面向用户的账户标识，与内部 ID 相互独立。
///
/// 业务规则:
/// - 不能为空
/// - 最大长度 32 字符
/// - 只允许 ASCII 大写字母和数字
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountUniqueId(String);

impl AccountUniqueId {
    /// 严格校验，不做任何改写
    pub fn new(value: impl Into<String>) -> Result<Self, AccountUniqueIdError> {
        let value = value.into();

        if value.is_empty() {
            return Err(AccountUniqueIdError::Empty);
        }
        if value.len() > MAX_LENGTH {
            return Err(AccountUniqueIdError::TooLong);
        }
        if let Some(c) = value
            .chars()
            .find(|c| !(c.is_ascii_uppercase() || c.is_ascii_digit()))
        {
            return Err(AccountUniqueIdError::InvalidCharacter(c));
        }

        Ok(Self(value))
    }

    /// 解析用户输入：去除首尾空白并转为大写后再校验
    pub fn normalize(input: &str) -> Result<Self, AccountUniqueIdError> {
        Self::new(input.trim().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AccountUniqueId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for AccountUniqueId {
    type Error = AccountUniqueIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for AccountUniqueId {
    type Error = AccountUniqueIdError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AccountUniqueId> for String {
    fn from(value: AccountUniqueId) -> Self {
        value.0
    }
}
