use async_trait::async_trait;
use bank_common::UserId;
use bank_errors::AppResult;

/// 用户目录
///
/// 用户由身份服务维护，这里只做存在性检查。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn user_exists(&self, user_id: &UserId) -> AppResult<bool>;
}
