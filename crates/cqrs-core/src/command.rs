//! Command trait 定义

use async_trait::async_trait;
use bank_errors::AppResult;

/// 会改变状态的请求
pub trait Command: Send + Sync {
    type Result: Send;
}

/// Command Handler trait
#[async_trait]
pub trait CommandHandler<C: Command + 'static>: Send + Sync {
    async fn handle(&self, command: C) -> AppResult<C::Result>;
}
