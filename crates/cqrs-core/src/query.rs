//! Query trait 定义

use async_trait::async_trait;
use bank_errors::AppResult;

/// 只读请求，不产生副作用
pub trait Query: Send + Sync {
    type Result: Send;
}

/// Query Handler trait
#[async_trait]
pub trait QueryHandler<Q: Query + 'static>: Send + Sync {
    async fn handle(&self, query: Q) -> AppResult<Q::Result>;
}
