//! 值对象模块

mod account_unique_id;
mod ids;

pub use account_unique_id::{AccountUniqueId, AccountUniqueIdError, MAX_LENGTH as UNIQUE_ID_MAX_LENGTH};
pub use ids::AccountId;
