//! bank-cqrs-core - CQRS 核心库
//!
//! Command/Query 及其 Handler trait

mod command;
mod query;

pub use command::*;
pub use query::*;
