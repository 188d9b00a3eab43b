//! Persistence implementations

mod memory;
mod migrations;
mod postgres;
mod rows;

pub use memory::InMemoryBankAccountStore;
pub use migrations::account_migrations;
pub use postgres::{PostgresBankAccountRepository, PostgresUserDirectory};
