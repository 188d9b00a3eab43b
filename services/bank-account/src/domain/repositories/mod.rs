//! Repository traits

mod bank_account_repository;
mod user_directory;

pub use bank_account_repository::*;
pub use user_directory::*;
