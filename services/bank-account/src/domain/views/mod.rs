//! 账户视图投影

mod bank_account_views;

pub use bank_account_views::*;
