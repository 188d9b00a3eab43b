//! bank-account - 银行账户服务
//!
//! 账户创建（唯一编号分配）、余额与编号查询、视图投影

pub mod application;
pub mod domain;
pub mod infrastructure;
