//! bank-bootstrap - 服务启动骨架
//!
//! 配置加载、遥测初始化和基础设施资源创建

mod infrastructure;
mod runtime;

pub use infrastructure::*;
pub use runtime::*;
