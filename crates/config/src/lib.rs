//! bank-config - 配置加载库
//!
//! 加载顺序：`default.toml` → `{APP_ENV}.toml` → `BANK_` 前缀环境变量
//! （嵌套字段用 `__` 分隔，例如 `BANK_DATABASE__URL`）。

use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use secrecy::Secret;
use serde::Deserialize;
use thiserror::Error;

/// 环境变量前缀
pub const ENV_PREFIX: &str = "BANK_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] figment::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// 数据库配置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: Secret<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// 启动时连接数据库的最大尝试次数
    #[serde(default = "default_connect_attempts")]
    pub connect_attempts: u32,
}

fn default_max_connections() -> u32 {
    // 开发环境: 10, 生产环境: 50
    match std::env::var("APP_ENV").as_deref() {
        Ok("production") => 50,
        _ => 10,
    }
}

fn default_connect_attempts() -> u32 {
    5
}

/// 遥测配置
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// 账户唯一编号生成策略
///
/// 编号格式为 `prefix` + `digits` 位随机数字，例如 `ABCJ04718263`。
#[derive(Debug, Clone, Deserialize)]
pub struct AccountIdConfig {
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default = "default_digits")]
    pub digits: usize,
    /// 分配唯一编号的最大尝试次数（包括插入时的冲突重试）
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// 连续冲突达到该次数后扩大候选空间
    #[serde(default = "default_widen_after")]
    pub widen_after: u32,
}

pub const MAX_PREFIX_LEN: usize = 8;
pub const MIN_DIGITS: usize = 4;
pub const MAX_DIGITS: usize = 16;
/// 扩大候选空间时追加尝试序号，上限保证编号不超过 32 个字符
pub const MAX_ATTEMPTS: u32 = 1000;

fn default_prefix() -> String {
    "ABCJ".to_string()
}

fn default_digits() -> usize {
    8
}

fn default_max_attempts() -> u32 {
    16
}

fn default_widen_after() -> u32 {
    8
}

impl Default for AccountIdConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            digits: default_digits(),
            max_attempts: default_max_attempts(),
            widen_after: default_widen_after(),
        }
    }
}

impl AccountIdConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.prefix.is_empty() || self.prefix.len() > MAX_PREFIX_LEN {
            return Err(ConfigError::Invalid(format!(
                "account_id.prefix must be 1..={MAX_PREFIX_LEN} characters"
            )));
        }
        if !self.prefix.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(ConfigError::Invalid(
                "account_id.prefix must contain only ASCII uppercase letters".to_string(),
            ));
        }
        if !(MIN_DIGITS..=MAX_DIGITS).contains(&self.digits) {
            return Err(ConfigError::Invalid(format!(
                "account_id.digits must be within {MIN_DIGITS}..={MAX_DIGITS}"
            )));
        }
        if !(1..=MAX_ATTEMPTS).contains(&self.max_attempts) {
            return Err(ConfigError::Invalid(format!(
                "account_id.max_attempts must be within 1..={MAX_ATTEMPTS}"
            )));
        }
        Ok(())
    }
}

/// 应用配置
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app_name: String,
    #[serde(default = "default_app_env")]
    pub app_env: String,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub account_id: AccountIdConfig,
}

fn default_app_env() -> String {
    "development".to_string()
}

impl AppConfig {
    /// 从配置目录和环境变量加载配置
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| default_app_env());

        let figment = Figment::new()
            .merge(Toml::file(format!("{}/default.toml", config_dir)))
            .merge(Toml::file(format!("{}/{}.toml", config_dir, env)))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        Self::from_figment(figment)
    }

    /// 从任意 figment 提取并校验
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.account_id.validate()?;
        Ok(config)
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.app_env == "production"
    }
}

#[cfg(test)]
mod tests;
