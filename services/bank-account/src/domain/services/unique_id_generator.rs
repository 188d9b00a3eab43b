//! 唯一编号生成器

use bank_config::AccountIdConfig;
use rand::Rng;

/// 候选唯一编号生成器
///
/// 只负责产生候选值，不保证未被占用。
pub trait UniqueIdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

impl<F> UniqueIdGenerator for F
where
    F: Fn() -> String + Send + Sync,
{
    fn generate(&self) -> String {
        self()
    }
}

/// 银行前缀 + 随机数字，例如 `ABCJ04718263`
#[derive(Debug, Clone)]
pub struct RandomUniqueIdGenerator {
    prefix: String,
    digits: usize,
}

impl RandomUniqueIdGenerator {
    pub fn new(prefix: impl Into<String>, digits: usize) -> Self {
        Self {
            prefix: prefix.into(),
            digits,
        }
    }

    /// 配置已通过 [`AccountIdConfig::validate`] 校验
    pub fn from_config(config: &AccountIdConfig) -> Self {
        Self::new(config.prefix.clone(), config.digits)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn digits(&self) -> usize {
        self.digits
    }
}

impl UniqueIdGenerator for RandomUniqueIdGenerator {
    fn generate(&self) -> String {
        let mut rng = rand::thread_rng();
        let mut value = String::with_capacity(self.prefix.len() + self.digits);
        value.push_str(&self.prefix);
        for _ in 0..self.digits {
            value.push(char::from(b'0' + rng.gen_range(0..10u8)));
        }
        value
    }
}
