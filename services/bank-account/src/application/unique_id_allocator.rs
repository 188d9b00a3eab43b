//! 唯一编号分配
//!
//! 生成候选编号并检查是否已被占用，直到找到空闲编号或尝试次数用尽。
//! 检查是只读的，真正的唯一性由存储层的唯一约束保证；插入冲突和这里的
//! 碰撞共用同一份 [`AttemptBudget`]。

use std::sync::Arc;

use bank_config::AccountIdConfig;
use bank_errors::{AppError, AppResult};
use tracing::debug;

use crate::domain::repositories::BankAccountRepository;
use crate::domain::services::UniqueIdGenerator;
use crate::domain::value_objects::{AccountUniqueId, UNIQUE_ID_MAX_LENGTH};
use crate::infrastructure::observability::record_unique_id_collision;

/// 分配策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationPolicy {
    /// 一次创建最多尝试的候选数
    pub max_attempts: u32,
    /// 连续碰撞达到该次数后，在候选值后追加尝试序号
    pub widen_after: u32,
}

impl Default for AllocationPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 16,
            widen_after: 8,
        }
    }
}

impl From<&AccountIdConfig> for AllocationPolicy {
    fn from(config: &AccountIdConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            widen_after: config.widen_after,
        }
    }
}

/// 一次创建的尝试预算
#[derive(Debug, Clone)]
pub struct AttemptBudget {
    used: u32,
    max: u32,
}

impl AttemptBudget {
    pub fn new(max: u32) -> Self {
        Self { used: 0, max }
    }

    /// 消耗一次尝试，返回从 1 开始的序号
    fn next_attempt(&mut self) -> Option<u32> {
        if self.used >= self.max {
            return None;
        }
        self.used += 1;
        Some(self.used)
    }

    pub fn used(&self) -> u32 {
        self.used
    }
}

/// 唯一编号分配器
pub struct UniqueIdAllocator {
    generator: Arc<dyn UniqueIdGenerator>,
    policy: AllocationPolicy,
}

impl UniqueIdAllocator {
    pub fn new(generator: Arc<dyn UniqueIdGenerator>, policy: AllocationPolicy) -> Self {
        Self { generator, policy }
    }

    pub fn budget(&self) -> AttemptBudget {
        AttemptBudget::new(self.policy.max_attempts)
    }

    fn candidate(&self, attempt: u32) -> AppResult<AccountUniqueId> {
        let mut raw = self.generator.generate();
        if attempt > self.policy.widen_after {
            // 追加后超长则不扩展，候选值仍参与碰撞检查
            let suffix = attempt.to_string();
            if raw.len() + suffix.len() <= UNIQUE_ID_MAX_LENGTH {
                raw.push_str(&suffix);
            }
        }
        AccountUniqueId::new(raw.as_str()).map_err(|e| {
            AppError::internal(format!("Generator produced invalid unique id {raw:?}: {e}"))
        })
    }

    /// 分配一个当前未被占用的唯一编号
    ///
    /// 预算用尽时返回 [`AppError::ResourceExhausted`]。
    pub async fn allocate(
        &self,
        repo: &dyn BankAccountRepository,
        budget: &mut AttemptBudget,
    ) -> AppResult<AccountUniqueId> {
        while let Some(attempt) = budget.next_attempt() {
            let candidate = self.candidate(attempt)?;
            if !repo.exists_by_unique_id(&candidate).await? {
                return Ok(candidate);
            }

            record_unique_id_collision();
            debug!(attempt, candidate = %candidate, "Account unique id collision");
        }

        Err(AppError::resource_exhausted(format!(
            "No free account unique id after {} attempts",
            budget.used()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockBankAccountRepository;
    use std::collections::{HashSet, VecDeque};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 按顺序返回预设值，最后一个值重复返回
    struct ScriptedGenerator {
        values: Mutex<VecDeque<String>>,
        calls: AtomicUsize,
    }

    impl ScriptedGenerator {
        fn new(values: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                values: Mutex::new(values.iter().map(|v| v.to_string()).collect()),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl UniqueIdGenerator for ScriptedGenerator {
        fn generate(&self) -> String {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut values = self.values.lock().unwrap();
            if values.len() > 1 {
                values.pop_front().unwrap()
            } else {
                values.front().cloned().unwrap()
            }
        }
    }

    fn store_holding(taken: &[&str]) -> MockBankAccountRepository {
        let taken: HashSet<String> = taken.iter().map(|v| v.to_string()).collect();
        let mut repo = MockBankAccountRepository::new();
        repo.expect_exists_by_unique_id()
            .returning(move |id| Ok(taken.contains(id.as_str())));
        repo
    }

    #[tokio::test]
    async fn test_skips_taken_candidates() {
        let generator = ScriptedGenerator::new(&["A1", "A1", "B2"]);
        let allocator = UniqueIdAllocator::new(generator.clone(), AllocationPolicy::default());
        let repo = store_holding(&["A1"]);

        let mut budget = allocator.budget();
        let unique_id = allocator.allocate(&repo, &mut budget).await.unwrap();

        assert_eq!(unique_id.as_str(), "B2");
        assert_eq!(generator.calls(), 3);
        assert_eq!(budget.used(), 3);
    }

    #[tokio::test]
    async fn test_free_first_candidate() {
        let generator = ScriptedGenerator::new(&["C3"]);
        let allocator = UniqueIdAllocator::new(generator.clone(), AllocationPolicy::default());
        let repo = store_holding(&["A1"]);

        let mut budget = allocator.budget();
        let unique_id = allocator.allocate(&repo, &mut budget).await.unwrap();

        assert_eq!(unique_id.as_str(), "C3");
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn test_widens_after_repeated_collisions() {
        let generator = ScriptedGenerator::new(&["A1"]);
        let policy = AllocationPolicy {
            max_attempts: 5,
            widen_after: 2,
        };
        let allocator = UniqueIdAllocator::new(generator.clone(), policy);
        let repo = store_holding(&["A1"]);

        let mut budget = allocator.budget();
        let unique_id = allocator.allocate(&repo, &mut budget).await.unwrap();

        assert_eq!(unique_id.as_str(), "A13");
        assert_eq!(generator.calls(), 3);
    }

    #[tokio::test]
    async fn test_exhausted_budget() {
        let generator = ScriptedGenerator::new(&["A1"]);
        let policy = AllocationPolicy {
            max_attempts: 4,
            widen_after: 10,
        };
        let allocator = UniqueIdAllocator::new(generator.clone(), policy);
        let repo = store_holding(&["A1"]);

        let mut budget = allocator.budget();
        let result = allocator.allocate(&repo, &mut budget).await;

        assert!(matches!(result, Err(AppError::ResourceExhausted(_))));
        assert_eq!(generator.calls(), 4);
        assert_eq!(budget.used(), 4);
    }

    #[tokio::test]
    async fn test_long_candidates_exhaust_instead_of_overflowing() {
        let long = "A".repeat(31);
        let generator = ScriptedGenerator::new(&[long.as_str()]);
        let policy = AllocationPolicy {
            max_attempts: 12,
            widen_after: 9,
        };
        let allocator = UniqueIdAllocator::new(generator.clone(), policy);
        let repo = store_holding(&[long.as_str()]);

        let mut budget = allocator.budget();
        let result = allocator.allocate(&repo, &mut budget).await;

        assert!(matches!(result, Err(AppError::ResourceExhausted(_))));
        assert_eq!(generator.calls(), 12);
    }

    #[tokio::test]
    async fn test_invalid_candidate_is_internal_error() {
        let generator = ScriptedGenerator::new(&["not valid"]);
        let allocator = UniqueIdAllocator::new(generator, AllocationPolicy::default());
        let repo = MockBankAccountRepository::new();

        let mut budget = allocator.budget();
        let result = allocator.allocate(&repo, &mut budget).await;

        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn test_store_error_propagates() {
        let generator = ScriptedGenerator::new(&["A1"]);
        let allocator = UniqueIdAllocator::new(generator, AllocationPolicy::default());
        let mut repo = MockBankAccountRepository::new();
        repo.expect_exists_by_unique_id()
            .returning(|_| Err(AppError::database("connection reset")));

        let mut budget = allocator.budget();
        let result = allocator.allocate(&repo, &mut budget).await;

        assert!(matches!(result, Err(AppError::Database(_))));
    }

    #[test]
    fn test_policy_from_config() {
        let policy = AllocationPolicy::from(&AccountIdConfig::default());
        assert_eq!(policy, AllocationPolicy::default());
    }
}
