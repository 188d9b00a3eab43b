//! Bank Account Metrics
//!
//! 业务指标记录

use metrics::counter;

/// 记录账户创建成功
pub fn record_account_created() {
    counter!("bank_account_created_total").increment(1);
}

/// 记录账户创建被拒绝
pub fn record_account_rejected(reason: &str) {
    let labels = [("reason", reason.to_string())];
    counter!("bank_account_rejected_total", &labels).increment(1);
}

/// 记录账户创建失败（存储错误、编号耗尽等），按错误类别分组
pub fn record_account_failed(kind: &str) {
    let labels = [("kind", kind.to_string())];
    counter!("bank_account_failed_total", &labels).increment(1);
}

/// 记录唯一编号碰撞（分配时已存在或插入时冲突）
pub fn record_unique_id_collision() {
    counter!("bank_account_unique_id_collisions_total").increment(1);
}
