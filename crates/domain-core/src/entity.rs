//! 实体基础 trait

use bank_common::AuditInfo;

/// 实体 trait
///
/// 实体以标识区分，两个字段完全相同但标识不同的实体不相等。
pub trait Entity {
    type Id: PartialEq;

    fn id(&self) -> &Self::Id;
}

/// 聚合根 trait
pub trait AggregateRoot: Entity {
    fn audit_info(&self) -> &AuditInfo;
}
