//! Application layer

pub mod commands;
pub mod handler;
pub mod queries;
pub mod unique_id_allocator;

pub use commands::*;
pub use handler::ServiceHandler;
pub use queries::*;
pub use unique_id_allocator::{AllocationPolicy, AttemptBudget, UniqueIdAllocator};
