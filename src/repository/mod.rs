// ==========================================
// 木工车间产量系统 - 仓储层
// ==========================================
// 职责: 生产记录（内存）与日目标（SQLite config_kv）的存取
// ==========================================

pub mod error;
pub mod record_store;
pub mod target_repo;

pub use error::{RepositoryError, RepositoryResult};
pub use record_store::RecordStore;
pub use target_repo::TargetRepository;
