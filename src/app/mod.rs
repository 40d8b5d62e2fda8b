// ==========================================
// 木工车间产量系统 - 应用层
// ==========================================
// 职责: 会话状态与 API 装配，供 CLI 调用
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState, ShopSession};
