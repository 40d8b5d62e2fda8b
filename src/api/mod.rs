// ==========================================
// 木工车间产量系统 - API 层
// ==========================================
// 职责: 组合引擎/仓储/编解码，向界面层提供视图模型与提示
// ==========================================

pub mod error;
pub mod import_api;
pub mod notice;
pub mod production_api;
pub mod report_api;
pub mod target_api;
pub mod validator;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use import_api::{ImportApi, LoadOutcome};
pub use notice::{Notice, NoticeLevel};
pub use production_api::{ChangeOutcome, ProductionApi};
pub use report_api::{MachineDashboard, ReportApi};
pub use target_api::TargetApi;
pub use validator::EntryForm;
