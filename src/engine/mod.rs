// ==========================================
// 木工车间产量系统 - 引擎层
// ==========================================
// 职责: 提成计算与聚合规则，纯函数
// 红线: Engine 不做 I/O，不读配置
// ==========================================

pub mod aggregator;
pub mod commission;

// 重导出核心引擎
pub use aggregator::{unnamed_operator_label, Aggregator};
pub use commission::{CommissionBreakdown, CommissionCalculator};
