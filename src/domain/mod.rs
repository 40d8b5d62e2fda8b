// ==========================================
// 木工车间产量系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、读模型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod machine;
pub mod production;
pub mod report;
pub mod types;

// 重导出核心类型
pub use machine::{MachineCatalog, MachineProfile};
pub use production::{ProductionEntry, ProductionRecord};
pub use report::{ChartSeries, CommissionReport, DashboardRow, MonthOption, OperatorCommission};
pub use types::{ContentTab, UnknownMachinePolicy, YearMonth};
