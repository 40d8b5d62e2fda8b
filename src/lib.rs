// ==========================================
// 木工车间产量系统 - 核心库
// ==========================================
// 职责: 机台日产量录入、日目标、超产提成与表格往返
// 技术栈: Rust + SQLite（仅配置）+ xlsx/csv（记录）
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "pt-BR");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 记录与日目标
pub mod repository;

// 引擎层 - 提成与聚合
pub mod engine;

// 表格编解码层 - 导入/导出
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - 会话状态
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{ContentTab, UnknownMachinePolicy, YearMonth};

// 领域实体
pub use domain::{
    ChartSeries, CommissionReport, DashboardRow, MachineCatalog, MachineProfile, MonthOption,
    OperatorCommission, ProductionEntry, ProductionRecord,
};

// 引擎
pub use engine::{Aggregator, CommissionCalculator};

// API
pub use api::{ImportApi, ProductionApi, ReportApi, TargetApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "Controle de Produção - Marcenaria";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert!(!APP_NAME.is_empty());
    }
}
