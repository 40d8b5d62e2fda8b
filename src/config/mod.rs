// ==========================================
// 木工车间产量系统 - 配置层
// ==========================================
// 职责: 系统配置管理（机台目录/导出目录/导入策略/语言）
// 存储: config_kv 表
// ==========================================

pub mod config_manager;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
