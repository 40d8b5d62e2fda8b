// ==========================================
// 木工车间产量系统 - 应用状态
// ==========================================
// 职责: 管理会话状态（当前机台/标签页/报表月份/记录）和API实例
// ==========================================

use std::path::Path;
use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::api::{ApiError, ApiResult, ImportApi, ProductionApi, ReportApi, TargetApi};
use crate::config::config_manager::ConfigManager;
use crate::db::{ensure_schema, open_sqlite_connection};
use crate::domain::machine::MachineCatalog;
use crate::domain::types::{ContentTab, YearMonth};
use crate::i18n;
use crate::repository::{RecordStore, TargetRepository};

/// 语言环境变量
pub const LOCALE_ENV: &str = "PRODUCTION_TRACKER_LOCALE";

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "PRODUCTION_TRACKER_DB_PATH";

// ==========================================
// ShopSession - 会话状态
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct ShopSession {
    pub current_machine: String,
    pub current_tab: ContentTab,
    /// None = 全部月份
    pub report_month: Option<YearMonth>,
    pub store: RecordStore,
}

impl ShopSession {
    /// 新会话: 默认第一台机台、看板页、全部月份、无记录
    pub fn new(catalog: &MachineCatalog) -> Self {
        Self {
            current_machine: catalog.first().key.clone(),
            current_tab: ContentTab::default(),
            report_month: None,
            store: RecordStore::new(),
        }
    }

    pub fn select_machine(&mut self, catalog: &MachineCatalog, machine: &str) -> ApiResult<()> {
        let profile = catalog
            .resolve(machine)
            .ok_or_else(|| ApiError::UnknownMachine(machine.to_string()))?;
        self.current_machine = profile.key.clone();
        Ok(())
    }

    pub fn switch_tab(&mut self, tab: ContentTab) {
        self.current_tab = tab;
    }

    /// 选择报表月份；所选月份不在可选列表中时回退为全部月份
    pub fn set_report_month(&mut self, month: Option<YearMonth>, available: &[YearMonth]) {
        self.report_month = month.filter(|m| available.contains(m));
    }

    /// 记录变化后校正报表月份
    pub fn sync_report_month(&mut self, available: &[YearMonth]) {
        if let Some(month) = self.report_month {
            if !available.contains(&month) {
                tracing::debug!("报表月份 {} 已无记录，回退为全部月份", month);
                self.report_month = None;
            }
        }
    }
}

/// 应用状态
///
/// 包含所有API实例与会话
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 机台目录（会话期间只读）
    pub catalog: Arc<MachineCatalog>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,

    /// 日目标API
    pub target_api: Arc<TargetApi>,

    /// 看板/报表API
    pub report_api: Arc<ReportApi>,

    /// 生产记录API
    pub production_api: Arc<ProductionApi>,

    /// 数据加载API
    pub import_api: Arc<ImportApi>,

    /// 当前会话
    pub session: ShopSession,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 说明
    /// 1. 打开数据库并确保 schema
    /// 2. 读取机台目录与语言设置
    /// 3. 创建所有API实例
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        ensure_schema(&conn).map_err(|e| format!("无法初始化数据库结构: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 配置
        // ==========================================
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );
        let catalog = Arc::new(
            config_manager
                .get_machine_catalog()
                .map_err(|e| format!("无法读取机台目录: {}", e))?,
        );

        let locale = match std::env::var(LOCALE_ENV) {
            Ok(value) if !value.trim().is_empty() => value,
            _ => config_manager
                .get_locale()
                .map_err(|e| format!("无法读取语言设置: {}", e))?,
        };
        i18n::set_locale(&locale);

        // ==========================================
        // API
        // ==========================================
        let target_repo = Arc::new(TargetRepository::from_connection(conn));
        let target_api = Arc::new(TargetApi::new(catalog.clone(), target_repo));
        let report_api = Arc::new(ReportApi::new(catalog.clone(), target_api.clone()));
        let production_api = Arc::new(ProductionApi::new(
            catalog.clone(),
            target_api.clone(),
            config_manager.clone(),
        ));
        let import_api = Arc::new(ImportApi::new(
            catalog.clone(),
            target_api.clone(),
            config_manager.clone(),
        ));

        let session = ShopSession::new(&catalog);
        tracing::info!("AppState初始化完成，机台数: {}", catalog.machines().len());

        Ok(Self {
            db_path,
            catalog,
            config_manager,
            target_api,
            report_api,
            production_api,
            import_api,
            session,
        })
    }

    /// 加载表格文件作为当前数据集
    pub async fn load_file(&mut self, file_path: &Path) -> ApiResult<crate::api::LoadOutcome> {
        let outcome = self
            .import_api
            .load_file(&mut self.session.store, file_path)
            .await?;
        self.sync_report_month();
        Ok(outcome)
    }

    /// 按当前记录校正报表月份
    pub fn sync_report_month(&mut self) {
        let available = self.report_api.available_months(&self.session.store);
        self.session.sync_report_month(&available);
    }

    /// 选择报表月份（不存在时回退为全部月份）
    pub fn select_report_month(&mut self, month: Option<YearMonth>) {
        let available = self.report_api.available_months(&self.session.store);
        self.session.set_report_month(month, &available);
    }
}

/// 获取默认数据库路径
///
/// 优先使用环境变量 PRODUCTION_TRACKER_DB_PATH，其次为用户数据目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./production_tracker.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("production-tracker");
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("production_tracker.db");
        }
    }

    path.to_string_lossy().to_string()
}
