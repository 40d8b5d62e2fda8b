// ==========================================
// 木工车间产量系统 - 数据加载 API
// ==========================================
// 职责: 读取上次导出的表格作为本次会话的数据集
// 红线: 仅在整份文件解析成功后替换记录；失败时记录保持不变
// ==========================================

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::error::ApiResult;
use crate::api::notice::Notice;
use crate::api::target_api::TargetApi;
use crate::config::ConfigManager;
use crate::domain::machine::MachineCatalog;
use crate::importer::{ImportReport, RecordImporter, SpreadsheetImporter};
use crate::repository::RecordStore;

/// 加载结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadOutcome {
    pub report: ImportReport,
    pub notice: Notice,
}

pub struct ImportApi {
    catalog: Arc<MachineCatalog>,
    target_api: Arc<TargetApi>,
    config_manager: Arc<ConfigManager>,
}

impl ImportApi {
    pub fn new(
        catalog: Arc<MachineCatalog>,
        target_api: Arc<TargetApi>,
        config_manager: Arc<ConfigManager>,
    ) -> Self {
        Self {
            catalog,
            target_api,
            config_manager,
        }
    }

    /// 加载表格文件并替换当前记录
    ///
    /// # 参数
    /// - store: 会话记录
    /// - file_path: .xlsx / .xls / .csv
    ///
    /// # 返回
    /// - Ok(LoadOutcome): 导入报告与提示
    /// - Err(ApiError::ImportFailed): 文件不可读或格式错误（store 未修改）
    /// - Err(ApiError::ValidationError): 日目标无法读取（store 未修改）
    pub async fn load_file(&self, store: &mut RecordStore, file_path: &Path) -> ApiResult<LoadOutcome> {
        let policy = self.config_manager.get_unknown_machine_policy()?;
        let importer = SpreadsheetImporter::new(self.catalog.as_ref().clone(), policy);

        let (records, report) = importer.import_file(file_path).await?;

        // 回填成功后才替换会话数据
        let mut loaded = RecordStore::from_records(records);
        self.target_api.backfill_percent(&mut loaded)?;
        *store = loaded;
        info!(file = %file_path.display(), loaded = report.loaded, "会话数据已替换");

        for warning in &report.warnings {
            warn!("{}", warning);
        }

        let count = report.loaded.to_string();
        let notice = if report.skipped.is_empty() {
            Notice::success("import.loaded", &[("count", count.as_str())])
        } else {
            let skipped = report.skipped.len().to_string();
            Notice::info(
                "import.loaded_with_skips",
                &[("count", count.as_str()), ("skipped", skipped.as_str())],
            )
        };

        Ok(LoadOutcome { report, notice })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::ApiError;
    use crate::domain::production::ProductionRecord;
    use crate::repository::TargetRepository;
    use chrono::{NaiveDate, Utc};
    use rusqlite::Connection;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::Builder;

    fn api() -> ImportApi {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::ensure_schema(&conn).unwrap();
        let conn = Arc::new(Mutex::new(conn));
        let config = Arc::new(ConfigManager::from_connection(conn.clone()).unwrap());
        let catalog = Arc::new(MachineCatalog::default());
        let repo = Arc::new(TargetRepository::from_connection(conn));
        let target_api = Arc::new(TargetApi::new(catalog.clone(), repo));
        ImportApi::new(catalog, target_api, config)
    }

    fn existing() -> ProductionRecord {
        ProductionRecord {
            id: "antigo".to_string(),
            machine: "SCM".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            operators: vec![String::new(), String::new()],
            hours: 8.0,
            output: 100,
            output_per_hour: 12.5,
            percent_of_target: None,
            commission_units: 0,
            total_commission_cents: 0,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_load_replaces_and_backfills() {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "Máquina,Data,Horas Trabalhadas,Métrica Principal (Produzido)").unwrap();
        writeln!(file, "Giben (Seccionadora),2024-05-10,8,750").unwrap();

        let mut store = RecordStore::from_records(vec![existing()]);
        let outcome = api().load_file(&mut store, file.path()).await.unwrap();

        assert_eq!(outcome.report.loaded, 1);
        assert!(!outcome.notice.is_error());
        assert_eq!(store.len(), 1);
        assert_eq!(store.all()[0].machine, "Giben");
        assert_eq!(store.all()[0].percent_of_target, Some(150.0));
    }

    #[tokio::test]
    async fn test_failed_load_keeps_store() {
        let mut file = Builder::new().suffix(".xlsx").tempfile().unwrap();
        file.write_all(b"isto nao e uma planilha").unwrap();

        let mut store = RecordStore::from_records(vec![existing()]);
        let err = api().load_file(&mut store, file.path()).await.unwrap_err();

        assert!(matches!(err, ApiError::ImportFailed(_)));
        assert_eq!(store.len(), 1);
        assert_eq!(store.all()[0].id, "antigo");
    }

    #[tokio::test]
    async fn test_unreadable_target_keeps_store() {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "Máquina,Data,Horas Trabalhadas,Métrica Principal (Produzido)").unwrap();
        writeln!(file, "SCM,2024-05-10,8,750").unwrap();

        let api = api();
        api.config_manager
            .set_global_config_value("target_Giben", "muito")
            .unwrap();

        let mut store = RecordStore::from_records(vec![existing()]);
        let err = api.load_file(&mut store, file.path()).await.unwrap_err();

        assert!(matches!(err, ApiError::ValidationError(_)));
        assert_eq!(store.len(), 1);
        assert_eq!(store.all()[0].id, "antigo");
    }
}
