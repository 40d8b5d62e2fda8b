// ==========================================
// 木工车间产量系统 - 生产记录 API
// ==========================================
// 职责: 录入/删除生产记录，并在每次变更后整表导出
// 流程: 校验 → 读取当前目标 → 计算提成（冻结）→ 入库 → 导出
// 红线: 导出失败不回滚已保存的记录，以错误提示告知
// ==========================================

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::api::notice::Notice;
use crate::api::target_api::TargetApi;
use crate::api::validator::{validate_entry, EntryForm};
use crate::config::ConfigManager;
use crate::domain::machine::MachineCatalog;
use crate::domain::production::ProductionRecord;
use crate::engine::CommissionCalculator;
use crate::importer::{default_file_name, RecordExporter};
use crate::repository::RecordStore;

/// 保存/删除结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeOutcome {
    /// 新增或被删除的记录
    pub record: ProductionRecord,
    /// 导出的文件（导出失败时为 None）
    pub exported: Option<PathBuf>,
    pub notice: Notice,
}

pub struct ProductionApi {
    catalog: Arc<MachineCatalog>,
    target_api: Arc<TargetApi>,
    config_manager: Arc<ConfigManager>,
    calculator: CommissionCalculator,
}

impl ProductionApi {
    pub fn new(
        catalog: Arc<MachineCatalog>,
        target_api: Arc<TargetApi>,
        config_manager: Arc<ConfigManager>,
    ) -> Self {
        Self {
            catalog,
            target_api,
            config_manager,
            calculator: CommissionCalculator::new(),
        }
    }

    /// 提交录入表单
    ///
    /// # 返回
    /// - Ok(ChangeOutcome): 记录已保存（导出成功与否见 notice）
    /// - Err(ApiError): 校验失败，未做任何修改
    #[instrument(skip(self, store, form), fields(machine = %form.machine))]
    pub fn submit(&self, store: &mut RecordStore, form: &EntryForm) -> ApiResult<ChangeOutcome> {
        let entry = validate_entry(&self.catalog, form)?;
        let profile = self
            .catalog
            .get(&entry.machine)
            .ok_or_else(|| ApiError::UnknownMachine(entry.machine.clone()))?;

        // 提成按录入时生效的目标计算并冻结
        let target = self.target_api.current_target(&profile.key)?;
        let breakdown = self
            .calculator
            .calculate(entry.output, entry.hours, profile, target);

        let record = ProductionRecord::from_entry(
            entry,
            breakdown.output_per_hour,
            breakdown.percent_of_target,
            breakdown.commission_units,
            breakdown.total_commission_cents,
        );
        store.insert(record.clone())?;
        info!(
            id = %record.id,
            output = record.output,
            commission_units = record.commission_units,
            "生产记录已保存"
        );

        let (exported, notice) = match self.export_default(store) {
            Ok(path) => {
                let file = path.display().to_string();
                (Some(path), Notice::success("production.saved", &[("file", file.as_str())]))
            }
            Err(e) => {
                warn!("保存后导出失败: {}", e);
                (
                    None,
                    Notice::error(
                        "production.saved_without_export",
                        &[("reason", e.to_string().as_str())],
                    ),
                )
            }
        };

        Ok(ChangeOutcome {
            record,
            exported,
            notice,
        })
    }

    /// 按 ID 删除记录
    ///
    /// # 返回
    /// - Err(ApiError::NotFound): 记录不存在
    #[instrument(skip(self, store))]
    pub fn delete(&self, store: &mut RecordStore, id: &str) -> ApiResult<ChangeOutcome> {
        let record = store.delete(id)?;
        info!(id = %record.id, machine = %record.machine, "生产记录已删除");

        let (exported, notice) = match self.export_default(store) {
            Ok(path) => {
                let file = path.display().to_string();
                (Some(path), Notice::success("production.deleted", &[("file", file.as_str())]))
            }
            Err(e) => {
                warn!("删除后导出失败: {}", e);
                (
                    None,
                    Notice::error(
                        "production.deleted_without_export",
                        &[("reason", e.to_string().as_str())],
                    ),
                )
            }
        };

        Ok(ChangeOutcome {
            record,
            exported,
            notice,
        })
    }

    /// 导出到指定文件（格式由扩展名决定）
    pub fn export_to(&self, store: &mut RecordStore, path: &Path) -> ApiResult<Notice> {
        self.target_api.backfill_percent(store)?;
        RecordExporter::new(&self.catalog).write(store.all(), path)?;

        let file = path.display().to_string();
        Ok(Notice::success("export.done", &[("file", file.as_str())]))
    }

    /// 导出到配置目录下的当日文件
    pub fn export_default(&self, store: &mut RecordStore) -> ApiResult<PathBuf> {
        let dir = self.config_manager.get_export_dir()?;
        std::fs::create_dir_all(&dir).map_err(|e| ApiError::ExportFailed(e.into()))?;

        let path = dir.join(default_file_name(Local::now().date_naive()));
        self.export_to(store, &path)?;
        Ok(path)
    }
}
