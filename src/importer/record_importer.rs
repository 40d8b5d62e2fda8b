// ==========================================
// 木工车间产量系统 - 表格导入器实现
// ==========================================
// 流程: 读取 → 解析 → 表头检查 → 行映射
// 红线: 任一步失败即返回错误，不产出部分结果
// ==========================================

use crate::domain::machine::MachineCatalog;
use crate::domain::production::ProductionRecord;
use crate::domain::types::UnknownMachinePolicy;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::importer_trait::{ParsedSheet, RecordImporter};
use crate::importer::record_mapper::{ImportReport, RecordMapper};
use crate::importer::schema::{self, has_column};
use async_trait::async_trait;
use chrono::Utc;
use std::path::Path;
use tracing::{info, instrument, warn};

// ==========================================
// SpreadsheetImporter - 表格导入器
// ==========================================
pub struct SpreadsheetImporter {
    catalog: MachineCatalog,
    policy: UnknownMachinePolicy,
}

impl SpreadsheetImporter {
    pub fn new(catalog: MachineCatalog, policy: UnknownMachinePolicy) -> Self {
        Self { catalog, policy }
    }

    /// 已解析的工作表 → 记录
    pub fn map_sheet(
        &self,
        sheet: &ParsedSheet,
    ) -> ImportResult<(Vec<ProductionRecord>, ImportReport)> {
        for required in [schema::COL_DATE, schema::COL_MACHINE] {
            if !has_column(&sheet.headers, required) {
                return Err(ImportError::MissingColumn(required.to_string()));
            }
        }

        let mapper = RecordMapper::new(&self.catalog, self.policy);
        Ok(mapper.map_rows(&sheet.rows, Utc::now()))
    }
}

#[async_trait]
impl RecordImporter for SpreadsheetImporter {
    #[instrument(skip(self), fields(file = %file_path.display()))]
    async fn import_file(
        &self,
        file_path: &Path,
    ) -> ImportResult<(Vec<ProductionRecord>, ImportReport)> {
        info!("开始导入生产记录");

        let parser = UniversalFileParser::for_path(file_path)?;
        let bytes = tokio::fs::read(file_path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                ImportError::FileNotFound(file_path.display().to_string())
            }
            _ => ImportError::FileReadError(e.to_string()),
        })?;

        let sheet = parser.parse_bytes(&bytes)?;
        let (records, report) = self.map_sheet(&sheet)?;

        if !report.skipped.is_empty() {
            warn!(skipped = report.skipped.len(), "部分行未导入");
        }
        info!(
            total_rows = report.total_rows,
            loaded = report.loaded,
            "生产记录导入完成"
        );

        Ok((records, report))
    }
}
