// ==========================================
// 木工车间产量系统 - 表格导出器
// ==========================================
// 支持: Excel (.xlsx) / CSV (.csv)
// 说明: 每次保存/删除后整表导出，导出文件即持久化介质
// ==========================================

use crate::domain::machine::MachineCatalog;
use crate::domain::production::ProductionRecord;
use crate::domain::types::cents_to_currency;
use crate::importer::error::{ExportError, ExportResult};
use crate::importer::schema::{export_headers, MIN_OPERATOR_COLUMNS, SHEET_NAME};
use chrono::{NaiveDate, SecondsFormat};
use rust_xlsxwriter::{Format, Workbook};
use std::path::Path;
use tracing::{debug, info};

/// 导出文件名前缀
pub const EXPORT_FILE_PREFIX: &str = "Producao_Atualizada_";

/// 默认导出文件名
pub fn default_file_name(date: NaiveDate) -> String {
    format!("{}{}.xlsx", EXPORT_FILE_PREFIX, date.format("%Y-%m-%d"))
}

/// 导出单元格
#[derive(Debug, Clone, PartialEq)]
pub enum ExportCell {
    Text(String),
    Number(f64),
}

impl ExportCell {
    /// CSV 文本形式
    pub fn to_text(&self) -> String {
        match self {
            ExportCell::Text(s) => s.clone(),
            ExportCell::Number(n) => n.to_string(),
        }
    }
}

pub fn format_money_cents(cents: i64) -> String {
    format!("{:.2}", cents_to_currency(cents))
}

pub fn format_rate(output_per_hour: f64) -> String {
    format!("{:.2}", output_per_hour)
}

/// 达成率文本（未定义时为空）
pub fn format_percent(percent: Option<f64>) -> String {
    percent.map(|p| format!("{:.1}%", p)).unwrap_or_default()
}

// ==========================================
// RecordExporter - 记录导出器
// ==========================================
pub struct RecordExporter<'a> {
    catalog: &'a MachineCatalog,
}

impl<'a> RecordExporter<'a> {
    pub fn new(catalog: &'a MachineCatalog) -> Self {
        Self { catalog }
    }

    /// 操作员列数（至少两列）
    fn operator_columns(records: &[ProductionRecord]) -> usize {
        records
            .iter()
            .map(|r| r.operators.len())
            .max()
            .unwrap_or(0)
            .max(MIN_OPERATOR_COLUMNS)
    }

    /// 记录 → 表头 + 行
    pub fn to_table(&self, records: &[ProductionRecord]) -> (Vec<String>, Vec<Vec<ExportCell>>) {
        let operator_columns = Self::operator_columns(records);
        let headers = export_headers(operator_columns);

        let rows = records
            .iter()
            .map(|r| {
                let mut row = vec![
                    ExportCell::Text(r.id.clone()),
                    ExportCell::Text(self.catalog.display_name(&r.machine).to_string()),
                    ExportCell::Text(r.date.format("%Y-%m-%d").to_string()),
                ];
                row.extend((0..operator_columns).map(|slot| ExportCell::Text(r.operator(slot).to_string())));
                row.extend([
                    ExportCell::Number(r.hours),
                    ExportCell::Number(r.output as f64),
                    ExportCell::Text(format_rate(r.output_per_hour)),
                    ExportCell::Text(format_percent(r.percent_of_target)),
                    ExportCell::Number(r.commission_units as f64),
                    ExportCell::Text(format_money_cents(r.total_commission_cents)),
                    ExportCell::Text(r.created_at.to_rfc3339_opts(SecondsFormat::Millis, true)),
                ]);
                row
            })
            .collect();

        (headers, rows)
    }

    /// 按扩展名导出
    pub fn write<P: AsRef<Path>>(&self, records: &[ProductionRecord], path: P) -> ExportResult<()> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "xlsx" => self.write_xlsx(records, path),
            "csv" => self.write_csv(records, path),
            _ => Err(ExportError::UnsupportedFormat(ext)),
        }?;

        info!(file = %path.display(), records = records.len(), "生产记录已导出");
        Ok(())
    }

    /// 导出为 xlsx
    pub fn write_xlsx(&self, records: &[ProductionRecord], path: &Path) -> ExportResult<()> {
        let (headers, rows) = self.to_table(records);

        let mut workbook = Workbook::new();
        let header_format = Format::new().set_bold();
        let worksheet = workbook.add_worksheet().set_name(SHEET_NAME)?;

        for (col, header) in headers.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, header, &header_format)?;
        }

        for (idx, row) in rows.iter().enumerate() {
            let row_num = (idx + 1) as u32;
            for (col, cell) in row.iter().enumerate() {
                match cell {
                    ExportCell::Text(s) => {
                        worksheet.write_string(row_num, col as u16, s)?;
                    }
                    ExportCell::Number(n) => {
                        worksheet.write_number(row_num, col as u16, *n)?;
                    }
                }
            }
        }

        workbook.save(path)?;
        debug!(rows = rows.len(), "xlsx 写入完成");
        Ok(())
    }

    /// 导出为 csv
    pub fn write_csv(&self, records: &[ProductionRecord], path: &Path) -> ExportResult<()> {
        let (headers, rows) = self.to_table(records);

        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(&headers)?;
        for row in &rows {
            writer.write_record(row.iter().map(ExportCell::to_text))?;
        }
        writer.flush()?;

        debug!(rows = rows.len(), "csv 写入完成");
        Ok(())
    }
}
