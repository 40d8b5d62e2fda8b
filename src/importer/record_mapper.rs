// ==========================================
// 木工车间产量系统 - 记录映射器
// ==========================================
// 职责: 原始行 → ProductionRecord
// 规则:
// - 机台: 显示名称反查，其次 key；无法匹配按 UnknownMachinePolicy 处理
// - 数值: 解析失败回退为 0（整数字段截断小数）
// - 时效: 由工时/产量重算，不信任文件中的旧值
// - 达成率: 置空，展示时按当前目标回填
// - ID: 缺失时生成新 UUID；文件内重复 ID 的后续行跳过
// ==========================================

use crate::domain::machine::MachineCatalog;
use crate::domain::production::ProductionRecord;
use crate::domain::types::{currency_to_cents, UnknownMachinePolicy};
use crate::engine::commission::output_per_hour;
use crate::importer::importer_trait::RawRow;
use crate::importer::schema::{self, aliases, operator_column};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;

// ==========================================
// 导入报告
// ==========================================

/// 行被跳过的原因
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkipReason {
    MissingDate,
    InvalidDate(String),
    MissingMachine,
    UnknownMachine(String),
    DuplicateId(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingDate => write!(f, "缺少日期"),
            SkipReason::InvalidDate(v) => write!(f, "日期无法识别: {}", v),
            SkipReason::MissingMachine => write!(f, "缺少机台"),
            SkipReason::UnknownMachine(v) => write!(f, "未知机台: {}", v),
            SkipReason::DuplicateId(v) => write!(f, "重复 ID: {}", v),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedRow {
    pub row_number: usize,
    pub reason: SkipReason,
}

/// 导入报告
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    pub total_rows: usize,
    pub loaded: usize,
    pub skipped: Vec<SkippedRow>,
    pub warnings: Vec<String>,
}

// ==========================================
// RecordMapper - 记录映射器
// ==========================================
pub struct RecordMapper<'a> {
    catalog: &'a MachineCatalog,
    policy: UnknownMachinePolicy,
}

impl<'a> RecordMapper<'a> {
    pub fn new(catalog: &'a MachineCatalog, policy: UnknownMachinePolicy) -> Self {
        Self { catalog, policy }
    }

    /// 批量映射
    ///
    /// # 参数
    /// - rows: 原始行
    /// - imported_at: 文件未带创建时间时使用的时间戳
    pub fn map_rows(
        &self,
        rows: &[RawRow],
        imported_at: DateTime<Utc>,
    ) -> (Vec<ProductionRecord>, ImportReport) {
        let mut report = ImportReport {
            total_rows: rows.len(),
            ..ImportReport::default()
        };
        let mut seen_ids: HashSet<String> = HashSet::new();
        let mut records = Vec::with_capacity(rows.len());

        for row in rows {
            match self.map_row(row, imported_at, &mut report.warnings) {
                Ok(record) => {
                    if !seen_ids.insert(record.id.clone()) {
                        tracing::warn!("第 {} 行重复 ID: {}", row.row_number, record.id);
                        report.skipped.push(SkippedRow {
                            row_number: row.row_number,
                            reason: SkipReason::DuplicateId(record.id),
                        });
                        continue;
                    }
                    records.push(record);
                }
                Err(reason) => {
                    tracing::warn!("第 {} 行已跳过: {}", row.row_number, reason);
                    report.skipped.push(SkippedRow {
                        row_number: row.row_number,
                        reason,
                    });
                }
            }
        }

        report.loaded = records.len();
        (records, report)
    }

    /// 单行映射
    pub fn map_row(
        &self,
        row: &RawRow,
        imported_at: DateTime<Utc>,
        warnings: &mut Vec<String>,
    ) -> Result<ProductionRecord, SkipReason> {
        // 1. 日期
        let raw_date = row
            .get(aliases(schema::COL_DATE))
            .ok_or(SkipReason::MissingDate)?;
        let date =
            parse_date(raw_date).ok_or_else(|| SkipReason::InvalidDate(raw_date.to_string()))?;

        // 2. 机台
        let raw_machine = row
            .get(aliases(schema::COL_MACHINE))
            .ok_or(SkipReason::MissingMachine)?;
        let profile = match self.catalog.resolve(raw_machine) {
            Some(p) => p,
            None => match self.policy {
                UnknownMachinePolicy::Skip => {
                    return Err(SkipReason::UnknownMachine(raw_machine.to_string()))
                }
                UnknownMachinePolicy::FallbackToFirst => {
                    let first = self.catalog.first();
                    warnings.push(format!(
                        "第 {} 行机台 \"{}\" 未识别，已归入 {}",
                        row.row_number, raw_machine, first.key
                    ));
                    first
                }
            },
        };

        // 3. 操作员（至少覆盖机台的 num_operators 个槽位）
        let mut operators = Vec::new();
        let mut slot = 0;
        loop {
            let column = operator_column(slot);
            let present = row.cells.contains_key(&column);
            if !present && slot >= profile.num_operators {
                break;
            }
            operators.push(row.get(&[column.as_str()]).unwrap_or("").to_string());
            slot += 1;
        }
        // 超出槽位数的空列来自同文件中操作员更多的记录
        while operators.len() > profile.num_operators
            && operators.last().map_or(false, |op| op.is_empty())
        {
            operators.pop();
        }

        // 4. 数值
        let hours = parse_f64_or_zero(row.get(aliases(schema::COL_HOURS)));
        let output = parse_i64_or_zero(row.get(aliases(schema::COL_OUTPUT)));
        let commission_units = parse_i64_or_zero(row.get(aliases(schema::COL_COMMISSION_UNITS)));
        let total_commission_cents =
            currency_to_cents(parse_f64_or_zero(row.get(aliases(schema::COL_TOTAL_COMMISSION))));

        // 5. 标识与时间
        let id = row
            .get(aliases(schema::COL_ID))
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let created_at = row
            .get(aliases(schema::COL_CREATED_AT))
            .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or(imported_at);

        Ok(ProductionRecord {
            id,
            machine: profile.key.clone(),
            date,
            operators,
            hours,
            output,
            output_per_hour: output_per_hour(output, hours),
            percent_of_target: None,
            commission_units,
            total_commission_cents,
            created_at,
        })
    }
}

// ==========================================
// 宽松解析
// ==========================================

/// 数字文本归一化: 去掉 R$ / % / 空白；仅含逗号时视为小数点
fn normalize_number(raw: &str) -> String {
    let cleaned: String = raw
        .trim()
        .trim_start_matches("R$")
        .trim_end_matches('%')
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if cleaned.contains(',') && !cleaned.contains('.') {
        cleaned.replace(',', ".")
    } else {
        cleaned
    }
}

fn parse_f64_or_zero(raw: Option<&str>) -> f64 {
    raw.map(normalize_number)
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

fn parse_i64_or_zero(raw: Option<&str>) -> i64 {
    parse_f64_or_zero(raw).trunc() as i64
}

/// 解析日期
///
/// 支持: YYYY-MM-DD / DD/MM/YYYY / YYYYMMDD / YYYY/MM/DD / 带时间的 ISO 文本 / Excel 序列号
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let value = raw.trim();
    for fmt in ["%Y-%m-%d", "%d/%m/%Y", "%Y%m%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(value, fmt) {
            return Some(d);
        }
    }

    // ISO 日期时间: 取日期部分
    if value.len() > 10 && value.is_char_boundary(10) {
        if let Ok(d) = NaiveDate::parse_from_str(&value[..10], "%Y-%m-%d") {
            return Some(d);
        }
    }

    // Excel 序列号（1900 日期系统）
    let serial = value.parse::<f64>().ok()?;
    if !(1.0..=2_958_465.0).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.trunc() as i64))
}
