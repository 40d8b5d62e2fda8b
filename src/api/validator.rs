// ==========================================
// 木工车间产量系统 - 表单校验器
// ==========================================
// 职责: 录入表单与目标值的输入校验
// 红线: 校验失败时不修改任何状态
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::domain::machine::MachineCatalog;
use crate::domain::production::ProductionEntry;
use crate::domain::types::MIN_DAILY_TARGET;

// ==========================================
// EntryForm - 录入表单（原始文本）
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryForm {
    pub machine: String,
    pub date: String,
    pub output: String,
    pub hours: String,
    /// 为空时使用机台固定操作员
    pub operators: Vec<String>,
}

/// 校验录入表单
///
/// # 规则
/// - 机台必须存在于目录
/// - 日期必填，格式 YYYY-MM-DD
/// - 产量为非负整数
/// - 工时为正数
pub fn validate_entry(catalog: &MachineCatalog, form: &EntryForm) -> ApiResult<ProductionEntry> {
    let profile = catalog
        .get(form.machine.trim())
        .ok_or_else(|| ApiError::UnknownMachine(form.machine.clone()))?;

    let date = parse_date(&form.date)?;
    let output = parse_output(&form.output)?;
    let hours = parse_hours(&form.hours)?;

    let mut operators: Vec<String> = if form.operators.is_empty() {
        profile.operator_slots()
    } else {
        form.operators.iter().map(|op| op.trim().to_string()).collect()
    };
    if operators.len() < profile.num_operators {
        operators.resize(profile.num_operators, String::new());
    }

    Ok(ProductionEntry {
        machine: profile.key.clone(),
        date,
        output,
        hours,
        operators,
    })
}

pub fn parse_date(raw: &str) -> ApiResult<NaiveDate> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(ApiError::MissingDate);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| ApiError::InvalidDate(value.to_string()))
}

pub fn parse_output(raw: &str) -> ApiResult<i64> {
    let value = raw.trim();
    match value.parse::<i64>() {
        Ok(n) if n >= 0 => Ok(n),
        _ => Err(ApiError::InvalidOutput(value.to_string())),
    }
}

pub fn parse_hours(raw: &str) -> ApiResult<f64> {
    let value = raw.trim();
    match value.replace(',', ".").parse::<f64>() {
        Ok(h) if h.is_finite() && h > 0.0 => Ok(h),
        _ => Err(ApiError::InvalidHours(value.to_string())),
    }
}

/// 校验目标值（整数，不低于下限；小数部分截断）
pub fn parse_target(raw: &str) -> ApiResult<i64> {
    let value = raw.trim();
    match value.parse::<f64>() {
        Ok(t) if t.is_finite() && t.trunc() >= MIN_DAILY_TARGET as f64 => Ok(t.trunc() as i64),
        _ => Err(ApiError::TargetTooLow(value.to_string())),
    }
}
