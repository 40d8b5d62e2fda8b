// ==========================================
// 木工车间产量系统 - 领域类型定义
// ==========================================
// 职责: 常量、枚举、年月值对象
// ==========================================

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 常量
// ==========================================

/// 提成单价: 每超出目标 1 个单位 = 1 分 (R$ 0,01)
pub const COMMISSION_RATE_CENTS_PER_UNIT: i64 = 1;

/// 目标值下限（单位/天）
pub const MIN_DAILY_TARGET: i64 = 10;

/// 月份名称（pt-BR，用于月份筛选项标签）
pub const MONTH_NAMES_PT: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

/// 分 → 货币单位
pub fn cents_to_currency(cents: i64) -> f64 {
    cents as f64 / 100.0
}

/// 货币单位 → 分（四舍五入）
pub fn currency_to_cents(value: f64) -> i64 {
    (value * 100.0).round() as i64
}

// ==========================================
// 内容页签 (Content Tab)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentTab {
    #[default]
    Dashboard, // 看板: 记录列表 + 趋势
    Report,    // 报表: 提成汇总
}

impl fmt::Display for ContentTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentTab::Dashboard => write!(f, "DASHBOARD"),
            ContentTab::Report => write!(f, "REPORT"),
        }
    }
}

// ==========================================
// 未知机台策略 (Unknown Machine Policy)
// ==========================================
// 导入时机台名称无法匹配的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnknownMachinePolicy {
    #[default]
    Skip,            // 跳过该行并报告
    FallbackToFirst, // 归入第一台机台（每行产生警告）
}

impl fmt::Display for UnknownMachinePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnknownMachinePolicy::Skip => write!(f, "SKIP"),
            UnknownMachinePolicy::FallbackToFirst => write!(f, "FALLBACK_TO_FIRST"),
        }
    }
}

impl FromStr for UnknownMachinePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "SKIP" => Ok(UnknownMachinePolicy::Skip),
            "FALLBACK_TO_FIRST" => Ok(UnknownMachinePolicy::FallbackToFirst),
            other => Err(format!("未知的机台匹配策略: {}", other)),
        }
    }
}

// ==========================================
// 年月 (Year-Month)
// ==========================================
// 报表月份筛选键，文本格式 YYYY-MM
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// 日期是否落在该月
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// 显示标签，例如 "Maio/2024"
    pub fn label(&self) -> String {
        format!("{}/{}", MONTH_NAMES_PT[(self.month - 1) as usize], self.year)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (year, month) = trimmed
            .split_once('-')
            .ok_or_else(|| format!("月份格式错误，期望 YYYY-MM: {}", trimmed))?;
        let year: i32 = year
            .parse()
            .map_err(|_| format!("年份无效: {}", trimmed))?;
        let month: u32 = month
            .parse()
            .map_err(|_| format!("月份无效: {}", trimmed))?;
        YearMonth::new(year, month).ok_or_else(|| format!("月份超出范围: {}", trimmed))
    }
}
