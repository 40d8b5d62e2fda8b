// ==========================================
// 木工车间产量系统 - 报表/看板读模型
// ==========================================
// 用途: 聚合引擎输出，API 层直接返回给展示层
// ==========================================

use crate::domain::types::YearMonth;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// ChartSeries - 日产量趋势
// ==========================================
// dates 与 outputs 等长、一一对应，按日历升序
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub machine: String,
    pub unit: String,
    pub dates: Vec<NaiveDate>,
    pub outputs: Vec<i64>,
}

impl ChartSeries {
    pub fn total_output(&self) -> i64 {
        self.outputs.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

// ==========================================
// OperatorCommission - 操作员提成汇总行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorCommission {
    pub operator: String,
    pub total_commission: f64,
    pub is_unnamed: bool, // 未命名槽位的占位标签
}

// ==========================================
// CommissionReport - 提成报表
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommissionReport {
    pub machine: String,
    pub month: Option<YearMonth>, // None = 全部月份
    pub is_commissionable: bool,
    pub record_count: usize,
    pub total_commission: f64,
    pub operators: Vec<OperatorCommission>,
}

impl CommissionReport {
    /// 不计提成机台的空报表
    pub fn not_commissionable(machine: &str, month: Option<YearMonth>) -> Self {
        Self {
            machine: machine.to_string(),
            month,
            is_commissionable: false,
            record_count: 0,
            total_commission: 0.0,
            operators: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    /// 各操作员分摊额之和
    pub fn distributed_total(&self) -> f64 {
        self.operators.iter().map(|o| o.total_commission).sum()
    }
}

// ==========================================
// MonthOption - 月份筛选项
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthOption {
    pub value: Option<YearMonth>, // None = 全部月份（累计）
    pub label: String,
}

// ==========================================
// DashboardRow - 看板记录行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardRow {
    pub id: String,
    pub date: NaiveDate,
    pub output: i64,
    pub operators: Vec<String>,
    pub commission_units: i64,
    pub total_commission: f64,
    pub percent_of_target: Option<f64>, // 按当前目标实时计算
    pub meets_target: bool,
}
