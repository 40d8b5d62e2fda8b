// ==========================================
// 木工车间产量系统 - 生产记录领域模型
// ==========================================
// 红线: commission_units / total_commission_cents 于创建时按当时目标计算并冻结
// 红线: percent_of_target 不冻结，每次展示按当前目标重算
// ==========================================

use crate::domain::types::{cents_to_currency, YearMonth};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// ProductionEntry - 录入表单（已校验）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionEntry {
    pub machine: String,
    pub date: NaiveDate,
    pub output: i64,
    pub hours: f64,
    pub operators: Vec<String>,
}

// ==========================================
// ProductionRecord - 生产记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionRecord {
    // ===== 主键 =====
    pub id: String,

    // ===== 归属 =====
    pub machine: String,        // 机台键
    pub date: NaiveDate,        // 生产日期（无时间部分）
    pub operators: Vec<String>, // 操作员槽位，空字符串 = 未命名

    // ===== 产量 =====
    pub hours: f64,                      // 工时 (> 0)
    pub output: i64,                     // 产量 (>= 0)
    pub output_per_hour: f64,            // 时效（派生）
    pub percent_of_target: Option<f64>,  // 目标达成率（展示时回填）

    // ===== 提成（创建时冻结）=====
    pub commission_units: i64,
    pub total_commission_cents: i64,

    // ===== 审计 =====
    pub created_at: DateTime<Utc>, // 默认排序键（新在前）
}

impl ProductionRecord {
    /// 由录入表单创建记录（生成新 ID 与创建时间）
    pub fn from_entry(
        entry: ProductionEntry,
        output_per_hour: f64,
        percent_of_target: Option<f64>,
        commission_units: i64,
        total_commission_cents: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            machine: entry.machine,
            date: entry.date,
            operators: entry.operators,
            hours: entry.hours,
            output: entry.output,
            output_per_hour,
            percent_of_target,
            commission_units,
            total_commission_cents,
            created_at: Utc::now(),
        }
    }

    /// 提成总额（货币单位）
    pub fn total_commission(&self) -> f64 {
        cents_to_currency(self.total_commission_cents)
    }

    /// 指定槽位的操作员（越界视为空）
    pub fn operator(&self, slot: usize) -> &str {
        self.operators.get(slot).map(String::as_str).unwrap_or("")
    }

    /// 记录是否点名了某操作员
    pub fn names_operator(&self, name: &str) -> bool {
        self.operators.iter().any(|op| op == name)
    }

    pub fn month(&self) -> YearMonth {
        YearMonth::of(self.date)
    }
}
