// ==========================================
// 木工车间产量系统 - 提成计算引擎
// ==========================================
// 规则: 仅超出日目标的产量计提成
//   commission_units = max(0, output - target)
//   total_commission = commission_units × 单价（1 分/单位）
// 红线: 不计提成机台两项提成恒为 0
// ==========================================

use crate::domain::machine::MachineProfile;
use crate::domain::types::COMMISSION_RATE_CENTS_PER_UNIT;
use serde::{Deserialize, Serialize};

// ==========================================
// CommissionBreakdown - 计算结果
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CommissionBreakdown {
    pub commission_units: i64,
    pub total_commission_cents: i64,
    pub output_per_hour: f64,
    pub percent_of_target: Option<f64>, // 目标 <= 0 时无定义
}

// ==========================================
// CommissionCalculator - 提成计算器（纯函数）
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct CommissionCalculator {
    rate_cents_per_unit: i64,
}

impl Default for CommissionCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl CommissionCalculator {
    pub fn new() -> Self {
        Self {
            rate_cents_per_unit: COMMISSION_RATE_CENTS_PER_UNIT,
        }
    }

    pub fn with_rate(rate_cents_per_unit: i64) -> Self {
        Self {
            rate_cents_per_unit,
        }
    }

    /// 计算单条产量的提成与派生指标
    ///
    /// # 参数
    /// - output: 产量（>= 0）
    /// - hours: 工时（调用方保证 > 0）
    /// - profile: 机台档案
    /// - target: 当前生效的日目标
    pub fn calculate(
        &self,
        output: i64,
        hours: f64,
        profile: &MachineProfile,
        target: i64,
    ) -> CommissionBreakdown {
        let (commission_units, total_commission_cents) = if profile.is_commissionable {
            let units = (output - target).max(0);
            (units, units * self.rate_cents_per_unit)
        } else {
            (0, 0)
        };

        CommissionBreakdown {
            commission_units,
            total_commission_cents,
            output_per_hour: output_per_hour(output, hours),
            percent_of_target: percent_of_target(output, target),
        }
    }
}

/// 时效 = 产量 / 工时（工时非正时为 0）
pub fn output_per_hour(output: i64, hours: f64) -> f64 {
    if hours > 0.0 {
        output as f64 / hours
    } else {
        0.0
    }
}

/// 目标达成率（%），目标非正时返回 None
pub fn percent_of_target(output: i64, target: i64) -> Option<f64> {
    if target <= 0 {
        return None;
    }
    Some(output as f64 / target as f64 * 100.0)
}
