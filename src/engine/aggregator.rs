// ==========================================
// 木工车间产量系统 - 聚合引擎
// ==========================================
// 职责: 日产量趋势聚合 / 操作员提成汇总 / 月份筛选项 / 看板行
// 红线: 纯函数，每次状态变化全量重算，不做增量索引
// ==========================================

use crate::domain::machine::MachineProfile;
use crate::domain::production::ProductionRecord;
use crate::domain::report::{ChartSeries, CommissionReport, DashboardRow, OperatorCommission};
use crate::domain::types::{cents_to_currency, YearMonth};
use crate::engine::commission::percent_of_target;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use tracing::instrument;

/// 空操作员槽位的占位标签（槽位从 1 开始计数）
pub fn unnamed_operator_label(slot: usize) -> String {
    format!("Operador {} Não Nomeado", slot + 1)
}

// ==========================================
// Aggregator - 聚合引擎
// ==========================================
#[derive(Debug, Default, Clone, Copy)]
pub struct Aggregator;

impl Aggregator {
    pub fn new() -> Self {
        Self
    }

    // ==========================================
    // 日产量趋势
    // ==========================================

    /// 按日期汇总某机台产量，日期按日历升序
    #[instrument(skip(self, records, profile), fields(machine = %profile.key))]
    pub fn chart_series(&self, records: &[ProductionRecord], profile: &MachineProfile) -> ChartSeries {
        let mut per_day: BTreeMap<NaiveDate, i64> = BTreeMap::new();
        for record in records.iter().filter(|r| r.machine == profile.key) {
            *per_day.entry(record.date).or_insert(0) += record.output;
        }

        let (dates, outputs) = per_day.into_iter().unzip();
        ChartSeries {
            machine: profile.key.clone(),
            unit: profile.unit.clone(),
            dates,
            outputs,
        }
    }

    // ==========================================
    // 操作员提成汇总
    // ==========================================

    /// 按操作员汇总提成
    ///
    /// # 规则
    /// 1. 过滤机台，再按月份过滤（None = 全部）
    /// 2. 机台不计提成 → 空报表
    /// 3. 每条记录的提成按 num_operators 均分到各槽位
    /// 4. 空槽位用占位标签累计；占位项合计为 0 时不展示
    /// 5. 按名称字典序输出
    #[instrument(skip(self, records, profile), fields(machine = %profile.key))]
    pub fn commission_report(
        &self,
        records: &[ProductionRecord],
        profile: &MachineProfile,
        month: Option<YearMonth>,
    ) -> CommissionReport {
        let matched: Vec<&ProductionRecord> = records
            .iter()
            .filter(|r| r.machine == profile.key)
            .filter(|r| month.map_or(true, |m| m.contains(r.date)))
            .collect();

        if !profile.is_commissionable {
            return CommissionReport::not_commissionable(&profile.key, month);
        }

        let slots = profile.num_operators.max(1);
        let mut totals: BTreeMap<String, f64> = BTreeMap::new();

        for record in &matched {
            let share = record.total_commission() / slots as f64;
            for slot in 0..slots {
                let name = match record.operator(slot) {
                    "" => unnamed_operator_label(slot),
                    named => named.to_string(),
                };
                *totals.entry(name).or_insert(0.0) += share;
            }
        }

        let operators = totals
            .into_iter()
            .filter(|(name, total)| {
                !name.is_empty()
                    && name != "-"
                    && (*total > 0.0 || matched.iter().any(|r| r.names_operator(name)))
            })
            .map(|(name, total)| OperatorCommission {
                is_unnamed: !matched.iter().any(|r| r.names_operator(&name)),
                operator: name,
                total_commission: total,
            })
            .collect();

        let total_cents: i64 = matched.iter().map(|r| r.total_commission_cents).sum();

        CommissionReport {
            machine: profile.key.clone(),
            month,
            is_commissionable: true,
            record_count: matched.len(),
            total_commission: cents_to_currency(total_cents),
            operators,
        }
    }

    // ==========================================
    // 月份筛选项
    // ==========================================

    /// 全部记录中出现过的月份，新在前
    pub fn available_months(&self, records: &[ProductionRecord]) -> Vec<YearMonth> {
        let months: BTreeSet<YearMonth> = records.iter().map(ProductionRecord::month).collect();
        months.into_iter().rev().collect()
    }

    // ==========================================
    // 看板行
    // ==========================================

    /// 某机台记录（创建时间新在前），达成率按当前目标计算
    pub fn dashboard_rows(
        &self,
        records: &[ProductionRecord],
        machine: &str,
        current_target: i64,
    ) -> Vec<DashboardRow> {
        let mut rows: Vec<&ProductionRecord> =
            records.iter().filter(|r| r.machine == machine).collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        rows.into_iter()
            .map(|r| {
                let percent = percent_of_target(r.output, current_target);
                DashboardRow {
                    id: r.id.clone(),
                    date: r.date,
                    output: r.output,
                    operators: r.operators.clone(),
                    commission_units: r.commission_units,
                    total_commission: r.total_commission(),
                    percent_of_target: percent,
                    meets_target: percent.map_or(false, |p| p >= 100.0),
                }
            })
            .collect()
    }
}
