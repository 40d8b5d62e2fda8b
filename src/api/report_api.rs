// ==========================================
// 木工车间产量系统 - 看板/报表 API
// ==========================================
// 职责: 组合引擎与仓储，产出只读视图模型
// 红线: 只读，不修改记录与目标
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::api::notice::Notice;
use crate::api::target_api::TargetApi;
use crate::domain::machine::{MachineCatalog, MachineProfile};
use crate::domain::report::{ChartSeries, CommissionReport, DashboardRow, MonthOption};
use crate::domain::types::YearMonth;
use crate::engine::Aggregator;
use crate::i18n::t;
use crate::repository::RecordStore;

/// 单台机台看板
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineDashboard {
    pub profile: MachineProfile,
    pub target: i64,
    pub chart: ChartSeries,
    pub rows: Vec<DashboardRow>,
}

pub struct ReportApi {
    catalog: Arc<MachineCatalog>,
    target_api: Arc<TargetApi>,
    aggregator: Aggregator,
}

impl ReportApi {
    pub fn new(catalog: Arc<MachineCatalog>, target_api: Arc<TargetApi>) -> Self {
        Self {
            catalog,
            target_api,
            aggregator: Aggregator::new(),
        }
    }

    fn profile(&self, machine: &str) -> ApiResult<&MachineProfile> {
        self.catalog
            .get(machine)
            .ok_or_else(|| ApiError::UnknownMachine(machine.to_string()))
    }

    /// 机台看板: 当前目标 + 按日产量序列 + 记录行（达成率按当前目标）
    pub fn dashboard(&self, store: &RecordStore, machine: &str) -> ApiResult<MachineDashboard> {
        let profile = self.profile(machine)?;
        let target = self.target_api.current_target(&profile.key)?;

        Ok(MachineDashboard {
            profile: profile.clone(),
            target,
            chart: self.aggregator.chart_series(store.all(), profile),
            rows: self.aggregator.dashboard_rows(store.all(), &profile.key, target),
        })
    }

    /// 按日产量序列
    pub fn chart(&self, store: &RecordStore, machine: &str) -> ApiResult<ChartSeries> {
        let profile = self.profile(machine)?;
        Ok(self.aggregator.chart_series(store.all(), profile))
    }

    /// 提成报表
    ///
    /// # 参数
    /// - month: None = 全部月份（累计）
    pub fn commission_report(
        &self,
        store: &RecordStore,
        machine: &str,
        month: Option<YearMonth>,
    ) -> ApiResult<CommissionReport> {
        let profile = self.profile(machine)?;
        Ok(self
            .aggregator
            .commission_report(store.all(), profile, month))
    }

    /// 报表无明细时的说明（不计提成机台 / 所选月份无提成记录）
    pub fn report_notice(&self, report: &CommissionReport) -> Option<Notice> {
        if !report.is_commissionable {
            let name = self.catalog.display_name(&report.machine);
            return Some(Notice::info(
                "report.not_commissionable",
                &[("machine", name)],
            ));
        }
        if report.is_empty() {
            let month = report
                .month
                .map(|m| m.label())
                .unwrap_or_else(|| t("common.all_months"));
            return Some(Notice::info("report.empty", &[("month", month.as_str())]));
        }
        None
    }

    /// 月份筛选项（"全部月份" 在前，其余新在前）
    pub fn month_options(&self, store: &RecordStore) -> Vec<MonthOption> {
        let mut options = vec![MonthOption {
            value: None,
            label: t("common.all_months"),
        }];
        options.extend(
            self.aggregator
                .available_months(store.all())
                .into_iter()
                .map(|m| MonthOption {
                    value: Some(m),
                    label: m.label(),
                }),
        );
        options
    }

    /// 记录中出现过的月份（新在前）
    pub fn available_months(&self, store: &RecordStore) -> Vec<YearMonth> {
        self.aggregator.available_months(store.all())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::production::ProductionRecord;
    use crate::i18n::{set_locale, tests::LOCALE_TEST_LOCK};
    use crate::repository::TargetRepository;
    use chrono::{NaiveDate, TimeZone, Utc};
    use rusqlite::Connection;
    use std::sync::Mutex;

    fn api() -> ReportApi {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::ensure_schema(&conn).unwrap();
        let repo = Arc::new(TargetRepository::from_connection(Arc::new(Mutex::new(conn))));
        let catalog = Arc::new(MachineCatalog::default());
        let target_api = Arc::new(TargetApi::new(catalog.clone(), repo));
        ReportApi::new(catalog, target_api)
    }

    fn record(id: &str, y: i32, m: u32, d: u32, output: i64) -> ProductionRecord {
        ProductionRecord {
            id: id.to_string(),
            machine: "SCM".to_string(),
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            operators: vec!["Dionei".to_string(), "Alvaro".to_string()],
            hours: 10.0,
            output,
            output_per_hour: output as f64 / 10.0,
            percent_of_target: None,
            commission_units: (output - 500).max(0),
            total_commission_cents: (output - 500).max(0),
            created_at: Utc.with_ymd_and_hms(y, m, d, 18, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_month_options() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("pt-BR");

        let store = RecordStore::from_records(vec![
            record("a", 2024, 4, 30, 600),
            record("b", 2024, 5, 2, 700),
            record("c", 2024, 5, 3, 400),
        ]);
        let options = api().month_options(&store);
        let labels: Vec<&str> = options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["Todos os Meses (Acumulado)", "Maio/2024", "Abril/2024"]);
        assert_eq!(options[0].value, None);
    }

    #[test]
    fn test_dashboard_uses_current_target() {
        let api = api();
        let store = RecordStore::from_records(vec![record("a", 2024, 5, 2, 650)]);

        let view = api.dashboard(&store, "SCM").unwrap();
        assert_eq!(view.target, 500);
        assert_eq!(view.rows[0].percent_of_target, Some(130.0));
        assert!(view.rows[0].meets_target);
        assert_eq!(view.chart.total_output(), 650);

        api.target_api.update_target("SCM", "1300").unwrap();
        let view = api.dashboard(&store, "SCM").unwrap();
        assert_eq!(view.rows[0].percent_of_target, Some(50.0));
        assert!(!view.rows[0].meets_target);
        // 提成冻结，不随目标变化
        assert_eq!(view.rows[0].commission_units, 150);
    }

    #[test]
    fn test_commission_report_by_month() {
        let api = api();
        let store = RecordStore::from_records(vec![
            record("a", 2024, 4, 30, 600),
            record("b", 2024, 5, 2, 700),
        ]);

        let all = api.commission_report(&store, "SCM", None).unwrap();
        assert_eq!(all.record_count, 2);
        assert!((all.total_commission - 3.0).abs() < 1e-9);

        let may = api
            .commission_report(&store, "SCM", YearMonth::new(2024, 5))
            .unwrap();
        assert_eq!(may.record_count, 1);
        assert!((may.total_commission - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_report_notice_explains_missing_rows() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("pt-BR");
        let api = api();
        let store = RecordStore::from_records(vec![record("a", 2024, 5, 2, 700)]);

        let june = api
            .commission_report(&store, "SCM", YearMonth::new(2024, 6))
            .unwrap();
        let notice = api.report_notice(&june).expect("empty report explained");
        assert_eq!(
            notice.message,
            "Nenhum registro comissionável encontrado para esta máquina em Junho/2024."
        );

        let may = api
            .commission_report(&store, "SCM", YearMonth::new(2024, 5))
            .unwrap();
        assert_eq!(api.report_notice(&may), None);
    }

    #[test]
    fn test_report_notice_for_non_commissionable_machine() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("pt-BR");

        let mut machines = MachineCatalog::default().machines().to_vec();
        for profile in machines.iter_mut().filter(|p| p.key == "Romani") {
            profile.is_commissionable = false;
        }
        let catalog = Arc::new(MachineCatalog::new(machines).unwrap());
        let conn = Connection::open_in_memory().unwrap();
        crate::db::ensure_schema(&conn).unwrap();
        let repo = Arc::new(TargetRepository::from_connection(Arc::new(Mutex::new(conn))));
        let api = ReportApi::new(catalog.clone(), Arc::new(TargetApi::new(catalog, repo)));

        let report = api
            .commission_report(&RecordStore::new(), "Romani", None)
            .unwrap();
        let notice = api.report_notice(&report).expect("non-commissionable explained");
        assert_eq!(
            notice.message,
            "A máquina Homag (Coladeira) não paga comissão por unidade bônus."
        );
    }
}
