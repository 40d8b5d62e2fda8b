// ==========================================
// 应用流程集成测试
// ==========================================
// 测试目标: 录入 → 自动导出 → 新会话加载 → 看板/报表
// ==========================================


use production_tracker::api::{ApiError, EntryForm};
use production_tracker::app::AppState;
use production_tracker::domain::YearMonth;
use test_helpers::create_test_env;

fn form(machine: &str, date: &str, output: &str, hours: &str, operators: &[&str]) -> EntryForm {
    EntryForm {
        machine: machine.to_string(),
        date: date.to_string(),
        output: output.to_string(),
        hours: hours.to_string(),
        operators: operators.iter().map(|s| s.to_string()).collect(),
    }
}

#[tokio::test]
async fn test_submit_export_and_reload() {
    let mut env = create_test_env().expect("Failed to create test env");
    let state = &mut env.state;

    let first = state
        .production_api
        .submit(&mut state.session.store, &form("SCM", "2024-05-10", "650", "10", &[]))
        .expect("submit should succeed");
    assert_eq!(first.record.commission_units, 150);
    assert_eq!(first.record.total_commission(), 1.5);

    let second = state
        .production_api
        .submit(
            &mut state.session.store,
            &form("Giben", "2024-05-11", "520", "8", &["Davi", "Iago"]),
        )
        .expect("submit should succeed");
    let exported = second.exported.expect("file should be exported");
    assert!(exported.starts_with(env.export_dir.path()));
    assert!(exported
        .file_name()
        .and_then(|n| n.to_str())
        .map_or(false, |n| n.starts_with("Producao_Atualizada_") && n.ends_with(".xlsx")));

    // 新会话从导出文件恢复
    let mut next = AppState::new(env.db_path.clone()).expect("Failed to create AppState");
    let outcome = next.load_file(&exported).await.expect("load should succeed");
    assert_eq!(outcome.report.loaded, 2);
    assert_eq!(next.session.store.len(), 2);

    let scm = next.session.store.find(&first.record.id).expect("record kept");
    assert_eq!(scm.commission_units, 150);
    assert_eq!(scm.percent_of_target, Some(130.0));
}

#[tokio::test]
async fn test_target_change_does_not_touch_frozen_commission() {
    let mut env = create_test_env().expect("Failed to create test env");
    let state = &mut env.state;

    state
        .production_api
        .submit(&mut state.session.store, &form("SCM", "2024-05-10", "650", "10", &[]))
        .expect("submit should succeed");

    state
        .target_api
        .update_target("SCM", "600")
        .expect("target update should succeed");

    let view = state
        .report_api
        .dashboard(&state.session.store, "SCM")
        .expect("dashboard should build");
    assert_eq!(view.target, 600);
    assert_eq!(view.rows[0].commission_units, 150);
    let percent = view.rows[0].percent_of_target.expect("percent defined");
    assert!((percent - 108.333).abs() < 0.001);

    // 新目标之后的录入按新目标计算
    let later = state
        .production_api
        .submit(&mut state.session.store, &form("SCM", "2024-05-11", "650", "10", &[]))
        .expect("submit should succeed");
    assert_eq!(later.record.commission_units, 50);
}

#[tokio::test]
async fn test_commission_report_splits_by_operator() {
    let mut env = create_test_env().expect("Failed to create test env");
    let state = &mut env.state;

    // 目标 500: 超产 200 → 2.00；超产 300 → 3.00
    state
        .production_api
        .submit(
            &mut state.session.store,
            &form("SCM", "2024-05-10", "700", "8", &["Alice", "Bob"]),
        )
        .expect("submit should succeed");
    state
        .production_api
        .submit(
            &mut state.session.store,
            &form("SCM", "2024-05-12", "800", "8", &["Alice", "Carol"]),
        )
        .expect("submit should succeed");

    let report = state
        .report_api
        .commission_report(&state.session.store, "SCM", YearMonth::new(2024, 5))
        .expect("report should build");

    let totals: Vec<(&str, f64)> = report
        .operators
        .iter()
        .map(|o| (o.operator.as_str(), o.total_commission))
        .collect();
    assert_eq!(totals.len(), 3);
    assert_eq!(totals[0].0, "Alice");
    assert!((totals[0].1 - 2.5).abs() < 1e-9);
    assert_eq!(totals[1].0, "Bob");
    assert!((totals[1].1 - 1.0).abs() < 1e-9);
    assert_eq!(totals[2].0, "Carol");
    assert!((totals[2].1 - 1.5).abs() < 1e-9);
    assert!((report.total_commission - 5.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_delete_resets_vanished_report_month() {
    let mut env = create_test_env().expect("Failed to create test env");
    let state = &mut env.state;

    state
        .production_api
        .submit(&mut state.session.store, &form("SCM", "2024-04-30", "600", "8", &[]))
        .expect("submit should succeed");
    let may = state
        .production_api
        .submit(&mut state.session.store, &form("SCM", "2024-05-02", "600", "8", &[]))
        .expect("submit should succeed");

    state.select_report_month(YearMonth::new(2024, 5));
    assert_eq!(state.session.report_month, YearMonth::new(2024, 5));

    state
        .production_api
        .delete(&mut state.session.store, &may.record.id)
        .expect("delete should succeed");
    state.sync_report_month();
    assert_eq!(state.session.report_month, None);
    assert_eq!(state.session.store.len(), 1);
}

#[tokio::test]
async fn test_invalid_form_changes_nothing() {
    let mut env = create_test_env().expect("Failed to create test env");
    let state = &mut env.state;

    let err = state
        .production_api
        .submit(&mut state.session.store, &form("SCM", "", "650", "10", &[]))
        .unwrap_err();
    assert!(matches!(err, ApiError::MissingDate));
    assert!(state.session.store.is_empty());
    assert!(std::fs::read_dir(env.export_dir.path())
        .expect("export dir readable")
        .next()
        .is_none());
}
