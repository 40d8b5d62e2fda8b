// ==========================================
// 日目标持久化集成测试
// ==========================================
// 测试目标: 日目标惰性创建、跨会话保留、非法值不落库
// ==========================================


use production_tracker::config::{config_keys, ConfigManager};
use production_tracker::domain::{MachineCatalog, UnknownMachinePolicy};
use production_tracker::repository::{target_repo::target_key, TargetRepository};
use test_helpers::create_test_db;

#[test]
fn test_default_target_written_back_on_first_read() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let catalog = MachineCatalog::default();
    let config = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");

    assert_eq!(
        config.get_global_config_value(&target_key("SCM")).unwrap(),
        None
    );

    let repo = TargetRepository::new(&db_path).expect("Failed to create TargetRepository");
    let scm = catalog.get("SCM").unwrap();
    assert_eq!(repo.get_or_init(scm).unwrap(), 500);

    assert_eq!(
        config.get_global_config_value("target_SCM").unwrap(),
        Some("500".to_string())
    );
}

#[test]
fn test_target_survives_new_session() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let catalog = MachineCatalog::default();

    {
        let repo = TargetRepository::new(&db_path).expect("Failed to create TargetRepository");
        repo.set("Romani", 3000).unwrap();
    }

    let repo = TargetRepository::new(&db_path).expect("Failed to create TargetRepository");
    let targets = repo.list(&catalog).unwrap();
    assert_eq!(
        targets,
        vec![
            ("SCM".to_string(), 500),
            ("Giben".to_string(), 500),
            ("Romani".to_string(), 3000),
        ]
    );
}

#[test]
fn test_invalid_target_rejected_without_write() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");

    let env_state =
        production_tracker::app::AppState::new(db_path.clone()).expect("Failed to create AppState");
    env_state.target_api.update_target("Giben", "650").unwrap();
    assert!(env_state.target_api.update_target("Giben", "abc").is_err());
    assert!(env_state.target_api.update_target("Giben", "5").is_err());
    assert_eq!(env_state.target_api.current_target("Giben").unwrap(), 650);
}

#[test]
fn test_config_overrides_catalog_and_policy() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");

    config
        .set_global_config_value(config_keys::UNKNOWN_MACHINE_POLICY, "FALLBACK_TO_FIRST")
        .unwrap();
    assert_eq!(
        config.get_unknown_machine_policy().unwrap(),
        UnknownMachinePolicy::FallbackToFirst
    );

    config
        .set_global_config_value(
            config_keys::MACHINE_CATALOG,
            r#"[{"key":"Serra","name":"Serra Circular","unit":"Peças","rate_label":"Peças/H",
                 "default_target":300,"is_commissionable":false,"num_operators":1,"operators":["Ana"]}]"#,
        )
        .unwrap();

    let state = production_tracker::app::AppState::new(db_path).expect("Failed to create AppState");
    assert_eq!(state.catalog.keys(), vec!["Serra"]);
    assert_eq!(state.session.current_machine, "Serra");
    assert_eq!(state.target_api.current_target("Serra").unwrap(), 300);
}
