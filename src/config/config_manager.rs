// ==========================================
// 木工车间产量系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::machine::{MachineCatalog, MachineProfile};
use crate::domain::types::UnknownMachinePolicy;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::json;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例（会确保 schema 存在）
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        crate::db::ensure_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let conn_guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取 global scope 的配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at)
             VALUES ('global', ?1, ?2, datetime('now'))
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> RepositoryResult<String> {
        Ok(self
            .get_global_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    // ===== 机台目录 =====

    /// 获取机台目录
    ///
    /// # 说明
    /// 配置格式为 JSON 数组（MachineProfile 列表）。
    /// 未配置时返回内置目录（SCM / Giben / Romani）。
    pub fn get_machine_catalog(&self) -> RepositoryResult<MachineCatalog> {
        match self.get_global_config_value(config_keys::MACHINE_CATALOG)? {
            None => Ok(MachineCatalog::default()),
            Some(raw) => {
                let machines: Vec<MachineProfile> = serde_json::from_str(&raw)?;
                MachineCatalog::new(machines).map_err(|message| RepositoryError::FieldValueError {
                    field: config_keys::MACHINE_CATALOG.to_string(),
                    message,
                })
            }
        }
    }

    /// 覆写机台目录
    pub fn set_machine_catalog(&self, catalog: &MachineCatalog) -> RepositoryResult<()> {
        let raw = serde_json::to_string(catalog.machines())?;
        self.set_global_config_value(config_keys::MACHINE_CATALOG, &raw)
    }

    // ===== 导入导出 =====

    /// 导出目录（默认当前目录）
    pub fn get_export_dir(&self) -> RepositoryResult<PathBuf> {
        let raw = self.get_config_or_default(config_keys::EXPORT_DIR, ".")?;
        Ok(PathBuf::from(raw.trim()))
    }

    /// 未知机台名称的导入策略（默认 SKIP）
    pub fn get_unknown_machine_policy(&self) -> RepositoryResult<UnknownMachinePolicy> {
        match self.get_global_config_value(config_keys::UNKNOWN_MACHINE_POLICY)? {
            None => Ok(UnknownMachinePolicy::default()),
            Some(raw) => raw
                .parse()
                .map_err(|message| RepositoryError::FieldValueError {
                    field: config_keys::UNKNOWN_MACHINE_POLICY.to_string(),
                    message,
                }),
        }
    }

    // ===== 界面 =====

    /// 提示语言（默认 pt-BR）
    pub fn get_locale(&self) -> RepositoryResult<String> {
        self.get_config_or_default(config_keys::LOCALE, "pt-BR")
    }

    // ===== 快照 =====

    /// 获取所有 global 配置的快照（JSON格式）
    pub fn get_config_snapshot(&self) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let mut config_map: HashMap<String, String> = HashMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }

    /// 从配置快照恢复配置
    ///
    /// # 返回
    /// - Ok(usize): 恢复的配置项数量
    ///
    /// # 注意
    /// - 此方法会覆盖现有的同名 global 配置
    pub fn restore_config_from_snapshot(&self, snapshot_json: &str) -> RepositoryResult<usize> {
        let config_map: HashMap<String, String> = serde_json::from_str(snapshot_json)?;

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let mut count = 0;
        for (key, value) in config_map.iter() {
            count += tx.execute(
                "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
                 ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
                params![key, value],
            )?;
        }

        tx.commit()?;
        Ok(count)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 机台目录 (JSON)
    pub const MACHINE_CATALOG: &str = "machine_catalog";

    // 导出目录
    pub const EXPORT_DIR: &str = "export.dir";

    // 导入: 未知机台策略 (SKIP / FALLBACK_TO_FIRST)
    pub const UNKNOWN_MACHINE_POLICY: &str = "import.unknown_machine_policy";

    // 提示语言
    pub const LOCALE: &str = "ui.locale";
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::ensure_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cm = manager();
        assert_eq!(cm.get_machine_catalog().unwrap(), MachineCatalog::default());
        assert_eq!(cm.get_export_dir().unwrap(), PathBuf::from("."));
        assert_eq!(
            cm.get_unknown_machine_policy().unwrap(),
            UnknownMachinePolicy::Skip
        );
        assert_eq!(cm.get_locale().unwrap(), "pt-BR");
    }

    #[test]
    fn test_machine_catalog_roundtrip() {
        let cm = manager();
        let mut machines = MachineCatalog::default().machines().to_vec();
        machines[2].is_commissionable = false;
        let catalog = MachineCatalog::new(machines).unwrap();

        cm.set_machine_catalog(&catalog).unwrap();
        let loaded = cm.get_machine_catalog().unwrap();
        assert!(!loaded.get("Romani").unwrap().is_commissionable);
    }

    #[test]
    fn test_invalid_catalog_rejected() {
        let cm = manager();
        cm.set_global_config_value(config_keys::MACHINE_CATALOG, "[]")
            .unwrap();
        assert!(cm.get_machine_catalog().is_err());
    }

    #[test]
    fn test_snapshot_restore() {
        let cm = manager();
        cm.set_global_config_value(config_keys::EXPORT_DIR, "/tmp/exports")
            .unwrap();
        let snapshot = cm.get_config_snapshot().unwrap();

        cm.set_global_config_value(config_keys::EXPORT_DIR, "/elsewhere")
            .unwrap();
        assert_eq!(cm.restore_config_from_snapshot(&snapshot).unwrap(), 1);
        assert_eq!(cm.get_export_dir().unwrap(), PathBuf::from("/tmp/exports"));
    }
}
