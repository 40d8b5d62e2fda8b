// ==========================================
// 木工车间产量系统 - 日目标仓储
// ==========================================
// 职责: 每台机台一个标量日目标，存于 config_kv（key = target_<机台键>）
// 说明: 首次读取时写回机台默认值（惰性创建），不删除
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::machine::{MachineCatalog, MachineProfile};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

/// config_kv 中的目标键
pub fn target_key(machine: &str) -> String {
    format!("target_{}", machine)
}

pub struct TargetRepository {
    conn: Arc<Mutex<Connection>>,
}

impl TargetRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        crate::db::ensure_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取当前日目标；从未设置时写入并返回默认值
    pub fn get_or_init(&self, profile: &MachineProfile) -> RepositoryResult<i64> {
        let key = target_key(&profile.key);
        let conn = self.get_conn()?;

        let stored: Option<String> = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        match stored {
            Some(raw) => parse_target(&key, &raw),
            None => {
                conn.execute(
                    "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)",
                    params![key, profile.default_target.to_string()],
                )?;
                tracing::debug!("日目标初始化: {} = {}", key, profile.default_target);
                Ok(profile.default_target)
            }
        }
    }

    /// 写入日目标（UPSERT）
    pub fn set(&self, machine: &str, target: i64) -> RepositoryResult<()> {
        let key = target_key(machine);
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at)
             VALUES ('global', ?1, ?2, datetime('now'))
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, target.to_string()],
        )?;
        Ok(())
    }

    /// 全部机台的当前目标（按目录顺序）
    pub fn list(&self, catalog: &MachineCatalog) -> RepositoryResult<Vec<(String, i64)>> {
        catalog
            .machines()
            .iter()
            .map(|m| Ok((m.key.clone(), self.get_or_init(m)?)))
            .collect()
    }
}

fn parse_target(key: &str, raw: &str) -> RepositoryResult<i64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| v.trunc() as i64)
        .ok_or_else(|| RepositoryError::FieldValueError {
            field: key.to_string(),
            message: format!("日目标不是数字: {}", raw),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> TargetRepository {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::ensure_schema(&conn).unwrap();
        TargetRepository::from_connection(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn test_lazy_default_then_update() {
        let repo = repo();
        let catalog = MachineCatalog::default();
        let romani = catalog.get("Romani").unwrap();

        assert_eq!(repo.get_or_init(romani).unwrap(), 2500);
        repo.set("Romani", 3000).unwrap();
        assert_eq!(repo.get_or_init(romani).unwrap(), 3000);
    }

    #[test]
    fn test_list_targets() {
        let repo = repo();
        let catalog = MachineCatalog::default();
        repo.set("Giben", 650).unwrap();

        let targets = repo.list(&catalog).unwrap();
        assert_eq!(
            targets,
            vec![
                ("SCM".to_string(), 500),
                ("Giben".to_string(), 650),
                ("Romani".to_string(), 2500),
            ]
        );
    }

    #[test]
    fn test_parse_legacy_float_value() {
        assert_eq!(parse_target("target_SCM", "620.0").unwrap(), 620);
        assert!(parse_target("target_SCM", "abc").is_err());
    }
}
