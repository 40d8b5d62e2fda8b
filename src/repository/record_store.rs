// ==========================================
// 木工车间产量系统 - 生产记录内存仓储
// ==========================================
// 职责: 会话内唯一事实来源（有序列表）
// 说明: 不落库；持久化由导出表格文件完成
// ==========================================

use crate::domain::production::ProductionRecord;
use crate::repository::error::{RepositoryError, RepositoryResult};
use serde::Serialize;

#[derive(Debug, Default, Clone, Serialize)]
pub struct RecordStore {
    records: Vec<ProductionRecord>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<ProductionRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 全部记录（保持插入顺序）
    pub fn all(&self) -> &[ProductionRecord] {
        &self.records
    }

    pub fn find(&self, id: &str) -> Option<&ProductionRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// 追加记录（ID 必须唯一）
    pub fn insert(&mut self, record: ProductionRecord) -> RepositoryResult<()> {
        if self.find(&record.id).is_some() {
            return Err(RepositoryError::UniqueConstraintViolation(format!(
                "ProductionRecord id={} 已存在",
                record.id
            )));
        }
        self.records.push(record);
        Ok(())
    }

    /// 按 ID 删除，仅删除一条，其余记录不变
    pub fn delete(&mut self, id: &str) -> RepositoryResult<ProductionRecord> {
        let pos = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "ProductionRecord".to_string(),
                id: id.to_string(),
            })?;
        Ok(self.records.remove(pos))
    }

    /// 回填某机台记录的目标达成率（按当前目标）
    ///
    /// 返回回填的记录数
    pub fn backfill_percent_of_target(&mut self, machine: &str, current_target: i64) -> usize {
        let mut count = 0;
        for record in self.records.iter_mut().filter(|r| r.machine == machine) {
            record.percent_of_target =
                crate::engine::commission::percent_of_target(record.output, current_target);
            count += 1;
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn record(id: &str, machine: &str, output: i64) -> ProductionRecord {
        ProductionRecord {
            id: id.to_string(),
            machine: machine.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            operators: vec!["A".to_string(), "B".to_string()],
            hours: 8.0,
            output,
            output_per_hour: output as f64 / 8.0,
            percent_of_target: None,
            commission_units: 0,
            total_commission_cents: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_delete_removes_exactly_one() {
        let mut store = RecordStore::from_records(vec![
            record("a", "SCM", 100),
            record("b", "SCM", 200),
            record("c", "Giben", 300),
        ]);
        let before: Vec<ProductionRecord> = store
            .all()
            .iter()
            .filter(|r| r.id != "b")
            .cloned()
            .collect();

        let removed = store.delete("b").unwrap();
        assert_eq!(removed.id, "b");
        assert_eq!(store.len(), 2);
        assert_eq!(store.all(), before.as_slice());
    }

    #[test]
    fn test_delete_not_found() {
        let mut store = RecordStore::from_records(vec![record("a", "SCM", 100)]);
        let err = store.delete("zzz").unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_insert_rejects_duplicate_id() {
        let mut store = RecordStore::new();
        store.insert(record("a", "SCM", 100)).unwrap();
        assert!(store.insert(record("a", "SCM", 100)).is_err());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_backfill_only_touches_machine() {
        let mut store =
            RecordStore::from_records(vec![record("a", "SCM", 250), record("b", "Giben", 250)]);
        assert_eq!(store.backfill_percent_of_target("SCM", 500), 1);
        assert_eq!(store.find("a").unwrap().percent_of_target, Some(50.0));
        assert_eq!(store.find("b").unwrap().percent_of_target, None);
    }
}
