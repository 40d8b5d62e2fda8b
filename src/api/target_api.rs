// ==========================================
// 木工车间产量系统 - 日目标 API
// ==========================================
// 职责: 读取/更新机台日目标，按当前目标回填达成率
// ==========================================

use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::api::notice::Notice;
use crate::api::validator::parse_target;
use crate::domain::machine::{MachineCatalog, MachineProfile};
use crate::repository::{RecordStore, TargetRepository};

pub struct TargetApi {
    catalog: Arc<MachineCatalog>,
    target_repo: Arc<TargetRepository>,
}

impl TargetApi {
    pub fn new(catalog: Arc<MachineCatalog>, target_repo: Arc<TargetRepository>) -> Self {
        Self {
            catalog,
            target_repo,
        }
    }

    fn profile(&self, machine: &str) -> ApiResult<&MachineProfile> {
        self.catalog
            .get(machine)
            .ok_or_else(|| ApiError::UnknownMachine(machine.to_string()))
    }

    /// 当前日目标（首次读取时写入默认值）
    pub fn current_target(&self, machine: &str) -> ApiResult<i64> {
        let profile = self.profile(machine)?;
        Ok(self.target_repo.get_or_init(profile)?)
    }

    /// 全部机台的日目标（按目录顺序）
    pub fn list_targets(&self) -> ApiResult<Vec<(String, i64)>> {
        Ok(self.target_repo.list(&self.catalog)?)
    }

    /// 更新日目标
    ///
    /// # 参数
    /// - machine: 机台键
    /// - raw_value: 用户输入（整数，>= 10）
    ///
    /// # 说明
    /// 已有记录的提成不变；达成率在下次展示时按新目标重算
    pub fn update_target(&self, machine: &str, raw_value: &str) -> ApiResult<Notice> {
        let profile = self.profile(machine)?;
        let target = parse_target(raw_value)?;

        self.target_repo.set(&profile.key, target)?;
        tracing::info!(machine = %profile.key, target, "日目标已更新");

        Ok(Notice::success(
            "target.updated",
            &[("machine", profile.name.as_str()), ("target", target.to_string().as_str())],
        ))
    }

    /// 按各机台当前目标回填记录的达成率
    pub fn backfill_percent(&self, store: &mut RecordStore) -> ApiResult<usize> {
        let mut count = 0;
        for profile in self.catalog.machines() {
            let target = self.target_repo.get_or_init(profile)?;
            count += store.backfill_percent_of_target(&profile.key, target);
        }
        Ok(count)
    }
}
