// ==========================================
// 木工车间产量系统 - 机台领域模型
// ==========================================
// 职责: 机台静态配置（名称/单位/默认目标/提成资格/固定操作员）
// 红线: 会话期间只读
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// MachineProfile - 机台档案
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineProfile {
    pub key: String,            // 机台键（SCM / Giben / Romani）
    pub name: String,           // 显示名称（导出文件中使用）
    pub unit: String,           // 产量单位（Peças / Metros）
    pub rate_label: String,     // 时效标签（Peças/H）
    pub default_target: i64,    // 默认日目标
    pub is_commissionable: bool, // 是否计提成
    pub num_operators: usize,   // 提成均分人数
    pub operators: Vec<String>, // 固定操作员（可为空字符串）
}

impl MachineProfile {
    /// 指定槽位的默认操作员（不存在时为空）
    pub fn operator_at(&self, slot: usize) -> &str {
        self.operators.get(slot).map(String::as_str).unwrap_or("")
    }

    /// 表单预填的操作员列表，长度至少为 num_operators
    pub fn operator_slots(&self) -> Vec<String> {
        let len = self.num_operators.max(self.operators.len());
        (0..len).map(|i| self.operator_at(i).to_string()).collect()
    }
}

// ==========================================
// MachineCatalog - 机台目录
// ==========================================
// 顺序有意义: 第一台为默认机台
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MachineCatalog {
    machines: Vec<MachineProfile>,
}

impl MachineCatalog {
    pub fn new(machines: Vec<MachineProfile>) -> Result<Self, String> {
        if machines.is_empty() {
            return Err("机台目录不能为空".to_string());
        }
        for (idx, m) in machines.iter().enumerate() {
            if m.key.trim().is_empty() {
                return Err(format!("第 {} 台机台缺少 key", idx + 1));
            }
            if m.num_operators == 0 {
                return Err(format!("机台 {} 的 num_operators 必须大于 0", m.key));
            }
            if machines[..idx].iter().any(|other| other.key == m.key) {
                return Err(format!("机台 key 重复: {}", m.key));
            }
        }
        Ok(Self { machines })
    }

    pub fn machines(&self) -> &[MachineProfile] {
        &self.machines
    }

    pub fn keys(&self) -> Vec<&str> {
        self.machines.iter().map(|m| m.key.as_str()).collect()
    }

    pub fn first(&self) -> &MachineProfile {
        // new() 保证非空
        &self.machines[0]
    }

    pub fn get(&self, key: &str) -> Option<&MachineProfile> {
        self.machines.iter().find(|m| m.key == key)
    }

    /// 按显示名称反查机台
    pub fn find_by_name(&self, name: &str) -> Option<&MachineProfile> {
        let name = name.trim();
        self.machines.iter().find(|m| m.name == name)
    }

    /// 导入时的机台解析: 先按显示名称，再按 key（忽略大小写）
    pub fn resolve(&self, name_or_key: &str) -> Option<&MachineProfile> {
        let trimmed = name_or_key.trim();
        if trimmed.is_empty() {
            return None;
        }
        self.find_by_name(trimmed).or_else(|| {
            self.machines
                .iter()
                .find(|m| m.key.eq_ignore_ascii_case(trimmed))
        })
    }

    /// 记录中的显示名称（未知 key 原样返回）
    pub fn display_name<'a>(&'a self, key: &'a str) -> &'a str {
        self.get(key).map(|m| m.name.as_str()).unwrap_or(key)
    }
}

impl Default for MachineCatalog {
    fn default() -> Self {
        let saw = |key: &str, name: &str, operators: [&str; 2]| MachineProfile {
            key: key.to_string(),
            name: name.to_string(),
            unit: "Peças".to_string(),
            rate_label: "Peças/H".to_string(),
            default_target: 500,
            is_commissionable: true,
            num_operators: 2,
            operators: operators.iter().map(|s| s.to_string()).collect(),
        };

        Self {
            machines: vec![
                saw("SCM", "SCM (Seccionadora)", ["Dionei", "Alvaro"]),
                saw("Giben", "Giben (Seccionadora)", ["Davi", "Iago"]),
                MachineProfile {
                    key: "Romani".to_string(),
                    name: "Homag (Coladeira)".to_string(),
                    unit: "Metros".to_string(),
                    rate_label: "Metros/H".to_string(),
                    default_target: 2500,
                    is_commissionable: true,
                    num_operators: 2,
                    operators: vec![String::new(), String::new()],
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_order() {
        let catalog = MachineCatalog::default();
        assert_eq!(catalog.keys(), vec!["SCM", "Giben", "Romani"]);
        assert_eq!(catalog.first().key, "SCM");
    }

    #[test]
    fn test_resolve_by_name_then_key() {
        let catalog = MachineCatalog::default();
        assert_eq!(catalog.resolve("Homag (Coladeira)").unwrap().key, "Romani");
        assert_eq!(catalog.resolve("giben").unwrap().key, "Giben");
        assert!(catalog.resolve("Desconhecida").is_none());
        assert!(catalog.resolve("  ").is_none());
    }

    #[test]
    fn test_operator_slots_fill_empty() {
        let catalog = MachineCatalog::default();
        let romani = catalog.get("Romani").unwrap();
        assert_eq!(romani.operator_slots(), vec!["".to_string(), "".to_string()]);
        let scm = catalog.get("SCM").unwrap();
        assert_eq!(scm.operator_at(1), "Alvaro");
        assert_eq!(scm.operator_at(5), "");
    }

    #[test]
    fn test_catalog_validation() {
        assert!(MachineCatalog::new(vec![]).is_err());

        let mut dup = MachineCatalog::default().machines().to_vec();
        dup.push(dup[0].clone());
        assert!(MachineCatalog::new(dup).is_err());

        let mut zero = MachineCatalog::default().machines().to_vec();
        zero[0].num_operators = 0;
        assert!(MachineCatalog::new(zero).is_err());
    }

    #[test]
    fn test_display_name_unknown_key() {
        let catalog = MachineCatalog::default();
        assert_eq!(catalog.display_name("SCM"), "SCM (Seccionadora)");
        assert_eq!(catalog.display_name("XYZ"), "XYZ");
    }
}
