// ==========================================
// 机加工车间排产系统 - 人员领域模型
// ==========================================
// 资格派生规则:
//   调机资格 = 调机区块出身 或 level_up == 1
//   生产资格 = 生产区块出身 或 level_up == 1
//   调机优先级 = 1 (调机出身) / 2 (level_up 提级) / 99 (其余)
// ==========================================

use serde::{Deserialize, Serialize};

use crate::domain::types::SourceSection;

// 调机优先级常量
pub const SETUP_PRIORITY_NATIVE: i32 = 1; // 调机区块出身
pub const SETUP_PRIORITY_LEVEL_UP: i32 = 2; // level_up 提级
pub const SETUP_PRIORITY_NONE: i32 = 99; // 无调机资格

// ==========================================
// Person - 人员档案
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub uid: String,                   // 工号
    pub name: String,                  // 姓名
    pub source_section: SourceSection, // 来源区块
    #[serde(default)]
    pub level_up: i32,                 // 提级标志 (0/1)
    pub setup_eligible: bool,          // 调机资格
    pub production_eligible: bool,     // 生产资格
    pub setup_priority: i32,           // 调机优先级 (越小越优先)
}

impl Person {
    /// 从区块与提级标志派生完整档案
    pub fn from_section(uid: &str, name: &str, section: SourceSection, level_up: i32) -> Self {
        let setup_eligible = section == SourceSection::Setup || level_up == 1;
        let production_eligible = section == SourceSection::Production || level_up == 1;
        let setup_priority = if section == SourceSection::Setup {
            SETUP_PRIORITY_NATIVE
        } else if level_up == 1 {
            SETUP_PRIORITY_LEVEL_UP
        } else {
            SETUP_PRIORITY_NONE
        };
        Self {
            uid: uid.to_string(),
            name: name.to_string(),
            source_section: section,
            level_up,
            setup_eligible,
            production_eligible,
            setup_priority,
        }
    }
}

/// 花名册归一化: 按工号合并重复档案并做确定性排序
///
/// 合并规则: 资格取并集, 调机优先级取最小, 提级取最大,
/// 任一重复行来自调机区块则来源定为调机区块, 姓名保留首见值。
/// 排序: 调机优先级升序, 同级按姓名升序。
pub fn normalize_roster(raw: &[Person]) -> Vec<Person> {
    let mut merged: Vec<Person> = Vec::new();
    for person in raw {
        if let Some(existing) = merged.iter_mut().find(|p| p.uid == person.uid) {
            existing.setup_eligible = existing.setup_eligible || person.setup_eligible;
            existing.production_eligible =
                existing.production_eligible || person.production_eligible;
            existing.setup_priority = existing.setup_priority.min(person.setup_priority);
            existing.level_up = existing.level_up.max(person.level_up);
            if person.source_section == SourceSection::Setup {
                existing.source_section = SourceSection::Setup;
            }
        } else {
            merged.push(person.clone());
        }
    }
    merged.sort_by(|a, b| {
        a.setup_priority
            .cmp(&b.setup_priority)
            .then_with(|| a.name.cmp(&b.name))
    });
    merged
}
