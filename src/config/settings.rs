// ==========================================
// 机加工车间排产系统 - 排产设置
// ==========================================
// 红线: 宽松输入在边界处一次性校验, 进入引擎后全部为强类型
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::calendar::{Breakdown, ClockWindow, Holiday};
use crate::domain::personnel::{normalize_roster, Person};
use crate::domain::types::ProfileMode;
use crate::engine::error::{EngineError, EngineResult};

// ==========================================
// 命名常量
// ==========================================

/// 生产员回退容差缺省值 (分钟): 生产区块人员能在此容差内
/// 开工时, 优先于更早空闲的替补人员
pub const DEFAULT_FALLBACK_TOLERANCE_MIN: i64 = 30;

/// 同一人运行区间的并发上限 (double 操机模式)
pub const MAX_RUN_CONCURRENCY: usize = 2;

/// 机床-人员协商轮次上限, 超出即判 Blocked
pub const MAX_NEGOTIATION_ROUNDS: usize = 8;

/// 日历搜索地平线 (天), 超出即判 CalendarExhausted
pub const CALENDAR_HORIZON_DAYS: i64 = 45;

/// 单次开槽搜索的跳跃次数上限
pub const MAX_SLOT_JUMPS: usize = 20_000;

/// 缺省调机窗口
pub const DEFAULT_SETUP_WINDOW: &str = "06:00-22:00";

/// 缺省生产窗口 (全天开放)
pub const DEFAULT_PRODUCTION_WINDOW: &str = "00:00-00:00";

// ==========================================
// ScheduleSettings - 外部输入的排产设置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSettings {
    pub global_start_datetime: NaiveDateTime,   // 全局排产起点
    #[serde(default = "default_setup_window")]
    pub global_setup_window: String,            // 全局调机窗口
    #[serde(default)]
    pub shift_windows: Vec<String>,             // 班次窗口 (1~3 班)
    #[serde(default)]
    pub production_windows: Vec<String>,        // 生产窗口 (1~3 班)
    #[serde(default)]
    pub holidays: Vec<Holiday>,                 // 假日清单
    #[serde(default)]
    pub breakdowns: Vec<Breakdown>,             // 机床故障清单
    pub personnel_profiles: Vec<Person>,        // 人员花名册
    #[serde(default)]
    pub profile_mode: ProfileMode,              // 档案模式
    #[serde(default)]
    pub enforce_operator_shifts: bool,          // 是否强制人员班次
    #[serde(default = "default_fallback_tolerance")]
    pub fallback_tolerance_min: i64,            // 回退容差 (分钟)
}

fn default_setup_window() -> String {
    DEFAULT_SETUP_WINDOW.to_string()
}

fn default_fallback_tolerance() -> i64 {
    DEFAULT_FALLBACK_TOLERANCE_MIN
}

// ==========================================
// ParsedSettings - 校验后的强类型设置
// ==========================================
#[derive(Debug, Clone)]
pub struct ParsedSettings {
    pub global_start: NaiveDateTime,          // 全局排产起点
    pub setup_window: ClockWindow,            // 调机窗口
    pub shift_windows: Vec<ClockWindow>,      // 班次窗口
    pub production_windows: Vec<ClockWindow>, // 生产窗口
    pub holidays: Vec<Holiday>,               // 假日
    pub breakdowns: Vec<Breakdown>,           // 故障
    pub roster: Vec<Person>,                  // 归一化花名册
    pub profile_mode: ProfileMode,            // 档案模式
    pub enforce_operator_shifts: bool,        // 强制班次
    pub fallback_tolerance_min: i64,          // 回退容差
}

impl ScheduleSettings {
    /// 边界校验并解析为强类型设置
    ///
    /// # 返回
    /// 结构性非法输入 (窗口串错误/空花名册/负容差) 为致命错误,
    /// 中止整次排产
    pub fn validate_parse(&self) -> EngineResult<ParsedSettings> {
        let setup_window = ClockWindow::parse(&self.global_setup_window)
            .map_err(EngineError::InvalidSettings)?;

        let mut shift_windows = Vec::new();
        for raw in &self.shift_windows {
            shift_windows.push(ClockWindow::parse(raw).map_err(EngineError::InvalidSettings)?);
        }
        // 未配置班次时, 班次即调机窗口
        if shift_windows.is_empty() {
            shift_windows.push(setup_window.clone());
        }

        let mut production_windows = Vec::new();
        for raw in &self.production_windows {
            production_windows
                .push(ClockWindow::parse(raw).map_err(EngineError::InvalidSettings)?);
        }
        if production_windows.is_empty() {
            production_windows.push(
                ClockWindow::parse(DEFAULT_PRODUCTION_WINDOW)
                    .map_err(EngineError::InvalidSettings)?,
            );
        }

        for holiday in &self.holidays {
            if holiday.end <= holiday.start {
                return Err(EngineError::InvalidSettings(format!(
                    "假日区间无效: {} ~ {}",
                    holiday.start, holiday.end
                )));
            }
        }
        for breakdown in &self.breakdowns {
            if breakdown.end <= breakdown.start {
                return Err(EngineError::InvalidSettings(format!(
                    "故障区间无效: {} ~ {}",
                    breakdown.start, breakdown.end
                )));
            }
        }

        if self.personnel_profiles.is_empty() {
            return Err(EngineError::InvalidSettings("人员花名册为空".to_string()));
        }
        if self.fallback_tolerance_min < 0 {
            return Err(EngineError::InvalidSettings(format!(
                "回退容差为负: {}",
                self.fallback_tolerance_min
            )));
        }

        let roster = normalize_roster(&self.personnel_profiles);
        debug!(
            roster = roster.len(),
            shifts = shift_windows.len(),
            mode = %self.profile_mode,
            "排产设置校验通过"
        );

        Ok(ParsedSettings {
            global_start: self.global_start_datetime,
            setup_window,
            shift_windows,
            production_windows,
            holidays: self.holidays.clone(),
            breakdowns: self.breakdowns.clone(),
            roster,
            profile_mode: self.profile_mode,
            enforce_operator_shifts: self.enforce_operator_shifts,
            fallback_tolerance_min: self.fallback_tolerance_min,
        })
    }
}

impl ParsedSettings {
    /// 按花名册序号轮转分配班次窗口
    pub fn shift_for_index(&self, index: usize) -> &ClockWindow {
        &self.shift_windows[index % self.shift_windows.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::SourceSection;
    use chrono::NaiveDate;

    fn base_settings() -> ScheduleSettings {
        ScheduleSettings {
            global_start_datetime: NaiveDate::from_ymd_opt(2026, 2, 20)
                .unwrap()
                .and_hms_opt(6, 0, 0)
                .unwrap(),
            global_setup_window: DEFAULT_SETUP_WINDOW.to_string(),
            shift_windows: vec![],
            production_windows: vec![],
            holidays: vec![],
            breakdowns: vec![],
            personnel_profiles: vec![Person::from_section(
                "P01",
                "王生产",
                SourceSection::Production,
                0,
            )],
            profile_mode: ProfileMode::Advanced,
            enforce_operator_shifts: false,
            fallback_tolerance_min: DEFAULT_FALLBACK_TOLERANCE_MIN,
        }
    }

    #[test]
    fn test_defaults_fill_windows() {
        let parsed = base_settings().validate_parse().unwrap();
        assert_eq!(parsed.shift_windows.len(), 1);
        assert_eq!(parsed.production_windows.len(), 1);
        assert_eq!(parsed.production_windows[0].raw, DEFAULT_PRODUCTION_WINDOW);
    }

    #[test]
    fn test_rejects_bad_window() {
        let mut settings = base_settings();
        settings.global_setup_window = "garbage".to_string();
        assert!(settings.validate_parse().is_err());
    }

    #[test]
    fn test_rejects_empty_roster() {
        let mut settings = base_settings();
        settings.personnel_profiles.clear();
        assert!(settings.validate_parse().is_err());
    }

    #[test]
    fn test_rejects_negative_tolerance() {
        let mut settings = base_settings();
        settings.fallback_tolerance_min = -1;
        assert!(settings.validate_parse().is_err());
    }

    #[test]
    fn test_shift_rotation() {
        let mut settings = base_settings();
        settings.shift_windows = vec!["06:00-14:00".to_string(), "14:00-22:00".to_string()];
        let parsed = settings.validate_parse().unwrap();
        assert_eq!(parsed.shift_for_index(0).raw, "06:00-14:00");
        assert_eq!(parsed.shift_for_index(1).raw, "14:00-22:00");
        assert_eq!(parsed.shift_for_index(2).raw, "06:00-14:00");
    }
}
