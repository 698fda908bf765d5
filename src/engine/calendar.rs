// ==========================================
// 机加工车间排产系统 - 日历可用性服务
// ==========================================
// 职责: 回答 "时刻 T 对资源 R 是否被阻塞" 与
//       "不早于 T 的下一个时长 D 的开放窗口"
// 红线: 窗口绝不跨边界拆分, 搜索单调前进且有界
// ==========================================

use chrono::{Duration, NaiveDateTime};
use tracing::trace;

use crate::config::settings::{ParsedSettings, CALENDAR_HORIZON_DAYS, MAX_SLOT_JUMPS};
use crate::domain::calendar::{Breakdown, ClockWindow, Holiday, Interval};
use crate::engine::error::{EngineError, EngineResult};

// ==========================================
// SlotKind - 开槽类型
// ==========================================
// 调机受全局调机窗口约束, 运行受生产窗口并集约束
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    Setup, // 调机
    Run,   // 运行
}

// ==========================================
// CalendarService - 日历服务
// ==========================================
#[derive(Debug, Clone)]
pub struct CalendarService {
    holidays: Vec<Holiday>,
    breakdowns: Vec<Breakdown>,
    setup_window: ClockWindow,
    production_windows: Vec<ClockWindow>,
}

impl CalendarService {
    pub fn new(settings: &ParsedSettings) -> Self {
        Self {
            holidays: settings.holidays.clone(),
            breakdowns: settings.breakdowns.clone(),
            setup_window: settings.setup_window.clone(),
            production_windows: settings.production_windows.clone(),
        }
    }

    // ==========================================
    // 分钟级阻塞判定
    // ==========================================

    /// 机床级阻塞: 假日全局阻塞, 故障仅阻塞清单内机床
    pub fn machine_open(&self, machine: &str, t: NaiveDateTime) -> bool {
        if self.holidays.iter().any(|h| h.contains(t)) {
            return false;
        }
        !self.breakdowns.iter().any(|b| b.blocks(machine, t))
    }

    /// 开槽分钟是否开放 (机床级阻塞 + 窗口约束 + 班次约束)
    pub fn minute_open(
        &self,
        kind: SlotKind,
        machine: &str,
        shift: Option<&ClockWindow>,
        t: NaiveDateTime,
    ) -> bool {
        if !self.machine_open(machine, t) {
            return false;
        }
        let in_window = match kind {
            SlotKind::Setup => self.setup_window.contains(t),
            SlotKind::Run => self.production_windows.iter().any(|w| w.contains(t)),
        };
        if !in_window {
            return false;
        }
        shift.map_or(true, |w| w.contains(t))
    }

    /// 资源在时刻 T 是否被阻塞
    pub fn is_blocked(
        &self,
        kind: SlotKind,
        machine: &str,
        shift: Option<&ClockWindow>,
        t: NaiveDateTime,
    ) -> bool {
        !self.minute_open(kind, machine, shift, t)
    }

    // ==========================================
    // 阻塞解除时刻推算
    // ==========================================

    /// 机床级阻塞解除后的最早候选时刻 (保证严格晚于 T)
    pub fn machine_reopen_after(&self, machine: &str, t: NaiveDateTime) -> NaiveDateTime {
        let mut candidate = t;
        for holiday in &self.holidays {
            if holiday.contains(t) && holiday.end > candidate {
                candidate = holiday.end;
            }
        }
        for breakdown in &self.breakdowns {
            if breakdown.blocks(machine, t) && breakdown.end > candidate {
                candidate = breakdown.end;
            }
        }
        if candidate <= t {
            candidate = t + Duration::minutes(1);
        }
        candidate
    }

    /// 开槽阻塞解除后的最早候选时刻 (保证严格晚于 T)
    ///
    /// 候选未必立即开放 (如调机窗口与班次窗口交错),
    /// 由外层循环重新判定并继续推进
    fn reopen_after(
        &self,
        kind: SlotKind,
        machine: &str,
        shift: Option<&ClockWindow>,
        t: NaiveDateTime,
    ) -> NaiveDateTime {
        let mut candidate = self.machine_reopen_after(machine, t);
        if candidate > t + Duration::minutes(1) {
            return candidate;
        }
        candidate = t;
        match kind {
            SlotKind::Setup => {
                if !self.setup_window.contains(t) {
                    candidate = candidate.max(self.setup_window.next_entry_after(t));
                }
            }
            SlotKind::Run => {
                if !self.production_windows.iter().any(|w| w.contains(t)) {
                    // 并集窗口: 取最早的下一次进入时刻
                    if let Some(next) = self
                        .production_windows
                        .iter()
                        .map(|w| w.next_entry_after(t))
                        .min()
                    {
                        candidate = candidate.max(next);
                    }
                }
            }
        }
        if let Some(window) = shift {
            if !window.contains(candidate) {
                candidate = candidate.max(window.next_entry_after(candidate));
            }
        }
        if candidate <= t {
            candidate = t + Duration::minutes(1);
        }
        candidate
    }

    /// 区间内首个被假日/故障阻塞的分钟 (机床级, 不含窗口约束)
    pub fn machine_block_within(&self, machine: &str, span: &Interval) -> Option<NaiveDateTime> {
        let mut t = span.start;
        while t < span.end {
            if !self.machine_open(machine, t) {
                return Some(t);
            }
            t += Duration::minutes(1);
        }
        None
    }

    /// 区间 [start, start+minutes) 内首个被阻塞的分钟
    fn first_blocked_within(
        &self,
        kind: SlotKind,
        machine: &str,
        shift: Option<&ClockWindow>,
        start: NaiveDateTime,
        minutes: i64,
    ) -> Option<NaiveDateTime> {
        let mut t = start;
        for _ in 0..minutes {
            if !self.minute_open(kind, machine, shift, t) {
                return Some(t);
            }
            t += Duration::minutes(1);
        }
        None
    }

    // ==========================================
    // 开槽搜索
    // ==========================================

    /// 不早于 earliest 的下一个连续开放窗口
    ///
    /// # 参数
    /// - `kind`: 调机或运行
    /// - `machine`: 目标机床
    /// - `shift`: 人员班次窗口 (仅强制班次时传入)
    /// - `earliest`: 最早起点
    /// - `minutes`: 所需连续时长
    ///
    /// # 返回
    /// 搜索超出地平线或跳跃上限时返回 CalendarExhausted
    pub fn next_open_slot(
        &self,
        kind: SlotKind,
        machine: &str,
        shift: Option<&ClockWindow>,
        earliest: NaiveDateTime,
        minutes: i64,
    ) -> EngineResult<Interval> {
        let horizon = earliest + Duration::days(CALENDAR_HORIZON_DAYS);
        let mut cursor = earliest;

        for _ in 0..MAX_SLOT_JUMPS {
            if cursor >= horizon {
                break;
            }
            if !self.minute_open(kind, machine, shift, cursor) {
                cursor = self.reopen_after(kind, machine, shift, cursor);
                continue;
            }
            match self.first_blocked_within(kind, machine, shift, cursor, minutes) {
                None => {
                    trace!(machine, ?kind, %cursor, minutes, "开槽命中");
                    return Ok(Interval::from_minutes(cursor, minutes));
                }
                Some(blocked_at) => {
                    // 窗口不跨边界拆分: 整体推到阻塞解除之后
                    let resume = self.reopen_after(kind, machine, shift, blocked_at);
                    cursor = resume.max(cursor + Duration::minutes(1));
                }
            }
        }

        Err(EngineError::CalendarExhausted {
            resource: format!("{} ({:?}, {}分钟)", machine, kind, minutes),
        })
    }
}
