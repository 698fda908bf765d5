// ==========================================
// 机加工车间排产系统 - 机床分配器
// ==========================================
// 红线: 机床同一时刻只做一件事, 操机并发约束作用于人不作用于机床,
//       机床时间线为简单无重叠区间集
// ==========================================

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDateTime};
use tracing::debug;

use crate::config::settings::{CALENDAR_HORIZON_DAYS, MAX_SLOT_JUMPS};
use crate::domain::calendar::Interval;
use crate::engine::calendar::CalendarService;
use crate::engine::error::{EngineError, EngineResult};

/// 机床自然排序键: 数字后缀按数值比较 ("VMC 2" 先于 "VMC 10")
pub fn machine_sort_key(name: &str) -> (String, u64, String) {
    let trimmed = name.trim();
    let digit_start = trimmed
        .rfind(|c: char| !c.is_ascii_digit())
        .map(|i| i + 1)
        .unwrap_or(0);
    let (prefix, digits) = trimmed.split_at(digit_start);
    let number = digits.parse::<u64>().unwrap_or(u64::MAX);
    (prefix.trim().to_uppercase(), number, trimmed.to_string())
}

// ==========================================
// MachineAllocator - 机床分配器
// ==========================================
#[derive(Debug, Default)]
pub struct MachineAllocator {
    // 每台机床的已提交区间 (按起点有序)
    timelines: BTreeMap<String, Vec<Interval>>,
}

impl MachineAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 机床在时刻 T 之后 (含 T) 的下一个空闲时刻 (仅看已提交区间)
    pub fn next_free_after(&self, machine: &str, t: NaiveDateTime) -> NaiveDateTime {
        let mut cursor = t;
        if let Some(timeline) = self.timelines.get(machine) {
            for interval in timeline {
                if interval.contains(cursor) {
                    cursor = interval.end;
                }
            }
        }
        cursor
    }

    /// 区间与已提交预约的冲突检查, 返回最早的冲突解除时刻
    pub fn span_conflict(&self, machine: &str, span: &Interval) -> Option<NaiveDateTime> {
        self.timelines
            .get(machine)?
            .iter()
            .filter(|iv| iv.overlaps(span))
            .map(|iv| iv.end)
            .min()
    }

    /// 在候选机床集中找全局最早的可行 (机床, 区间) 对
    ///
    /// # 参数
    /// - `eligible`: 候选机床清单
    /// - `after`: 最早起点
    /// - `minutes`: 所需连续时长 (估算: 调机 + 运行)
    /// - `calendar`: 机床级阻塞判定 (假日/故障)
    ///
    /// # 返回
    /// 起点并列时按机床自然序取先者; 候选为空返回 NoEligibleMachine,
    /// 全部搜索超限返回 CalendarExhausted
    pub fn earliest_free(
        &self,
        eligible: &[String],
        after: NaiveDateTime,
        minutes: i64,
        calendar: &CalendarService,
    ) -> EngineResult<(String, Interval)> {
        if eligible.is_empty() {
            return Err(EngineError::NoEligibleMachine {
                detail: "候选机床清单为空".to_string(),
            });
        }

        let mut ordered: Vec<&String> = eligible.iter().collect();
        ordered.sort_by_key(|name| machine_sort_key(name));
        ordered.dedup();

        let mut best: Option<(String, Interval)> = None;
        for machine in ordered {
            if let Some(slot) = self.earliest_free_on(machine, after, minutes, calendar) {
                let better = match &best {
                    None => true,
                    // 自然序已保证并列时先到先得
                    Some((_, current)) => slot.start < current.start,
                };
                if better {
                    best = Some((machine.clone(), slot));
                }
            }
        }

        best.ok_or_else(|| EngineError::CalendarExhausted {
            resource: format!("机床候选集 {:?}", eligible),
        })
    }

    /// 单台机床上不早于 after 的首个时长 minutes 的可行区间
    fn earliest_free_on(
        &self,
        machine: &str,
        after: NaiveDateTime,
        minutes: i64,
        calendar: &CalendarService,
    ) -> Option<Interval> {
        let horizon = after + Duration::days(CALENDAR_HORIZON_DAYS);
        let mut cursor = after;

        for _ in 0..MAX_SLOT_JUMPS {
            cursor = self.next_free_after(machine, cursor);
            if cursor >= horizon {
                return None;
            }
            if !calendar.machine_open(machine, cursor) {
                cursor = calendar.machine_reopen_after(machine, cursor);
                continue;
            }
            let span = Interval::from_minutes(cursor, minutes);
            if let Some(resume) = self.span_conflict(machine, &span) {
                cursor = resume;
                continue;
            }
            if let Some(blocked_at) = calendar.machine_block_within(machine, &span) {
                cursor = calendar.machine_reopen_after(machine, blocked_at);
                continue;
            }
            return Some(span);
        }
        None
    }

    /// 提交机床预约 [调机开始, 运行结束]
    pub fn reserve(&mut self, machine: &str, span: Interval) {
        let timeline = self.timelines.entry(machine.to_string()).or_default();
        timeline.push(span);
        timeline.sort_by_key(|iv| iv.start);
        debug!(machine, span = %span, "机床预约已提交");
    }

    /// 某机床的已提交区间视图 (测试与校验用)
    pub fn timeline(&self, machine: &str) -> &[Interval] {
        self.timelines
            .get(machine)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::ScheduleSettings;
    use crate::domain::calendar::Breakdown;
    use crate::domain::personnel::Person;
    use crate::domain::types::{ProfileMode, SourceSection};
    use chrono::NaiveDate;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn create_test_calendar(breakdowns: Vec<Breakdown>) -> CalendarService {
        let settings = ScheduleSettings {
            global_start_datetime: NaiveDate::from_ymd_opt(2026, 2, 20)
                .unwrap()
                .and_hms_opt(6, 0, 0)
                .unwrap(),
            global_setup_window: "06:00-22:00".to_string(),
            shift_windows: vec![],
            production_windows: vec![],
            holidays: vec![],
            breakdowns,
            personnel_profiles: vec![Person::from_section(
                "P01",
                "王生产",
                SourceSection::Production,
                0,
            )],
            profile_mode: ProfileMode::Advanced,
            enforce_operator_shifts: false,
            fallback_tolerance_min: 30,
        };
        CalendarService::new(&settings.validate_parse().unwrap())
    }

    #[test]
    fn test_natural_machine_order() {
        let mut names = vec!["VMC 10", "VMC 2", "VMC 1"];
        names.sort_by_key(|n| machine_sort_key(n));
        assert_eq!(names, vec!["VMC 1", "VMC 2", "VMC 10"]);
    }

    #[test]
    fn test_earliest_free_prefers_lower_machine_on_tie() {
        let allocator = MachineAllocator::new();
        let calendar = create_test_calendar(vec![]);
        let eligible = vec!["VMC 2".to_string(), "VMC 1".to_string()];
        let (machine, slot) = allocator
            .earliest_free(&eligible, dt("2026-02-20 06:00"), 60, &calendar)
            .unwrap();
        assert_eq!(machine, "VMC 1");
        assert_eq!(slot.start, dt("2026-02-20 06:00"));
    }

    #[test]
    fn test_reservation_pushes_next_free() {
        let mut allocator = MachineAllocator::new();
        let calendar = create_test_calendar(vec![]);
        allocator.reserve(
            "VMC 1",
            Interval::new(dt("2026-02-20 06:00"), dt("2026-02-20 08:00")),
        );
        let eligible = vec!["VMC 1".to_string()];
        let (_, slot) = allocator
            .earliest_free(&eligible, dt("2026-02-20 06:00"), 60, &calendar)
            .unwrap();
        assert_eq!(slot.start, dt("2026-02-20 08:00"));
    }

    #[test]
    fn test_breakdown_machine_loses_to_healthy_one() {
        let allocator = MachineAllocator::new();
        let calendar = create_test_calendar(vec![Breakdown {
            machines: vec!["VMC 1".to_string()],
            start: dt("2026-02-20 06:00"),
            end: dt("2026-02-20 20:00"),
        }]);
        let eligible = vec!["VMC 1".to_string(), "VMC 2".to_string()];
        let (machine, slot) = allocator
            .earliest_free(&eligible, dt("2026-02-20 06:00"), 60, &calendar)
            .unwrap();
        assert_eq!(machine, "VMC 2");
        assert_eq!(slot.start, dt("2026-02-20 06:00"));
    }

    #[test]
    fn test_empty_eligible_set_is_error() {
        let allocator = MachineAllocator::new();
        let calendar = create_test_calendar(vec![]);
        let result = allocator.earliest_free(&[], dt("2026-02-20 06:00"), 60, &calendar);
        assert!(matches!(
            result,
            Err(EngineError::NoEligibleMachine { .. })
        ));
    }

    #[test]
    fn test_span_conflict_reports_resume_point() {
        let mut allocator = MachineAllocator::new();
        allocator.reserve(
            "VMC 1",
            Interval::new(dt("2026-02-20 07:00"), dt("2026-02-20 09:00")),
        );
        let span = Interval::new(dt("2026-02-20 06:30"), dt("2026-02-20 07:30"));
        assert_eq!(
            allocator.span_conflict("VMC 1", &span),
            Some(dt("2026-02-20 09:00"))
        );
        let clear = Interval::new(dt("2026-02-20 09:00"), dt("2026-02-20 10:00"));
        assert_eq!(allocator.span_conflict("VMC 1", &clear), None);
    }
}
