// ==========================================
// 机加工车间排产系统 - 人员分配器
// ==========================================
// 每人维护两条独立时间线: 调机时间线与运行时间线,
// 且两条时间线之间不得自我重叠 (一个人不能边调机边看机)。
// 运行并发按容量单位计: single 占 2 单位, double 占 1 单位,
// 并发上限 MAX_RUN_CONCURRENCY (2) 单位。
// ==========================================

use std::cmp::Ordering;

use chrono::{Duration, NaiveDateTime};
use tracing::debug;

use crate::config::settings::{ParsedSettings, MAX_RUN_CONCURRENCY, MAX_SLOT_JUMPS};
use crate::domain::calendar::{ClockWindow, Interval};
use crate::domain::personnel::Person;
use crate::domain::types::{HandleMode, ProfileMode, SourceSection};
use crate::engine::calendar::{CalendarService, SlotKind};
use crate::engine::error::{EngineError, EngineResult};

/// 操机模式占用的容量单位
fn capacity_units(mode: HandleMode) -> usize {
    match mode {
        HandleMode::Single => MAX_RUN_CONCURRENCY,
        HandleMode::Double => 1,
    }
}

// ==========================================
// RunReservation - 运行预约
// ==========================================
#[derive(Debug, Clone)]
pub struct RunReservation {
    pub interval: Interval, // 运行区间
    pub units: usize,       // 占用容量单位
}

// ==========================================
// PersonState - 人员运行时状态
// ==========================================
#[derive(Debug, Clone)]
pub struct PersonState {
    pub profile: Person,                    // 档案
    pub shift: ClockWindow,                 // 分配班次
    pub setup_timeline: Vec<Interval>,      // 调机时间线
    pub run_timeline: Vec<RunReservation>,  // 运行时间线
    pub setup_minutes: i64,                 // 已承担调机分钟数
    pub run_minutes: i64,                   // 已承担运行分钟数
}

// ==========================================
// PersonChoice - 选人结果
// ==========================================
#[derive(Debug, Clone)]
pub struct PersonChoice {
    pub person_index: usize, // 花名册下标
    pub name: String,        // 姓名
    pub interval: Interval,  // 可行区间
}

// ==========================================
// PersonnelAllocator - 人员分配器
// ==========================================
#[derive(Debug)]
pub struct PersonnelAllocator {
    people: Vec<PersonState>,
    profile_mode: ProfileMode,
    enforce_shifts: bool,
    fallback_tolerance_min: i64,
}

impl PersonnelAllocator {
    pub fn new(settings: &ParsedSettings) -> Self {
        let people = settings
            .roster
            .iter()
            .enumerate()
            .map(|(index, profile)| PersonState {
                profile: profile.clone(),
                shift: settings.shift_for_index(index).clone(),
                setup_timeline: Vec::new(),
                run_timeline: Vec::new(),
                setup_minutes: 0,
                run_minutes: 0,
            })
            .collect();
        Self {
            people,
            profile_mode: settings.profile_mode,
            enforce_shifts: settings.enforce_operator_shifts,
            fallback_tolerance_min: settings.fallback_tolerance_min,
        }
    }

    pub fn person(&self, index: usize) -> &PersonState {
        &self.people[index]
    }

    pub fn find_by_name(&self, name: &str) -> Option<&PersonState> {
        self.people.iter().find(|p| p.profile.name == name)
    }

    fn shift_opt<'a>(&'a self, person: &'a PersonState) -> Option<&'a ClockWindow> {
        if self.enforce_shifts {
            Some(&person.shift)
        } else {
            None
        }
    }

    // ==========================================
    // 冲突检测
    // ==========================================

    /// 调机区间冲突: 与本人任何调机或运行区间重叠即阻塞
    fn setup_conflict(person: &PersonState, span: &Interval) -> Option<NaiveDateTime> {
        let mut resume: Option<NaiveDateTime> = None;
        for iv in &person.setup_timeline {
            if iv.overlaps(span) {
                resume = Some(resume.map_or(iv.end, |r: NaiveDateTime| r.min(iv.end)));
            }
        }
        for r in &person.run_timeline {
            if r.interval.overlaps(span) {
                resume = Some(resume.map_or(r.interval.end, |t: NaiveDateTime| {
                    t.min(r.interval.end)
                }));
            }
        }
        resume
    }

    /// 运行区间冲突
    ///
    /// 规则:
    /// - 与本人调机区间 (含本批次暂定调机) 重叠一律阻塞
    /// - 新区间为 single (2 单位): 与任何已有运行区间重叠即阻塞
    /// - 新区间为 double (1 单位): 与已有 single 重叠阻塞;
    ///   与已有 double 允许重叠, 但任一时刻并发不得超过 2 单位
    fn run_conflict(
        person: &PersonState,
        span: &Interval,
        units: usize,
        tentative_setup: Option<&Interval>,
    ) -> Option<NaiveDateTime> {
        let mut resume: Option<NaiveDateTime> = None;
        let mut note = |end: NaiveDateTime| {
            resume = Some(resume.map_or(end, |r: NaiveDateTime| r.min(end)));
        };

        for iv in &person.setup_timeline {
            if iv.overlaps(span) {
                note(iv.end);
            }
        }
        if let Some(setup) = tentative_setup {
            if setup.overlaps(span) {
                note(setup.end);
            }
        }

        let overlapping: Vec<&RunReservation> = person
            .run_timeline
            .iter()
            .filter(|r| r.interval.overlaps(span))
            .collect();

        if units >= MAX_RUN_CONCURRENCY {
            // single: 任何运行重叠即阻塞
            for r in &overlapping {
                note(r.interval.end);
            }
        } else {
            // double: single 重叠阻塞, double 两两同时重叠则超并发
            for r in &overlapping {
                if r.units >= MAX_RUN_CONCURRENCY {
                    note(r.interval.end);
                }
            }
            let doubles: Vec<&&RunReservation> = overlapping
                .iter()
                .filter(|r| r.units < MAX_RUN_CONCURRENCY)
                .collect();
            for (i, a) in doubles.iter().enumerate() {
                for b in doubles.iter().skip(i + 1) {
                    if a.interval.overlaps(&b.interval) {
                        note(a.interval.end.min(b.interval.end));
                    }
                }
            }
        }
        resume
    }

    /// 本人不早于 floor 的首个无冲突开槽
    fn earliest_person_slot(
        &self,
        person: &PersonState,
        kind: SlotKind,
        machine: &str,
        floor: NaiveDateTime,
        minutes: i64,
        units: usize,
        tentative_setup: Option<&Interval>,
        calendar: &CalendarService,
    ) -> EngineResult<Interval> {
        let shift = self.shift_opt(person);
        let mut cursor = floor;
        for _ in 0..MAX_SLOT_JUMPS {
            let slot = calendar.next_open_slot(kind, machine, shift, cursor, minutes)?;
            let conflict = match kind {
                SlotKind::Setup => Self::setup_conflict(person, &slot),
                SlotKind::Run => Self::run_conflict(person, &slot, units, tentative_setup),
            };
            match conflict {
                None => return Ok(slot),
                Some(resume) => {
                    cursor = resume.max(slot.start + Duration::minutes(1));
                }
            }
        }
        Err(EngineError::CalendarExhausted {
            resource: format!("人员 {} ({:?})", person.profile.name, kind),
        })
    }

    // ==========================================
    // 调机员选择
    // ==========================================

    /// 在调机资格人员中选最早可开工者
    ///
    /// 并列规则: 开槽起点升序 -> 调机优先级升序 ->
    /// 已承担调机分钟数升序 (负载均衡) -> 姓名/工号升序
    pub fn select_setup_person(
        &self,
        machine: &str,
        floor: NaiveDateTime,
        setup_minutes: i64,
        calendar: &CalendarService,
    ) -> EngineResult<PersonChoice> {
        let mut best: Option<(Interval, usize)> = None;
        let mut any_eligible = false;

        for (index, person) in self.people.iter().enumerate() {
            if !person.profile.setup_eligible {
                continue;
            }
            any_eligible = true;
            let slot = match self.earliest_person_slot(
                person,
                SlotKind::Setup,
                machine,
                floor,
                setup_minutes,
                0,
                None,
                calendar,
            ) {
                Ok(slot) => slot,
                Err(_) => continue, // 此人窗口耗尽, 换下一人
            };
            let replace = match &best {
                None => true,
                Some((current, current_index)) => {
                    self.compare_setup_candidates(&slot, index, current, *current_index)
                        == Ordering::Less
                }
            };
            if replace {
                best = Some((slot, index));
            }
        }

        match best {
            Some((interval, person_index)) => Ok(PersonChoice {
                name: self.people[person_index].profile.name.clone(),
                person_index,
                interval,
            }),
            None if !any_eligible => Err(EngineError::NoEligiblePersonnel {
                detail: "花名册中无调机资格人员".to_string(),
            }),
            None => Err(EngineError::CalendarExhausted {
                resource: "全部调机候选人窗口耗尽".to_string(),
            }),
        }
    }

    fn compare_setup_candidates(
        &self,
        slot_a: &Interval,
        index_a: usize,
        slot_b: &Interval,
        index_b: usize,
    ) -> Ordering {
        let a = &self.people[index_a];
        let b = &self.people[index_b];
        match slot_a.start.cmp(&slot_b.start) {
            Ordering::Equal => {}
            other => return other,
        }
        match a.profile.setup_priority.cmp(&b.profile.setup_priority) {
            Ordering::Equal => {}
            other => return other,
        }
        match a.setup_minutes.cmp(&b.setup_minutes) {
            Ordering::Equal => {}
            other => return other,
        }
        match a.profile.name.cmp(&b.profile.name) {
            Ordering::Equal => {}
            other => return other,
        }
        a.profile.uid.cmp(&b.profile.uid)
    }

    // ==========================================
    // 生产员选择
    // ==========================================

    /// 两级偏好选择生产员
    ///
    /// 第一级: 生产区块出身且能在理论起点的回退容差内开工者,
    /// 取已承担运行分钟数最少者 (并列按姓名/工号)。
    /// 第二级: 任何生产资格人员, 取最早可开工者。
    /// basic 档案模式: 花名册全员单一角色, 直接按最早可开工选取。
    pub fn select_run_person(
        &self,
        machine: &str,
        theoretical_start: NaiveDateTime,
        run_minutes: i64,
        handle_mode: HandleMode,
        tentative_setup: Option<(usize, Interval)>,
        calendar: &CalendarService,
    ) -> EngineResult<PersonChoice> {
        let units = capacity_units(handle_mode);
        let mut candidates: Vec<(usize, Interval)> = Vec::new();
        let mut any_eligible = false;

        for (index, person) in self.people.iter().enumerate() {
            let eligible = match self.profile_mode {
                ProfileMode::Basic => true,
                ProfileMode::Advanced => person.profile.production_eligible,
            };
            if !eligible {
                continue;
            }
            any_eligible = true;
            let own_setup = tentative_setup
                .as_ref()
                .filter(|(setup_index, _)| *setup_index == index)
                .map(|(_, iv)| iv);
            match self.earliest_person_slot(
                person,
                SlotKind::Run,
                machine,
                theoretical_start,
                run_minutes,
                units,
                own_setup,
                calendar,
            ) {
                Ok(slot) => candidates.push((index, slot)),
                Err(_) => continue,
            }
        }

        if candidates.is_empty() {
            return if any_eligible {
                Err(EngineError::CalendarExhausted {
                    resource: "全部生产候选人窗口耗尽".to_string(),
                })
            } else {
                Err(EngineError::NoEligiblePersonnel {
                    detail: "花名册中无生产资格人员".to_string(),
                })
            };
        }

        let chosen = if self.profile_mode == ProfileMode::Advanced {
            self.pick_preferred_run_candidate(&candidates, theoretical_start)
        } else {
            None
        }
        .unwrap_or_else(|| self.pick_earliest_run_candidate(&candidates));

        let (person_index, interval) = chosen;
        debug!(
            person = %self.people[person_index].profile.name,
            start = %interval.start,
            mode = %handle_mode,
            "生产员选定"
        );
        Ok(PersonChoice {
            name: self.people[person_index].profile.name.clone(),
            person_index,
            interval,
        })
    }

    /// 第一级: 容差内的生产区块人员, 负载最轻者
    fn pick_preferred_run_candidate(
        &self,
        candidates: &[(usize, Interval)],
        theoretical_start: NaiveDateTime,
    ) -> Option<(usize, Interval)> {
        let deadline = theoretical_start + Duration::minutes(self.fallback_tolerance_min);
        let mut best: Option<(usize, Interval)> = None;
        for (index, slot) in candidates {
            let person = &self.people[*index];
            if person.profile.source_section != SourceSection::Production {
                continue;
            }
            if slot.start > deadline {
                continue;
            }
            let replace = match &best {
                None => true,
                Some((best_index, _)) => {
                    let a = &self.people[*index];
                    let b = &self.people[*best_index];
                    match a.run_minutes.cmp(&b.run_minutes) {
                        Ordering::Less => true,
                        Ordering::Greater => false,
                        Ordering::Equal => match a.profile.name.cmp(&b.profile.name) {
                            Ordering::Less => true,
                            Ordering::Greater => false,
                            Ordering::Equal => a.profile.uid < b.profile.uid,
                        },
                    }
                }
            };
            if replace {
                best = Some((*index, *slot));
            }
        }
        best
    }

    /// 第二级: 最早可开工者 (并列按负载再姓名/工号)
    fn pick_earliest_run_candidate(&self, candidates: &[(usize, Interval)]) -> (usize, Interval) {
        let mut best = candidates[0];
        for (index, slot) in candidates.iter().skip(1) {
            let a = &self.people[*index];
            let b = &self.people[best.0];
            let replace = match slot.start.cmp(&best.1.start) {
                Ordering::Less => true,
                Ordering::Greater => false,
                Ordering::Equal => match a.run_minutes.cmp(&b.run_minutes) {
                    Ordering::Less => true,
                    Ordering::Greater => false,
                    Ordering::Equal => match a.profile.name.cmp(&b.profile.name) {
                        Ordering::Less => true,
                        Ordering::Greater => false,
                        Ordering::Equal => a.profile.uid < b.profile.uid,
                    },
                },
            };
            if replace {
                best = (*index, *slot);
            }
        }
        best
    }

    // ==========================================
    // 预约提交
    // ==========================================

    /// 提交调机预约 (basic 模式下不应调用)
    pub fn reserve_setup(&mut self, person_index: usize, interval: Interval) {
        let person = &mut self.people[person_index];
        person.setup_minutes += interval.duration_minutes();
        person.setup_timeline.push(interval);
        person.setup_timeline.sort_by_key(|iv| iv.start);
    }

    /// 提交运行预约
    pub fn reserve_run(&mut self, person_index: usize, interval: Interval, mode: HandleMode) {
        let person = &mut self.people[person_index];
        person.run_minutes += interval.duration_minutes();
        person.run_timeline.push(RunReservation {
            interval,
            units: capacity_units(mode),
        });
        person.run_timeline.sort_by_key(|r| r.interval.start);
    }
}
