// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use machining_aps::config::ScheduleSettings;
use machining_aps::domain::calendar::{Breakdown, Holiday};
use machining_aps::domain::order::{Operation, Order};
use machining_aps::domain::personnel::Person;
use machining_aps::domain::types::{
    BatchMode, HandleMode, OrderPriority, ProfileMode, SourceSection,
};

/// 解析 "YYYY-MM-DD HH:MM" 测试时刻
pub fn dt(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
}

/// 测试缺省排产起点: 2026-02-20 06:00
pub fn default_start() -> NaiveDateTime {
    dt("2026-02-20 06:00")
}

// ==========================================
// Operation 构建器
// ==========================================

pub struct OperationBuilder {
    sequence_number: u32,
    name: String,
    setup_minutes: i64,
    cycle_minutes_per_unit: i64,
    minimum_batch_size: u32,
    eligible_machines: Vec<String>,
    handle_mode: HandleMode,
}

impl OperationBuilder {
    pub fn new(sequence_number: u32) -> Self {
        Self {
            sequence_number,
            name: format!("OP{}", sequence_number),
            setup_minutes: 30,
            cycle_minutes_per_unit: 10,
            minimum_batch_size: 5,
            eligible_machines: vec!["VMC 1".to_string()],
            handle_mode: HandleMode::Single,
        }
    }

    pub fn setup_minutes(mut self, minutes: i64) -> Self {
        self.setup_minutes = minutes;
        self
    }

    pub fn cycle_minutes(mut self, minutes: i64) -> Self {
        self.cycle_minutes_per_unit = minutes;
        self
    }

    pub fn minimum_batch(mut self, size: u32) -> Self {
        self.minimum_batch_size = size;
        self
    }

    pub fn machines(mut self, machines: &[&str]) -> Self {
        self.eligible_machines = machines.iter().map(|m| m.to_string()).collect();
        self
    }

    pub fn handle_mode(mut self, mode: HandleMode) -> Self {
        self.handle_mode = mode;
        self
    }

    pub fn build(self) -> Operation {
        Operation {
            sequence_number: self.sequence_number,
            name: self.name,
            setup_minutes: self.setup_minutes,
            cycle_minutes_per_unit: self.cycle_minutes_per_unit,
            minimum_batch_size: self.minimum_batch_size,
            eligible_machines: self.eligible_machines,
            handle_mode: self.handle_mode,
        }
    }
}

// ==========================================
// Order 构建器
// ==========================================

pub struct OrderBuilder {
    id: String,
    part_number: String,
    priority: OrderPriority,
    quantity: i64,
    batch_mode: BatchMode,
    custom_batch_size: Option<i64>,
    due_date: Option<NaiveDate>,
    start_datetime: Option<NaiveDateTime>,
    operations: Vec<Operation>,
}

impl OrderBuilder {
    pub fn new(id: &str, part_number: &str) -> Self {
        Self {
            id: id.to_string(),
            part_number: part_number.to_string(),
            priority: OrderPriority::Normal,
            quantity: 4,
            batch_mode: BatchMode::SingleBatch,
            custom_batch_size: None,
            due_date: None,
            start_datetime: None,
            operations: vec![OperationBuilder::new(1).build()],
        }
    }

    pub fn priority(mut self, priority: OrderPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn quantity(mut self, quantity: i64) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn batch_mode(mut self, mode: BatchMode) -> Self {
        self.batch_mode = mode;
        self
    }

    pub fn custom_batch_size(mut self, size: i64) -> Self {
        self.custom_batch_size = Some(size);
        self
    }

    pub fn due_date(mut self, date: NaiveDate) -> Self {
        self.due_date = Some(date);
        self
    }

    pub fn start_datetime(mut self, start: NaiveDateTime) -> Self {
        self.start_datetime = Some(start);
        self
    }

    pub fn operations(mut self, operations: Vec<Operation>) -> Self {
        self.operations = operations;
        self
    }

    pub fn build(self) -> Order {
        Order {
            id: self.id,
            part_number: self.part_number,
            priority: self.priority,
            quantity: self.quantity,
            batch_mode: self.batch_mode,
            custom_batch_size: self.custom_batch_size,
            due_date: self.due_date,
            start_datetime: self.start_datetime,
            operations: self.operations,
        }
    }
}

// ==========================================
// 人员便捷函数
// ==========================================

/// 生产区块人员 (无提级)
pub fn production_person(uid: &str, name: &str) -> Person {
    Person::from_section(uid, name, SourceSection::Production, 0)
}

/// 调机区块人员 (无提级)
pub fn setup_person(uid: &str, name: &str) -> Person {
    Person::from_section(uid, name, SourceSection::Setup, 0)
}

/// 调机区块人员, 提级后兼具生产资格
pub fn versatile_setup_person(uid: &str, name: &str) -> Person {
    Person::from_section(uid, name, SourceSection::Setup, 1)
}

// ==========================================
// ScheduleSettings 构建器
// ==========================================

pub struct SettingsBuilder {
    global_start_datetime: NaiveDateTime,
    global_setup_window: String,
    shift_windows: Vec<String>,
    production_windows: Vec<String>,
    holidays: Vec<Holiday>,
    breakdowns: Vec<Breakdown>,
    personnel_profiles: Vec<Person>,
    profile_mode: ProfileMode,
    enforce_operator_shifts: bool,
    fallback_tolerance_min: i64,
}

impl SettingsBuilder {
    /// 缺省花名册: 李调机 (调机, 提级) + 王生产 (生产)
    pub fn new() -> Self {
        Self {
            global_start_datetime: default_start(),
            global_setup_window: "06:00-22:00".to_string(),
            shift_windows: vec![],
            production_windows: vec![],
            holidays: vec![],
            breakdowns: vec![],
            personnel_profiles: vec![
                versatile_setup_person("S01", "李调机"),
                production_person("P01", "王生产"),
            ],
            profile_mode: ProfileMode::Advanced,
            enforce_operator_shifts: false,
            fallback_tolerance_min: 30,
        }
    }

    pub fn start(mut self, start: NaiveDateTime) -> Self {
        self.global_start_datetime = start;
        self
    }

    pub fn shift_windows(mut self, windows: &[&str]) -> Self {
        self.shift_windows = windows.iter().map(|w| w.to_string()).collect();
        self
    }

    pub fn production_windows(mut self, windows: &[&str]) -> Self {
        self.production_windows = windows.iter().map(|w| w.to_string()).collect();
        self
    }

    pub fn holiday(mut self, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        self.holidays.push(Holiday { start, end });
        self
    }

    pub fn breakdown(mut self, machines: &[&str], start: NaiveDateTime, end: NaiveDateTime) -> Self {
        self.breakdowns.push(Breakdown {
            machines: machines.iter().map(|m| m.to_string()).collect(),
            start,
            end,
        });
        self
    }

    pub fn roster(mut self, people: Vec<Person>) -> Self {
        self.personnel_profiles = people;
        self
    }

    pub fn profile_mode(mut self, mode: ProfileMode) -> Self {
        self.profile_mode = mode;
        self
    }

    pub fn enforce_operator_shifts(mut self) -> Self {
        self.enforce_operator_shifts = true;
        self
    }

    pub fn fallback_tolerance(mut self, minutes: i64) -> Self {
        self.fallback_tolerance_min = minutes;
        self
    }

    pub fn build(self) -> ScheduleSettings {
        ScheduleSettings {
            global_start_datetime: self.global_start_datetime,
            global_setup_window: self.global_setup_window,
            shift_windows: self.shift_windows,
            production_windows: self.production_windows,
            holidays: self.holidays,
            breakdowns: self.breakdowns,
            personnel_profiles: self.personnel_profiles,
            profile_mode: self.profile_mode,
            enforce_operator_shifts: self.enforce_operator_shifts,
            fallback_tolerance_min: self.fallback_tolerance_min,
        }
    }
}

impl Default for SettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
