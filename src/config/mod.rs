// ==========================================
// 机加工车间排产系统 - 配置层
// ==========================================

// 排产设置与命名常量
pub mod settings;

pub use settings::{
    ParsedSettings, ScheduleSettings, CALENDAR_HORIZON_DAYS, DEFAULT_FALLBACK_TOLERANCE_MIN,
    DEFAULT_PRODUCTION_WINDOW, DEFAULT_SETUP_WINDOW, MAX_NEGOTIATION_ROUNDS, MAX_RUN_CONCURRENCY,
    MAX_SLOT_JUMPS,
};
