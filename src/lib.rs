// ==========================================
// 机加工车间排产系统 - 核心库
// ==========================================
// 系统定位: 确定性排产引擎 (纯函数, 无持久化)
// 排产模型: 订单 -> 批次 -> 工序, 机床+调机员+生产员三方协商
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 排产规则
pub mod engine;

// 配置层 - 排产设置
pub mod config;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    BatchMode, HandleMode, OrderPriority, ProfileMode, RowStatus, ScheduleState, SourceSection,
};

// 领域实体
pub use domain::{
    Batch, Breakdown, ClockWindow, Holiday, Interval, Operation, Order, Person, PieceRecord,
    ScheduleOutput, ScheduleSummary, ScheduledRow,
};

// 配置
pub use config::{
    ScheduleSettings, CALENDAR_HORIZON_DAYS, DEFAULT_FALLBACK_TOLERANCE_MIN,
    MAX_NEGOTIATION_ROUNDS, MAX_RUN_CONCURRENCY,
};

// 引擎
pub use engine::{
    run_schedule, BatchPlanner, CalendarService, EngineError, EngineResult, MachineAllocator,
    OperationScheduler, PersonnelAllocator, PieceTimelineBuilder,
};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "机加工车间排产系统";
