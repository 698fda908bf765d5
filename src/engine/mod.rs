// ==========================================
// 机加工车间排产系统 - 引擎层
// ==========================================
// 调用链: 工序排产器 -> 分批计划器 / 机床分配器 / 人员分配器
//         -> 日历服务 -> 单件时间线构建器
// ==========================================

// 引擎错误类型
pub mod error;

// 日历可用性服务
pub mod calendar;

// 分批计划器
pub mod batch_planner;

// 机床分配器
pub mod machine_allocator;

// 人员分配器
pub mod personnel_allocator;

// 工序排产器 (核心循环)
pub mod scheduler;

// 单件时间线构建器
pub mod piece_timeline;

// ==========================================
// 重导出
// ==========================================

pub use batch_planner::BatchPlanner;
pub use calendar::{CalendarService, SlotKind};
pub use error::{EngineError, EngineResult};
pub use machine_allocator::{machine_sort_key, MachineAllocator};
pub use personnel_allocator::{PersonChoice, PersonnelAllocator};
pub use piece_timeline::{verify_piece_continuity, PieceTimelineBuilder};
pub use scheduler::{run_schedule, OperationScheduler};
