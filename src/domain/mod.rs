// ==========================================
// 机加工车间排产系统 - 领域层
// ==========================================

// 领域类型 (枚举与状态机)
pub mod types;

// 订单与工序
pub mod order;

// 人员档案
pub mod personnel;

// 日历实体 (窗口/假日/故障)
pub mod calendar;

// 排产结果
pub mod schedule;

// ==========================================
// 重导出
// ==========================================

pub use calendar::{Breakdown, ClockWindow, Holiday, Interval};
pub use order::{Operation, Order};
pub use personnel::{normalize_roster, Person};
pub use schedule::{Batch, PieceRecord, ScheduleOutput, ScheduleSummary, ScheduledRow};
