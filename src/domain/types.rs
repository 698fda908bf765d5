// ==========================================
// 机加工车间排产系统 - 领域类型定义
// ==========================================
// 红线: 确定性排产, 所有枚举排序/比较必须稳定
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 订单优先级 (Order Priority)
// ==========================================
// 红线: 等级制, 同级订单保持输入顺序 (稳定排序)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderPriority {
    Urgent, // 特急
    High,   // 加急
    Normal, // 正常
    Low,    // 延后
}

impl OrderPriority {
    /// 排序权重: 数值越小越先排
    pub fn rank(&self) -> u8 {
        match self {
            OrderPriority::Urgent => 0,
            OrderPriority::High => 1,
            OrderPriority::Normal => 2,
            OrderPriority::Low => 3,
        }
    }
}

impl Default for OrderPriority {
    fn default() -> Self {
        OrderPriority::Normal
    }
}

impl fmt::Display for OrderPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderPriority::Urgent => write!(f, "urgent"),
            OrderPriority::High => write!(f, "high"),
            OrderPriority::Normal => write!(f, "normal"),
            OrderPriority::Low => write!(f, "low"),
        }
    }
}

// ==========================================
// 分批模式 (Batch Mode)
// ==========================================
// 序列化格式与外部订单数据一致 (kebab-case)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchMode {
    #[serde(rename = "single-batch")]
    SingleBatch, // 整单一批
    #[serde(rename = "auto-split")]
    AutoSplit, // 按最小批量自动拆分
    #[serde(rename = "custom-batch-size")]
    CustomBatchSize, // 按指定批量拆分
}

impl Default for BatchMode {
    fn default() -> Self {
        BatchMode::SingleBatch
    }
}

impl fmt::Display for BatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchMode::SingleBatch => write!(f, "single-batch"),
            BatchMode::AutoSplit => write!(f, "auto-split"),
            BatchMode::CustomBatchSize => write!(f, "custom-batch-size"),
        }
    }
}

// ==========================================
// 操机模式 (Handle Mode)
// ==========================================
// 约束生产员的运行并发: double 允许同一人同时看两台机床,
// single 禁止任何重叠; single 与任何区间混排一律阻塞
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleMode {
    Single, // 单机操作
    Double, // 双机操作 (并发上限 2)
}

impl Default for HandleMode {
    fn default() -> Self {
        HandleMode::Single
    }
}

impl fmt::Display for HandleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandleMode::Single => write!(f, "single"),
            HandleMode::Double => write!(f, "double"),
        }
    }
}

// ==========================================
// 人员来源区块 (Source Section)
// ==========================================
// 生产区块人员优先承担运行任务, 调机区块人员优先承担调机任务
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceSection {
    Production, // 生产区块
    Setup,      // 调机区块
}

impl fmt::Display for SourceSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceSection::Production => write!(f, "production"),
            SourceSection::Setup => write!(f, "setup"),
        }
    }
}

// ==========================================
// 人员档案模式 (Profile Mode)
// ==========================================
// basic: 单一角色, 不预留调机时间线, 不产出调机事件
// advanced: 调机/生产双时间线完整模型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileMode {
    Basic,    // 基础模式
    Advanced, // 完整模式
}

impl Default for ProfileMode {
    fn default() -> Self {
        ProfileMode::Advanced
    }
}

impl fmt::Display for ProfileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileMode::Basic => write!(f, "basic"),
            ProfileMode::Advanced => write!(f, "advanced"),
        }
    }
}

// ==========================================
// 排产行状态 (Row Status)
// ==========================================
// 红线: 局部失败以状态表达, 不抛错, 始终返回部分结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RowStatus {
    Scheduled, // 已排产
    Completed, // 已完成 (外部回写)
    Blocked,   // 无法落位
}

impl fmt::Display for RowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowStatus::Scheduled => write!(f, "SCHEDULED"),
            RowStatus::Completed => write!(f, "COMPLETED"),
            RowStatus::Blocked => write!(f, "BLOCKED"),
        }
    }
}

// ==========================================
// 排产单元状态机 (Schedule State)
// ==========================================
// 每个 (订单, 批次, 工序) 单元的协商状态:
// Pending -> AwaitingMachine -> AwaitingPersonnel -> Committed | Blocked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScheduleState {
    Pending,           // 待处理
    AwaitingMachine,   // 等待机床窗口
    AwaitingPersonnel, // 等待人员窗口
    Committed,         // 已提交 (终态)
    Blocked,           // 无法落位 (终态)
}

impl ScheduleState {
    /// 判断是否为终态
    pub fn is_terminal(&self) -> bool {
        matches!(self, ScheduleState::Committed | ScheduleState::Blocked)
    }
}

impl fmt::Display for ScheduleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleState::Pending => write!(f, "PENDING"),
            ScheduleState::AwaitingMachine => write!(f, "AWAITING_MACHINE"),
            ScheduleState::AwaitingPersonnel => write!(f, "AWAITING_PERSONNEL"),
            ScheduleState::Committed => write!(f, "COMMITTED"),
            ScheduleState::Blocked => write!(f, "BLOCKED"),
        }
    }
}
