// ==========================================
// 机加工车间排产系统 - 引擎错误类型
// ==========================================
// 传播策略:
//   InvalidSettings            -> 致命, 中止整次排产
//   InvalidOrder / 批次配置错误 -> 跳过该订单, 其余订单继续
//   机床/人员/日历不可行        -> 转为行级 Blocked 状态, 绝不抛出
// ==========================================

use thiserror::Error;

/// 引擎统一错误类型
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("排产设置非法: {0}")]
    InvalidSettings(String),

    #[error("订单 {order_id} 分批配置非法: {detail}")]
    InvalidBatchConfiguration { order_id: String, detail: String },

    #[error("订单 {order_id} 结构非法: {detail}")]
    InvalidOrder { order_id: String, detail: String },

    #[error("无可用机床: {detail}")]
    NoEligibleMachine { detail: String },

    #[error("无可用人员: {detail}")]
    NoEligiblePersonnel { detail: String },

    #[error("日历搜索超限: {resource}")]
    CalendarExhausted { resource: String },

    #[error("内部错误: {0}")]
    Other(#[from] anyhow::Error),
}

impl EngineError {
    /// 是否为行级可恢复错误 (转为 Blocked 状态而非中止)
    pub fn is_row_level(&self) -> bool {
        matches!(
            self,
            EngineError::NoEligibleMachine { .. }
                | EngineError::NoEligiblePersonnel { .. }
                | EngineError::CalendarExhausted { .. }
        )
    }

    /// 是否为订单级错误 (跳过单个订单)
    pub fn is_order_level(&self) -> bool {
        matches!(
            self,
            EngineError::InvalidBatchConfiguration { .. } | EngineError::InvalidOrder { .. }
        )
    }
}

/// 引擎结果类型别名
pub type EngineResult<T> = Result<T, EngineError>;
