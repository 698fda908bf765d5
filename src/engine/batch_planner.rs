// ==========================================
// 机加工车间排产系统 - 分批计划器
// ==========================================
// 红线: 首工序的批次结构即泳道, 后续工序不得重新分批;
//       各工序批量之和恒等于订单数量
// ==========================================

use tracing::debug;

use crate::domain::order::Order;
use crate::domain::schedule::Batch;
use crate::domain::types::BatchMode;
use crate::engine::error::{EngineError, EngineResult};

// ==========================================
// BatchPlanner - 分批计划器
// ==========================================
#[derive(Debug, Default)]
pub struct BatchPlanner;

impl BatchPlanner {
    pub fn new() -> Self {
        Self
    }

    /// 按订单分批模式计算泳道结构 (以首工序为准)
    ///
    /// # 返回
    /// 批次清单 (批次ID 订单内从 B01 起编号);
    /// 数量或指定批量非正时返回 InvalidBatchConfiguration
    pub fn plan(&self, order: &Order) -> EngineResult<Vec<Batch>> {
        if order.quantity <= 0 {
            return Err(EngineError::InvalidBatchConfiguration {
                order_id: order.id.clone(),
                detail: format!("订单数量非正: {}", order.quantity),
            });
        }
        if order.quantity > u32::MAX as i64 {
            return Err(EngineError::InvalidBatchConfiguration {
                order_id: order.id.clone(),
                detail: format!("订单数量超出上限: {}", order.quantity),
            });
        }
        let quantity = order.quantity as u32;
        let first_op = order
            .first_operation()
            .ok_or_else(|| EngineError::InvalidOrder {
                order_id: order.id.clone(),
                detail: "订单无工序".to_string(),
            })?;

        let chunk = match order.batch_mode {
            BatchMode::SingleBatch => quantity,
            // 最小批量按 1 兜底, 避免除零
            BatchMode::AutoSplit => first_op.minimum_batch_size.max(1),
            BatchMode::CustomBatchSize => match order.custom_batch_size {
                Some(size) if size > 0 => size as u32,
                other => {
                    return Err(EngineError::InvalidBatchConfiguration {
                        order_id: order.id.clone(),
                        detail: format!("指定批量非正: {:?}", other),
                    })
                }
            },
        };

        let mut batches = Vec::new();
        let mut remaining = quantity;
        while remaining > 0 {
            let size = remaining.min(chunk);
            batches.push(Batch {
                batch_id: format!("B{:02}", batches.len() + 1),
                operation_seq: first_op.sequence_number,
                quantity: size,
            });
            remaining -= size;
        }

        debug!(
            order_id = %order.id,
            mode = %order.batch_mode,
            batches = batches.len(),
            "分批完成"
        );
        Ok(batches)
    }
}
