// ==========================================
// 机加工车间排产系统 - 订单领域模型
// ==========================================
// 红线: 订单为只读输入, 每次排产调用消费一次
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::types::{BatchMode, HandleMode, OrderPriority};

// ==========================================
// Operation - 工序
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub sequence_number: u32,            // 工序号 (1 起, 订单内严格递增)
    pub name: String,                    // 工序名称
    pub setup_minutes: i64,              // 调机时长 (分钟)
    pub cycle_minutes_per_unit: i64,     // 单件加工时长 (分钟)
    pub minimum_batch_size: u32,         // 最小批量 (auto-split 分批依据)
    pub eligible_machines: Vec<String>,  // 可用机床清单
    #[serde(default)]
    pub handle_mode: HandleMode,         // 操机模式 (缺省 single)
}

impl Operation {
    /// 批次运行时长 = 批量 x 单件时长
    pub fn run_minutes(&self, batch_qty: u32) -> i64 {
        self.cycle_minutes_per_unit * batch_qty as i64
    }

    /// 工序级字段校验, 返回首个问题描述
    pub fn validate(&self) -> Option<String> {
        if self.sequence_number == 0 {
            return Some("工序号必须从 1 开始".to_string());
        }
        if self.setup_minutes < 0 {
            return Some(format!("工序 {} 调机时长为负", self.sequence_number));
        }
        if self.cycle_minutes_per_unit <= 0 {
            return Some(format!("工序 {} 单件时长无效", self.sequence_number));
        }
        if self.eligible_machines.is_empty() {
            return Some(format!("工序 {} 未配置可用机床", self.sequence_number));
        }
        None
    }
}

// ==========================================
// Order - 生产订单
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,                             // 订单ID
    pub part_number: String,                    // 零件号
    #[serde(default)]
    pub priority: OrderPriority,                // 优先级
    pub quantity: i64,                          // 订单数量 (允许非法值, 边界校验拦截)
    #[serde(default)]
    pub batch_mode: BatchMode,                  // 分批模式
    #[serde(default)]
    pub custom_batch_size: Option<i64>,         // 指定批量 (custom-batch-size 模式)
    #[serde(default)]
    pub due_date: Option<NaiveDate>,            // 交期 (仅透传到输出行)
    #[serde(default)]
    pub start_datetime: Option<NaiveDateTime>,  // 订单级最早开工覆盖
    pub operations: Vec<Operation>,             // 工序清单
}

impl Order {
    /// 订单级结构校验: 问题订单整单跳过, 不影响其他订单
    ///
    /// # 返回
    /// 首个问题描述; None 表示结构合法
    pub fn validate(&self) -> Option<String> {
        if self.id.trim().is_empty() {
            return Some("订单ID为空".to_string());
        }
        if self.operations.is_empty() {
            return Some("订单无工序".to_string());
        }
        let mut prev_seq = 0u32;
        for op in &self.operations {
            if let Some(problem) = op.validate() {
                return Some(problem);
            }
            if op.sequence_number <= prev_seq {
                return Some(format!("工序号未严格递增: {}", op.sequence_number));
            }
            prev_seq = op.sequence_number;
        }
        None
    }

    /// 首工序 (分批结构的唯一依据)
    pub fn first_operation(&self) -> Option<&Operation> {
        self.operations.first()
    }
}
