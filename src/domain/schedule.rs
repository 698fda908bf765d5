// ==========================================
// 机加工车间排产系统 - 排产结果领域模型
// ==========================================
// 红线: 结果行只追加不修改, 局部失败以状态表达
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::types::{HandleMode, OrderPriority, RowStatus};

// ==========================================
// Batch - 批次
// ==========================================
// 首工序的批次结构即"泳道", 后续工序逐一镜像
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    pub batch_id: String,   // 批次ID (订单内 B01, B02, ...)
    pub operation_seq: u32, // 工序号
    pub quantity: u32,      // 批量
}

// ==========================================
// ScheduledRow - 排产明细行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledRow {
    pub order_id: String,                // 订单ID
    pub part_number: String,             // 零件号
    pub priority: OrderPriority,         // 优先级快照
    pub due_date: Option<NaiveDate>,     // 交期快照 (仅报表)
    pub batch_id: String,                // 批次ID
    pub batch_qty: u32,                  // 批量
    pub operation_seq: u32,              // 工序号
    pub operation_name: String,          // 工序名称
    pub machine: String,                 // 机床
    pub setup_person_name: String,       // 调机员姓名
    pub setup_start: NaiveDateTime,      // 调机开始
    pub setup_end: NaiveDateTime,        // 调机结束
    pub production_person_name: String,  // 生产员姓名
    pub run_start: NaiveDateTime,        // 运行开始
    pub run_end: NaiveDateTime,          // 运行结束
    pub handle_mode: HandleMode,         // 操机模式
    pub status: RowStatus,               // 行状态
    #[serde(default)]
    pub reason: Option<String>,          // 阻塞原因 (仅 Blocked 行)
}

impl ScheduledRow {
    pub fn is_blocked(&self) -> bool {
        self.status == RowStatus::Blocked
    }
}

// ==========================================
// PieceRecord - 单件时间线记录
// ==========================================
// 批次运行模型: 同批各件共享批次运行窗口
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PieceRecord {
    pub part_number: String,        // 零件号
    pub batch_id: String,           // 批次ID
    pub piece: u32,                 // 件号 (批内 1 起)
    pub operation_seq: u32,         // 工序号
    pub machine: String,            // 机床
    pub run_start: NaiveDateTime,   // 运行开始
    pub run_end: NaiveDateTime,     // 运行结束
}

// ==========================================
// ScheduleSummary - 排产汇总
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSummary {
    pub total_orders: usize,   // 输入订单数
    pub scheduled_rows: usize, // 落位行数
    pub blocked_rows: usize,   // 阻塞行数
    pub skipped_orders: usize, // 结构非法而跳过的订单数
}

// ==========================================
// ScheduleOutput - 排产输出
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleOutput {
    pub rows: Vec<ScheduledRow>,          // 排产明细行
    pub piece_timeline: Vec<PieceRecord>, // 单件时间线
    pub alerts: Vec<String>,              // 订单级告警 (跳过/阻塞原因)
    pub summary: ScheduleSummary,         // 汇总
}
