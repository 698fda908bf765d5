// ==========================================
// 机加工车间排产系统 - 单件时间线构建器
// ==========================================
// 批次运行模型: 同批各件共享批次的机床与运行窗口,
// 连续性校验以 (零件, 批次, 件号) 为键跨工序进行
// ==========================================

use std::collections::BTreeMap;

use tracing::debug;

use crate::domain::schedule::{PieceRecord, ScheduledRow};
use crate::domain::types::RowStatus;

// ==========================================
// PieceTimelineBuilder - 单件时间线构建器
// ==========================================
#[derive(Debug, Default)]
pub struct PieceTimelineBuilder;

impl PieceTimelineBuilder {
    pub fn new() -> Self {
        Self
    }

    /// 将已落位的批次级运行窗口展开为单件记录
    ///
    /// Blocked 行不展开 (无可信窗口)
    pub fn build(&self, rows: &[ScheduledRow]) -> Vec<PieceRecord> {
        let mut records = Vec::new();
        for row in rows {
            if row.status == RowStatus::Blocked {
                continue;
            }
            for piece in 1..=row.batch_qty {
                records.push(PieceRecord {
                    part_number: row.part_number.clone(),
                    batch_id: row.batch_id.clone(),
                    piece,
                    operation_seq: row.operation_seq,
                    machine: row.machine.clone(),
                    run_start: row.run_start,
                    run_end: row.run_end,
                });
            }
        }
        debug!(records = records.len(), "单件时间线展开完成");
        records
    }
}

/// 跨工序连续性校验: 同一 (零件, 批次, 件号) 按工序号排序后,
/// 工序号必须严格递增且后道运行开始不得早于前道运行结束
///
/// # 返回
/// 违规描述清单 (空表示全部通过)
pub fn verify_piece_continuity(records: &[PieceRecord]) -> Vec<String> {
    let mut grouped: BTreeMap<(String, String, u32), Vec<&PieceRecord>> = BTreeMap::new();
    for record in records {
        grouped
            .entry((
                record.part_number.clone(),
                record.batch_id.clone(),
                record.piece,
            ))
            .or_default()
            .push(record);
    }

    let mut violations = Vec::new();
    for ((part, batch, piece), mut group) in grouped {
        group.sort_by_key(|r| r.operation_seq);
        for pair in group.windows(2) {
            let (prev, next) = (pair[0], pair[1]);
            if next.operation_seq <= prev.operation_seq {
                violations.push(format!(
                    "{} {} 第{}件: 工序号未递增 ({} -> {})",
                    part, batch, piece, prev.operation_seq, next.operation_seq
                ));
            }
            if next.run_start < prev.run_end {
                violations.push(format!(
                    "{} {} 第{}件: 工序{}运行开始早于工序{}运行结束",
                    part, batch, piece, next.operation_seq, prev.operation_seq
                ));
            }
        }
    }
    violations
}
