// ==========================================
// 机加工车间排产系统 - 工序排产器 (核心循环)
// ==========================================
// 每个 (订单, 批次, 工序) 单元走状态机:
//   Pending -> AwaitingMachine -> AwaitingPersonnel -> Committed | Blocked
// 机床与人员分配器之间做有界定点协商, 超轮次判 Blocked。
// 红线: 单元失败以行状态表达, 整次排产始终返回部分结果
// ==========================================

use chrono::NaiveDateTime;
use tracing::{debug, info, instrument, trace, warn};

use crate::config::settings::{ParsedSettings, ScheduleSettings, MAX_NEGOTIATION_ROUNDS};
use crate::domain::calendar::Interval;
use crate::domain::order::{Operation, Order};
use crate::domain::schedule::{Batch, ScheduleOutput, ScheduleSummary, ScheduledRow};
use crate::domain::types::{ProfileMode, RowStatus, ScheduleState};
use crate::engine::batch_planner::BatchPlanner;
use crate::engine::calendar::{CalendarService, SlotKind};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::machine_allocator::MachineAllocator;
use crate::engine::personnel_allocator::PersonnelAllocator;
use crate::engine::piece_timeline::PieceTimelineBuilder;

// ==========================================
// 单元落位结果 (内部)
// ==========================================
#[derive(Debug)]
enum UnitOutcome {
    Committed {
        machine: String,
        setup_person: String,
        setup: Interval,
        production_person: String,
        run: Interval,
    },
    Blocked {
        reason: String,
    },
}

// ==========================================
// OperationScheduler - 工序排产器
// ==========================================
#[derive(Debug, Default)]
pub struct OperationScheduler;

impl OperationScheduler {
    pub fn new() -> Self {
        Self
    }

    /// 执行一次完整排产
    ///
    /// # 参数
    /// - `orders`: 订单清单 (只读输入)
    /// - `settings`: 排产设置
    ///
    /// # 返回
    /// 排产明细 + 单件时间线 + 告警 + 汇总;
    /// 仅结构性非法设置返回 Err, 订单级问题转为告警与跳过
    #[instrument(skip_all, fields(orders = orders.len()))]
    pub fn run(
        &self,
        orders: &[Order],
        settings: &ScheduleSettings,
    ) -> EngineResult<ScheduleOutput> {
        // 步骤1: 设置校验与分配器上下文构建 (每次调用全新状态)
        let parsed = settings.validate_parse()?;
        let calendar = CalendarService::new(&parsed);
        let mut machines = MachineAllocator::new();
        let mut personnel = PersonnelAllocator::new(&parsed);
        let planner = BatchPlanner::new();

        info!(
            orders = orders.len(),
            roster = parsed.roster.len(),
            mode = %parsed.profile_mode,
            start = %parsed.global_start,
            "排产开始"
        );

        // 步骤2: 订单排序 (优先级升序, 同级保持输入顺序)
        let mut ordered: Vec<(usize, &Order)> = orders.iter().enumerate().collect();
        ordered.sort_by_key(|(index, order)| (order.priority.rank(), *index));

        // 步骤3: 逐单分批, 逐工序逐批次落位
        let mut rows: Vec<ScheduledRow> = Vec::new();
        let mut alerts: Vec<String> = Vec::new();
        let mut skipped_orders = 0usize;

        for (_, order) in &ordered {
            if let Some(problem) = order.validate() {
                let err = EngineError::InvalidOrder {
                    order_id: order.id.clone(),
                    detail: problem,
                };
                warn!(order_id = %order.id, %err, "订单结构非法, 整单跳过");
                alerts.push(err.to_string());
                skipped_orders += 1;
                continue;
            }
            let lanes: Vec<Batch> = match planner.plan(order) {
                Ok(lanes) => lanes,
                Err(err) => {
                    warn!(order_id = %order.id, %err, "分批失败, 整单跳过");
                    alerts.push(err.to_string());
                    skipped_orders += 1;
                    continue;
                }
            };

            self.schedule_order(
                order,
                &lanes,
                &parsed,
                &calendar,
                &mut machines,
                &mut personnel,
                &mut rows,
                &mut alerts,
            );
        }

        // 步骤4: 单件时间线展开
        let piece_timeline = PieceTimelineBuilder::new().build(&rows);

        // 步骤5: 汇总
        let summary = ScheduleSummary {
            total_orders: orders.len(),
            scheduled_rows: rows.iter().filter(|r| r.status == RowStatus::Scheduled).count(),
            blocked_rows: rows.iter().filter(|r| r.is_blocked()).count(),
            skipped_orders,
        };
        info!(
            scheduled = summary.scheduled_rows,
            blocked = summary.blocked_rows,
            skipped = summary.skipped_orders,
            "排产完成"
        );

        Ok(ScheduleOutput {
            rows,
            piece_timeline,
            alerts,
            summary,
        })
    }

    /// 单个订单的全部 (工序 x 批次) 落位
    #[allow(clippy::too_many_arguments)]
    fn schedule_order(
        &self,
        order: &Order,
        lanes: &[Batch],
        parsed: &ParsedSettings,
        calendar: &CalendarService,
        machines: &mut MachineAllocator,
        personnel: &mut PersonnelAllocator,
        rows: &mut Vec<ScheduledRow>,
        alerts: &mut Vec<String>,
    ) {
        // 订单级最早开工: 订单覆盖值优先于全局起点
        let order_floor = order.start_datetime.unwrap_or(parsed.global_start);
        // 每条泳道的落位下限 = 前道工序的运行结束
        let mut lane_floors: Vec<NaiveDateTime> = vec![order_floor; lanes.len()];
        let mut lane_blocked: Vec<bool> = vec![false; lanes.len()];

        for op in &order.operations {
            for (lane_index, lane) in lanes.iter().enumerate() {
                if lane_blocked[lane_index] {
                    // 前道未落位, 后道下限不可知, 级联阻塞
                    rows.push(self.blocked_row(
                        order,
                        op,
                        lane,
                        lane_floors[lane_index],
                        "前道工序未落位".to_string(),
                    ));
                    continue;
                }
                let outcome = self.schedule_unit(
                    order,
                    op,
                    lane,
                    lane_floors[lane_index],
                    parsed,
                    calendar,
                    machines,
                    personnel,
                );
                match outcome {
                    UnitOutcome::Committed {
                        machine,
                        setup_person,
                        setup,
                        production_person,
                        run,
                    } => {
                        lane_floors[lane_index] = run.end;
                        rows.push(ScheduledRow {
                            order_id: order.id.clone(),
                            part_number: order.part_number.clone(),
                            priority: order.priority,
                            due_date: order.due_date,
                            batch_id: lane.batch_id.clone(),
                            batch_qty: lane.quantity,
                            operation_seq: op.sequence_number,
                            operation_name: op.name.clone(),
                            machine,
                            setup_person_name: setup_person,
                            setup_start: setup.start,
                            setup_end: setup.end,
                            production_person_name: production_person,
                            run_start: run.start,
                            run_end: run.end,
                            handle_mode: op.handle_mode,
                            status: RowStatus::Scheduled,
                            reason: None,
                        });
                    }
                    UnitOutcome::Blocked { reason } => {
                        warn!(
                            order_id = %order.id,
                            batch_id = %lane.batch_id,
                            op = op.sequence_number,
                            %reason,
                            "单元无法落位"
                        );
                        alerts.push(format!(
                            "订单 {} 批次 {} 工序 {} 无法落位: {}",
                            order.id, lane.batch_id, op.sequence_number, reason
                        ));
                        lane_blocked[lane_index] = true;
                        rows.push(self.blocked_row(
                            order,
                            op,
                            lane,
                            lane_floors[lane_index],
                            reason,
                        ));
                    }
                }
            }
        }
    }

    /// 单个 (订单, 批次, 工序) 单元的机床-人员协商落位
    #[allow(clippy::too_many_arguments)]
    fn schedule_unit(
        &self,
        order: &Order,
        op: &Operation,
        lane: &Batch,
        unit_floor: NaiveDateTime,
        parsed: &ParsedSettings,
        calendar: &CalendarService,
        machines: &mut MachineAllocator,
        personnel: &mut PersonnelAllocator,
    ) -> UnitOutcome {
        let setup_minutes = op.setup_minutes;
        let run_minutes = op.run_minutes(lane.quantity);
        let mut state = ScheduleState::Pending;
        let mut floor = unit_floor;
        // 机床需连续空闲的时长估算; 人员或窗口拉宽区间后按实际值重估
        let mut required_minutes = setup_minutes + run_minutes;
        trace!(order_id = %order.id, batch_id = %lane.batch_id, %state, %floor, "单元就绪");

        for round in 0..MAX_NEGOTIATION_ROUNDS {
            // --- 机床候选 ---
            state = ScheduleState::AwaitingMachine;
            trace!(order_id = %order.id, batch_id = %lane.batch_id, %state, round, %floor);
            let (machine, machine_slot) = match machines.earliest_free(
                &op.eligible_machines,
                floor,
                required_minutes,
                calendar,
            ) {
                Ok(found) => found,
                Err(err) => return UnitOutcome::Blocked { reason: err.to_string() },
            };

            // --- 人员候选 ---
            state = ScheduleState::AwaitingPersonnel;
            trace!(order_id = %order.id, batch_id = %lane.batch_id, %state, round, machine);

            // 调机: advanced 走调机员选择, basic 只占日历窗口不占人
            let (setup_choice, setup_interval) = match parsed.profile_mode {
                ProfileMode::Advanced => {
                    match personnel.select_setup_person(
                        &machine,
                        machine_slot.start,
                        setup_minutes,
                        calendar,
                    ) {
                        Ok(choice) => {
                            let interval = choice.interval;
                            (Some(choice), interval)
                        }
                        Err(err) => return UnitOutcome::Blocked { reason: err.to_string() },
                    }
                }
                ProfileMode::Basic => {
                    match calendar.next_open_slot(
                        SlotKind::Setup,
                        &machine,
                        None,
                        machine_slot.start,
                        setup_minutes,
                    ) {
                        Ok(interval) => (None, interval),
                        Err(err) => return UnitOutcome::Blocked { reason: err.to_string() },
                    }
                }
            };

            // 运行: 理论起点为调机结束
            let tentative_setup = setup_choice
                .as_ref()
                .map(|choice| (choice.person_index, setup_interval));
            let run_choice = match personnel.select_run_person(
                &machine,
                setup_interval.end,
                run_minutes,
                op.handle_mode,
                tentative_setup,
                calendar,
            ) {
                Ok(choice) => choice,
                Err(err) => return UnitOutcome::Blocked { reason: err.to_string() },
            };

            // --- 定点校验: 机床必须对 [调机开始, 运行结束] 整段空闲 ---
            let span = Interval::new(setup_interval.start, run_choice.interval.end);
            if let Some(resume) = machines.span_conflict(&machine, &span) {
                // 人员把区间拉宽, 机床候选失效: 从拉宽后的起点按实际
                // 时长重新询价, 给其他机床在 resume 之前的空档机会
                debug!(
                    order_id = %order.id,
                    batch_id = %lane.batch_id,
                    round,
                    machine,
                    %resume,
                    "机床窗口失效, 重新协商"
                );
                floor = setup_interval.start;
                required_minutes = span.duration_minutes();
                continue;
            }
            // 红线: 机床预约为连续区间, 不得横跨假日或故障
            if let Some(blocked_at) = calendar.machine_block_within(&machine, &span) {
                debug!(
                    order_id = %order.id,
                    batch_id = %lane.batch_id,
                    round,
                    machine,
                    %blocked_at,
                    "预约区间撞上机床阻塞, 整体顺延"
                );
                floor = calendar.machine_reopen_after(&machine, blocked_at);
                required_minutes = span.duration_minutes();
                continue;
            }

            // --- 提交 ---
            machines.reserve(&machine, span);
            let setup_person_name = match &setup_choice {
                Some(choice) => {
                    personnel.reserve_setup(choice.person_index, setup_interval);
                    choice.name.clone()
                }
                // basic 模式: 调机由生产员自理, 不占调机时间线
                None => run_choice.name.clone(),
            };
            personnel.reserve_run(run_choice.person_index, run_choice.interval, op.handle_mode);

            state = ScheduleState::Committed;
            debug!(
                order_id = %order.id,
                batch_id = %lane.batch_id,
                op = op.sequence_number,
                %state,
                machine,
                setup = %setup_interval,
                run = %run_choice.interval,
                "单元落位"
            );
            return UnitOutcome::Committed {
                machine,
                setup_person: setup_person_name,
                setup: setup_interval,
                production_person: run_choice.name,
                run: run_choice.interval,
            };
        }

        UnitOutcome::Blocked {
            reason: format!("机床-人员协商超过 {} 轮仍未收敛", MAX_NEGOTIATION_ROUNDS),
        }
    }

    /// 构造 Blocked 行: 时间字段填当前下限, 不提交任何预约
    fn blocked_row(
        &self,
        order: &Order,
        op: &Operation,
        lane: &Batch,
        floor: NaiveDateTime,
        reason: String,
    ) -> ScheduledRow {
        ScheduledRow {
            order_id: order.id.clone(),
            part_number: order.part_number.clone(),
            priority: order.priority,
            due_date: order.due_date,
            batch_id: lane.batch_id.clone(),
            batch_qty: lane.quantity,
            operation_seq: op.sequence_number,
            operation_name: op.name.clone(),
            machine: "-".to_string(),
            setup_person_name: "-".to_string(),
            setup_start: floor,
            setup_end: floor,
            production_person_name: "-".to_string(),
            run_start: floor,
            run_end: floor,
            handle_mode: op.handle_mode,
            status: RowStatus::Blocked,
            reason: Some(reason),
        }
    }
}

/// 便捷入口: 一次性执行完整排产
pub fn run_schedule(orders: &[Order], settings: &ScheduleSettings) -> EngineResult<ScheduleOutput> {
    OperationScheduler::new().run(orders, settings)
}
