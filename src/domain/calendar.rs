// ==========================================
// 机加工车间排产系统 - 日历领域模型
// ==========================================
// 红线: 日历实体只读, 排产过程中不可变更
// ==========================================

use chrono::{Duration, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// Interval - 半开时间区间 [start, end)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub start: NaiveDateTime, // 起始时刻 (含)
    pub end: NaiveDateTime,   // 结束时刻 (不含)
}

impl Interval {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// 按起点与时长构造
    pub fn from_minutes(start: NaiveDateTime, minutes: i64) -> Self {
        Self {
            start,
            end: start + Duration::minutes(minutes),
        }
    }

    /// 半开区间重叠判定
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// 判断时刻是否落在区间内
    pub fn contains(&self, t: NaiveDateTime) -> bool {
        self.start <= t && t < self.end
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} ~ {})", self.start, self.end)
    }
}

// ==========================================
// ClockWindow - 每日循环的钟点窗口
// ==========================================
// 形如 "06:00-22:00"; 结束不晚于开始视为跨夜窗口 (如 "22:00-06:00"),
// "00:00-00:00" 表示全天开放
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockWindow {
    pub start_minute: u32, // 窗口起点 (当日第几分钟)
    pub end_minute: u32,   // 窗口终点 (当日第几分钟)
    pub overnight: bool,   // 是否跨夜
    pub raw: String,       // 原始配置串
}

impl ClockWindow {
    /// 解析 "HH:MM-HH:MM" 窗口串
    ///
    /// # 参数
    /// - `raw`: 窗口配置串
    ///
    /// # 返回
    /// 解析失败时返回错误描述 (由配置校验层转为致命错误)
    pub fn parse(raw: &str) -> Result<Self, String> {
        let trimmed = raw.trim();
        let (lhs, rhs) = trimmed
            .split_once('-')
            .ok_or_else(|| format!("窗口格式错误: {}", raw))?;
        let start_minute = Self::parse_clock(lhs)
            .ok_or_else(|| format!("窗口起点无效: {}", raw))?;
        let end_minute = Self::parse_clock(rhs)
            .ok_or_else(|| format!("窗口终点无效: {}", raw))?;
        Ok(Self {
            start_minute,
            end_minute,
            overnight: end_minute <= start_minute,
            raw: trimmed.to_string(),
        })
    }

    fn parse_clock(part: &str) -> Option<u32> {
        let (h, m) = part.trim().split_once(':')?;
        let hours: u32 = h.parse().ok()?;
        let minutes: u32 = m.parse().ok()?;
        if hours > 23 || minutes > 59 {
            return None;
        }
        Some(hours * 60 + minutes)
    }

    /// 判断时刻所在分钟是否落在窗口内
    pub fn contains(&self, t: NaiveDateTime) -> bool {
        let minute = t.hour() * 60 + t.minute();
        if self.overnight {
            minute >= self.start_minute || minute < self.end_minute
        } else {
            minute >= self.start_minute && minute < self.end_minute
        }
    }

    /// 下一次进入窗口的时刻 (若已在窗口内则返回原时刻)
    pub fn next_entry_after(&self, t: NaiveDateTime) -> NaiveDateTime {
        if self.contains(t) {
            return t;
        }
        let today_start = t
            .date()
            .and_hms_opt(self.start_minute / 60, self.start_minute % 60, 0)
            .unwrap_or(t);
        if today_start > t {
            today_start
        } else {
            today_start + Duration::days(1)
        }
    }
}

impl fmt::Display for ClockWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

// ==========================================
// Holiday - 假日
// ==========================================
// 假日区间内所有机床与所有人员全局阻塞
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    pub start: NaiveDateTime, // 起始时刻
    pub end: NaiveDateTime,   // 结束时刻
}

impl Holiday {
    pub fn contains(&self, t: NaiveDateTime) -> bool {
        self.start <= t && t < self.end
    }
}

// ==========================================
// Breakdown - 机床故障
// ==========================================
// 故障区间内仅阻塞清单中列出的机床
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakdown {
    pub machines: Vec<String>, // 受影响机床
    pub start: NaiveDateTime,  // 起始时刻
    pub end: NaiveDateTime,    // 结束时刻
}

impl Breakdown {
    pub fn blocks(&self, machine: &str, t: NaiveDateTime) -> bool {
        self.start <= t && t < self.end && self.machines.iter().any(|m| m == machine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    #[test]
    fn test_parse_day_window() {
        let w = ClockWindow::parse("06:00-22:00").unwrap();
        assert_eq!(w.start_minute, 360);
        assert_eq!(w.end_minute, 1320);
        assert!(!w.overnight);
        assert!(w.contains(dt("2026-02-20 06:00")));
        assert!(w.contains(dt("2026-02-20 21:59")));
        assert!(!w.contains(dt("2026-02-20 22:00")));
        assert!(!w.contains(dt("2026-02-20 05:59")));
    }

    #[test]
    fn test_parse_overnight_window() {
        let w = ClockWindow::parse("22:00-06:00").unwrap();
        assert!(w.overnight);
        assert!(w.contains(dt("2026-02-20 23:30")));
        assert!(w.contains(dt("2026-02-20 03:00")));
        assert!(!w.contains(dt("2026-02-20 12:00")));
    }

    #[test]
    fn test_full_day_window() {
        let w = ClockWindow::parse("00:00-00:00").unwrap();
        assert!(w.overnight);
        assert!(w.contains(dt("2026-02-20 00:00")));
        assert!(w.contains(dt("2026-02-20 23:59")));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(ClockWindow::parse("0600-2200").is_err());
        assert!(ClockWindow::parse("25:00-26:00").is_err());
        assert!(ClockWindow::parse("abc").is_err());
    }

    #[test]
    fn test_next_entry_after() {
        let w = ClockWindow::parse("06:00-22:00").unwrap();
        // 窗口内: 原样返回
        assert_eq!(w.next_entry_after(dt("2026-02-20 08:00")), dt("2026-02-20 08:00"));
        // 窗口前: 当日 06:00
        assert_eq!(w.next_entry_after(dt("2026-02-20 03:00")), dt("2026-02-20 06:00"));
        // 窗口后: 次日 06:00
        assert_eq!(w.next_entry_after(dt("2026-02-20 22:30")), dt("2026-02-21 06:00"));
    }

    #[test]
    fn test_interval_overlap() {
        let base = NaiveDate::from_ymd_opt(2026, 2, 20).unwrap();
        let a = Interval::new(
            base.and_hms_opt(6, 0, 0).unwrap(),
            base.and_hms_opt(8, 0, 0).unwrap(),
        );
        let b = Interval::new(
            base.and_hms_opt(8, 0, 0).unwrap(),
            base.and_hms_opt(9, 0, 0).unwrap(),
        );
        // 半开区间: 首尾相接不算重叠
        assert!(!a.overlaps(&b));
        let c = Interval::new(
            base.and_hms_opt(7, 0, 0).unwrap(),
            base.and_hms_opt(8, 30, 0).unwrap(),
        );
        assert!(a.overlaps(&c));
        assert!(b.overlaps(&c));
    }

    #[test]
    fn test_breakdown_blocks_only_listed_machines() {
        let bd = Breakdown {
            machines: vec!["VMC 1".to_string()],
            start: dt("2026-02-20 06:00"),
            end: dt("2026-02-20 20:00"),
        };
        assert!(bd.blocks("VMC 1", dt("2026-02-20 10:00")));
        assert!(!bd.blocks("VMC 2", dt("2026-02-20 10:00")));
        assert!(!bd.blocks("VMC 1", dt("2026-02-20 20:00")));
    }
}
