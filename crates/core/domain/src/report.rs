use crate::data::StoreId;

const MINUTE_MS: i64 = 60_000;
const HOUR_MS: i64 = 60 * MINUTE_MS;

/// 报表窗口：均以参考时刻 `now` 为终点。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportWindow {
    LastHour,
    LastDay,
    LastWeek,
}

impl ReportWindow {
    pub const ALL: [ReportWindow; 3] = [
        ReportWindow::LastHour,
        ReportWindow::LastDay,
        ReportWindow::LastWeek,
    ];

    pub fn duration_ms(&self) -> i64 {
        match self {
            ReportWindow::LastHour => HOUR_MS,
            ReportWindow::LastDay => 24 * HOUR_MS,
            ReportWindow::LastWeek => 168 * HOUR_MS,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportWindow::LastHour => "last_hour",
            ReportWindow::LastDay => "last_day",
            ReportWindow::LastWeek => "last_week",
        }
    }

    /// 窗口 `[now - duration, now)` 的起点。
    pub fn start_ms(&self, now_ms: i64) -> i64 {
        now_ms.saturating_sub(self.duration_ms())
    }
}

/// 单个门店在单个窗口内的在线/离线时长。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UptimeDowntimeRecord {
    pub window: ReportWindow,
    pub uptime_ms: i64,
    pub downtime_ms: i64,
    /// 窗口内计划营业总时长。
    pub open_ms: i64,
}

impl UptimeDowntimeRecord {
    pub fn uptime_minutes(&self) -> f64 {
        self.uptime_ms as f64 / MINUTE_MS as f64
    }

    pub fn downtime_minutes(&self) -> f64 {
        self.downtime_ms as f64 / MINUTE_MS as f64
    }

    pub fn open_minutes(&self) -> f64 {
        self.open_ms as f64 / MINUTE_MS as f64
    }
}

/// 单个门店的三窗口报表行。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreReport {
    pub store_id: StoreId,
    pub last_hour: UptimeDowntimeRecord,
    pub last_day: UptimeDowntimeRecord,
    pub last_week: UptimeDowntimeRecord,
}

impl StoreReport {
    pub fn window(&self, window: ReportWindow) -> &UptimeDowntimeRecord {
        match window {
            ReportWindow::LastHour => &self.last_hour,
            ReportWindow::LastDay => &self.last_day,
            ReportWindow::LastWeek => &self.last_week,
        }
    }
}

/// 一次生成的完整报表（按 store_id 升序）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub now_ms: i64,
    pub stores: Vec<StoreReport>,
}
