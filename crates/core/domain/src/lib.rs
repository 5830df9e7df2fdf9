pub mod data;
pub mod report;

pub use data::{
    BusinessHoursRule, Observation, RawRow, RawTable, StatusPoll, StoreId, StoreStatus,
    StoreTimezone,
};
pub use report::{Report, ReportWindow, StoreReport, UptimeDowntimeRecord};

/// 未配置时区的门店使用的默认时区。
pub const DEFAULT_TIMEZONE: &str = "America/Chicago";
