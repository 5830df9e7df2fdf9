//! # Uptime Report 引擎
//!
//! 按门店计算最近一小时 / 一天 / 一周营业时间内的在线与离线时长。
//!
//! - `timezone`：门店时区解析（缺失回落默认时区）
//! - `business_hours`：营业时间索引（缺失视为全天营业）
//! - `schedule`：报表窗口与营业时间求交，本地时间 -> UTC
//! - `aggregate`：阶跃插值汇总
//! - `builder`：单次报表组装，参考时刻取最大轮询时间
//! - `service`：触发、并行计算与发布

pub mod aggregate;
pub mod builder;
pub mod business_hours;
pub mod error;
pub mod schedule;
pub mod service;
pub mod timezone;

pub use aggregate::{Aggregate, aggregate};
pub use builder::{Dataset, ReportBuilder};
pub use business_hours::{BusinessHoursIndex, LocalInterval};
pub use error::ReportError;
pub use schedule::{Intersector, UtcInterval, covers, local_to_utc_ms, merge_intervals};
pub use service::{DatasetLoader, ReportService, ReportServiceConfig};
pub use timezone::TimezoneResolver;
