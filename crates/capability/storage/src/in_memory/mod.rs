//! 内存存储实现模块
//!
//! 输入表在报表计算前整体加载到内存；报表状态仅在进程生命周期内保留。
//!
//! 包含以下实现：
//! - StatusPollStore: InMemoryStatusPollStore
//! - BusinessHoursStore: InMemoryBusinessHoursStore
//! - TimezoneStore: InMemoryTimezoneStore
//! - ReportStore: InMemoryReportStore

pub mod business_hours;
pub mod report;
pub mod status_poll;
pub mod timezone;

pub use business_hours::*;
pub use report::*;
pub use status_poll::*;
pub use timezone::*;
