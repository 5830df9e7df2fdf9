//! # Uptime Storage 模块
//!
//! 报表引擎的存储抽象层：三张输入表（状态轮询、营业时间、时区）
//! 与报表状态存储（Report Status Store）。
//!
//! ## 架构设计
//!
//! 1. **接口抽象层** (`traits.rs`)：所有存储的异步 Trait 接口
//! 2. **数据模型层** (`models.rs`)：报表状态（Running / Complete / NoData / Failed）
//! 3. **错误处理层** (`error.rs`)：统一的存储错误类型
//! 4. **验证辅助层** (`validation.rs`)：报表 ID 校验
//! 5. **实现层** (`in_memory/`)：基于 `RwLock` 的内存实现
//!
//! ## 报表状态存储
//!
//! 报表在外部完整计算后一次性发布：`publish` 在单次写锁内整体替换
//! 对应 report_id 的状态，读者只会看到旧值或完整的新值，
//! 不会观察到写了一半的报表。
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use uptime_storage::{InMemoryReportStore, ReportState, ReportStore};
//!
//! let store = InMemoryReportStore::new();
//! store.mark_running("report-1").await?;
//! store.publish(ReportState::complete("report-1", report)).await?;
//! let latest = store.latest_report().await?;
//! ```

pub mod error;
pub mod in_memory;
pub mod models;
pub mod traits;
pub mod validation;

pub use error::*;
pub use models::*;
pub use traits::*;
pub use validation::*;

pub use in_memory::{
    InMemoryBusinessHoursStore, InMemoryReportStore, InMemoryStatusPollStore,
    InMemoryTimezoneStore,
};
