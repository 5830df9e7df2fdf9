//! 存储接口 Trait 定义
//!
//! - StatusPollStore：状态轮询（只追加）
//! - BusinessHoursStore：营业时间规则
//! - TimezoneStore：门店时区
//! - ReportStore：报表状态存储
//!
//! 设计原则：
//! - 所有接口返回 StorageError
//! - 使用 async_trait 支持动态分发

use crate::error::StorageError;
use crate::models::ReportState;
use async_trait::async_trait;
use domain::{BusinessHoursRule, StatusPoll, StoreTimezone};
use std::sync::Arc;

/// 状态轮询存储接口
#[async_trait]
pub trait StatusPollStore: Send + Sync {
    /// 追加一批轮询，返回写入条数
    async fn append_polls(&self, polls: &[StatusPoll]) -> Result<usize, StorageError>;

    /// 全量快照（按写入顺序）
    async fn list_polls(&self) -> Result<Vec<StatusPoll>, StorageError>;

    /// 所有轮询中的最大时间戳
    async fn max_timestamp_ms(&self) -> Result<Option<i64>, StorageError>;

    /// 清空全部轮询（整表重新加载前调用）
    async fn clear_polls(&self) -> Result<(), StorageError>;
}

/// 营业时间规则存储接口
///
/// 同一门店同一工作日允许多条规则，存储层不合并、不去重。
#[async_trait]
pub trait BusinessHoursStore: Send + Sync {
    async fn insert_rules(&self, rules: &[BusinessHoursRule]) -> Result<usize, StorageError>;

    async fn list_rules(&self) -> Result<Vec<BusinessHoursRule>, StorageError>;

    async fn clear_rules(&self) -> Result<(), StorageError>;
}

/// 门店时区存储接口
///
/// 每个门店最多一条，后写覆盖先写。
#[async_trait]
pub trait TimezoneStore: Send + Sync {
    async fn upsert_timezone(&self, record: StoreTimezone) -> Result<(), StorageError>;

    async fn list_timezones(&self) -> Result<Vec<StoreTimezone>, StorageError>;

    async fn clear_timezones(&self) -> Result<(), StorageError>;
}

/// 报表状态存储接口
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// 登记 report_id 为 Running
    async fn mark_running(&self, report_id: &str) -> Result<(), StorageError>;

    /// 整体替换 report_id 的状态（原子发布）
    async fn publish(&self, state: ReportState) -> Result<(), StorageError>;

    /// 查询指定 report_id
    async fn get_report(&self, report_id: &str)
    -> Result<Option<Arc<ReportState>>, StorageError>;

    /// 最近一次触发的报表状态；从未触发时为 None
    async fn latest_report(&self) -> Result<Option<Arc<ReportState>>, StorageError>;
}
