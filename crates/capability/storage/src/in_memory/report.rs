//! 报表状态内存实现
//!
//! 每个 report_id 对应一个 `Arc<ReportState>`，发布时整体替换。
//! 超出容量时淘汰最早登记的报表（最近一次始终保留）。

use crate::error::StorageError;
use crate::models::ReportState;
use crate::traits::ReportStore;
use crate::validation::ensure_report_id;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};

const DEFAULT_CAPACITY: usize = 16;

struct Entries {
    states: HashMap<String, Arc<ReportState>>,
    order: VecDeque<String>,
    latest: Option<String>,
    capacity: usize,
}

impl Entries {
    fn evict(&mut self) {
        while self.states.len() > self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            if self.latest.as_deref() == Some(oldest.as_str()) {
                self.order.push_back(oldest);
                break;
            }
            self.states.remove(&oldest);
        }
    }
}

/// 报表状态内存存储
pub struct InMemoryReportStore {
    entries: RwLock<Entries>,
}

impl InMemoryReportStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// 最多保留 `capacity` 个 report_id（至少 1 个）
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(Entries {
                states: HashMap::new(),
                order: VecDeque::new(),
                latest: None,
                capacity: capacity.max(1),
            }),
        }
    }

    /// 当前保留的报表数量（用于测试）
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.states.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryReportStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ReportStore for InMemoryReportStore {
    async fn mark_running(&self, report_id: &str) -> Result<(), StorageError> {
        ensure_report_id(report_id)?;
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let state = Arc::new(ReportState::running(report_id));
        if entries
            .states
            .insert(report_id.to_string(), state)
            .is_none()
        {
            entries.order.push_back(report_id.to_string());
        }
        entries.latest = Some(report_id.to_string());
        entries.evict();
        Ok(())
    }

    async fn publish(&self, state: ReportState) -> Result<(), StorageError> {
        ensure_report_id(&state.report_id)?;
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let report_id = state.report_id.clone();
        if entries
            .states
            .insert(report_id.clone(), Arc::new(state))
            .is_none()
        {
            entries.order.push_back(report_id.clone());
            entries.latest = Some(report_id);
        }
        entries.evict();
        Ok(())
    }

    async fn get_report(
        &self,
        report_id: &str,
    ) -> Result<Option<Arc<ReportState>>, StorageError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(entries.states.get(report_id).cloned())
    }

    async fn latest_report(&self) -> Result<Option<Arc<ReportState>>, StorageError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(entries
            .latest
            .as_ref()
            .and_then(|report_id| entries.states.get(report_id))
            .cloned())
    }
}
