//! 状态轮询内存实现

use crate::error::StorageError;
use crate::traits::StatusPollStore;
use domain::StatusPoll;
use std::sync::RwLock;

/// 状态轮询内存存储
pub struct InMemoryStatusPollStore {
    polls: RwLock<Vec<StatusPoll>>,
}

impl InMemoryStatusPollStore {
    pub fn new() -> Self {
        Self {
            polls: RwLock::new(Vec::new()),
        }
    }

    /// 当前累计的轮询数量（用于测试）
    pub fn len(&self) -> usize {
        self.polls.read().map(|v| v.len()).unwrap_or(0)
    }
}

impl Default for InMemoryStatusPollStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl StatusPollStore for InMemoryStatusPollStore {
    async fn append_polls(&self, polls: &[StatusPoll]) -> Result<usize, StorageError> {
        let mut store = self
            .polls
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        store.extend_from_slice(polls);
        Ok(polls.len())
    }

    async fn list_polls(&self) -> Result<Vec<StatusPoll>, StorageError> {
        let store = self
            .polls
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(store.clone())
    }

    async fn max_timestamp_ms(&self) -> Result<Option<i64>, StorageError> {
        let store = self
            .polls
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(store.iter().map(|poll| poll.ts_ms).max())
    }

    async fn clear_polls(&self) -> Result<(), StorageError> {
        self.polls
            .write()
            .map_err(|_| StorageError::new("lock failed"))?
            .clear();
        Ok(())
    }
}
