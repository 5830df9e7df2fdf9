//! 门店时区内存实现

use crate::error::StorageError;
use crate::traits::TimezoneStore;
use domain::{StoreId, StoreTimezone};
use std::collections::BTreeMap;
use std::sync::RwLock;

/// 门店时区内存存储（按 store_id 排序输出）
pub struct InMemoryTimezoneStore {
    timezones: RwLock<BTreeMap<StoreId, String>>,
}

impl InMemoryTimezoneStore {
    pub fn new() -> Self {
        Self {
            timezones: RwLock::new(BTreeMap::new()),
        }
    }
}

impl Default for InMemoryTimezoneStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl TimezoneStore for InMemoryTimezoneStore {
    async fn upsert_timezone(&self, record: StoreTimezone) -> Result<(), StorageError> {
        let mut map = self
            .timezones
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        map.insert(record.store_id, record.timezone);
        Ok(())
    }

    async fn list_timezones(&self) -> Result<Vec<StoreTimezone>, StorageError> {
        let map = self
            .timezones
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(map
            .iter()
            .map(|(store_id, timezone)| StoreTimezone {
                store_id: *store_id,
                timezone: timezone.clone(),
            })
            .collect())
    }

    async fn clear_timezones(&self) -> Result<(), StorageError> {
        self.timezones
            .write()
            .map_err(|_| StorageError::new("lock failed"))?
            .clear();
        Ok(())
    }
}
