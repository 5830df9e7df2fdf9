//! 营业时间规则内存实现

use crate::error::StorageError;
use crate::traits::BusinessHoursStore;
use domain::BusinessHoursRule;
use std::sync::RwLock;

/// 营业时间规则内存存储
pub struct InMemoryBusinessHoursStore {
    rules: RwLock<Vec<BusinessHoursRule>>,
}

impl InMemoryBusinessHoursStore {
    pub fn new() -> Self {
        Self {
            rules: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryBusinessHoursStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl BusinessHoursStore for InMemoryBusinessHoursStore {
    async fn insert_rules(&self, rules: &[BusinessHoursRule]) -> Result<usize, StorageError> {
        let mut store = self
            .rules
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        store.extend_from_slice(rules);
        Ok(rules.len())
    }

    async fn list_rules(&self) -> Result<Vec<BusinessHoursRule>, StorageError> {
        let store = self
            .rules
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(store.clone())
    }

    async fn clear_rules(&self) -> Result<(), StorageError> {
        self.rules
            .write()
            .map_err(|_| StorageError::new("lock failed"))?
            .clear();
        Ok(())
    }
}
