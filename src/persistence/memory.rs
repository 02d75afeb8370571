use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::CartStorage;
use crate::{Result, StoreError};

/// Process-local snapshot slots. Used in tests and when no database is wired.
#[derive(Default)]
pub struct MemoryCartStorage {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryCartStorage {
    fn slots(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.slots.lock().map_err(|_| StoreError::Storage("cart storage lock poisoned".into()))
    }

    pub fn len(&self) -> usize { self.slots.lock().map(|s| s.len()).unwrap_or(0) }
    pub fn is_empty(&self) -> bool { self.len() == 0 }
}

#[async_trait]
impl CartStorage for MemoryCartStorage {
    async fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots()?.get(key).cloned())
    }

    async fn save(&self, key: &str, payload: &str) -> Result<()> {
        self.slots()?.insert(key.to_string(), payload.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.slots()?.remove(key);
        Ok(())
    }
}
