use super::error::InfrastructureError;
use crate::domain::image_store::ImageStore;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Bounded in-process store; the oldest entry is evicted once `capacity` is exceeded.
pub struct InMemoryImageStore {
    capacity: usize,
    inner: RwLock<Entries>,
}

#[derive(Default)]
struct Entries {
    images: HashMap<String, Vec<u8>>,
    order: VecDeque<String>,
}

impl InMemoryImageStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: RwLock::new(Entries::default()),
        }
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.inner.read().await.images.len()
    }
}

#[async_trait]
impl ImageStore for InMemoryImageStore {
    async fn put(&self, bytes: Vec<u8>) -> Result<String, InfrastructureError> {
        let key = Uuid::new_v4().to_string();
        let mut entries = self.inner.write().await;
        entries.images.insert(key.clone(), bytes);
        entries.order.push_back(key.clone());
        while entries.order.len() > self.capacity {
            if let Some(evicted) = entries.order.pop_front() {
                entries.images.remove(&evicted);
                log::debug!("Evicted image {} from memory store", evicted);
            }
        }
        Ok(key)
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, InfrastructureError> {
        Ok(self.inner.read().await.images.get(key).cloned())
    }
}
