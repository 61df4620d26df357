#![cfg(test)]
use std::{
    path::PathBuf,
    sync::atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use tokio::sync::OwnedMutexGuard;

use crate::errors::ServiceError;
use crate::storage::{Collection, CollectionStore};

/// Unique, not-yet-existing file path under the system temp dir.
pub fn temp_path(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("storefront_{}_{}.json", tag, uuid::Uuid::new_v4()))
}

/// In-memory store that counts file accesses and can be told to fail saves.
pub struct SpyStore {
    key_field: &'static str,
    pub data: tokio::sync::Mutex<Collection>,
    pub loads: AtomicUsize,
    pub saves: AtomicUsize,
    pub fail_saves: bool,
}

impl SpyStore {
    pub fn new(key_field: &'static str, data: Collection) -> Self {
        Self {
            key_field,
            data: tokio::sync::Mutex::new(data),
            loads: AtomicUsize::new(0),
            saves: AtomicUsize::new(0),
            fail_saves: false,
        }
    }

    pub fn failing(key_field: &'static str) -> Self {
        Self { fail_saves: true, ..Self::new(key_field, Collection::new()) }
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CollectionStore for SpyStore {
    fn key_field(&self) -> &str {
        self.key_field
    }

    fn label(&self) -> &str {
        "spy"
    }

    fn strict(&self) -> bool {
        false
    }

    async fn load(&self) -> Collection {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.data.lock().await.clone()
    }

    async fn try_load(&self) -> Result<Collection, ServiceError> {
        Ok(self.load().await)
    }

    async fn save(&self, collection: &Collection) -> Result<(), ServiceError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        if self.fail_saves {
            return Err(ServiceError::io(
                std::path::Path::new("spy.json"),
                std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            ));
        }
        *self.data.lock().await = collection.clone();
        Ok(())
    }

    async fn write_guard(&self) -> Option<OwnedMutexGuard<()>> {
        None
    }
}
