use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use tokio::{
    fs,
    sync::{Mutex, OwnedMutexGuard},
};
use tracing::{debug, info, warn};

use super::{Collection, CollectionStore};
use crate::errors::ServiceError;
use crate::observability::{
    STORE_FALLBACKS_TOTAL, STORE_LOADS_TOTAL, STORE_SAVES_TOTAL, STORE_SAVE_ERRORS_TOTAL,
};

// One lock per collection file, shared by every store instance in the process.
static FILE_LOCKS: Lazy<DashMap<PathBuf, Arc<Mutex<()>>>> = Lazy::new(DashMap::new);

/// Opt-in hardening; both off by default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StoreOptions {
    pub strict: bool,
    pub serialize_writes: bool,
}

enum ReadFailure {
    Missing,
    Io(std::io::Error),
    Corrupt(serde_json::Error),
}

/// Generic JSON file-backed record store.
///
/// Persists a [`Collection`] as a pretty-printed JSON array and looks records up
/// by `key_field`. The file is re-read on every load; nothing is cached.
#[derive(Clone, Debug)]
pub struct JsonArrayStore {
    file_path: PathBuf,
    key_field: String,
    label: String,
    options: StoreOptions,
}

impl JsonArrayStore {
    pub fn new<P: Into<PathBuf>>(path: P, key_field: impl Into<String>) -> Self {
        Self::with_options(path, key_field, StoreOptions::default())
    }

    pub fn with_options<P: Into<PathBuf>>(
        path: P,
        key_field: impl Into<String>,
        options: StoreOptions,
    ) -> Self {
        let file_path = path.into();
        let label = file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_path.display().to_string());
        Self { file_path, key_field: key_field.into(), label, options }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    pub fn options(&self) -> StoreOptions {
        self.options
    }

    async fn read(&self) -> Result<Collection, ReadFailure> {
        STORE_LOADS_TOTAL.with_label_values(&[self.label.as_str()]).inc();
        let bytes = match fs::read(&self.file_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(ReadFailure::Missing),
            Err(e) => return Err(ReadFailure::Io(e)),
        };
        serde_json::from_slice(&bytes).map_err(ReadFailure::Corrupt)
    }

    fn lock_key(&self) -> PathBuf {
        if self.file_path.is_absolute() {
            return self.file_path.clone();
        }
        std::env::current_dir()
            .map(|cwd| cwd.join(&self.file_path))
            .unwrap_or_else(|_| self.file_path.clone())
    }

    fn fallback(&self, reason: &str) {
        STORE_FALLBACKS_TOTAL.with_label_values(&[self.label.as_str(), reason]).inc();
    }
}

#[async_trait]
impl CollectionStore for JsonArrayStore {
    fn key_field(&self) -> &str {
        &self.key_field
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn strict(&self) -> bool {
        self.options.strict
    }

    async fn load(&self) -> Collection {
        match self.read().await {
            Ok(c) => c,
            Err(ReadFailure::Missing) => {
                debug!(path = %self.file_path.display(), "collection file missing; treating as empty");
                self.fallback("missing");
                Collection::new()
            }
            Err(ReadFailure::Io(e)) => {
                warn!(path = %self.file_path.display(), error = %e, "error reading collection file; treating as empty");
                self.fallback("io");
                Collection::new()
            }
            Err(ReadFailure::Corrupt(e)) => {
                warn!(path = %self.file_path.display(), error = %e, "error parsing collection file; treating as empty");
                self.fallback("corrupt");
                Collection::new()
            }
        }
    }

    async fn try_load(&self) -> Result<Collection, ServiceError> {
        match self.read().await {
            Ok(c) => Ok(c),
            Err(ReadFailure::Missing) => {
                self.fallback("missing");
                Ok(Collection::new())
            }
            Err(ReadFailure::Io(e)) => Err(ServiceError::io(&self.file_path, e)),
            Err(ReadFailure::Corrupt(e)) if self.options.strict => Err(ServiceError::Corrupt {
                path: self.file_path.display().to_string(),
                reason: e.to_string(),
            }),
            Err(ReadFailure::Corrupt(e)) => {
                warn!(path = %self.file_path.display(), error = %e, "error parsing collection file; treating as empty");
                self.fallback("corrupt");
                Ok(Collection::new())
            }
        }
    }

    async fn save(&self, collection: &Collection) -> Result<(), ServiceError> {
        let data = serde_json::to_vec_pretty(collection)?;
        if let Err(e) = fs::write(&self.file_path, data).await {
            STORE_SAVE_ERRORS_TOTAL.with_label_values(&[self.label.as_str()]).inc();
            warn!(path = %self.file_path.display(), error = %e, "error writing collection file");
            return Err(ServiceError::io(&self.file_path, e));
        }
        STORE_SAVES_TOTAL.with_label_values(&[self.label.as_str()]).inc();
        info!(path = %self.file_path.display(), records = collection.len(), "collection saved");
        Ok(())
    }

    async fn write_guard(&self) -> Option<OwnedMutexGuard<()>> {
        if !self.options.serialize_writes {
            return None;
        }
        let lock = FILE_LOCKS
            .entry(self.lock_key())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        Some(lock.lock_owned().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{modify, Mutation, Record};
    use crate::test_support::temp_path;
    use serde_json::json;

    fn rec(v: serde_json::Value) -> Record {
        v.as_object().cloned().expect("object")
    }

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let store = JsonArrayStore::new(temp_path("missing"), "id");
        assert!(store.load().await.is_empty());
        assert!(store.try_load().await.expect("absence is not an error").is_empty());
        // loading never creates the file
        assert!(fs::metadata(store.path()).await.is_err());
    }

    #[tokio::test]
    async fn corrupt_file_loads_empty() -> Result<(), anyhow::Error> {
        let path = temp_path("corrupt");
        let inputs: [&[u8]; 4] = [b"{not json", b"", b"{\"id\": 1}", b"[1, 2, 3]"];
        for garbage in inputs {
            fs::write(&path, garbage).await?;
            let store = JsonArrayStore::new(&path, "id");
            assert!(store.load().await.is_empty());
            assert!(store.try_load().await?.is_empty());
        }
        let _ = fs::remove_file(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn strict_store_reports_corruption() -> Result<(), anyhow::Error> {
        let path = temp_path("strict_corrupt");
        fs::write(&path, b"{not json").await?;
        let store = JsonArrayStore::with_options(
            &path,
            "id",
            StoreOptions { strict: true, serialize_writes: false },
        );
        assert!(store.load().await.is_empty());
        assert!(matches!(store.try_load().await, Err(ServiceError::Corrupt { .. })));
        let _ = fs::remove_file(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn unreadable_path_is_io_error_for_try_load() -> Result<(), anyhow::Error> {
        let dir = temp_path("dir_as_file");
        fs::create_dir_all(&dir).await?;
        let store = JsonArrayStore::new(&dir, "id");
        assert!(store.load().await.is_empty());
        assert!(matches!(store.try_load().await, Err(ServiceError::Io { .. })));
        assert!(matches!(store.save(&Collection::new()).await, Err(ServiceError::Io { .. })));
        let _ = fs::remove_dir_all(&dir).await;
        Ok(())
    }

    #[tokio::test]
    async fn save_writes_pretty_array_and_reloads() -> Result<(), anyhow::Error> {
        let path = temp_path("save");
        let store = JsonArrayStore::new(&path, "id");
        let c = Collection::from(vec![rec(json!({"name": "Widget", "id": 1}))]);
        store.save(&c).await?;

        let text = fs::read_to_string(&path).await?;
        assert_eq!(text, "[\n  {\n    \"name\": \"Widget\",\n    \"id\": 1\n  }\n]");
        assert_eq!(store.load().await, c);

        store.save(&Collection::new()).await?;
        assert_eq!(fs::read_to_string(&path).await?, "[]");
        let _ = fs::remove_file(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn modify_skips_save_on_discard() -> Result<(), anyhow::Error> {
        let path = temp_path("discard");
        let store = JsonArrayStore::new(&path, "id");
        let hit = modify(&store, |c| {
            let patch = rec(json!({"price": 1}));
            if c.upsert_merge("id", &json!(7), patch) {
                Mutation::Persist(true)
            } else {
                Mutation::Discard(false)
            }
        })
        .await?;
        assert!(!hit);
        assert!(fs::metadata(&path).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn serialized_writes_do_not_lose_updates() -> Result<(), anyhow::Error> {
        let path = temp_path("serialized");
        let opts = StoreOptions { strict: false, serialize_writes: true };
        let mut tasks = Vec::new();
        for i in 0..16 {
            // separate instances on the same file share the lock
            let store = JsonArrayStore::with_options(&path, "id", opts);
            tasks.push(tokio::spawn(async move {
                modify(&store, |c| {
                    c.append(rec(json!({"id": i})));
                    Mutation::Persist(())
                })
                .await
            }));
        }
        for t in tasks {
            t.await??;
        }
        let store = JsonArrayStore::new(&path, "id");
        assert_eq!(store.load().await.len(), 16);
        let _ = fs::remove_file(&path).await;
        Ok(())
    }
}
