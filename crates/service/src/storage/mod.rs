//! Storage abstractions for the service layer
//!
//! A collection lives in one JSON file holding an array of records. The
//! `CollectionStore` trait is the seam services depend on; `JsonArrayStore`
//! is the file-backed implementation.

pub mod collection;
pub mod json_array_store;

use async_trait::async_trait;
use tokio::sync::OwnedMutexGuard;
use tracing::debug;

use crate::errors::ServiceError;
pub use collection::{Collection, Record};
pub use json_array_store::{JsonArrayStore, StoreOptions};

/// Read/write access to one collection, identified by its key field.
#[async_trait]
pub trait CollectionStore: Send + Sync {
    /// Name of the identifying field (`id`, `order_id`, ...).
    fn key_field(&self) -> &str;

    /// Short label for logs and metrics.
    fn label(&self) -> &str;

    /// Whether corrupt data and update/delete misses are surfaced as errors.
    fn strict(&self) -> bool;

    /// Fail-open read: anything unreadable is an empty collection.
    async fn load(&self) -> Collection;

    /// Read that reports I/O failures other than absence.
    /// Corrupt content is an error only for strict stores.
    async fn try_load(&self) -> Result<Collection, ServiceError>;

    /// Overwrite the whole file with `collection`.
    async fn save(&self, collection: &Collection) -> Result<(), ServiceError>;

    /// Exclusive access for a read-modify-write cycle, when the store serializes writes.
    async fn write_guard(&self) -> Option<OwnedMutexGuard<()>>;
}

/// What a mutation decided about the collection it was handed.
pub enum Mutation<T> {
    /// The collection changed and must be saved.
    Persist(T),
    /// Nothing changed; skip the write.
    Discard(T),
}

/// Load honoring the store's policy: fail-open by default, checked when strict.
pub async fn read<S>(store: &S) -> Result<Collection, ServiceError>
where
    S: CollectionStore + ?Sized,
{
    if store.strict() {
        store.try_load().await
    } else {
        Ok(store.load().await)
    }
}

/// Load, mutate and save one collection.
///
/// Without `serialize_writes` two concurrent calls race and the last save wins.
pub async fn modify<S, F, T>(store: &S, f: F) -> Result<T, ServiceError>
where
    S: CollectionStore + ?Sized,
    F: FnOnce(&mut Collection) -> Mutation<T>,
{
    let _guard = store.write_guard().await;
    let mut collection = read(store).await?;
    match f(&mut collection) {
        Mutation::Persist(out) => {
            store.save(&collection).await?;
            Ok(out)
        }
        Mutation::Discard(out) => {
            debug!(collection = store.label(), "mutation left collection unchanged; skipping save");
            Ok(out)
        }
    }
}
