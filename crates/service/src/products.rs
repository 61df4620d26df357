use std::{path::PathBuf, sync::Arc};

use serde_json::Value;
use tracing::{info, warn};

use crate::errors::ServiceError;
use crate::ids;
use crate::storage::{self, CollectionStore, JsonArrayStore, Mutation, Record, StoreOptions};

/// Identifying field of a product record.
pub const PRODUCT_KEY: &str = "id";

/// Product catalogue backed by one collection store.
#[derive(Clone)]
pub struct ProductService {
    store: Arc<dyn CollectionStore>,
}

impl ProductService {
    pub fn new(store: Arc<dyn CollectionStore>) -> Self {
        Self { store }
    }

    /// Products stored in a JSON file at `path`.
    pub fn from_path<P: Into<PathBuf>>(path: P, options: StoreOptions) -> Self {
        Self::new(Arc::new(JsonArrayStore::with_options(path, PRODUCT_KEY, options)))
    }

    /// Products whose `name` contains `name`, ignoring case, in stored order.
    ///
    /// A missing or empty query is rejected before the file is touched.
    /// Unlike the other operations this one reports read failures.
    pub async fn search(&self, name: Option<&str>) -> Result<Vec<Record>, ServiceError> {
        let needle = match name {
            Some(n) if !n.is_empty() => n.to_lowercase(),
            _ => return Err(ServiceError::Validation("Product name is required".into())),
        };
        let products = self.store.try_load().await?;
        let matches: Vec<Record> = products
            .into_records()
            .into_iter()
            .filter(|p| {
                p.get("name")
                    .and_then(Value::as_str)
                    .is_some_and(|n| n.to_lowercase().contains(&needle))
            })
            .collect();
        info!(query = %needle, matches = matches.len(), "product search");
        Ok(matches)
    }

    /// Append a product with a freshly generated `id` and persist; returns the id.
    /// A client-supplied `id` is overwritten.
    pub async fn create(&self, mut fields: Record) -> Result<i64, ServiceError> {
        let key = self.store.key_field().to_owned();
        storage::modify(self.store.as_ref(), move |products| {
            let id = ids::next_id();
            fields.insert(key, Value::from(id));
            products.append(fields);
            Mutation::Persist(id)
        })
        .await
        .inspect(|id| info!(product_id = id, "product added"))
    }

    /// Merge `patch` into the product with `id`.
    ///
    /// A miss leaves the file alone and is reported as `Ok(false)`, or as
    /// `NotFound` when the store is strict.
    pub async fn update(&self, id: i64, patch: Record) -> Result<bool, ServiceError> {
        let key = self.store.key_field().to_owned();
        let hit = storage::modify(self.store.as_ref(), move |products| {
            if products.upsert_merge(&key, &Value::from(id), patch) {
                Mutation::Persist(true)
            } else {
                Mutation::Discard(false)
            }
        })
        .await?;
        self.settle(id, hit, "updated")
    }

    /// Remove the first product with `id`. Misses behave as in [`Self::update`].
    pub async fn delete(&self, id: i64) -> Result<bool, ServiceError> {
        let key = self.store.key_field().to_owned();
        let hit = storage::modify(self.store.as_ref(), move |products| {
            match products.remove(&key, &Value::from(id)) {
                Some(_) => Mutation::Persist(true),
                None => Mutation::Discard(false),
            }
        })
        .await?;
        self.settle(id, hit, "deleted")
    }

    fn settle(&self, id: i64, hit: bool, action: &str) -> Result<bool, ServiceError> {
        if hit {
            info!(product_id = id, action, "product record changed");
            return Ok(true);
        }
        warn!(product_id = id, action, "record with provided unique key not found");
        if self.store.strict() {
            return Err(ServiceError::not_found("Product"));
        }
        Ok(false)
    }
}
