use std::{path::PathBuf, sync::Arc};

use serde_json::Value;
use tracing::{error, info};

use crate::errors::ServiceError;
use crate::ids;
use crate::storage::{self, CollectionStore, JsonArrayStore, Mutation, Record, StoreOptions};

/// Identifying field of an order record.
pub const ORDER_KEY: &str = "order_id";
/// Value written to `status` when an order is cancelled.
pub const CANCELLED: &str = "Cancelled";

#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn CollectionStore>,
}

impl OrderService {
    pub fn new(store: Arc<dyn CollectionStore>) -> Self {
        Self { store }
    }

    pub fn from_path<P: Into<PathBuf>>(path: P, options: StoreOptions) -> Self {
        Self::new(Arc::new(JsonArrayStore::with_options(path, ORDER_KEY, options)))
    }

    /// The order with `id`, if any.
    pub async fn find(&self, id: i64) -> Result<Option<Record>, ServiceError> {
        let orders = storage::read(self.store.as_ref()).await?;
        Ok(orders.find_by_key(self.store.key_field(), &Value::from(id)).cloned())
    }

    /// `status` of the order with `id`; `Ok(None)` when there is no such order,
    /// `Ok(Some(None))` when the order has no status field.
    pub async fn status(&self, id: i64) -> Result<Option<Option<Value>>, ServiceError> {
        Ok(self.find(id).await?.map(|order| order.get("status").cloned()))
    }

    /// Append an order under a generated `order_id`; returns the id.
    pub async fn create(&self, mut fields: Record) -> Result<i64, ServiceError> {
        let key = self.store.key_field().to_owned();
        let id = storage::modify(self.store.as_ref(), move |orders| {
            let id = ids::next_id();
            fields.insert(key, Value::from(id));
            orders.append(fields);
            Mutation::Persist(id)
        })
        .await
        .map_err(|e| {
            error!(error = %e, "error creating order");
            e
        })?;
        info!(order_id = id, "order created");
        Ok(id)
    }

    /// Mark the order as cancelled. A missing order is logged and ignored
    /// (`Ok(false)`), or `NotFound` for strict stores.
    pub async fn cancel(&self, id: i64) -> Result<bool, ServiceError> {
        let key = self.store.key_field().to_owned();
        let hit = storage::modify(self.store.as_ref(), move |orders| {
            let mut patch = Record::new();
            patch.insert("status".into(), Value::from(CANCELLED));
            if orders.upsert_merge(&key, &Value::from(id), patch) {
                Mutation::Persist(true)
            } else {
                Mutation::Discard(false)
            }
        })
        .await?;

        if hit {
            info!(order_id = id, "order cancelled");
        } else {
            error!(order_id = id, "order with provided ID not found");
            if self.store.strict() {
                return Err(ServiceError::not_found("Order"));
            }
        }
        Ok(hit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Collection;
    use crate::test_support::{temp_path, SpyStore};
    use serde_json::json;

    fn rec(v: Value) -> Record {
        v.as_object().cloned().expect("object")
    }

    fn book() -> Collection {
        Collection::from(vec![
            rec(json!({"order_id": 100, "item": "Widget", "status": "Pending"})),
            rec(json!({"order_id": 200, "item": "Gadget"})),
        ])
    }

    #[tokio::test]
    async fn status_lookup() -> Result<(), ServiceError> {
        let svc = OrderService::new(Arc::new(SpyStore::new(ORDER_KEY, book())));
        assert_eq!(svc.status(100).await?, Some(Some(json!("Pending"))));
        assert_eq!(svc.status(200).await?, Some(None));
        assert_eq!(svc.status(300).await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn create_assigns_order_id_and_persists() -> Result<(), anyhow::Error> {
        let path = temp_path("orders_create");
        let svc = OrderService::from_path(&path, StoreOptions::default());
        let id = svc.create(rec(json!({"item": "Widget", "status": "Pending"}))).await?;
        let order = svc.find(id).await?.expect("stored");
        assert_eq!(order["item"], "Widget");
        assert_eq!(order[ORDER_KEY], json!(id));
        let _ = tokio::fs::remove_file(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn cancel_sets_status_and_keeps_other_fields() -> Result<(), ServiceError> {
        let store = Arc::new(SpyStore::new(ORDER_KEY, book()));
        let svc = OrderService::new(store.clone());
        assert!(svc.cancel(200).await?);
        let data = store.data.lock().await.clone();
        assert_eq!(
            data.iter().nth(1).cloned(),
            Some(rec(json!({"order_id": 200, "item": "Gadget", "status": "Cancelled"})))
        );
        assert_eq!(data.iter().next().map(|o| o["status"].clone()), Some(json!("Pending")));
        Ok(())
    }

    #[tokio::test]
    async fn cancel_miss_leaves_file_untouched() -> Result<(), ServiceError> {
        let store = Arc::new(SpyStore::new(ORDER_KEY, book()));
        let svc = OrderService::new(store.clone());
        assert!(!svc.cancel(999).await?);
        assert_eq!(store.saves(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn strict_cancel_miss_is_order_not_found() {
        let path = temp_path("orders_strict");
        let svc = OrderService::from_path(&path, StoreOptions { strict: true, serialize_writes: false });
        assert!(matches!(
            svc.cancel(1).await,
            Err(ServiceError::NotFound(msg)) if msg == "Order not found"
        ));
    }

    #[tokio::test]
    async fn corrupt_orders_file_reads_as_empty() -> Result<(), anyhow::Error> {
        let path = temp_path("orders_corrupt");
        tokio::fs::write(&path, b"not json at all").await?;
        let svc = OrderService::from_path(&path, StoreOptions::default());
        assert_eq!(svc.status(1).await?, None);
        // the next write replaces the corrupt content
        let id = svc.create(rec(json!({"item": "X"}))).await?;
        assert!(svc.find(id).await?.is_some());
        let _ = tokio::fs::remove_file(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn failed_save_surfaces_io_error() {
        let svc = OrderService::new(Arc::new(SpyStore::failing(ORDER_KEY)));
        assert!(matches!(svc.create(Record::new()).await, Err(ServiceError::Io { .. })));
    }
}
