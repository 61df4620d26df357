use configs::StorageConfig;
use service::{orders::OrderService, products::ProductService, storage::StoreOptions};

/// Shared handler state: one service per collection.
#[derive(Clone)]
pub struct AppState {
    pub products: ProductService,
    pub orders: OrderService,
}

impl AppState {
    pub fn new(products: ProductService, orders: OrderService) -> Self {
        Self { products, orders }
    }

    /// File-backed services at the configured paths.
    pub fn from_config(cfg: &StorageConfig) -> Self {
        let options = StoreOptions { strict: cfg.strict, serialize_writes: cfg.serialize_writes };
        Self::new(
            ProductService::from_path(cfg.products_path(), options),
            OrderService::from_path(cfg.orders_path(), options),
        )
    }
}
