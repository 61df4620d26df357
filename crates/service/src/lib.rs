//! Service layer: the JSON record store and the product/order services built on it.
//! - `storage` owns file I/O and the pure collection operations.
//! - `products` / `orders` map requests to store operations with their key fields.
//! - Errors are reported as `ServiceError`; the HTTP layer chooses status codes.

pub mod errors;
pub mod ids;
pub mod observability;
pub mod orders;
pub mod products;
pub mod storage;
#[cfg(test)]
pub mod test_support;
