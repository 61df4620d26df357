//! Shared building blocks for the storefront crates: logging setup,
//! runtime environment checks and the small wire types every surface uses.

pub mod env;
pub mod types;
pub mod utils;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_type_ok() {
        let h = types::Health { status: "ok" };
        assert_eq!(h.status, "ok");
    }

    #[test]
    fn error_body_serializes_single_field() {
        let body = types::ErrorBody::new("Order not found");
        let json = serde_json::to_value(&body).expect("serialize");
        assert_eq!(json, serde_json::json!({"error": "Order not found"}));
    }
}
