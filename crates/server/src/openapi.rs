use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct ErrorResponse { pub error: String }

#[derive(ToSchema)]
pub struct MessageDoc { pub message: String }

/// Products are open objects; only `name` is interpreted (by search).
#[derive(ToSchema)]
pub struct ProductDoc { pub name: Option<String> }

#[derive(ToSchema)]
pub struct ProductCreatedDoc { pub id: i64, pub message: String }

/// Orders are open objects; `status` is what lookups report.
#[derive(ToSchema)]
pub struct OrderDoc { pub status: Option<String> }

#[derive(ToSchema)]
pub struct OrderCreatedDoc { pub order_id: i64 }

#[derive(ToSchema)]
#[allow(non_snake_case)]
pub struct OrderCancelledDoc { pub message: String, pub orderId: i64 }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::products::search,
        crate::routes::products::create,
        crate::routes::products::update,
        crate::routes::products::delete,
        crate::routes::orders::status,
        crate::routes::orders::create,
        crate::routes::orders::cancel,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorResponse,
            MessageDoc,
            ProductDoc,
            ProductCreatedDoc,
            OrderDoc,
            OrderCreatedDoc,
            OrderCancelledDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "products"),
        (name = "orders")
    )
)]
pub struct ApiDoc;
