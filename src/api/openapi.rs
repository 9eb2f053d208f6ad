//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{health, holders, items, loans};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Circulation API",
        version = "0.1.0",
        description = "Borrow/return transactions for a lending library",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Items
        items::get_item,
        // Holders
        holders::get_holder,
        holders::delete_holder,
        // Loans
        loans::borrow,
        loans::return_items,
    ),
    components(
        schemas(
            crate::models::item::ItemAvailability,
            crate::models::holder::Holder,
            crate::models::loan::BorrowRequest,
            crate::models::loan::BorrowLine,
            crate::models::loan::ReturnRequest,
            crate::models::loan::ReturnLine,
            crate::models::loan::LoanResponse,
            health::HealthResponse,
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "items", description = "Item availability"),
        (name = "holders", description = "Holder accounts"),
        (name = "loans", description = "Borrowing and returning")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
