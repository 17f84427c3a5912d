//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, health, items, transactions, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Lendium API",
        version = "1.0.0",
        description = "Peer-to-Peer Item Lending REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        // Users
        users::create_user,
        users::list_users,
        users::get_user,
        // Items
        items::list_items,
        items::get_item,
        items::create_item,
        items::update_item,
        // Transactions
        transactions::create_transaction,
        transactions::decide_transaction,
        transactions::cancel_transaction,
        transactions::list_transactions,
        transactions::get_user_transactions,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            // Users
            crate::models::user::User,
            crate::models::user::UserShort,
            crate::models::user::CreateUser,
            // Items
            crate::models::item::Item,
            crate::models::item::ItemShort,
            crate::models::item::ItemStatus,
            crate::models::item::CreateItem,
            crate::models::item::UpdateItem,
            // Transactions
            crate::models::transaction::Transaction,
            crate::models::transaction::TransactionDetails,
            crate::models::transaction::TransactionStatus,
            transactions::CreateTransactionRequest,
            transactions::DecideTransactionRequest,
            transactions::CancelTransactionRequest,
            transactions::CancelTransactionResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "users", description = "User management"),
        (name = "items", description = "Item listing management"),
        (name = "transactions", description = "Borrow transaction lifecycle")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
