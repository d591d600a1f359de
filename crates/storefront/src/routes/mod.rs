//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health               - Liveness
//! GET    /health/ready         - Readiness (database)
//!
//! # Accounts
//! POST   /api/register         - Register, emails a verification code
//! POST   /api/verify-email     - Consume a verification code
//! POST   /api/login            - Username/password login, returns a token pair
//! POST   /api/login/refresh    - Exchange a refresh token for an access token
//! POST   /api/logout           - Blacklist a refresh token
//! POST   /api/alterar-senha    - Change password (auth)
//! POST   /api/add-saldo        - Top up balance (auth)
//! DELETE /api/delete-user      - Delete the caller's account (auth)
//!
//! # Catalog
//! POST   /api/criar-produto    - Create a product (auth)
//! GET    /api/produtos         - Filtered, sorted, paginated products
//!
//! # Purchases
//! POST   /api/compra           - Atomic purchase (auth)
//! GET    /api/transacoes       - Caller's purchase history (auth)
//! ```
//!
//! Every path is also served with a trailing slash.

pub mod account;
pub mod auth;
pub mod products;
pub mod purchases;

use axum::{
    Json, Router,
    routing::{delete, get, post},
};
use serde::Serialize;

use crate::state::AppState;

/// `{"message": …}` body returned by successful actions.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn json(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

/// Create the `/api` router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/verify-email", post(auth::verify_email))
        .route("/login", post(auth::login))
        .route("/login/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout))
        .route("/alterar-senha", post(auth::change_password))
        .route("/add-saldo", post(account::add_saldo))
        .route("/delete-user", delete(account::delete_user))
        .route("/criar-produto", post(products::create))
        .route("/produtos", get(products::list))
        .route("/compra", post(purchases::purchase))
        .route("/transacoes", get(purchases::list))
}

/// Create all routes.
pub fn routes() -> Router<AppState> {
    Router::new().nest("/api", api_routes())
}
