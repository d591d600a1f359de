//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers return `Result<T, AppError>`;
//! every error body is `{"error": "<message>"}`.

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use mercado_core::AmountError;
use mercado_core::listing::ListingError;
use mercado_core::purchase::PurchaseError as Rejection;

use crate::db::RepositoryError;
use crate::services::{
    AccountError, AuthError, CatalogError, LedgerError, PurchaseError, TokenError,
};

/// Generic message for anything that ends in a 500.
const INTERNAL_MESSAGE: &str = "Erro interno do servidor.";

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Balance operation failed.
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Catalog operation failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Purchase failed.
    #[error("Purchase error: {0}")]
    Purchase(#[from] PurchaseError),

    /// Account deletion failed.
    #[error("Account error: {0}")]
    Account(#[from] AccountError),

    /// Malformed listing query.
    #[error("Listing error: {0}")]
    Listing(#[from] ListingError),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl AppError {
    /// Status code and client-facing message. Internal details never leave
    /// the server.
    fn status_and_message(&self) -> (StatusCode, String) {
        let internal = || (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string());
        let bad_request = |msg: &str| (StatusCode::BAD_REQUEST, msg.to_string());
        let not_found = |msg: &str| (StatusCode::NOT_FOUND, msg.to_string());

        match self {
            Self::Database(_) | Self::Internal(_) => internal(),
            Self::Auth(err) => match err {
                AuthError::InvalidUsername(_) => bad_request("Username inválido."),
                AuthError::InvalidEmail(_) => bad_request("E-mail inválido."),
                AuthError::InvalidCredentials => (
                    StatusCode::UNAUTHORIZED,
                    "Nenhuma conta ativa foi encontrada com as credenciais fornecidas".to_string(),
                ),
                AuthError::UserNotFound => (
                    StatusCode::UNAUTHORIZED,
                    "Usuário não encontrado.".to_string(),
                ),
                AuthError::UsernameTaken => {
                    bad_request("Este username já está em uso. Escolha outro.")
                }
                AuthError::EmailTaken => bad_request("Este e-mail já está em uso."),
                AuthError::WeakPassword(_) => bad_request("A senha não pode ser vazia."),
                AuthError::VerificationNotFound => not_found("Código de verificação inválido."),
                AuthError::InvalidVerificationCode => {
                    bad_request("Código de verificação inválido ou já utilizado.")
                }
                AuthError::WrongCurrentPassword => bad_request("A senha atual está incorreta."),
                AuthError::PasswordMismatch => {
                    bad_request("A nova senha e a confirmação não correspondem.")
                }
                AuthError::Token(TokenError::Encode(_))
                | AuthError::Logout(TokenError::Encode(_))
                | AuthError::Repository(_)
                | AuthError::PasswordHash => internal(),
                AuthError::Token(token) => (StatusCode::UNAUTHORIZED, token.to_string()),
                AuthError::Logout(token) => bad_request(&token.to_string()),
            },
            Self::Ledger(err) => match err {
                LedgerError::InvalidAmount(AmountError::NotNumeric) => {
                    bad_request("O valor do saldo deve ser numérico.")
                }
                LedgerError::InvalidAmount(AmountError::TooLarge) => {
                    bad_request("O valor do saldo excede o limite permitido.")
                }
                LedgerError::CustomerNotFound => not_found("Cliente não encontrado."),
                LedgerError::InsufficientFunds => bad_request("Saldo insuficiente"),
                LedgerError::Repository(_) => internal(),
            },
            Self::Catalog(err) => match err {
                CatalogError::InvalidName(msg) => bad_request(msg),
                CatalogError::InvalidPrice(_) => bad_request(
                    "O preço deve ser um número não negativo com até 2 casas decimais e 10 dígitos.",
                ),
                CatalogError::InvalidStock(_) => {
                    bad_request("O estoque deve ser um número inteiro não negativo.")
                }
                CatalogError::Repository(_) => internal(),
            },
            Self::Purchase(err) => match err {
                PurchaseError::UserNotFound => not_found("Usuário não encontrado."),
                PurchaseError::CustomerNotFound => not_found("Cliente não encontrado"),
                PurchaseError::ProductNotFound => not_found("Produto não encontrado"),
                PurchaseError::Rejected(Rejection::InsufficientFunds { .. }) => {
                    bad_request("Saldo insuficiente")
                }
                PurchaseError::Rejected(Rejection::InsufficientStock { .. }) => {
                    bad_request("Estoque insuficiente")
                }
                PurchaseError::Repository(_) => internal(),
            },
            Self::Account(err) => match err {
                AccountError::CustomerNotFound => not_found("Cliente não encontrado."),
                AccountError::Repository(_) => internal(),
            },
            Self::Listing(err) => bad_request(&listing_message(err)),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            Self::BadRequest(msg) => bad_request(msg),
        }
    }
}

fn listing_message(err: &ListingError) -> String {
    match err {
        ListingError::NotANumber { param } => format!("O parâmetro '{param}' deve ser numérico."),
        ListingError::BelowOne { param } => {
            format!("O parâmetro '{param}' deve ser maior ou igual a 1.")
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, username: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            username: username.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
