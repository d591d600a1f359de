//! Balance and account deletion routes.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::Deserialize;

use super::MessageResponse;
use crate::error::{Result, clear_sentry_user};
use crate::middleware::RequireAuth;
use crate::services::{DeleteOutcome, LedgerService, account};
use crate::state::AppState;

/// Top-up form. `saldo` may be a number or a numeric string.
#[derive(Debug, Deserialize)]
pub struct AddSaldoRequest {
    pub saldo: Option<serde_json::Value>,
}

/// Add to the caller's balance.
///
/// POST /api/add-saldo
pub async fn add_saldo(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    body: std::result::Result<Json<AddSaldoRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>> {
    let Json(req) = body?;
    let saldo = req.saldo.unwrap_or(serde_json::Value::Null);

    let balance = LedgerService::new(state.pool())
        .add_balance(user.id, &saldo)
        .await?;

    Ok(MessageResponse::json(format!(
        "Saldo atualizado para {balance}."
    )))
}

/// Delete the caller's customer, verification record and user.
///
/// DELETE /api/delete-user
pub async fn delete_user(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<MessageResponse>> {
    let outcome = account::delete_user(state.pool(), user.id).await?;
    clear_sentry_user();

    let message = match outcome {
        DeleteOutcome::Deleted => "Usuário deletado com sucesso.",
        DeleteOutcome::DeletedWithoutVerification => {
            "Usuário deletado sem registro de verificação de e-mail."
        }
    };

    Ok(MessageResponse::json(message))
}
