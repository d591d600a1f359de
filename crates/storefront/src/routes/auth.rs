//! Registration, verification, login, token and password routes.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use super::MessageResponse;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::services::{AuthService, TokenPair};
use crate::state::AppState;

// ============================================================================
// Registration
// ============================================================================

/// Registration form.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Register a user and email them a verification code.
///
/// POST /api/register
///
/// The email is sent on a background task after commit; delivery failures
/// never change the response.
pub async fn register(
    State(state): State<AppState>,
    body: std::result::Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>)> {
    let Json(req) = body?;

    let (user, code) = AuthService::new(state.pool(), state.tokens())
        .register(
            req.username.as_deref().unwrap_or_default(),
            req.email.as_deref().unwrap_or_default(),
            req.password.as_deref().unwrap_or_default(),
        )
        .await?;

    if let Some(email) = state.email() {
        email.dispatch_verification_code(user.email, code);
    } else {
        tracing::warn!(user_id = %user.id, "Email disabled; verification code not sent");
    }

    Ok((
        StatusCode::CREATED,
        MessageResponse::json("Usuário cadastrado com sucesso!"),
    ))
}

/// Verification form. `code` must be a string to match.
#[derive(Debug, Deserialize)]
pub struct VerifyEmailRequest {
    pub email: Option<String>,
    pub code: Option<serde_json::Value>,
}

/// Consume a verification code.
///
/// POST /api/verify-email
pub async fn verify_email(
    State(state): State<AppState>,
    body: std::result::Result<Json<VerifyEmailRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>> {
    let Json(req) = body?;
    let code = req
        .code
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default();

    AuthService::new(state.pool(), state.tokens())
        .verify_email(req.email.as_deref().unwrap_or_default(), code)
        .await?;

    Ok(MessageResponse::json("E-mail verificado com sucesso!"))
}

// ============================================================================
// Tokens
// ============================================================================

/// Login form.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Exchange credentials for an access/refresh pair.
///
/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    body: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenPair>> {
    let Json(req) = body?;
    let (Some(username), Some(password)) = (req.username, req.password) else {
        return Err(AppError::BadRequest(
            "Os campos username e password são obrigatórios.".to_string(),
        ));
    };

    let pair = AuthService::new(state.pool(), state.tokens())
        .login(&username, &password)
        .await?;

    Ok(Json(pair))
}

/// Body carrying a refresh token.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh: Option<String>,
}

impl RefreshRequest {
    fn into_token(self) -> Result<String> {
        self.refresh
            .ok_or_else(|| AppError::BadRequest("O campo refresh é obrigatório.".to_string()))
    }
}

/// A freshly issued access token.
#[derive(Debug, Serialize)]
pub struct AccessResponse {
    pub access: String,
}

/// Issue a new access token.
///
/// POST /api/login/refresh
pub async fn refresh(
    State(state): State<AppState>,
    body: std::result::Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<Json<AccessResponse>> {
    let Json(req) = body?;
    let token = req.into_token()?;

    let access = AuthService::new(state.pool(), state.tokens())
        .refresh(&token)
        .await?;

    Ok(Json(AccessResponse { access }))
}

/// Blacklist a refresh token.
///
/// POST /api/logout
pub async fn logout(
    State(state): State<AppState>,
    body: std::result::Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>> {
    let Json(req) = body?;
    let token = req.into_token()?;

    AuthService::new(state.pool(), state.tokens())
        .logout(&token)
        .await?;

    Ok(MessageResponse::json("Logout realizado com sucesso!"))
}

// ============================================================================
// Password Management
// ============================================================================

/// Password change form.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub senha_atual: Option<String>,
    pub nova_senha: Option<String>,
    pub confirmar_senha: Option<String>,
}

/// Change the caller's password.
///
/// POST /api/alterar-senha
pub async fn change_password(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    body: std::result::Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>> {
    let Json(req) = body?;

    AuthService::new(state.pool(), state.tokens())
        .change_password(
            user.id,
            req.senha_atual.as_deref().unwrap_or_default(),
            req.nova_senha.as_deref().unwrap_or_default(),
            req.confirmar_senha.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok(MessageResponse::json("Senha alterada com sucesso!"))
}
