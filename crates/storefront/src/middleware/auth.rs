//! Authentication extractor.
//!
//! Protected handlers take [`RequireAuth`], which resolves the
//! `Authorization: Bearer <access token>` header to a [`User`].

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::error::{AppError, set_sentry_user};
use crate::models::User;
use crate::services::AuthService;
use crate::state::AppState;

/// Message for requests without usable credentials.
const MISSING_CREDENTIALS: &str = "As credenciais de autenticação não foram fornecidas.";

/// Extractor that requires a valid access token.
///
/// Missing or malformed headers, invalid, expired or refresh-typed tokens and
/// tokens whose user no longer exists are all rejected with 401.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Olá, {}!", user.username)
/// }
/// ```
pub struct RequireAuth(pub User);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| AppError::Unauthorized(MISSING_CREDENTIALS.to_string()))?;

        let user = AuthService::new(state.pool(), state.tokens())
            .authenticate(token)
            .await?;

        set_sentry_user(&user.id, Some(user.username.as_str()));
        tracing::Span::current().record("user_id", user.id.as_i32());

        Ok(Self(user))
    }
}

/// The token from an `Authorization: Bearer <token>` header.
fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();

    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/add-saldo");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token(&parts(Some("Bearer abc.def"))), Some("abc.def"));
        assert_eq!(bearer_token(&parts(Some("bearer abc"))), Some("abc"));
    }

    #[test]
    fn test_bearer_token_rejects_other_shapes() {
        assert_eq!(bearer_token(&parts(None)), None);
        assert_eq!(bearer_token(&parts(Some("Basic dXNlcjpwYXNz"))), None);
        assert_eq!(bearer_token(&parts(Some("Bearer"))), None);
        assert_eq!(bearer_token(&parts(Some("Bearer   "))), None);
    }
}
