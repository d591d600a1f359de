//! HTTP client for the storefront API.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Url};
use serde_json::Value;

use super::session::SessionError;

/// Errors talking to the API.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("{status}: {message}")]
    Api { status: u16, message: String },

    #[error("Usuário não autenticado. Faça login primeiro.")]
    NotLoggedIn,

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// JSON client bound to one API base URL.
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for `base_url` (e.g. `http://localhost:3000/api`).
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    /// Absolute URL for an API path.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub async fn get(
        &self,
        path: &str,
        params: &[(&str, Option<String>)],
        token: Option<&str>,
    ) -> Result<Value, ClientError> {
        let url = with_query(&self.endpoint(path), params)?;
        self.send(self.http.get(url), token).await
    }

    pub async fn post(
        &self,
        path: &str,
        body: &Value,
        token: Option<&str>,
    ) -> Result<Value, ClientError> {
        self.send(self.http.post(self.endpoint(path)).json(body), token)
            .await
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> Result<Value, ClientError> {
        self.send(self.http.delete(self.endpoint(path)), token).await
    }

    async fn send(
        &self,
        request: RequestBuilder,
        token: Option<&str>,
    ) -> Result<Value, ClientError> {
        let request = match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        let body = serde_json::from_str(&text).unwrap_or(Value::String(text));

        tracing::debug!(status = status.as_u16(), "API response");

        if status.is_success() {
            Ok(body)
        } else {
            Err(ClientError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            })
        }
    }
}

/// Append query parameters, skipping absent and empty values.
fn with_query(url: &str, params: &[(&str, Option<String>)]) -> Result<Url, ClientError> {
    let present = params
        .iter()
        .filter_map(|(key, value)| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .map(|v| (*key, v))
        })
        .collect::<Vec<_>>();

    let mut parsed = Url::parse(url).map_err(|e| ClientError::InvalidUrl {
        url: url.to_string(),
        message: e.to_string(),
    })?;
    if !present.is_empty() {
        parsed.query_pairs_mut().extend_pairs(present);
    }
    Ok(parsed)
}

/// The `error` field of an API error body, or the whole body.
fn error_message(body: &Value) -> String {
    match body {
        Value::Object(map) => map
            .get("error")
            .and_then(Value::as_str)
            .map_or_else(|| body.to_string(), ToString::to_string),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_endpoint_joins_slashes() {
        let client = ApiClient::new("http://localhost:3000/api/").unwrap();
        assert_eq!(client.endpoint("/login"), "http://localhost:3000/api/login");

        let client = ApiClient::new("http://localhost:3000/api").unwrap();
        assert_eq!(
            client.endpoint("login/refresh"),
            "http://localhost:3000/api/login/refresh"
        );
    }

    #[test]
    fn test_with_query_skips_empty_params() {
        let url = with_query(
            "http://localhost:3000/api/produtos",
            &[
                ("nome", Some("café".to_string())),
                ("preco_max", None),
                ("ordenar_por", Some(String::new())),
                ("pagina", Some("2".to_string())),
            ],
        )
        .unwrap();

        assert_eq!(url.query(), Some("nome=caf%C3%A9&pagina=2"));
    }

    #[test]
    fn test_with_query_without_params() {
        let url = with_query("http://localhost:3000/api/transacoes", &[]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/transacoes");
    }

    #[test]
    fn test_with_query_rejects_bad_base() {
        assert!(matches!(
            with_query("not a url", &[]),
            Err(ClientError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_error_message() {
        assert_eq!(
            error_message(&json!({"error": "Saldo insuficiente"})),
            "Saldo insuficiente"
        );
        assert_eq!(error_message(&json!("Bad Gateway")), "Bad Gateway");
        assert_eq!(error_message(&json!({"detail": 1})), r#"{"detail":1}"#);
    }
}
