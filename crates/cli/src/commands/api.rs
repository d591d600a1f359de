//! Client subcommands: one function per API operation.
//!
//! Each prints the server's JSON response. `login` and `refresh` keep the
//! session file up to date; `logout` and `delete-user` remove it.

use mercado_core::{Email, ProductId, Quantity};
use serde_json::{Value, json};

use super::client::{ApiClient, ClientError};
use super::session::{Session, SessionStore};

/// Catalog listing options.
#[derive(Debug, Default, Clone)]
pub struct ProductQuery {
    pub nome: Option<String>,
    pub preco_max: Option<String>,
    pub ordenar_por: Option<String>,
    pub pagina: Option<u32>,
    pub itens_por_pagina: Option<u32>,
}

/// Purchase-history listing options.
#[derive(Debug, Default, Clone)]
pub struct TransactionQuery {
    pub produto: Option<String>,
    pub quantidade_min: Option<String>,
    pub ordenar_por: Option<String>,
    pub pagina: Option<u32>,
    pub itens_por_pagina: Option<u32>,
}

pub async fn register(
    client: &ApiClient,
    username: &str,
    email: &Email,
    password: &str,
) -> Result<(), ClientError> {
    let body = json!({"username": username, "email": email, "password": password});
    print_json(&client.post("register", &body, None).await?);
    Ok(())
}

pub async fn verify_email(client: &ApiClient, email: &Email, code: &str) -> Result<(), ClientError> {
    let body = json!({"email": email, "code": code});
    print_json(&client.post("verify-email", &body, None).await?);
    Ok(())
}

pub async fn login(
    client: &ApiClient,
    store: &SessionStore,
    username: &str,
    password: &str,
) -> Result<(), ClientError> {
    let body = json!({"username": username, "password": password});
    let response = client.post("login", &body, None).await?;

    let session = Session {
        username: username.to_string(),
        access: string_field(&response, "access")?,
        refresh: string_field(&response, "refresh")?,
    };
    store.save(&session)?;

    tracing::info!(username, path = %store.path().display(), "Logged in; session saved");
    Ok(())
}

pub async fn refresh(client: &ApiClient, store: &SessionStore) -> Result<(), ClientError> {
    let mut session = require_session(store)?;
    let body = json!({"refresh": session.refresh});
    let response = client.post("login/refresh", &body, None).await?;

    session.access = string_field(&response, "access")?;
    store.save(&session)?;

    tracing::info!(username = %session.username, "Access token refreshed");
    Ok(())
}

pub async fn logout(client: &ApiClient, store: &SessionStore) -> Result<(), ClientError> {
    let session = require_session(store)?;
    let body = json!({"refresh": session.refresh});
    print_json(&client.post("logout", &body, Some(session.access.as_str())).await?);
    store.clear()?;
    Ok(())
}

pub async fn change_password(
    client: &ApiClient,
    store: &SessionStore,
    current: &str,
    new: &str,
    confirm: &str,
) -> Result<(), ClientError> {
    let session = require_session(store)?;
    let body = json!({
        "senha_atual": current,
        "nova_senha": new,
        "confirmar_senha": confirm,
    });
    print_json(&client.post("alterar-senha", &body, Some(session.access.as_str())).await?);
    Ok(())
}

/// `saldo` is sent as a string so decimals survive untouched.
pub async fn add_saldo(client: &ApiClient, store: &SessionStore, saldo: &str) -> Result<(), ClientError> {
    let session = require_session(store)?;
    let body = json!({"saldo": saldo});
    print_json(&client.post("add-saldo", &body, Some(session.access.as_str())).await?);
    Ok(())
}

pub async fn create_product(
    client: &ApiClient,
    store: &SessionStore,
    nome: &str,
    preco: &str,
    estoque: i64,
) -> Result<(), ClientError> {
    let session = require_session(store)?;
    let body = json!({"nome": nome, "preco": preco, "estoque": estoque});
    print_json(&client.post("criar-produto", &body, Some(session.access.as_str())).await?);
    Ok(())
}

pub async fn list_products(client: &ApiClient, query: ProductQuery) -> Result<(), ClientError> {
    let params = [
        ("nome", query.nome),
        ("preco_max", query.preco_max),
        ("ordenar_por", query.ordenar_por),
        ("pagina", query.pagina.map(|p| p.to_string())),
        ("itens_por_pagina", query.itens_por_pagina.map(|n| n.to_string())),
    ];
    print_json(&client.get("produtos", &params, None).await?);
    Ok(())
}

/// Buy as `username`, or as the logged-in user when not given.
pub async fn purchase(
    client: &ApiClient,
    store: &SessionStore,
    username: Option<&str>,
    product_id: ProductId,
    quantity: Quantity,
) -> Result<(), ClientError> {
    let session = require_session(store)?;
    let body = json!({
        "username": username.unwrap_or(session.username.as_str()),
        "produto_id": product_id,
        "quantidade": quantity,
    });
    print_json(&client.post("compra", &body, Some(session.access.as_str())).await?);
    Ok(())
}

pub async fn list_transactions(
    client: &ApiClient,
    store: &SessionStore,
    query: TransactionQuery,
) -> Result<(), ClientError> {
    let session = require_session(store)?;
    let params = [
        ("produto", query.produto),
        ("quantidade_min", query.quantidade_min),
        ("ordenar_por", query.ordenar_por),
        ("pagina", query.pagina.map(|p| p.to_string())),
        ("itens_por_pagina", query.itens_por_pagina.map(|n| n.to_string())),
    ];
    print_json(&client.get("transacoes", &params, Some(session.access.as_str())).await?);
    Ok(())
}

pub async fn delete_user(client: &ApiClient, store: &SessionStore) -> Result<(), ClientError> {
    let session = require_session(store)?;
    print_json(&client.delete("delete-user", Some(session.access.as_str())).await?);
    store.clear()?;
    Ok(())
}

fn require_session(store: &SessionStore) -> Result<Session, ClientError> {
    store.load()?.ok_or(ClientError::NotLoggedIn)
}

fn string_field(body: &Value, field: &str) -> Result<String, ClientError> {
    body.get(field)
        .and_then(Value::as_str)
        .map(ToString::to_string)
        .ok_or_else(|| ClientError::Api {
            status: 200,
            message: format!("response is missing '{field}'"),
        })
}

fn print_json(value: &Value) {
    let text = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    #[allow(clippy::print_stdout)]
    {
        println!("{text}");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_string_field() {
        let body = json!({"access": "a.b.c", "refresh": 5});
        assert_eq!(string_field(&body, "access").unwrap(), "a.b.c");
        assert!(matches!(
            string_field(&body, "refresh"),
            Err(ClientError::Api { status: 200, .. })
        ));
        assert!(string_field(&body, "missing").is_err());
    }

    #[test]
    fn test_require_session_without_file() {
        let store = SessionStore::new(std::env::temp_dir().join(format!(
            "mercado-api-no-session-{}.json",
            std::process::id()
        )));
        assert!(matches!(
            require_session(&store),
            Err(ClientError::NotLoggedIn)
        ));
    }
}
