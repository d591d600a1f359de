//! Integration tests for Mercado.
//!
//! # Running Tests
//!
//! ```bash
//! # Migrate and start the server
//! cargo run -p mercado-cli -- migrate
//! cargo run -p mercado-storefront
//!
//! # Run integration tests
//! cargo test -p mercado-integration-tests -- --ignored
//! ```
//!
//! Verification codes are read straight from the database, so the tests
//! need `STOREFRONT_DATABASE_URL` (or `DATABASE_URL`) pointing at the same
//! database as the server.
//!
//! # Test Categories
//!
//! - `accounts` - Registration, verification, tokens, password and deletion
//! - `catalog` - Product creation, filtering and pagination
//! - `purchases` - Purchases, concurrency and history

#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use sqlx::PgPool;
use uuid::Uuid;

/// Base URL for the API (configurable via environment).
pub fn base_url() -> String {
    std::env::var("MERCADO_BASE_URL").unwrap_or_else(|_| "http://localhost:3000/api".to_string())
}

/// Absolute URL for an API path.
pub fn api_url(path: &str) -> String {
    format!("{}/{path}", base_url().trim_end_matches('/'))
}

/// Connect to the server's database.
pub async fn database() -> PgPool {
    let url = std::env::var("STOREFRONT_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("STOREFRONT_DATABASE_URL or DATABASE_URL must be set");
    PgPool::connect(&url)
        .await
        .expect("Failed to connect to test database")
}

/// A name no other test run will use.
pub fn unique(prefix: &str) -> String {
    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(12).collect();
    format!("{prefix}_{suffix}")
}

/// A registered, logged-in user.
pub struct TestUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub access: String,
    pub refresh: String,
}

impl TestUser {
    /// Register a fresh user and log in. The account is not verified.
    pub async fn create(client: &Client) -> Self {
        let username = unique("user");
        let email = format!("{username}@example.com");
        let password = "s3nha-forte".to_string();

        let resp = client
            .post(api_url("register"))
            .json(&json!({"username": username, "email": email, "password": password}))
            .send()
            .await
            .expect("Failed to register");
        assert_eq!(resp.status(), StatusCode::CREATED);

        let tokens = login(client, &username, &password).await;
        Self {
            username,
            email,
            password,
            access: tokens["access"].as_str().expect("access").to_string(),
            refresh: tokens["refresh"].as_str().expect("refresh").to_string(),
        }
    }

    /// Register, log in and top up the balance.
    pub async fn with_balance(client: &Client, saldo: &str) -> Self {
        let user = Self::create(client).await;
        let resp = user.add_saldo(client, saldo).await;
        assert_eq!(resp.status(), StatusCode::OK);
        user
    }

    /// The pending verification code for this user.
    pub async fn verification_code(&self, pool: &PgPool) -> String {
        sqlx::query_scalar(
            "SELECT ev.verification_code FROM mercado.email_verification ev \
             JOIN mercado.user u ON u.id = ev.user_id WHERE u.username = $1",
        )
        .bind(&self.username)
        .fetch_one(pool)
        .await
        .expect("Failed to read verification code")
    }

    /// This user's customer ID.
    pub async fn customer_id(&self, pool: &PgPool) -> i32 {
        sqlx::query_scalar(
            "SELECT c.id FROM mercado.customer c \
             JOIN mercado.user u ON u.id = c.user_id WHERE u.username = $1",
        )
        .bind(&self.username)
        .fetch_one(pool)
        .await
        .expect("Failed to read customer id")
    }

    /// POST /add-saldo with `saldo` and return the response.
    pub async fn add_saldo(&self, client: &Client, saldo: &str) -> reqwest::Response {
        client
            .post(api_url("add-saldo"))
            .bearer_auth(&self.access)
            .json(&json!({"saldo": saldo}))
            .send()
            .await
            .expect("Failed to add balance")
    }

    /// Current balance as the database renders it (e.g. `200.00`).
    pub async fn balance(&self, pool: &PgPool) -> String {
        sqlx::query_scalar(
            "SELECT c.balance::TEXT FROM mercado.customer c \
             JOIN mercado.user u ON u.id = c.user_id WHERE u.username = $1",
        )
        .bind(&self.username)
        .fetch_one(pool)
        .await
        .expect("Failed to read balance")
    }
}

/// POST /login and return the token pair body.
pub async fn login(client: &Client, username: &str, password: &str) -> Value {
    let resp = client
        .post(api_url("login"))
        .json(&json!({"username": username, "password": password}))
        .send()
        .await
        .expect("Failed to log in");
    assert_eq!(resp.status(), StatusCode::OK);
    resp.json().await.expect("Failed to parse login response")
}

/// Create a product and return its JSON.
pub async fn create_product(client: &Client, token: &str, nome: &str, preco: &str, estoque: i64) -> Value {
    let resp = client
        .post(api_url("criar-produto"))
        .bearer_auth(token)
        .json(&json!({"nome": nome, "preco": preco, "estoque": estoque}))
        .send()
        .await
        .expect("Failed to create product");
    assert_eq!(resp.status(), StatusCode::CREATED);
    resp.json().await.expect("Failed to parse product")
}

/// Number of customer rows with `id`.
pub async fn customer_count(pool: &PgPool, customer_id: i32) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM mercado.customer WHERE id = $1")
        .bind(customer_id)
        .fetch_one(pool)
        .await
        .expect("Failed to count customers")
}

/// Read a product's current stock from the database.
pub async fn stock(pool: &PgPool, product_id: i64) -> i32 {
    sqlx::query_scalar("SELECT stock FROM mercado.product WHERE id = $1")
        .bind(i32::try_from(product_id).expect("product id fits i32"))
        .fetch_one(pool)
        .await
        .expect("Failed to read stock")
}
