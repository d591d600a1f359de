//! Integration tests for purchases and purchase history.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (cargo run -p mercado-cli -- migrate)
//! - The storefront server running (cargo run -p mercado-storefront)
//!
//! Run with: cargo test -p mercado-integration-tests -- --ignored

use mercado_integration_tests::{TestUser, api_url, create_product, database, stock, unique};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

async fn buy(client: &Client, user: &TestUser, product_id: i64, quantity: i64) -> reqwest::Response {
    client
        .post(api_url("compra"))
        .bearer_auth(&user.access)
        .json(&json!({
            "username": user.username,
            "produto_id": product_id,
            "quantidade": quantity,
        }))
        .send()
        .await
        .expect("Failed to send purchase")
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_purchase_updates_balance_stock_and_history() {
    let client = Client::new();
    let pool = database().await;
    let user = TestUser::with_balance(&client, "500.00").await;

    let product = create_product(&client, &user.access, &unique("item"), "100.00", 5).await;
    let product_id = product["id"].as_i64().expect("product id");

    let resp = buy(&client, &user, product_id, 3).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    assert_eq!(stock(&pool, product_id).await, 2);
    assert_eq!(user.balance(&pool).await, "200.00");

    let resp = client
        .get(api_url("transacoes"))
        .bearer_auth(&user.access)
        .send()
        .await
        .expect("Failed to list transactions");
    assert_eq!(resp.status(), StatusCode::OK);
    let page: Value = resp.json().await.expect("Failed to parse transactions");
    assert_eq!(page["total_items"], 1);
    assert_eq!(page["transacoes"][0]["quantidade"], 3);
    assert_eq!(page["transacoes"][0]["total"], "300.00");
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_insufficient_balance_changes_nothing() {
    let client = Client::new();
    let pool = database().await;
    let user = TestUser::with_balance(&client, "50.00").await;

    let product = create_product(&client, &user.access, &unique("item"), "100.00", 5).await;
    let product_id = product["id"].as_i64().expect("product id");

    let resp = buy(&client, &user, product_id, 1).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("Failed to parse error");
    assert_eq!(body["error"], "Saldo insuficiente");

    assert_eq!(stock(&pool, product_id).await, 5);
    assert_eq!(user.balance(&pool).await, "50.00");
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_unknown_product_is_not_found() {
    let client = Client::new();
    let user = TestUser::with_balance(&client, "10.00").await;

    let resp = buy(&client, &user, i64::from(i32::MAX), 1).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_concurrent_purchases_cannot_oversell() {
    let client = Client::new();
    let pool = database().await;
    let seller = TestUser::create(&client).await;
    let first = TestUser::with_balance(&client, "1000.00").await;
    let second = TestUser::with_balance(&client, "1000.00").await;

    let product = create_product(&client, &seller.access, &unique("raro"), "10.00", 5).await;
    let product_id = product["id"].as_i64().expect("product id");

    let (a, b) = tokio::join!(
        buy(&client, &first, product_id, 3),
        buy(&client, &second, product_id, 3),
    );

    let mut statuses = [a.status(), b.status()];
    statuses.sort_by_key(StatusCode::as_u16);
    assert_eq!(statuses, [StatusCode::CREATED, StatusCode::BAD_REQUEST]);

    let failed = if a.status() == StatusCode::BAD_REQUEST { a } else { b };
    let body: Value = failed.json().await.expect("Failed to parse error");
    assert_eq!(body["error"], "Estoque insuficiente");

    assert_eq!(stock(&pool, product_id).await, 2);
}

async fn history(client: &Client, user: &TestUser, query: &str) -> Value {
    let resp = client
        .get(format!("{}?{query}", api_url("transacoes")))
        .bearer_auth(&user.access)
        .send()
        .await
        .expect("Failed to list transactions");
    assert_eq!(resp.status(), StatusCode::OK);
    resp.json().await.expect("Failed to parse transactions")
}

fn product_names(page: &Value) -> Vec<String> {
    page["transacoes"]
        .as_array()
        .expect("transacoes array")
        .iter()
        .map(|t| t["produto_nome"].as_str().expect("produto_nome").to_string())
        .collect()
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_history_filters_sorting_and_ownership() {
    let client = Client::new();
    let buyer = TestUser::with_balance(&client, "1000.00").await;
    let other = TestUser::with_balance(&client, "1000.00").await;
    let tag = unique("hist");

    let caneca = create_product(&client, &buyer.access, &format!("{tag} caneca"), "30.00", 10).await;
    let lapis = create_product(&client, &buyer.access, &format!("{tag} lapis"), "2.00", 10).await;
    let caneca_id = caneca["id"].as_i64().expect("product id");
    let lapis_id = lapis["id"].as_i64().expect("product id");

    // Totals: caneca 30.00, lapis 10.00
    assert_eq!(buy(&client, &buyer, caneca_id, 1).await.status(), StatusCode::CREATED);
    assert_eq!(buy(&client, &buyer, lapis_id, 5).await.status(), StatusCode::CREATED);
    assert_eq!(buy(&client, &other, lapis_id, 2).await.status(), StatusCode::CREATED);

    let page = history(&client, &buyer, "").await;
    assert_eq!(page["total_items"], 2);

    let page = history(&client, &buyer, "produto=caneca").await;
    assert_eq!(page["total_items"], 1);
    assert_eq!(product_names(&page), [format!("{tag} caneca")]);

    let page = history(&client, &buyer, "quantidade_min=5").await;
    assert_eq!(page["total_items"], 1);
    assert_eq!(product_names(&page), [format!("{tag} lapis")]);

    let page = history(&client, &buyer, "ordenar_por=total").await;
    assert_eq!(
        product_names(&page),
        [format!("{tag} lapis"), format!("{tag} caneca")]
    );

    let page = history(&client, &buyer, "ordenar_por=data").await;
    assert_eq!(
        product_names(&page),
        [format!("{tag} caneca"), format!("{tag} lapis")]
    );

    // The other buyer sees only their own purchase
    let page = history(&client, &other, "").await;
    assert_eq!(page["total_items"], 1);
    assert_eq!(page["transacoes"][0]["quantidade"], 2);
}
