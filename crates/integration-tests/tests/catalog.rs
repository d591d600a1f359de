//! Integration tests for the product catalog.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (cargo run -p mercado-cli -- migrate)
//! - The storefront server running (cargo run -p mercado-storefront)
//!
//! Run with: cargo test -p mercado-integration-tests -- --ignored

use mercado_integration_tests::{TestUser, api_url, create_product, unique};
use reqwest::{Client, StatusCode};
use serde_json::Value;

async fn list(client: &Client, query: &str) -> Value {
    let resp = client
        .get(format!("{}?{query}", api_url("produtos")))
        .send()
        .await
        .expect("Failed to list products");
    assert_eq!(resp.status(), StatusCode::OK);
    resp.json().await.expect("Failed to parse product page")
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_filter_by_max_price() {
    let client = Client::new();
    let user = TestUser::create(&client).await;
    let tag = unique("preco");

    create_product(&client, &user.access, &format!("{tag} A"), "100.00", 1).await;
    create_product(&client, &user.access, &format!("{tag} B"), "200.00", 1).await;

    let page = list(&client, &format!("nome={tag}&preco_max=150")).await;
    assert_eq!(page["total_items"], 1);
    assert_eq!(page["produtos"][0]["nome"], format!("{tag} A"));
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_second_page_of_one() {
    let client = Client::new();
    let user = TestUser::create(&client).await;
    let tag = unique("pagina");

    create_product(&client, &user.access, &format!("{tag} caro"), "90.00", 1).await;
    create_product(&client, &user.access, &format!("{tag} barato"), "10.00", 1).await;

    let page = list(
        &client,
        &format!("nome={tag}&ordenar_por=preco&pagina=2&itens_por_pagina=1"),
    )
    .await;
    assert_eq!(page["total_items"], 2);
    assert_eq!(page["pagina"], 2);
    assert_eq!(page["produtos"].as_array().map(Vec::len), Some(1));
    assert_eq!(page["produtos"][0]["nome"], format!("{tag} caro"));
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_create_product_validation() {
    let client = Client::new();
    let user = TestUser::create(&client).await;

    let resp = client
        .post(api_url("criar-produto"))
        .bearer_auth(&user.access)
        .json(&serde_json::json!({"nome": "Negativo", "preco": "-1", "estoque": 1}))
        .send()
        .await
        .expect("Failed to create product");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = client
        .post(api_url("criar-produto"))
        .bearer_auth(&user.access)
        .json(&serde_json::json!({"nome": "", "preco": "1.00", "estoque": 1}))
        .send()
        .await
        .expect("Failed to create product");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_page_past_the_end_is_empty() {
    let client = Client::new();
    let user = TestUser::create(&client).await;
    let tag = unique("fim");

    create_product(&client, &user.access, &format!("{tag} um"), "1.00", 1).await;
    create_product(&client, &user.access, &format!("{tag} dois"), "2.00", 1).await;

    let page = list(&client, &format!("nome={tag}&pagina=5&itens_por_pagina=2")).await;
    assert_eq!(page["total_items"], 2);
    assert_eq!(page["pagina"], 5);
    assert_eq!(page["produtos"], serde_json::json!([]));

    let page = list(
        &client,
        &format!("nome={tag}&pagina=4294967295&itens_por_pagina=4294967295"),
    )
    .await;
    assert_eq!(page["total_items"], 2);
    assert_eq!(page["produtos"], serde_json::json!([]));
}
