//! Catalog routes.

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection, rejection::QueryRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use mercado_core::listing::{Pagination, ProductFilter, ProductSort};
use mercado_core::{Money, ProductId};

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::Product;
use crate::services::CatalogService;
use crate::state::AppState;

/// A product on the wire.
#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: ProductId,
    pub nome: String,
    pub preco: Money,
    pub estoque: i32,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            nome: product.name,
            preco: product.price,
            estoque: product.stock.get(),
        }
    }
}

/// Product creation form.
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub nome: Option<String>,
    pub preco: Option<serde_json::Value>,
    pub estoque: Option<serde_json::Value>,
}

/// Create a product.
///
/// POST /api/criar-produto
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    body: std::result::Result<Json<CreateProductRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ProductResponse>)> {
    let Json(req) = body?;

    let product = CatalogService::new(state.pool())
        .create_product(
            req.nome.as_deref(),
            req.preco.as_ref(),
            req.estoque.as_ref(),
        )
        .await?;
    tracing::debug!(user_id = %user.id, product_id = %product.id, "Product created by user");

    Ok((StatusCode::CREATED, Json(product.into())))
}

/// Catalog query string. Every value is optional and read leniently.
#[derive(Debug, Deserialize)]
pub struct ListProductsQuery {
    pub nome: Option<String>,
    pub preco_max: Option<String>,
    pub ordenar_por: Option<String>,
    pub pagina: Option<String>,
    pub itens_por_pagina: Option<String>,
}

/// A page of products.
#[derive(Debug, Serialize)]
pub struct ProductPage {
    pub total_items: i64,
    pub pagina: u32,
    pub itens_por_pagina: u32,
    pub produtos: Vec<ProductResponse>,
}

/// List products.
///
/// GET /api/produtos
pub async fn list(
    State(state): State<AppState>,
    query: std::result::Result<Query<ListProductsQuery>, QueryRejection>,
) -> Result<Json<ProductPage>> {
    let Query(query) = query?;

    let filter = ProductFilter::from_params(query.nome.as_deref(), query.preco_max.as_deref())?;
    let sort = ProductSort::from_param(query.ordenar_por.as_deref());
    let page = Pagination::from_params(query.pagina.as_deref(), query.itens_por_pagina.as_deref())?;

    let (products, total_items) = CatalogService::new(state.pool())
        .list(&filter, sort, &page)
        .await?;

    Ok(Json(ProductPage {
        total_items,
        pagina: page.page(),
        itens_por_pagina: page.per_page(),
        produtos: products.into_iter().map(ProductResponse::from).collect(),
    }))
}
