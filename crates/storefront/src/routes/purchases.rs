//! Purchase and purchase-history routes.

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection, rejection::QueryRejection},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mercado_core::listing::{Pagination, TransactionFilter, TransactionSort};
use mercado_core::{CustomerId, Money, ProductId, Quantity, QuantityError, TransactionId};

use super::MessageResponse;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::RequireAuth;
use crate::models::TransactionRecord;
use crate::services::{PurchaseError, PurchaseService};
use crate::state::AppState;

/// Purchase form. The buyer is named by `username`; numeric fields may be
/// numbers or numeric strings.
#[derive(Debug, Deserialize)]
pub struct PurchaseRequest {
    pub username: Option<String>,
    pub produto_id: Option<serde_json::Value>,
    pub quantidade: Option<serde_json::Value>,
}

/// Buy a product.
///
/// POST /api/compra
pub async fn purchase(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
    body: std::result::Result<Json<PurchaseRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>)> {
    let Json(req) = body?;

    let quantity = req
        .quantidade
        .as_ref()
        .ok_or(QuantityError::NotInteger)
        .and_then(Quantity::from_value)
        .map_err(|_| {
            AppError::BadRequest("A quantidade deve ser um número inteiro positivo.".to_string())
        })?;
    let product_id = parse_product_id(req.produto_id.as_ref())?;
    let username = req.username.unwrap_or_default();

    let product = product_id.to_string();
    add_breadcrumb(
        "purchase",
        "Purchase requested",
        Some(&[
            ("caller", caller.username.as_str()),
            ("username", username.as_str()),
            ("product_id", product.as_str()),
        ]),
    );

    PurchaseService::new(state.pool())
        .purchase(&username, product_id, quantity)
        .await?;

    Ok((
        StatusCode::CREATED,
        MessageResponse::json("Compra realizada com sucesso"),
    ))
}

/// `produto_id` as a product ID. Integers that fit no product are reported
/// as a missing product.
fn parse_product_id(value: Option<&serde_json::Value>) -> Result<ProductId> {
    let invalid = || AppError::BadRequest("O produto_id deve ser um número inteiro.".to_string());

    let raw = match value {
        Some(serde_json::Value::Number(n)) => n.as_i64().ok_or_else(invalid)?,
        Some(serde_json::Value::String(s)) => s.trim().parse::<i64>().map_err(|_| invalid())?,
        _ => return Err(invalid()),
    };

    i32::try_from(raw)
        .map(ProductId::new)
        .map_err(|_| PurchaseError::ProductNotFound.into())
}

/// History query string.
#[derive(Debug, Deserialize)]
pub struct ListTransactionsQuery {
    pub produto: Option<String>,
    pub quantidade_min: Option<String>,
    pub ordenar_por: Option<String>,
    pub pagina: Option<String>,
    pub itens_por_pagina: Option<String>,
}

/// A transaction on the wire.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub id: TransactionId,
    pub cliente: CustomerId,
    pub produto: ProductId,
    pub produto_nome: String,
    pub quantidade: Quantity,
    pub total: Money,
    pub data: DateTime<Utc>,
}

impl From<TransactionRecord> for TransactionResponse {
    fn from(record: TransactionRecord) -> Self {
        let t = record.transaction;
        Self {
            id: t.id,
            cliente: t.customer_id,
            produto: t.product_id,
            produto_nome: record.product_name,
            quantidade: t.quantity,
            total: t.total,
            data: t.created_at,
        }
    }
}

/// A page of transactions.
#[derive(Debug, Serialize)]
pub struct TransactionPage {
    pub total_items: i64,
    pub pagina: u32,
    pub itens_por_pagina: u32,
    pub transacoes: Vec<TransactionResponse>,
}

/// List the caller's purchases.
///
/// GET /api/transacoes
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    query: std::result::Result<Query<ListTransactionsQuery>, QueryRejection>,
) -> Result<Json<TransactionPage>> {
    let Query(query) = query?;

    let filter =
        TransactionFilter::from_params(query.produto.as_deref(), query.quantidade_min.as_deref())?;
    let sort = TransactionSort::from_param(query.ordenar_por.as_deref());
    let page = Pagination::from_params(query.pagina.as_deref(), query.itens_por_pagina.as_deref())?;

    let (records, total_items) = PurchaseService::new(state.pool())
        .history(user.id, &filter, sort, &page)
        .await?;

    Ok(Json(TransactionPage {
        total_items,
        pagina: page.page(),
        itens_por_pagina: page.per_page(),
        transacoes: records.into_iter().map(TransactionResponse::from).collect(),
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_product_id() {
        assert_eq!(parse_product_id(Some(&json!(7))).unwrap(), ProductId::new(7));
        assert_eq!(parse_product_id(Some(&json!("8"))).unwrap(), ProductId::new(8));
    }

    #[test]
    fn test_parse_product_id_rejects_non_integers() {
        for value in [json!("abc"), json!(1.5), json!(null)] {
            assert!(matches!(
                parse_product_id(Some(&value)),
                Err(AppError::BadRequest(_))
            ));
        }
        assert!(matches!(parse_product_id(None), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_out_of_range_product_id_is_not_found() {
        assert!(matches!(
            parse_product_id(Some(&json!(i64::MAX))),
            Err(AppError::Purchase(PurchaseError::ProductNotFound))
        ));
    }
}
