use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde::Deserialize;
use tally_core::{SaleReceipt, SaleReceiptFilter, SaleReceiptInput, SaleReceiptRow};

use super::found;
use super::sale_invoices::NextNumber;
use crate::error::ApiResult;
use crate::state::SharedState;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list).post(create))
        .route("/next_number", get(next_number))
        .route("/:id", get(get_receipt).put(update).delete(delete))
}

async fn list(
    Extension(state): Extension<SharedState>,
    Query(filter): Query<SaleReceiptFilter>,
) -> ApiResult<Json<Vec<SaleReceiptRow>>> {
    Ok(Json(state.db.sale_receipts().list(&filter).await?))
}

async fn get_receipt(
    Extension(state): Extension<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SaleReceipt>> {
    let receipt = state.db.sale_receipts().get(&id).await?;
    Ok(Json(found(receipt, "SaleReceipt", &id)?))
}

#[derive(Debug, Deserialize)]
struct NextNumberQuery {
    point_of_sale_id: String,
}

async fn next_number(
    Extension(state): Extension<SharedState>,
    Query(query): Query<NextNumberQuery>,
) -> ApiResult<Json<NextNumber>> {
    let number = state
        .db
        .sale_receipts()
        .next_number(&query.point_of_sale_id)
        .await?;
    Ok(Json(NextNumber { number }))
}

async fn create(
    Extension(state): Extension<SharedState>,
    Json(input): Json<SaleReceiptInput>,
) -> ApiResult<(StatusCode, Json<SaleReceipt>)> {
    let receipt = state.db.sale_receipts().create(input).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

async fn update(
    Extension(state): Extension<SharedState>,
    Path(id): Path<String>,
    Json(input): Json<SaleReceiptInput>,
) -> ApiResult<Json<SaleReceipt>> {
    Ok(Json(state.db.sale_receipts().update(&id, input).await?))
}

async fn delete(
    Extension(state): Extension<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.sale_receipts().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
