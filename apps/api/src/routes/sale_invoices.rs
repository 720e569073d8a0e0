//! Sales invoices.
//!
//! Listing takes every [`SaleInvoiceFilter`] field as a query parameter,
//! plus `fields=` to project the response.

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tally_core::{SaleInvoice, SaleInvoiceFilter, SaleInvoiceInput};

use super::{found, Projection};
use crate::error::ApiResult;
use crate::state::SharedState;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list).post(create))
        .route("/next_number", get(next_number))
        .route("/:id", get(get_invoice).put(update).delete(delete))
}

async fn list(
    Extension(state): Extension<SharedState>,
    Query(filter): Query<SaleInvoiceFilter>,
    Query(projection): Query<Projection>,
) -> ApiResult<Json<Value>> {
    let rows = state.db.sale_invoices().list(&filter).await?;
    Ok(Json(projection.apply(&rows)?))
}

async fn get_invoice(
    Extension(state): Extension<SharedState>,
    Path(id): Path<String>,
    Query(projection): Query<Projection>,
) -> ApiResult<Json<Value>> {
    let invoice = state.db.sale_invoices().get(&id).await?;
    let invoice = found(invoice, "SaleInvoice", &id)?;
    Ok(Json(projection.apply(&invoice)?))
}

#[derive(Debug, Deserialize)]
struct NextNumberQuery {
    doc_type_id: String,
    point_of_sale_id: String,
}

#[derive(Debug, Serialize)]
pub struct NextNumber {
    pub number: String,
}

async fn next_number(
    Extension(state): Extension<SharedState>,
    Query(query): Query<NextNumberQuery>,
) -> ApiResult<Json<NextNumber>> {
    let number = state
        .db
        .sale_invoices()
        .next_number(&query.doc_type_id, &query.point_of_sale_id)
        .await?;
    Ok(Json(NextNumber { number }))
}

async fn create(
    Extension(state): Extension<SharedState>,
    Json(input): Json<SaleInvoiceInput>,
) -> ApiResult<(StatusCode, Json<SaleInvoice>)> {
    let invoice = state.db.sale_invoices().create(input).await?;
    Ok((StatusCode::CREATED, Json(invoice)))
}

async fn update(
    Extension(state): Extension<SharedState>,
    Path(id): Path<String>,
    Json(input): Json<SaleInvoiceInput>,
) -> ApiResult<Json<SaleInvoice>> {
    Ok(Json(state.db.sale_invoices().update(&id, input).await?))
}

async fn delete(
    Extension(state): Extension<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.sale_invoices().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
