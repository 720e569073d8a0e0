//! Purchase invoices and receipts.

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde::Deserialize;
use tally_core::{
    PurchaseInvoice, PurchaseInvoiceInput, PurchaseInvoiceRow, PurchaseReceipt,
    PurchaseReceiptInput,
};

use super::found;
use crate::error::ApiResult;
use crate::state::SharedState;

pub fn invoice_router() -> Router {
    Router::new()
        .route("/", get(list_invoices).post(create_invoice))
        .route(
            "/:id",
            get(get_invoice).put(update_invoice).delete(delete_invoice),
        )
}

pub fn receipt_router() -> Router {
    Router::new()
        .route("/", get(list_receipts).post(create_receipt))
        .route(
            "/:id",
            get(get_receipt).put(update_receipt).delete(delete_receipt),
        )
}

// =============================================================================
// Invoices
// =============================================================================

#[derive(Debug, Default, Deserialize)]
struct InvoiceQuery {
    supplier_id: Option<String>,
}

async fn list_invoices(
    Extension(state): Extension<SharedState>,
    Query(query): Query<InvoiceQuery>,
) -> ApiResult<Json<Vec<PurchaseInvoiceRow>>> {
    let rows = state
        .db
        .purchases()
        .list_invoices(query.supplier_id.as_deref())
        .await?;
    Ok(Json(rows))
}

async fn get_invoice(
    Extension(state): Extension<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<PurchaseInvoice>> {
    let invoice = state.db.purchases().get_invoice(&id).await?;
    Ok(Json(found(invoice, "PurchaseInvoice", &id)?))
}

async fn create_invoice(
    Extension(state): Extension<SharedState>,
    Json(input): Json<PurchaseInvoiceInput>,
) -> ApiResult<(StatusCode, Json<PurchaseInvoice>)> {
    let invoice = state.db.purchases().create_invoice(input).await?;
    Ok((StatusCode::CREATED, Json(invoice)))
}

async fn update_invoice(
    Extension(state): Extension<SharedState>,
    Path(id): Path<String>,
    Json(input): Json<PurchaseInvoiceInput>,
) -> ApiResult<Json<PurchaseInvoice>> {
    Ok(Json(state.db.purchases().update_invoice(&id, input).await?))
}

async fn delete_invoice(
    Extension(state): Extension<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.purchases().delete_invoice(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Receipts
// =============================================================================

#[derive(Debug, Default, Deserialize)]
struct ReceiptQuery {
    invoice_id: Option<String>,
}

async fn list_receipts(
    Extension(state): Extension<SharedState>,
    Query(query): Query<ReceiptQuery>,
) -> ApiResult<Json<Vec<PurchaseReceipt>>> {
    let receipts = state
        .db
        .purchases()
        .list_receipts(query.invoice_id.as_deref())
        .await?;
    Ok(Json(receipts))
}

async fn get_receipt(
    Extension(state): Extension<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<PurchaseReceipt>> {
    let receipt = state.db.purchases().get_receipt(&id).await?;
    Ok(Json(found(receipt, "PurchaseReceipt", &id)?))
}

async fn create_receipt(
    Extension(state): Extension<SharedState>,
    Json(input): Json<PurchaseReceiptInput>,
) -> ApiResult<(StatusCode, Json<PurchaseReceipt>)> {
    let receipt = state.db.purchases().create_receipt(input).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

async fn update_receipt(
    Extension(state): Extension<SharedState>,
    Path(id): Path<String>,
    Json(input): Json<PurchaseReceiptInput>,
) -> ApiResult<Json<PurchaseReceipt>> {
    Ok(Json(state.db.purchases().update_receipt(&id, input).await?))
}

async fn delete_receipt(
    Extension(state): Extension<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.purchases().delete_receipt(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
