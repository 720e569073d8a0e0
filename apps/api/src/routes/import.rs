//! Bulk CSV upload.
//!
//! ```text
//! POST /api/import/sale_invoices?filename=march.csv
//! Content-Type: text/csv
//!
//! <raw file bytes>
//! ```
//!
//! Either every row is created (201 with a summary) or nothing is and the
//! response lists every failing row.

use axum::body::Bytes;
use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Extension, Json, Router};
use serde::Deserialize;
use tally_core::import::{ImportKind, ImportSummary};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::state::SharedState;

pub fn router() -> Router {
    Router::new().route("/:kind", post(upload))
}

#[derive(Debug, Deserialize)]
struct UploadQuery {
    filename: Option<String>,
}

async fn upload(
    Extension(state): Extension<SharedState>,
    Path(kind): Path<ImportKind>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<ImportSummary>)> {
    let filename = query
        .filename
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("A filename query parameter is required"))?;

    info!(%kind, %filename, bytes = body.len(), "Import received");

    let summary = state.db.importer().import(kind, &filename, &body).await?;
    Ok((StatusCode::CREATED, Json(summary)))
}
