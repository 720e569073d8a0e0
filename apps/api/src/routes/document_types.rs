use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Extension, Json, Router};
use tally_core::{DocumentType, DocumentTypeInput};

use super::found;
use crate::error::ApiResult;
use crate::state::SharedState;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(get_type).put(update))
}

async fn list(Extension(state): Extension<SharedState>) -> ApiResult<Json<Vec<DocumentType>>> {
    Ok(Json(state.db.document_types().list().await?))
}

async fn get_type(
    Extension(state): Extension<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DocumentType>> {
    let doc_type = state.db.document_types().get(&id).await?;
    Ok(Json(found(doc_type, "DocumentType", &id)?))
}

async fn create(
    Extension(state): Extension<SharedState>,
    Json(input): Json<DocumentTypeInput>,
) -> ApiResult<(StatusCode, Json<DocumentType>)> {
    let doc_type = state.db.document_types().create(input).await?;
    Ok((StatusCode::CREATED, Json(doc_type)))
}

async fn update(
    Extension(state): Extension<SharedState>,
    Path(id): Path<String>,
    Json(input): Json<DocumentTypeInput>,
) -> ApiResult<Json<DocumentType>> {
    Ok(Json(state.db.document_types().update(&id, input).await?))
}
