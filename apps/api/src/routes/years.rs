use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Extension, Json, Router};
use tally_core::{FinancialYear, FinancialYearInput};

use super::found;
use crate::error::{ApiError, ApiResult};
use crate::state::SharedState;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list).post(create))
        .route("/current", get(current))
        .route("/:id", get(get_year).put(update).delete(delete))
}

async fn list(Extension(state): Extension<SharedState>) -> ApiResult<Json<Vec<FinancialYear>>> {
    Ok(Json(state.db.years().list().await?))
}

async fn current(Extension(state): Extension<SharedState>) -> ApiResult<Json<FinancialYear>> {
    let year = state
        .db
        .years()
        .current()
        .await?
        .ok_or_else(|| ApiError::not_found("FinancialYear", "current"))?;
    Ok(Json(year))
}

async fn get_year(
    Extension(state): Extension<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<FinancialYear>> {
    let year = state.db.years().get(&id).await?;
    Ok(Json(found(year, "FinancialYear", &id)?))
}

async fn create(
    Extension(state): Extension<SharedState>,
    Json(input): Json<FinancialYearInput>,
) -> ApiResult<(StatusCode, Json<FinancialYear>)> {
    let year = state.db.years().create(input).await?;
    Ok((StatusCode::CREATED, Json(year)))
}

async fn update(
    Extension(state): Extension<SharedState>,
    Path(id): Path<String>,
    Json(input): Json<FinancialYearInput>,
) -> ApiResult<Json<FinancialYear>> {
    Ok(Json(state.db.years().update(&id, input).await?))
}

async fn delete(
    Extension(state): Extension<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.years().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
