use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Extension, Json, Router};
use tally_core::{PointOfSale, PointOfSaleInput};

use super::found;
use crate::error::ApiResult;
use crate::state::SharedState;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(get_point).put(update))
}

async fn list(Extension(state): Extension<SharedState>) -> ApiResult<Json<Vec<PointOfSale>>> {
    Ok(Json(state.db.points_of_sale().list().await?))
}

async fn get_point(
    Extension(state): Extension<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<PointOfSale>> {
    let point = state.db.points_of_sale().get(&id).await?;
    Ok(Json(found(point, "PointOfSale", &id)?))
}

async fn create(
    Extension(state): Extension<SharedState>,
    Json(input): Json<PointOfSaleInput>,
) -> ApiResult<(StatusCode, Json<PointOfSale>)> {
    let point = state.db.points_of_sale().create(input).await?;
    Ok((StatusCode::CREATED, Json(point)))
}

async fn update(
    Extension(state): Extension<SharedState>,
    Path(id): Path<String>,
    Json(input): Json<PointOfSaleInput>,
) -> ApiResult<Json<PointOfSale>> {
    Ok(Json(state.db.points_of_sale().update(&id, input).await?))
}
