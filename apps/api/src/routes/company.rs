//! Company settings and year periods.

use axum::extract::Query;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde::Deserialize;
use tally_core::{Company, CompanyInput, YearKind, YearPeriods};

use crate::error::{ApiError, ApiResult};
use crate::state::SharedState;

pub fn router() -> Router {
    Router::new()
        .route("/", get(get_company).post(create).put(save))
        .route("/periods", get(periods))
}

async fn get_company(Extension(state): Extension<SharedState>) -> ApiResult<Json<Company>> {
    let company = state
        .db
        .company()
        .get()
        .await?
        .ok_or_else(|| ApiError::not_found("Company", "settings"))?;
    Ok(Json(company))
}

async fn create(
    Extension(state): Extension<SharedState>,
    Json(input): Json<CompanyInput>,
) -> ApiResult<(StatusCode, Json<Company>)> {
    let company = state.db.company().create(input).await?;
    Ok((StatusCode::CREATED, Json(company)))
}

async fn save(
    Extension(state): Extension<SharedState>,
    Json(input): Json<CompanyInput>,
) -> ApiResult<Json<Company>> {
    Ok(Json(state.db.company().save(input).await?))
}

#[derive(Debug, Default, Deserialize)]
struct PeriodQuery {
    #[serde(default)]
    kind: YearKind,
    year: Option<i32>,
}

async fn periods(
    Extension(state): Extension<SharedState>,
    Query(query): Query<PeriodQuery>,
) -> ApiResult<Json<YearPeriods>> {
    Ok(Json(state.db.company().periods(query.kind, query.year).await?))
}
