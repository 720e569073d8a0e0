//! Payment methods and terms. `POST` takes one object or an array.

use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Extension, Json, Router};
use tally_core::{PaymentMethod, PaymentMethodInput, PaymentTerm, PaymentTermInput};

use super::{found, OneOrMany};
use crate::error::ApiResult;
use crate::state::SharedState;

pub fn router() -> Router {
    Router::new()
        .route("/methods", get(list_methods).post(create_methods))
        .route(
            "/methods/:id",
            get(get_method).put(update_method).delete(delete_method),
        )
        .route("/terms", get(list_terms).post(create_terms))
        .route(
            "/terms/:id",
            get(get_term).put(update_term).delete(delete_term),
        )
}

// =============================================================================
// Methods
// =============================================================================

async fn list_methods(
    Extension(state): Extension<SharedState>,
) -> ApiResult<Json<Vec<PaymentMethod>>> {
    Ok(Json(state.db.payment_conditions().list_methods().await?))
}

async fn get_method(
    Extension(state): Extension<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<PaymentMethod>> {
    let method = state.db.payment_conditions().get_method(&id).await?;
    Ok(Json(found(method, "PaymentMethod", &id)?))
}

async fn create_methods(
    Extension(state): Extension<SharedState>,
    Json(body): Json<OneOrMany<PaymentMethodInput>>,
) -> ApiResult<(StatusCode, Json<Vec<PaymentMethod>>)> {
    let created = state
        .db
        .payment_conditions()
        .create_methods(body.into_vec())
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_method(
    Extension(state): Extension<SharedState>,
    Path(id): Path<String>,
    Json(input): Json<PaymentMethodInput>,
) -> ApiResult<Json<PaymentMethod>> {
    Ok(Json(
        state.db.payment_conditions().update_method(&id, input).await?,
    ))
}

async fn delete_method(
    Extension(state): Extension<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.payment_conditions().delete_method(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Terms
// =============================================================================

async fn list_terms(Extension(state): Extension<SharedState>) -> ApiResult<Json<Vec<PaymentTerm>>> {
    Ok(Json(state.db.payment_conditions().list_terms().await?))
}

async fn get_term(
    Extension(state): Extension<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<PaymentTerm>> {
    let term = state.db.payment_conditions().get_term(&id).await?;
    Ok(Json(found(term, "PaymentTerm", &id)?))
}

async fn create_terms(
    Extension(state): Extension<SharedState>,
    Json(body): Json<OneOrMany<PaymentTermInput>>,
) -> ApiResult<(StatusCode, Json<Vec<PaymentTerm>>)> {
    let created = state
        .db
        .payment_conditions()
        .create_terms(body.into_vec())
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_term(
    Extension(state): Extension<SharedState>,
    Path(id): Path<String>,
    Json(input): Json<PaymentTermInput>,
) -> ApiResult<Json<PaymentTerm>> {
    Ok(Json(state.db.payment_conditions().update_term(&id, input).await?))
}

async fn delete_term(
    Extension(state): Extension<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.payment_conditions().delete_term(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
