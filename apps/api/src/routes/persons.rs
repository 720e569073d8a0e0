//! Clients and suppliers share one set of handlers; the router for each
//! kind carries its [`PersonKind`] as an extension.

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde::Deserialize;
use tally_core::{AccountStatement, Person, PersonInput, PersonKind};

use super::{found, Deleted, IdList};
use crate::error::{ApiError, ApiResult};
use crate::state::SharedState;

pub fn router(kind: PersonKind) -> Router {
    Router::new()
        .route("/", get(list).post(create).delete(delete_many))
        .route("/:id", get(get_person).put(update).delete(delete))
        .route("/:id/account", get(account))
        .layer(Extension(kind))
}

#[derive(Debug, Default, Deserialize)]
struct SearchQuery {
    search: Option<String>,
}

async fn list(
    Extension(state): Extension<SharedState>,
    Extension(kind): Extension<PersonKind>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<Person>>> {
    let persons = state.db.persons(kind).list(query.search.as_deref()).await?;
    Ok(Json(persons))
}

async fn get_person(
    Extension(state): Extension<SharedState>,
    Extension(kind): Extension<PersonKind>,
    Path(id): Path<String>,
) -> ApiResult<Json<Person>> {
    let person = state.db.persons(kind).get(&id).await?;
    Ok(Json(found(person, &kind.to_string(), &id)?))
}

async fn create(
    Extension(state): Extension<SharedState>,
    Extension(kind): Extension<PersonKind>,
    Json(input): Json<PersonInput>,
) -> ApiResult<(StatusCode, Json<Person>)> {
    let person = state.db.persons(kind).create(input).await?;
    Ok((StatusCode::CREATED, Json(person)))
}

async fn update(
    Extension(state): Extension<SharedState>,
    Extension(kind): Extension<PersonKind>,
    Path(id): Path<String>,
    Json(input): Json<PersonInput>,
) -> ApiResult<Json<Person>> {
    Ok(Json(state.db.persons(kind).update(&id, input).await?))
}

async fn delete(
    Extension(state): Extension<SharedState>,
    Extension(kind): Extension<PersonKind>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.persons(kind).delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_many(
    Extension(state): Extension<SharedState>,
    Extension(kind): Extension<PersonKind>,
    Json(body): Json<IdList>,
) -> ApiResult<Json<Deleted>> {
    if body.ids.is_empty() {
        return Err(ApiError::bad_request("No IDs provided"));
    }
    let deleted = state.db.persons(kind).delete_many(&body.ids).await?;
    Ok(Json(Deleted { deleted }))
}

async fn account(
    Extension(state): Extension<SharedState>,
    Extension(kind): Extension<PersonKind>,
    Path(id): Path<String>,
) -> ApiResult<Json<AccountStatement>> {
    Ok(Json(state.db.accounts().statement(kind, &id).await?))
}
