//! Chart of accounts and journal entries. Entries are posted whole and
//! cannot be edited afterwards, so there is no `PUT`.

use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Extension, Json, Router};
use tally_core::{
    ChartAccount, ChartAccountInput, ChartCategory, ChartCategoryInput, JournalEntry,
    JournalEntryInput,
};

use super::found;
use crate::error::ApiResult;
use crate::state::SharedState;

pub fn router() -> Router {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route("/accounts", get(list_accounts).post(create_account))
        .route("/entries", get(list_entries).post(post_entry))
        .route("/entries/:id", get(get_entry))
}

async fn list_categories(
    Extension(state): Extension<SharedState>,
) -> ApiResult<Json<Vec<ChartCategory>>> {
    Ok(Json(state.db.bookkeeping().list_categories().await?))
}

async fn create_category(
    Extension(state): Extension<SharedState>,
    Json(input): Json<ChartCategoryInput>,
) -> ApiResult<(StatusCode, Json<ChartCategory>)> {
    let category = state.db.bookkeeping().create_category(input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

async fn list_accounts(
    Extension(state): Extension<SharedState>,
) -> ApiResult<Json<Vec<ChartAccount>>> {
    Ok(Json(state.db.bookkeeping().list_accounts().await?))
}

async fn create_account(
    Extension(state): Extension<SharedState>,
    Json(input): Json<ChartAccountInput>,
) -> ApiResult<(StatusCode, Json<ChartAccount>)> {
    let account = state.db.bookkeeping().create_account(input).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

async fn list_entries(Extension(state): Extension<SharedState>) -> ApiResult<Json<Vec<JournalEntry>>> {
    Ok(Json(state.db.bookkeeping().list_entries().await?))
}

async fn get_entry(
    Extension(state): Extension<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<JournalEntry>> {
    let entry = state.db.bookkeeping().get_entry(&id).await?;
    Ok(Json(found(entry, "JournalEntry", &id)?))
}

async fn post_entry(
    Extension(state): Extension<SharedState>,
    Json(input): Json<JournalEntryInput>,
) -> ApiResult<(StatusCode, Json<JournalEntry>)> {
    let entry = state.db.bookkeeping().post_entry(input).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}
