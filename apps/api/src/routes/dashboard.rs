use axum::{Extension, Json};
use tally_core::Dashboard;

use crate::error::ApiResult;
use crate::state::SharedState;

pub async fn summary(Extension(state): Extension<SharedState>) -> ApiResult<Json<Dashboard>> {
    Ok(Json(state.db.dashboard().summary().await?))
}
