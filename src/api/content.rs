//! List endpoints shared by every content kind.

use axum::{extract::State, Json};

use super::{success, ApiResult, SavedList};
use crate::sync::SyncRecord;
use crate::AppState;

/// GET /api/{kind} - The stored list.
pub async fn list_content<R: SyncRecord>(State(state): State<AppState>) -> ApiResult<Vec<R>> {
    success(state.store.load::<R>().await?)
}

/// PUT /api/{kind} - Replace the stored list with the submitted one.
pub async fn replace_content<R: SyncRecord>(
    State(state): State<AppState>,
    Json(items): Json<Vec<R>>,
) -> ApiResult<SavedList<R>> {
    tracing::info!(
        "Saving {} list with {} entries",
        R::KIND.storage_key(),
        items.len()
    );
    let report = state.store.save(&items).await?;
    let items = state.store.load::<R>().await?;
    success(SavedList { items, report })
}
