//! Tour API endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;

use super::{success, ApiResult};
use crate::catalog::{add_tour, filter_tours, remove_tour, update_tour};
use crate::models::{FilterSelection, TourDraft, TourRecord};
use crate::AppState;

/// GET /api/tours - Tours matching the filter bar selection.
pub async fn list_tours(
    State(state): State<AppState>,
    Query(selection): Query<FilterSelection>,
) -> ApiResult<Vec<TourRecord>> {
    let tours: Vec<TourRecord> = state.store.load().await?;
    success(filter_tours(&tours, &selection))
}

/// POST /api/tours - Create a tour from the admin form.
pub async fn create_tour(
    State(state): State<AppState>,
    Json(draft): Json<TourDraft>,
) -> ApiResult<TourRecord> {
    let tours: Vec<TourRecord> = state.store.load().await?;
    let (next, tour) = add_tour(&tours, draft, Utc::now())?;
    state.store.save(&next).await?;

    tracing::info!("Created tour {}", tour.id);
    success(tour)
}

/// PUT /api/tours/:id - Edit a tour in place.
pub async fn edit_tour(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(draft): Json<TourDraft>,
) -> ApiResult<TourRecord> {
    let tours: Vec<TourRecord> = state.store.load().await?;
    let (next, tour) = update_tour(&tours, &id, draft)?;
    state.store.save(&next).await?;

    tracing::info!("Updated tour {}", id);
    success(tour)
}

/// DELETE /api/tours/:id - Delete a tour.
pub async fn delete_tour(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let tours: Vec<TourRecord> = state.store.load().await?;
    let next = remove_tour(&tours, &id)?;
    state.store.save(&next).await?;

    tracing::info!("Deleted tour {}", id);
    success(())
}
