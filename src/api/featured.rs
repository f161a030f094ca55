//! Hero banner: the featured tour and its countdown.

use axum::{extract::State, Json};
use serde::Serialize;

use super::{success, ApiResult};
use crate::catalog::{select_featured, Countdown, CountdownState};
use crate::errors::AppError;
use crate::models::{FeaturedPointer, TourRecord};
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaturedView {
    pub tour: TourRecord,
    /// The stored pointer, which may name a tour that no longer exists
    pub featured_id: String,
    pub countdown: Countdown,
    pub finished: bool,
}

/// GET /api/featured
pub async fn get_featured(State(state): State<AppState>) -> ApiResult<FeaturedView> {
    success(featured_view(&state).await?)
}

/// PUT /api/featured - Point the hero at another tour.
pub async fn set_featured(
    State(state): State<AppState>,
    Json(pointer): Json<FeaturedPointer>,
) -> ApiResult<FeaturedView> {
    state.store.save_featured(pointer.id.trim()).await?;
    tracing::info!("Featured tour set to {:?}", pointer.id);
    success(featured_view(&state).await?)
}

async fn featured_view(state: &AppState) -> Result<FeaturedView, AppError> {
    let tours: Vec<TourRecord> = state.store.load().await?;
    let featured_id = state.store.load_featured().await?;
    let tour = select_featured(&tours, &featured_id);

    // An unparseable departure date shows a stopped, zeroed countdown.
    let CountdownState {
        countdown,
        finished,
    } = match tour.departure_instant() {
        Some(target) => state.countdown.current(target).await,
        None => CountdownState {
            countdown: Countdown::default(),
            finished: true,
        },
    };

    Ok(FeaturedView {
        tour,
        featured_id,
        countdown,
        finished,
    })
}
