//! Admin edits to the working tour list.
//!
//! Each operation returns the complete new list; the caller saves it as a
//! whole so the store can reconcile against it.

use chrono::{DateTime, Utc};

use crate::errors::AppError;
use crate::models::{TourDraft, TourRecord};

/// Departure city preselected in the admin form.
pub const DEFAULT_DEPARTURE_CITY: &str = "桃園";

/// Timestamp-derived id for a new tour: `tour-<unix millis>`.
pub fn new_tour_id(now: DateTime<Utc>) -> String {
    format!("tour-{}", now.timestamp_millis())
}

/// Check the fields the admin form requires.
pub fn validate_draft(draft: &TourDraft) -> Result<(), AppError> {
    let mut missing = Vec::new();
    if draft.title.trim().is_empty() {
        missing.push("title");
    }
    if draft.destination.trim().is_empty() {
        missing.push("destination");
    }
    if missing.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )))
    }
}

/// Add a new tour built from `draft` at the front of the list.
pub fn add_tour(
    tours: &[TourRecord],
    draft: TourDraft,
    now: DateTime<Utc>,
) -> Result<(Vec<TourRecord>, TourRecord), AppError> {
    validate_draft(&draft)?;

    let base = new_tour_id(now);
    let mut id = base.clone();
    let mut n = 2;
    while tours.iter().any(|t| t.id == id) {
        id = format!("{}-{}", base, n);
        n += 1;
    }

    let tour = from_draft(id, draft, None);
    let mut next = Vec::with_capacity(tours.len() + 1);
    next.push(tour.clone());
    next.extend_from_slice(tours);
    Ok((next, tour))
}

/// Replace the fields of tour `id` in place, keeping its id and position.
pub fn update_tour(
    tours: &[TourRecord],
    id: &str,
    draft: TourDraft,
) -> Result<(Vec<TourRecord>, TourRecord), AppError> {
    validate_draft(&draft)?;

    let index = tours
        .iter()
        .position(|t| t.id == id)
        .ok_or_else(|| AppError::NotFound(format!("Tour not found: {}", id)))?;

    let tour = from_draft(id.to_string(), draft, Some(&tours[index]));
    let mut next = tours.to_vec();
    next[index] = tour.clone();
    Ok((next, tour))
}

/// Drop tour `id` from the list.
pub fn remove_tour(tours: &[TourRecord], id: &str) -> Result<Vec<TourRecord>, AppError> {
    if !tours.iter().any(|t| t.id == id) {
        return Err(AppError::NotFound(format!("Tour not found: {}", id)));
    }
    Ok(tours.iter().filter(|t| t.id != id).cloned().collect())
}

fn from_draft(id: String, draft: TourDraft, existing: Option<&TourRecord>) -> TourRecord {
    let departure_city = draft
        .departure_city
        .filter(|c| !c.trim().is_empty())
        .or_else(|| existing.map(|t| t.departure_city.clone()))
        .unwrap_or_else(|| DEFAULT_DEPARTURE_CITY.to_string());

    TourRecord {
        id,
        title: draft.title.trim().to_string(),
        destination: draft.destination.trim().to_string(),
        departure_city,
        departure_date: draft.departure_date.trim().to_string(),
        description: draft.description,
        image: draft.image,
        itinerary_link: draft.itinerary_link,
        status: draft
            .status
            .or_else(|| existing.map(|t| t.status))
            .unwrap_or_default(),
        is_full: draft
            .is_full
            .or_else(|| existing.map(|t| t.is_full))
            .unwrap_or(false),
        price: draft.price.or_else(|| existing.and_then(|t| t.price)),
    }
}
