//! Tour list filtering.

use chrono::Datelike;

use crate::models::{FilterSelection, TourRecord};

/// Keep the tours matching every non-empty field of `selection`, in order.
///
/// * `departure_city`: exact, case-sensitive
/// * `destination`: substring of the tour's destination
/// * `month`: numeric month of the departure date
///
/// A blank field is no constraint. A tour whose departure date does not parse,
/// or a month value without a leading number, never passes a month filter, so
/// malformed entries drop out instead of matching by accident.
pub fn filter_tours(tours: &[TourRecord], selection: &FilterSelection) -> Vec<TourRecord> {
    let city = non_blank(&selection.departure_city);
    let destination = non_blank(&selection.destination);
    let month = non_blank(&selection.month).map(parse_month);

    tours
        .iter()
        .filter(|tour| city.map_or(true, |c| tour.departure_city == c))
        .filter(|tour| destination.map_or(true, |d| tour.destination.contains(d)))
        .filter(|tour| match month {
            None => true,
            Some(wanted) => {
                let actual = tour.departure_day().map(|d| d.month());
                wanted.is_some() && actual == wanted
            }
        })
        .cloned()
        .collect()
}

/// Leading digits of a month label: `"04月"` → 4, `"12"` → 12, `"月"` → None.
pub fn parse_month(label: &str) -> Option<u32> {
    let digits: String = label
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}
