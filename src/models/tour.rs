//! Tour model matching the frontend Tour interface.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status shown on a tour card.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TourStatus {
    #[default]
    Upcoming,
    Ongoing,
    Past,
}

impl TourStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TourStatus::Upcoming => "upcoming",
            TourStatus::Ongoing => "ongoing",
            TourStatus::Past => "past",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "upcoming" => Some(TourStatus::Upcoming),
            "ongoing" => Some(TourStatus::Ongoing),
            "past" => Some(TourStatus::Past),
            _ => None,
        }
    }
}

/// A guided tour listed on the public page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TourRecord {
    pub id: String,
    pub title: String,
    pub destination: String,
    pub departure_city: String,
    /// Calendar date, `YYYY-MM-DD`
    pub departure_date: String,
    #[serde(default)]
    pub description: String,
    /// Image URL or embedded data URL
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub itinerary_link: String,
    #[serde(default)]
    pub status: TourStatus,
    #[serde(default)]
    pub is_full: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

impl TourRecord {
    /// Parse the departure date. Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp.
    pub fn departure_day(&self) -> Option<NaiveDate> {
        parse_calendar_date(&self.departure_date)
    }

    /// Departure instant used for the countdown (midnight UTC for plain dates).
    pub fn departure_instant(&self) -> Option<DateTime<Utc>> {
        let raw = self.departure_date.trim();
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Some(ts.with_timezone(&Utc));
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .map(|d| d.and_time(NaiveTime::MIN).and_utc())
    }
}

fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().or_else(|| {
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|ts| ts.with_timezone(&Utc).date_naive())
    })
}

/// Admin form input for creating or editing a tour.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TourDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub departure_city: Option<String>,
    #[serde(default)]
    pub departure_date: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub itinerary_link: String,
    #[serde(default)]
    pub status: Option<TourStatus>,
    #[serde(default)]
    pub is_full: Option<bool>,
    #[serde(default)]
    pub price: Option<f64>,
}

/// Optional predicates narrowing the visible tour list.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FilterSelection {
    #[serde(default)]
    pub departure_city: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
    /// Month as shown in the filter bar, e.g. `04月` or `4`
    #[serde(default)]
    pub month: Option<String>,
}

/// Request body for changing the featured tour.
#[derive(Debug, Clone, Deserialize)]
pub struct FeaturedPointer {
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tour_on(date: &str) -> TourRecord {
        TourRecord {
            id: "t".to_string(),
            title: "Busan".to_string(),
            destination: "Korea".to_string(),
            departure_city: "Taoyuan".to_string(),
            departure_date: date.to_string(),
            description: String::new(),
            image: String::new(),
            itinerary_link: String::new(),
            status: TourStatus::Upcoming,
            is_full: false,
            price: None,
        }
    }

    #[test]
    fn test_departure_day_formats() {
        let expected = NaiveDate::from_ymd_opt(2026, 4, 29);
        assert_eq!(tour_on("2026-04-29").departure_day(), expected);
        assert_eq!(tour_on("2026-04-29T10:00:00Z").departure_day(), expected);
        assert_eq!(tour_on("someday").departure_day(), None);
        assert_eq!(tour_on("2026-02-30").departure_day(), None);
    }

    #[test]
    fn test_plain_date_departs_at_midnight_utc() {
        let instant = tour_on("2026-04-29").departure_instant().unwrap();
        assert_eq!(instant.to_rfc3339(), "2026-04-29T00:00:00+00:00");
    }

    #[test]
    fn test_json_shape_is_camel_case() {
        let json = serde_json::to_value(tour_on("2026-04-29")).unwrap();
        assert_eq!(json["departureCity"], "Taoyuan");
        assert_eq!(json["isFull"], false);
        assert_eq!(json["status"], "upcoming");
        assert!(json.get("price").is_none());
    }
}
