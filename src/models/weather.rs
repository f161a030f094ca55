//! Weather query and result models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Cities the weather widget knows coordinates for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum City {
    Seoul,
    Busan,
    Jeju,
    Daegu,
    Incheon,
}

impl City {
    pub const ALL: [City; 5] = [
        City::Seoul,
        City::Busan,
        City::Jeju,
        City::Daegu,
        City::Incheon,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            City::Seoul => "Seoul",
            City::Busan => "Busan",
            City::Jeju => "Jeju",
            City::Daegu => "Daegu",
            City::Incheon => "Incheon",
        }
    }

    /// Name shown on the site.
    pub fn name_zh(&self) -> &'static str {
        match self {
            City::Seoul => "首爾",
            City::Busan => "釜山",
            City::Jeju => "濟州",
            City::Daegu => "大邱",
            City::Incheon => "仁川",
        }
    }

    /// `(latitude, longitude)`
    pub fn coordinates(&self) -> (f64, f64) {
        match self {
            City::Seoul => (37.5665, 126.9780),
            City::Busan => (35.1796, 129.0756),
            City::Jeju => (33.4996, 126.5312),
            City::Daegu => (35.8714, 128.6014),
            City::Incheon => (37.4563, 126.7052),
        }
    }

    /// Case-insensitive lookup by English or Chinese name.
    pub fn from_name(s: &str) -> Option<Self> {
        let s = s.trim();
        City::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s) || c.name_zh() == s)
    }
}

/// City entry for the selector.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CityInfo {
    pub name: &'static str,
    pub name_zh: &'static str,
    pub lat: f64,
    pub lon: f64,
}

impl From<City> for CityInfo {
    fn from(city: City) -> Self {
        let (lat, lon) = city.coordinates();
        Self {
            name: city.name(),
            name_zh: city.name_zh(),
            lat,
            lon,
        }
    }
}

/// A weather lookup. `date == None` means the live reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeatherQuery {
    pub city: City,
    pub date: Option<NaiveDate>,
}

/// Which upstream series produced a reading.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum WeatherSource {
    Live,
    Forecast,
    Archive,
    /// Last year's archive standing in for a date beyond the forecast horizon
    ArchiveProxy,
}

/// A resolved reading.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeatherResult {
    pub temperature_celsius: f64,
    pub condition_code: i32,
    /// Read from the archive, either for a past date or as a proxy
    pub is_historical: bool,
    pub is_historical_proxy: bool,
    pub source: WeatherSource,
    /// The date the user asked about
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_date: Option<NaiveDate>,
    /// The date actually sent upstream
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_date: Option<NaiveDate>,
}
