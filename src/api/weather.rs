//! Weather advisory endpoints.

use axum::{
    extract::{Query, State},
    http::HeaderMap,
};
use chrono::NaiveDate;
use serde::Deserialize;

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{City, CityInfo, WeatherQuery};
use crate::weather::WeatherReport;
use crate::AppState;

/// Header identifying the requesting tab for the superseded-query check.
pub const CLIENT_ID_HEADER: &str = "x-client-id";

#[derive(Debug, Deserialize)]
pub struct WeatherParams {
    pub city: String,
    /// `YYYY-MM-DD`; absent, empty or `now` means the live reading
    #[serde(default)]
    pub date: Option<String>,
}

impl WeatherParams {
    fn to_query(&self) -> Result<WeatherQuery, AppError> {
        let city = City::from_name(&self.city)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown city: {}", self.city)))?;

        let date = match self.date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(s) if s.eq_ignore_ascii_case("now") => None,
            Some(s) => Some(NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
                AppError::BadRequest(format!("Invalid date {:?}, expected YYYY-MM-DD", s))
            })?),
        };

        Ok(WeatherQuery { city, date })
    }
}

/// GET /api/weather/cities
pub async fn list_cities() -> ApiResult<Vec<CityInfo>> {
    success(City::ALL.into_iter().map(CityInfo::from).collect())
}

/// GET /api/weather?city=&date=
pub async fn get_weather(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<WeatherParams>,
) -> ApiResult<WeatherReport> {
    let query = params.to_query()?;
    let client = headers
        .get(CLIENT_ID_HEADER)
        .and_then(|v| v.to_str().ok());

    success(state.weather.report_for(client, query).await?)
}
