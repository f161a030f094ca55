//! Weather advisory: resolve a (city, date) to a reading and outfit advice.
//!
//! Dated queries pick an upstream series by distance from today:
//!
//! | days from today | series | flags |
//! |---|---|---|
//! | `0..=16` | forecast for the date | none |
//! | `< 0` | archive for the date | historical |
//! | `> 16` | archive for the same date last year | historical, proxy |

mod advisory;
mod provider;

pub use advisory::*;
pub use provider::*;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{Datelike, FixedOffset, NaiveDate, Offset, Utc};
use serde::Serialize;

use crate::errors::AppError;
use crate::models::{City, CityInfo, WeatherQuery, WeatherResult, WeatherSource};

/// Furthest day ahead the forecast series covers.
pub const FORECAST_HORIZON_DAYS: i64 = 16;

/// Which upstream call answers a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryPlan {
    Live,
    Forecast {
        date: NaiveDate,
    },
    Archive {
        date: NaiveDate,
    },
    ArchiveProxy {
        requested: NaiveDate,
        query_date: NaiveDate,
    },
}

impl QueryPlan {
    pub fn source(&self) -> WeatherSource {
        match self {
            QueryPlan::Live => WeatherSource::Live,
            QueryPlan::Forecast { .. } => WeatherSource::Forecast,
            QueryPlan::Archive { .. } => WeatherSource::Archive,
            QueryPlan::ArchiveProxy { .. } => WeatherSource::ArchiveProxy,
        }
    }
}

/// Choose the upstream call for `date` (None = live) relative to `today`.
pub fn plan_query(date: Option<NaiveDate>, today: NaiveDate) -> QueryPlan {
    let Some(date) = date else {
        return QueryPlan::Live;
    };
    let days_diff = (date - today).num_days();
    if days_diff < 0 {
        QueryPlan::Archive { date }
    } else if days_diff <= FORECAST_HORIZON_DAYS {
        QueryPlan::Forecast { date }
    } else {
        QueryPlan::ArchiveProxy {
            requested: date,
            query_date: one_year_earlier(date),
        }
    }
}

/// Same calendar date a year earlier; Feb 29 rolls over to Mar 1.
pub fn one_year_earlier(date: NaiveDate) -> NaiveDate {
    date.with_year(date.year() - 1)
        .or_else(|| NaiveDate::from_ymd_opt(date.year() - 1, 3, 1))
        .unwrap_or(date)
}

/// A resolved reading with its derived labels.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReport {
    pub city: CityInfo,
    pub weather: WeatherResult,
    pub condition: WeatherCondition,
    pub condition_label: &'static str,
    pub outfit: OutfitAdvice,
}

/// Per-requester tickets; only the newest query per key may apply its answer.
#[derive(Default)]
pub struct LatestQuery {
    next: AtomicU64,
    latest: Mutex<HashMap<String, u64>>,
}

/// An in-flight query. Dropping it clears its entry if it is still the newest,
/// so abandoned requests do not linger in the map.
pub struct QueryTicket<'a> {
    owner: &'a LatestQuery,
    key: String,
    seq: u64,
}

impl LatestQuery {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, u64>> {
        self.latest.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a query for `key`, superseding any still in flight.
    pub fn issue(&self, key: &str) -> QueryTicket<'_> {
        let seq = self.next.fetch_add(1, Ordering::Relaxed);
        self.entries().insert(key.to_string(), seq);
        QueryTicket {
            owner: self,
            key: key.to_string(),
            seq,
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries().len()
    }
}

impl QueryTicket<'_> {
    /// Finish the query. Returns false if a newer one for the same key was issued.
    ///
    /// A missing entry means a newer ticket already finished.
    pub fn finish(self) -> bool {
        let is_latest = self.owner.entries().get(&self.key) == Some(&self.seq);
        is_latest
    }
}

impl Drop for QueryTicket<'_> {
    fn drop(&mut self) {
        let mut latest = self.owner.entries();
        if latest.get(&self.key) == Some(&self.seq) {
            latest.remove(&self.key);
        }
    }
}

pub struct WeatherService {
    provider: Arc<dyn WeatherProvider>,
    utc_offset: FixedOffset,
    latest: LatestQuery,
}

impl WeatherService {
    pub fn new(provider: Arc<dyn WeatherProvider>, utc_offset_hours: i32) -> Self {
        let utc_offset = FixedOffset::east_opt(utc_offset_hours * 3600).unwrap_or_else(|| Utc.fix());
        Self {
            provider,
            utc_offset,
            latest: LatestQuery::new(),
        }
    }

    /// Today's date at the configured offset.
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.utc_offset).date_naive()
    }

    pub async fn resolve(&self, query: WeatherQuery) -> Result<WeatherResult, AppError> {
        self.resolve_on(query, self.today()).await
    }

    /// Resolve as if today were `today`.
    pub async fn resolve_on(
        &self,
        query: WeatherQuery,
        today: NaiveDate,
    ) -> Result<WeatherResult, AppError> {
        let (lat, lon) = query.city.coordinates();
        let plan = plan_query(query.date, today);
        tracing::debug!("Weather for {} planned as {:?}", query.city.name(), plan);

        let reading = match plan {
            QueryPlan::Live => self.provider.current(lat, lon).await,
            QueryPlan::Forecast { date } => self.provider.daily_forecast(lat, lon, date).await,
            QueryPlan::Archive { date } => self.provider.daily_historical(lat, lon, date).await,
            QueryPlan::ArchiveProxy { query_date, .. } => {
                self.provider.daily_historical(lat, lon, query_date).await
            }
        }
        .map_err(|e| {
            tracing::warn!("Weather lookup for {} failed: {}", query.city.name(), e);
            match e {
                AppError::WeatherUnavailable(_) => e,
                other => AppError::WeatherUnavailable(other.message()),
            }
        })?;

        let (is_historical, is_historical_proxy, query_date) = match plan {
            QueryPlan::Live => (false, false, None),
            QueryPlan::Forecast { date } => (false, false, Some(date)),
            QueryPlan::Archive { date } => (true, false, Some(date)),
            QueryPlan::ArchiveProxy { query_date, .. } => (true, true, Some(query_date)),
        };

        Ok(WeatherResult {
            temperature_celsius: reading.temperature_celsius,
            condition_code: reading.condition_code,
            is_historical,
            is_historical_proxy,
            source: plan.source(),
            requested_date: query.date,
            query_date,
        })
    }

    pub async fn report(&self, query: WeatherQuery) -> Result<WeatherReport, AppError> {
        let weather = self.resolve(query).await?;
        Ok(build_report(query.city, weather))
    }

    /// Like [`report`](Self::report), but a query overtaken by a newer one from
    /// the same client fails with `Superseded`.
    pub async fn report_for(
        &self,
        client: Option<&str>,
        query: WeatherQuery,
    ) -> Result<WeatherReport, AppError> {
        let Some(client) = client.filter(|c| !c.is_empty()) else {
            return self.report(query).await;
        };

        let ticket = self.latest.issue(client);
        let result = self.report(query).await;
        if !ticket.finish() {
            tracing::debug!("Dropping superseded weather answer for client {}", client);
            return Err(AppError::Superseded(
                "A newer weather query from this client replaced this one".to_string(),
            ));
        }
        result
    }
}

fn build_report(city: City, weather: WeatherResult) -> WeatherReport {
    let condition = WeatherCondition::from_code(weather.condition_code);
    let outfit = OutfitTier::for_temperature(weather.temperature_celsius).into();
    WeatherReport {
        city: city.into(),
        weather,
        condition,
        condition_label: condition.label(),
        outfit,
    }
}
