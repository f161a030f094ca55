//! Upstream weather readings.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::config::Config;
use crate::errors::AppError;

/// Time zone the daily series are requested in.
pub const DAILY_TIMEZONE: &str = "Asia/Seoul";

/// One temperature and WMO condition code.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub temperature_celsius: f64,
    pub condition_code: i32,
}

/// Source of weather readings for a coordinate.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// The reading right now.
    async fn current(&self, lat: f64, lon: f64) -> Result<Reading, AppError>;

    /// Daily reading for a date within the forecast horizon.
    async fn daily_forecast(&self, lat: f64, lon: f64, date: NaiveDate) -> Result<Reading, AppError>;

    /// Daily reading for a past date.
    async fn daily_historical(&self, lat: f64, lon: f64, date: NaiveDate) -> Result<Reading, AppError>;
}

/// Open-Meteo forecast and archive APIs.
#[derive(Clone)]
pub struct OpenMeteoProvider {
    client: reqwest::Client,
    forecast_url: String,
    archive_url: String,
}

impl OpenMeteoProvider {
    pub fn new(
        forecast_url: impl Into<String>,
        archive_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            forecast_url: forecast_url.into(),
            archive_url: archive_url.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Self::new(
            config.forecast_url.clone(),
            config.archive_url.clone(),
            Duration::from_secs(config.weather_timeout_secs),
        )
    }

    async fn fetch_daily(
        &self,
        base_url: &str,
        lat: f64,
        lon: f64,
        date: NaiveDate,
    ) -> Result<Reading, AppError> {
        let day = date.format("%Y-%m-%d").to_string();
        tracing::debug!("Daily weather {} for ({}, {}) from {}", day, lat, lon, base_url);

        let response: DailyResponse = self
            .client
            .get(base_url)
            .query(&[
                ("latitude", lat.to_string()),
                ("longitude", lon.to_string()),
                (
                    "daily",
                    "temperature_2m_max,temperature_2m_min,weather_code".to_string(),
                ),
                ("start_date", day.clone()),
                ("end_date", day),
                ("timezone", DAILY_TIMEZONE.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response.daily.first_reading()
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoProvider {
    async fn current(&self, lat: f64, lon: f64) -> Result<Reading, AppError> {
        tracing::debug!("Current weather for ({}, {})", lat, lon);

        let response: CurrentResponse = self
            .client
            .get(&self.forecast_url)
            .query(&[
                ("latitude", lat.to_string()),
                ("longitude", lon.to_string()),
                ("current_weather", "true".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(Reading {
            temperature_celsius: response.current_weather.temperature,
            condition_code: response.current_weather.weathercode,
        })
    }

    async fn daily_forecast(&self, lat: f64, lon: f64, date: NaiveDate) -> Result<Reading, AppError> {
        self.fetch_daily(&self.forecast_url, lat, lon, date).await
    }

    async fn daily_historical(&self, lat: f64, lon: f64, date: NaiveDate) -> Result<Reading, AppError> {
        self.fetch_daily(&self.archive_url, lat, lon, date).await
    }
}

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    current_weather: CurrentWeather,
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    temperature: f64,
    weathercode: i32,
}

#[derive(Debug, Deserialize)]
struct DailyResponse {
    daily: DailySeries,
}

/// Archive days without data come back as `null`.
#[derive(Debug, Default, Deserialize)]
struct DailySeries {
    #[serde(default)]
    temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    weather_code: Vec<Option<i32>>,
}

impl DailySeries {
    fn first_reading(&self) -> Result<Reading, AppError> {
        let first = |series: &[Option<f64>]| series.first().copied().flatten();
        match (
            first(&self.temperature_2m_max),
            first(&self.temperature_2m_min),
            self.weather_code.first().copied().flatten(),
        ) {
            (Some(max), Some(min), Some(code)) => Ok(Reading {
                temperature_celsius: daily_mean(max, min),
                condition_code: code,
            }),
            _ => Err(AppError::WeatherUnavailable(
                "No daily data for the requested date".to_string(),
            )),
        }
    }
}

/// Mean of the day's max and min, rounded to one decimal with halves going up.
pub fn daily_mean(max: f64, min: f64) -> f64 {
    ((max + min) / 2.0 * 10.0 + 0.5).floor() / 10.0
}
