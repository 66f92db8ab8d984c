use crate::{
    Config,
    error::Result,
    model::{Coordinates, Query, UnitSystem},
    provider::{
        openweather::OpenWeatherClient,
        payload::{CurrentPayload, OneCallPayload, ThreeHourlyPayload},
    },
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;
pub mod payload;

/// Upstream weather API.
///
/// Each call is exactly one outbound request; nothing is retried. Payloads
/// are returned as decoded, without judging their shape.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn fetch_current(&self, query: &Query, unit: UnitSystem) -> Result<CurrentPayload>;

    /// One-call forecast, excluding the current/minutely/alert blocks.
    async fn fetch_one_call(&self, coords: Coordinates, unit: UnitSystem)
    -> Result<OneCallPayload>;

    /// 5-day forecast in 3-hour steps.
    async fn fetch_three_hourly(
        &self,
        coords: Coordinates,
        unit: UnitSystem,
    ) -> Result<ThreeHourlyPayload>;
}

/// Construct the OpenWeather client from config.
///
/// A missing API key is not an error here; every call made with the client
/// fails instead.
pub fn source_from_config(config: &Config) -> Result<OpenWeatherClient> {
    OpenWeatherClient::new(
        config.weather_api_key().map(str::to_owned),
        &config.endpoints,
    )
}
