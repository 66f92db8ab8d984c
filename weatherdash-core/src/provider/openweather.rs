use async_trait::async_trait;
use reqwest::Client;
use tracing::instrument;

use crate::{
    config::{Endpoints, WEATHER_KEY_ENV},
    error::{Result, WeatherError},
    http::{build_client, fetch_json},
    model::{Coordinates, Criterion, Query, UnitSystem},
};

use super::{
    WeatherSource,
    payload::{CurrentPayload, OneCallPayload, ThreeHourlyPayload},
};

const SERVICE: &str = "OpenWeather";

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: Option<String>,
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: Option<String>, endpoints: &Endpoints) -> Result<Self> {
        Ok(Self {
            api_key,
            base_url: endpoints.weather_base_url.trim_end_matches('/').to_string(),
            http: build_client(endpoints.timeout_secs)?,
        })
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or(WeatherError::MissingApiKey {
                service: SERVICE,
                env_var: WEATHER_KEY_ENV,
            })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{endpoint}", self.base_url)
    }

    fn coord_params(coords: Coordinates, unit: UnitSystem) -> Vec<(&'static str, String)> {
        vec![
            ("lat", coords.lat.to_string()),
            ("lon", coords.lon.to_string()),
            ("units", unit.as_str().to_string()),
        ]
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    #[instrument(skip_all, fields(unit = %unit))]
    async fn fetch_current(&self, query: &Query, unit: UnitSystem) -> Result<CurrentPayload> {
        let mut params: Vec<(&str, String)> = match query.criterion() {
            Criterion::Name(name) => vec![("q", name.to_string())],
            Criterion::Coords(c) => vec![("lat", c.lat.to_string()), ("lon", c.lon.to_string())],
            Criterion::Device => return Err(WeatherError::EmptyQuery),
        };
        params.push(("units", unit.as_str().to_string()));

        let api_key = self.api_key()?;
        tracing::debug!(?params, "fetching current weather");

        let request = self
            .http
            .get(self.url("weather"))
            .query(&params)
            .query(&[("appid", api_key)]);

        fetch_json("OpenWeather current weather", request).await
    }

    #[instrument(skip_all, fields(lat = %coords.lat, lon = %coords.lon, unit = %unit))]
    async fn fetch_one_call(
        &self,
        coords: Coordinates,
        unit: UnitSystem,
    ) -> Result<OneCallPayload> {
        let api_key = self.api_key()?;
        tracing::debug!("fetching one-call forecast");

        let request = self
            .http
            .get(self.url("onecall"))
            .query(&Self::coord_params(coords, unit))
            .query(&[("exclude", "current,minutely,alerts"), ("appid", api_key)]);

        fetch_json("OpenWeather one-call forecast", request).await
    }

    #[instrument(skip_all, fields(lat = %coords.lat, lon = %coords.lon, unit = %unit))]
    async fn fetch_three_hourly(
        &self,
        coords: Coordinates,
        unit: UnitSystem,
    ) -> Result<ThreeHourlyPayload> {
        let api_key = self.api_key()?;
        tracing::debug!("fetching 3-hour forecast");

        let request = self
            .http
            .get(self.url("forecast"))
            .query(&Self::coord_params(coords, unit))
            .query(&[("appid", api_key)]);

        fetch_json("OpenWeather 3-hour forecast", request).await
    }
}
