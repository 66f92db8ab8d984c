//! City-name suggestions from the GeoDB cities API.

use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

use crate::{
    Config,
    config::GEO_KEY_ENV,
    error::{Result, WeatherError},
    http::{build_client, fetch_json},
    model::GeoCity,
};

const SERVICE: &str = "GeoDB cities";
const RAPIDAPI_HOST: &str = "wft-geo-db.p.rapidapi.com";
/// Smallest population a suggested city may have.
pub const MIN_POPULATION: u32 = 10_000;

#[derive(Debug, Deserialize)]
struct CitiesResponse {
    data: Option<Vec<GeoCity>>,
}

#[derive(Debug, Clone)]
pub struct GeocodingClient {
    api_key: Option<String>,
    base_url: String,
    http: Client,
}

impl GeocodingClient {
    pub fn new(api_key: Option<String>, base_url: &str, timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: build_client(timeout_secs)?,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.geo_api_key().map(str::to_owned),
            &config.endpoints.geo_base_url,
            config.endpoints.timeout_secs,
        )
    }

    /// Cities whose name starts with `prefix`.
    #[instrument(skip(self))]
    pub async fn fetch_cities(&self, prefix: &str) -> Result<Vec<GeoCity>> {
        let api_key = self.api_key.as_deref().ok_or(WeatherError::MissingApiKey {
            service: SERVICE,
            env_var: GEO_KEY_ENV,
        })?;

        let request = self
            .http
            .get(format!("{}/cities", self.base_url))
            .query(&[
                ("minPopulation", MIN_POPULATION.to_string()),
                ("namePrefix", prefix.to_string()),
            ])
            .header("X-RapidAPI-Key", api_key)
            .header("X-RapidAPI-Host", RAPIDAPI_HOST);

        let response: CitiesResponse = fetch_json(SERVICE, request).await?;
        let cities = response
            .data
            .ok_or_else(|| WeatherError::missing(SERVICE, "data"))?;

        tracing::debug!(count = cities.len(), "city suggestions received");
        Ok(cities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_key_fails_without_request() {
        let client = GeocodingClient::new(None, "http://127.0.0.1:9", 1).unwrap();
        let err = client.fetch_cities("Par").await.unwrap_err();
        assert!(err.to_string().contains(GEO_KEY_ENV));
    }

    #[test]
    fn suggestions_decode_from_camel_case() {
        let parsed: CitiesResponse = serde_json::from_str(
            r#"{"data":[{"id":1,"name":"Paris","countryCode":"FR","latitude":48.85,"longitude":2.35}]}"#,
        )
        .unwrap();
        let cities = parsed.data.unwrap();
        assert_eq!(cities[0].label(), "Paris, FR");
    }
}
