//! World-city picklist: fetch the catalog once, then filter and sort locally.

use reqwest::Client;
use serde::Deserialize;
use std::str::FromStr;

use crate::{
    Config,
    error::{Result, WeatherError},
    http::{build_client, fetch_json_checked},
    model::CityRecord,
};

const SERVICE: &str = "city catalog";
pub const DEFAULT_LIMIT: u32 = 100;

#[derive(Debug, Deserialize)]
struct CatalogResponse {
    #[serde(default)]
    results: Option<Vec<CityRecord>>,
}

#[derive(Debug, Clone)]
pub struct CatalogClient {
    url: String,
    http: Client,
}

impl CatalogClient {
    pub fn new(url: &str, timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            url: url.to_string(),
            http: build_client(timeout_secs)?,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.endpoints.catalog_url, config.endpoints.timeout_secs)
    }

    pub async fn fetch(&self, limit: u32) -> Result<CityCatalog> {
        let request = self.http.get(&self.url).query(&[("limit", limit)]);
        let response: CatalogResponse = fetch_json_checked(SERVICE, request).await?;

        let records = response
            .results
            .ok_or_else(|| WeatherError::missing(SERVICE, "results"))?;

        tracing::debug!(count = records.len(), "city catalog fetched");
        Ok(CityCatalog::new(records))
    }
}

/// Column a catalog listing can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CityKey {
    #[default]
    Name,
    Country,
    CountryCode,
    Timezone,
}

impl CityKey {
    fn field<'a>(&self, record: &'a CityRecord) -> &'a str {
        match self {
            CityKey::Name => &record.name,
            CityKey::Country => &record.country,
            CityKey::CountryCode => &record.country_code,
            CityKey::Timezone => &record.timezone,
        }
    }
}

impl FromStr for CityKey {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "name" | "city" => Ok(CityKey::Name),
            "country" => Ok(CityKey::Country),
            "code" | "country_code" => Ok(CityKey::CountryCode),
            "timezone" | "tz" => Ok(CityKey::Timezone),
            _ => Err(anyhow::anyhow!(
                "Unknown sort key '{value}'. Supported: name, country, code, timezone."
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortConfig {
    pub key: CityKey,
    pub descending: bool,
}

impl SortConfig {
    /// Re-selecting the current key flips direction; a new key starts ascending.
    pub fn toggle(self, key: CityKey) -> Self {
        let descending = self.key == key && !self.descending;
        Self { key, descending }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CityFilter {
    /// Case-insensitive substring of the city name.
    pub search: Option<String>,
    /// Substring of the IANA zone, e.g. "Europe/Berlin".
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CityCatalog {
    records: Vec<CityRecord>,
}

impl CityCatalog {
    pub fn new(records: Vec<CityRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn view(&self, filter: &CityFilter, sort: SortConfig) -> Vec<&CityRecord> {
        let needle = filter.search.as_deref().map(str::to_lowercase);

        let mut rows: Vec<&CityRecord> = self
            .records
            .iter()
            .filter(|r| {
                needle
                    .as_deref()
                    .is_none_or(|n| r.name.to_lowercase().contains(n))
            })
            .filter(|r| {
                filter
                    .timezone
                    .as_deref()
                    .is_none_or(|tz| r.timezone.contains(tz))
            })
            .collect();

        rows.sort_by(|a, b| {
            let ord = sort.key.field(a).cmp(sort.key.field(b));
            if sort.descending { ord.reverse() } else { ord }
        });
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, country: &str, code: &str, tz: &str) -> CityRecord {
        CityRecord {
            name: name.into(),
            country: country.into(),
            country_code: code.into(),
            timezone: tz.into(),
        }
    }

    fn catalog() -> CityCatalog {
        CityCatalog::new(vec![
            record("Tokyo", "Japan", "JP", "Asia/Tokyo"),
            record("Berlin", "Germany", "DE", "Europe/Berlin"),
            record("London", "United Kingdom", "GB", "Europe/London"),
            record("Kabul", "Afghanistan", "AF", "Asia/Kabul"),
        ])
    }

    fn names(rows: Vec<&CityRecord>) -> Vec<&str> {
        rows.into_iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn default_view_sorts_by_name() {
        let cat = catalog();
        let rows = cat.view(&CityFilter::default(), SortConfig::default());
        assert_eq!(names(rows), ["Berlin", "Kabul", "London", "Tokyo"]);
    }

    #[test]
    fn search_is_case_insensitive() {
        let cat = catalog();
        let filter = CityFilter {
            search: Some("ON".into()),
            ..CityFilter::default()
        };
        assert_eq!(names(cat.view(&filter, SortConfig::default())), ["London"]);
    }

    #[test]
    fn timezone_filter_and_descending_sort() {
        let cat = catalog();
        let filter = CityFilter {
            timezone: Some("Asia/".into()),
            ..CityFilter::default()
        };
        let sort = SortConfig {
            key: CityKey::CountryCode,
            descending: true,
        };
        assert_eq!(names(cat.view(&filter, sort)), ["Tokyo", "Kabul"]);
    }

    #[test]
    fn toggle_flips_same_key_and_resets_new_key() {
        let sort = SortConfig::default();
        let flipped = sort.toggle(CityKey::Name);
        assert!(flipped.descending);
        assert!(!flipped.toggle(CityKey::Name).descending);

        let other = flipped.toggle(CityKey::Country);
        assert_eq!(other.key, CityKey::Country);
        assert!(!other.descending);
    }

    #[test]
    fn sort_key_parsing() {
        assert_eq!("tz".parse::<CityKey>().unwrap(), CityKey::Timezone);
        assert!("population".parse::<CityKey>().is_err());
    }

    #[test]
    fn catalog_record_decodes_from_geonames_fields() {
        let parsed: CatalogResponse = serde_json::from_str(
            r#"{"total_count":1,"results":[{"name":"Tirana","cou_name_en":"Albania","country_code":"AL","timezone":"Europe/Tirane","population":418495}]}"#,
        )
        .unwrap();
        let rows = parsed.results.unwrap();
        assert_eq!(rows[0], record("Tirana", "Albania", "AL", "Europe/Tirane"));
    }
}
