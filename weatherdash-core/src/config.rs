use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::model::{Coordinates, UnitSystem};

pub const WEATHER_KEY_ENV: &str = "OPENWEATHER_API_KEY";
pub const GEO_KEY_ENV: &str = "GEODB_API_KEY";

/// Upstream locations; overridable so tests and mirrors can point elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Endpoints {
    #[serde(default = "default_weather_base_url")]
    pub weather_base_url: String,

    #[serde(default = "default_geo_base_url")]
    pub geo_base_url: String,

    #[serde(default = "default_catalog_url")]
    pub catalog_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_weather_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_geo_base_url() -> String {
    "https://wft-geo-db.p.rapidapi.com/v1/geo".to_string()
}

fn default_catalog_url() -> String {
    "https://public.opendatasoft.com/api/explore/v2.1/catalog/datasets/geonames-all-cities-with-a-population-1000/records"
        .to_string()
}

const fn default_timeout() -> u64 {
    10
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            weather_base_url: default_weather_base_url(),
            geo_base_url: default_geo_base_url(),
            catalog_url: default_catalog_url(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Fixed device location used when a query names no place.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct HomeLocation {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<HomeLocation> for Coordinates {
    fn from(home: HomeLocation) -> Self {
        Coordinates {
            lat: home.latitude,
            lon: home.longitude,
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// weather_api_key = "..."
/// geo_api_key = "..."
/// units = "imperial"
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo_api_key: Option<String>,

    #[serde(default)]
    pub units: UnitSystem,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home: Option<HomeLocation>,

    #[serde(default)]
    pub endpoints: Endpoints,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weatherdash", "weatherdash")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Override API keys from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|name| std::env::var(name).ok());
    }

    /// Override API keys using `lookup`; blank values are ignored.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_blank(WEATHER_KEY_ENV) {
            self.weather_api_key = Some(key);
        }
        if let Some(key) = non_blank(GEO_KEY_ENV) {
            self.geo_api_key = Some(key);
        }
    }

    pub fn weather_api_key(&self) -> Option<&str> {
        self.weather_api_key.as_deref()
    }

    pub fn geo_api_key(&self) -> Option<&str> {
        self.geo_api_key.as_deref()
    }

    pub fn home_coordinates(&self) -> Option<Coordinates> {
        self.home.map(Coordinates::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.endpoints.timeout_secs, 10);
        assert!(cfg.weather_api_key().is_none());
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let cfg = Config {
            weather_api_key: Some("OW".into()),
            geo_api_key: Some("GEO".into()),
            units: UnitSystem::Imperial,
            home: Some(HomeLocation {
                latitude: 48.85,
                longitude: 2.35,
            }),
            ..Config::default()
        };
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, cfg);
        assert_eq!(
            loaded.home_coordinates(),
            Some(Coordinates { lat: 48.85, lon: 2.35 })
        );
    }

    #[test]
    fn partial_endpoints_keep_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            weather_api_key = "OW"

            [endpoints]
            weather_base_url = "http://localhost:9000"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.endpoints.weather_base_url, "http://localhost:9000");
        assert_eq!(cfg.endpoints.geo_base_url, default_geo_base_url());
        assert_eq!(cfg.units, UnitSystem::Metric);
    }

    #[test]
    fn malformed_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "units = 42").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn env_overrides_keys_but_ignores_blank() {
        let mut cfg = Config {
            weather_api_key: Some("FROM_FILE".into()),
            geo_api_key: Some("GEO_FILE".into()),
            ..Config::default()
        };

        cfg.apply_env_with(|name| match name {
            WEATHER_KEY_ENV => Some("FROM_ENV".into()),
            GEO_KEY_ENV => Some("  ".into()),
            _ => None,
        });

        assert_eq!(cfg.weather_api_key(), Some("FROM_ENV"));
        assert_eq!(cfg.geo_api_key(), Some("GEO_FILE"));
    }
}
