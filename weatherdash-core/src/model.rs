use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// One-click cities offered next to the search box.
pub const QUICK_PICKS: [&str; 5] = ["New York", "Mumbai", "Dubai", "Toronto", "Paris"];

/// User-specified location criterion.
///
/// Replaced wholesale on every search, selection or locate action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// What a [`Query`] actually asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum Criterion<'a> {
    Name(&'a str),
    Coords(Coordinates),
    /// Nothing usable; fall back to the device location.
    Device,
}

impl Query {
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn by_coords(coords: Coordinates) -> Self {
        Self {
            name: None,
            latitude: Some(coords.lat),
            longitude: Some(coords.lon),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// A non-blank name wins over coordinates; a lone latitude or longitude
    /// is ignored.
    pub fn criterion(&self) -> Criterion<'_> {
        if let Some(name) = self.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            return Criterion::Name(name);
        }

        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Criterion::Coords(Coordinates { lat, lon }),
            _ => Criterion::Device,
        }
    }

    /// Human description used in status notices.
    pub fn describe(&self) -> String {
        match self.criterion() {
            Criterion::Name(name) => name.to_string(),
            Criterion::Coords(c) => format!("{:.4}, {:.4}", c.lat, c.lon),
            Criterion::Device => "current location".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    /// Value of the upstream `units` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }

    pub fn temperature_symbol(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "°C",
            UnitSystem::Imperial => "°F",
        }
    }

    pub fn speed_symbol(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "m/s",
            UnitSystem::Imperial => "mph",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            UnitSystem::Metric => UnitSystem::Imperial,
            UnitSystem::Imperial => UnitSystem::Metric,
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitSystem {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "metric" => Ok(UnitSystem::Metric),
            "imperial" => Ok(UnitSystem::Imperial),
            _ => Err(anyhow::anyhow!(
                "Unknown unit system '{value}'. Supported: metric, imperial."
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Normalized current conditions. Only ever built with every field present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeatherRecord {
    pub lat: f64,
    pub lon: f64,
    pub temp: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity: f64,
    pub name: String,
    pub dt: i64,
    pub country: String,
    pub sunrise: i64,
    pub sunset: i64,
    /// Condition group label, e.g. "Clouds".
    pub details: String,
    pub icon: String,
    pub wind_speed: f64,
}

impl CurrentWeatherRecord {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            lat: self.lat,
            lon: self.lon,
        }
    }
}

/// One normalized daily or hourly forecast entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastBucket {
    pub title: String,
    pub temp: f64,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    pub timezone: String,
    pub daily: Vec<ForecastBucket>,
    pub hourly: Vec<ForecastBucket>,
}

/// The sole artifact handed to presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedWeather {
    #[serde(flatten)]
    pub current: CurrentWeatherRecord,
    pub timezone: String,
    pub daily: Vec<ForecastBucket>,
    pub hourly: Vec<ForecastBucket>,
}

impl AggregatedWeather {
    pub fn merge(current: CurrentWeatherRecord, forecast: ForecastRecord) -> Self {
        Self {
            current,
            timezone: forecast.timezone,
            daily: forecast.daily,
            hourly: forecast.hourly,
        }
    }
}

/// Entry of the 5-day / 3-hour forecast variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreeHourSlot {
    pub dt_txt: String,
    pub temp: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub description: String,
    pub icon: String,
    pub wind_speed: f64,
    /// Probability of precipitation, 0.0..=1.0.
    pub pop: f64,
}

/// City suggestion from the geocoding upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoCity {
    pub name: String,
    pub country_code: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoCity {
    pub fn label(&self) -> String {
        format!("{}, {}", self.name, self.country_code)
    }

    /// Selecting a suggestion searches by its label, like typing it.
    pub fn to_query(&self) -> Query {
        Query::by_name(self.label())
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            lat: self.latitude,
            lon: self.longitude,
        }
    }
}

/// Reference row of the world-city catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityRecord {
    pub name: String,
    #[serde(rename = "cou_name_en", default)]
    pub country: String,
    #[serde(default)]
    pub country_code: String,
    #[serde(default)]
    pub timezone: String,
}
