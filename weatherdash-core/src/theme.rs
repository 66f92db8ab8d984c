use serde::Serialize;
use std::fmt;

use crate::model::{AggregatedWeather, UnitSystem};

/// Themed background shown behind the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backdrop {
    Clear,
    Cold,
    Cloudy,
    Haze,
    Hot,
    Rainy,
}

impl Backdrop {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backdrop::Clear => "clear",
            Backdrop::Cold => "cold",
            Backdrop::Cloudy => "cloudy",
            Backdrop::Haze => "haze",
            Backdrop::Hot => "hot",
            Backdrop::Rainy => "rainy",
        }
    }
}

impl fmt::Display for Backdrop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn cold_threshold(unit: UnitSystem) -> f64 {
    match unit {
        UnitSystem::Metric => 20.0,
        UnitSystem::Imperial => 60.0,
    }
}

/// A recognised condition label decides; otherwise temperature does.
pub fn select_backdrop(details: &str, temp: f64, unit: UnitSystem) -> Backdrop {
    let by_temperature = if temp <= cold_threshold(unit) {
        Backdrop::Cold
    } else {
        Backdrop::Clear
    };

    match details.to_lowercase().as_str() {
        "clear" => Backdrop::Clear,
        "clouds" => Backdrop::Cloudy,
        "smoke" | "haze" => Backdrop::Haze,
        "hot" => Backdrop::Hot,
        "rain" => Backdrop::Rainy,
        "cold" => Backdrop::Cold,
        _ => by_temperature,
    }
}

pub fn backdrop_for(weather: &AggregatedWeather, unit: UnitSystem) -> Backdrop {
    select_backdrop(&weather.current.details, weather.current.temp, unit)
}
