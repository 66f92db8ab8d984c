//! Raw upstream payloads.
//!
//! Blocks are optional so that "city not found" and other partial bodies
//! still decode; the aggregator decides what a usable payload is.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RawCoord {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RawMain {
    pub temp: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity: f64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RawSys {
    pub country: Option<String>,
    pub sunrise: Option<i64>,
    pub sunset: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RawCondition {
    #[serde(default)]
    pub main: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub icon: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RawWind {
    pub speed: f64,
}

/// Body of the current-weather endpoint.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct CurrentPayload {
    /// Upstream status; a number on success, sometimes a string on errors.
    #[serde(default)]
    pub cod: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub coord: Option<RawCoord>,
    #[serde(default)]
    pub main: Option<RawMain>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub dt: Option<i64>,
    #[serde(default)]
    pub sys: Option<RawSys>,
    #[serde(default)]
    pub weather: Vec<RawCondition>,
    #[serde(default)]
    pub wind: Option<RawWind>,
}

/// Daily entries carry a temperature object, hourly entries a bare number.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RawTemp {
    Scalar(f64),
    Detailed { day: f64 },
}

impl RawTemp {
    pub fn day(&self) -> f64 {
        match self {
            RawTemp::Scalar(t) => *t,
            RawTemp::Detailed { day } => *day,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OneCallEntry {
    pub dt: i64,
    pub temp: RawTemp,
    #[serde(default)]
    pub weather: Vec<RawCondition>,
}

/// Body of the one-call forecast endpoint.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct OneCallPayload {
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub daily: Option<Vec<OneCallEntry>>,
    #[serde(default)]
    pub hourly: Option<Vec<OneCallEntry>>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ThreeHourEntry {
    pub dt_txt: String,
    pub main: RawMain,
    #[serde(default)]
    pub weather: Vec<RawCondition>,
    pub wind: RawWind,
    #[serde(default)]
    pub pop: Option<f64>,
}

/// Body of the 5-day / 3-hour forecast endpoint.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ThreeHourlyPayload {
    #[serde(default)]
    pub list: Option<Vec<ThreeHourEntry>>,
}
