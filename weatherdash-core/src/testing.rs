//! In-memory upstream used by the aggregator and resolver tests.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
};

use crate::{
    error::{Result, WeatherError},
    model::{Coordinates, Criterion, Query, UnitSystem},
    provider::{
        WeatherSource,
        payload::{CurrentPayload, OneCallPayload, ThreeHourlyPayload},
    },
};

/// 2024-01-15T12:00:00Z, a Monday.
pub(crate) const BASE_TS: i64 = 1_705_320_000;

#[derive(Debug, Default)]
pub(crate) struct FakeSource {
    pub current: Value,
    pub one_call: Value,
    pub three_hourly: Value,
    pub current_calls: AtomicUsize,
    pub one_call_calls: AtomicUsize,
    pub units_seen: Mutex<Vec<UnitSystem>>,
}

impl FakeSource {
    pub fn new(current: Value, one_call: Value) -> Self {
        Self {
            current,
            one_call,
            ..Self::default()
        }
    }

    pub fn current_calls(&self) -> usize {
        self.current_calls.load(Ordering::SeqCst)
    }

    pub fn one_call_calls(&self) -> usize {
        self.one_call_calls.load(Ordering::SeqCst)
    }
}

fn decode<T: serde::de::DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value.clone()).map_err(|source| WeatherError::Decode {
        service: "fake",
        status: 200,
        body: value.to_string(),
        source,
    })
}

#[async_trait]
impl WeatherSource for FakeSource {
    async fn fetch_current(&self, query: &Query, unit: UnitSystem) -> Result<CurrentPayload> {
        self.current_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut seen) = self.units_seen.lock() {
            seen.push(unit);
        }

        let mut body = self.current.clone();
        if body.get("coord").is_some() {
            match query.criterion() {
                Criterion::Name(name) => body["name"] = json!(name),
                Criterion::Coords(c) => body["coord"] = json!({ "lat": c.lat, "lon": c.lon }),
                Criterion::Device => return Err(WeatherError::EmptyQuery),
            }
        }
        decode(body)
    }

    async fn fetch_one_call(&self, _coords: Coordinates, _unit: UnitSystem) -> Result<OneCallPayload> {
        self.one_call_calls.fetch_add(1, Ordering::SeqCst);
        decode(self.one_call.clone())
    }

    async fn fetch_three_hourly(&self, _coords: Coordinates, _unit: UnitSystem) -> Result<ThreeHourlyPayload> {
        decode(self.three_hourly.clone())
    }
}

pub(crate) fn current_payload() -> Value {
    json!({
        "coord": { "lon": 2.3488, "lat": 48.8534 },
        "weather": [{ "id": 803, "main": "Clouds", "description": "broken clouds", "icon": "04d" }],
        "main": {
            "temp": 12.3, "feels_like": 11.1, "temp_min": 10.9, "temp_max": 13.5,
            "pressure": 1012, "humidity": 81
        },
        "wind": { "speed": 4.12, "deg": 240 },
        "dt": BASE_TS,
        "sys": { "country": "FR", "sunrise": BASE_TS - 16_400, "sunset": BASE_TS + 15_600 },
        "timezone": 3600,
        "name": "Paris",
        "cod": 200
    })
}

pub(crate) fn not_found_payload() -> Value {
    json!({ "cod": "404", "message": "city not found" })
}

/// One-call body with `days` daily and `hours` hourly entries.
pub(crate) fn one_call_payload(days: usize, hours: usize) -> Value {
    let daily: Vec<Value> = (0..days)
        .map(|i| {
            json!({
                "dt": BASE_TS + i as i64 * 86_400,
                "temp": { "day": 10.0 + i as f64, "min": 5.0, "max": 15.0 },
                "weather": [{ "main": "Clouds", "icon": format!("d{i}") }]
            })
        })
        .collect();
    let hourly: Vec<Value> = (0..hours)
        .map(|i| {
            json!({
                "dt": BASE_TS + i as i64 * 3_600,
                "temp": 20.0 + i as f64,
                "weather": [{ "main": "Clear", "icon": format!("h{i}") }]
            })
        })
        .collect();

    json!({ "lat": 48.8534, "lon": 2.3488, "timezone": "UTC", "daily": daily, "hourly": hourly })
}

pub(crate) fn three_hourly_payload(entries: usize) -> Value {
    let list: Vec<Value> = (0..entries)
        .map(|i| {
            json!({
                "dt": BASE_TS + i as i64 * 10_800,
                "dt_txt": format!("2024-01-15 {:02}:00:00", (12 + 3 * i) % 24),
                "main": {
                    "temp": 10.0 + i as f64, "feels_like": 9.0, "temp_min": 8.0,
                    "temp_max": 12.0, "humidity": 70
                },
                "weather": [{ "main": "Rain", "description": "light rain", "icon": "10d" }],
                "wind": { "speed": 3.5 },
                "pop": 0.4
            })
        })
        .collect();

    json!({ "cod": "200", "cnt": entries, "list": list })
}
