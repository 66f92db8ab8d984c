//! Core library for the `weatherdash` terminal dashboard.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Upstream clients (OpenWeather, GeoDB cities, the world-city catalog)
//! - Aggregation of current weather and forecasts into one view model
//! - Query resolution and session state
//!
//! It is used by `weatherdash-cli`, but can also be reused by other front ends.

pub mod aggregate;
pub mod cities;
pub mod config;
pub mod error;
pub mod format;
pub mod geocoding;
mod http;
pub mod model;
pub mod provider;
pub mod resolver;
pub mod theme;

#[cfg(test)]
mod testing;

pub use aggregate::Aggregator;
pub use config::Config;
pub use error::{GeolocationError, WeatherError};
pub use model::{AggregatedWeather, Coordinates, Query, UnitSystem};
pub use provider::{WeatherSource, openweather::OpenWeatherClient, source_from_config};
pub use resolver::{Session, Transition};
