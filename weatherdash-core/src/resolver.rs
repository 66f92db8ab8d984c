//! Query resolution: which aggregation to run, and whose result is shown.
//!
//! [`Session`] owns the current query, unit system and displayed record.
//! Every change hands out a [`FetchTicket`] tagged with a sequence number;
//! only the newest ticket's result may replace what is displayed, so a slow
//! response for an abandoned query cannot overwrite a newer one.

use async_trait::async_trait;
use std::fmt;

use crate::{
    aggregate::Aggregator,
    error::GeolocationError,
    model::{AggregatedWeather, Coordinates, Criterion, Query, UnitSystem},
    provider::WeatherSource,
};

#[derive(Debug, Clone, PartialEq)]
pub struct FetchTicket {
    pub seq: u64,
    pub query: Query,
    pub unit: UnitSystem,
}

/// What the caller has to do after a state change.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Run exactly one aggregation for this ticket.
    Fetch(FetchTicket),
    /// The query names no place; obtain the device location first.
    AwaitLocation,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub seq: u64,
    pub weather: Option<AggregatedWeather>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// Latest ticket, but aggregation produced nothing.
    Failed,
    /// Superseded by a newer ticket; result dropped.
    Stale,
}

/// Status line shown to the user around a fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Fetching(String),
    Fetched { name: String, country: String },
    Failed(String),
    Locating,
    Located,
    LocationDenied(String),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Fetching(what) => write!(f, "Fetching weather for {what}."),
            Notice::Fetched { name, country } => {
                write!(f, "Successfully fetched weather for {name}, {country}.")
            }
            Notice::Failed(what) => write!(f, "Failed to load weather data for {what}."),
            Notice::Locating => f.write_str("Fetching user's location."),
            Notice::Located => f.write_str("Location fetched!"),
            Notice::LocationDenied(reason) => write!(f, "Could not get your location: {reason}"),
        }
    }
}

#[derive(Debug, Default)]
pub struct Session {
    query: Query,
    unit: UnitSystem,
    displayed: Option<AggregatedWeather>,
    issued: u64,
}

impl Session {
    pub fn new(unit: UnitSystem) -> Self {
        Self {
            unit,
            ..Self::default()
        }
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn unit(&self) -> UnitSystem {
        self.unit
    }

    pub fn displayed(&self) -> Option<&AggregatedWeather> {
        self.displayed.as_ref()
    }

    /// Replace the query. Always a transition, even for an equal query.
    pub fn set_query(&mut self, query: Query) -> Transition {
        self.query = query;
        self.transition()
    }

    pub fn set_unit(&mut self, unit: UnitSystem) -> Transition {
        if unit == self.unit {
            return Transition::Unchanged;
        }
        self.unit = unit;
        self.transition()
    }

    /// Every transition supersedes all tickets handed out before it, including
    /// one that only waits for the device location.
    fn transition(&mut self) -> Transition {
        self.displayed = None;
        self.issued += 1;

        if self.query.criterion() == Criterion::Device {
            tracing::debug!(seq = self.issued, "query is empty, awaiting device location");
            return Transition::AwaitLocation;
        }

        tracing::debug!(seq = self.issued, query = %self.query.describe(), unit = %self.unit, "issuing fetch");
        Transition::Fetch(FetchTicket {
            seq: self.issued,
            query: self.query.clone(),
            unit: self.unit,
        })
    }

    pub fn notice_for(&self, completion: &Completion) -> Notice {
        match &completion.weather {
            Some(w) => Notice::Fetched {
                name: w.current.name.clone(),
                country: w.current.country.clone(),
            },
            None => Notice::Failed(self.query.describe()),
        }
    }

    /// Apply a finished aggregation if it belongs to the newest ticket.
    pub fn complete(&mut self, completion: Completion) -> Outcome {
        if completion.seq != self.issued {
            tracing::debug!(
                seq = completion.seq,
                latest = self.issued,
                "dropping stale weather result"
            );
            return Outcome::Stale;
        }

        match completion.weather {
            Some(weather) => {
                self.displayed = Some(weather);
                Outcome::Applied
            }
            None => {
                self.displayed = None;
                Outcome::Failed
            }
        }
    }
}

impl<S: WeatherSource> Aggregator<S> {
    /// Run the aggregation a ticket asks for.
    pub async fn resolve(&self, ticket: &FetchTicket) -> Completion {
        Completion {
            seq: ticket.seq,
            weather: self.aggregated_weather(&ticket.query, ticket.unit).await,
        }
    }
}

/// Source of the device position.
#[async_trait]
pub trait Geolocator: Send + Sync + fmt::Debug {
    async fn locate(&self) -> Result<Coordinates, GeolocationError>;
}

/// Always reports the same position, e.g. a configured home location.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocator(pub Coordinates);

#[async_trait]
impl Geolocator for FixedLocator {
    async fn locate(&self) -> Result<Coordinates, GeolocationError> {
        Ok(self.0)
    }
}

/// No location source available.
#[derive(Debug, Clone, Default)]
pub struct NoLocator {
    pub reason: String,
}

#[async_trait]
impl Geolocator for NoLocator {
    async fn locate(&self) -> Result<Coordinates, GeolocationError> {
        Err(GeolocationError::Unavailable(self.reason.clone()))
    }
}

pub async fn locate_query(locator: &dyn Geolocator) -> Result<Query, GeolocationError> {
    let coords = locator.locate().await?;
    tracing::info!(lat = coords.lat, lon = coords.lon, "device location fetched");
    Ok(Query::by_coords(coords))
}
