use thiserror::Error;

/// Failures from the upstream clients.
///
/// The aggregator turns every one of these into a `None` result; the
/// geocoding, catalog and 3-hour forecast calls hand them to the caller.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error(
        "No API key configured for {service}.\n\
         Hint: run `weatherdash configure` or set {env_var}."
    )]
    MissingApiKey {
        service: &'static str,
        env_var: &'static str,
    },

    #[error("Query has neither a city name nor coordinates")]
    EmptyQuery,

    #[error("Failed to reach {service}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to decode {service} response (status {status}): {body}")]
    Decode {
        service: &'static str,
        status: u16,
        body: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{service} request failed with status {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("{service} response is missing `{field}`")]
    MissingField {
        service: &'static str,
        field: &'static str,
    },

    #[error("Failed to build HTTP client")]
    Client(#[source] reqwest::Error),
}

impl WeatherError {
    pub(crate) fn missing(service: &'static str, field: &'static str) -> Self {
        Self::MissingField { service, field }
    }
}

/// Why no device location could be obtained.
#[derive(Debug, Error)]
pub enum GeolocationError {
    #[error("Location access denied: {0}")]
    Denied(String),

    #[error("Location unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T, E = WeatherError> = std::result::Result<T, E>;
