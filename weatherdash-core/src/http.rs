use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::{Result, WeatherError};

pub(crate) fn build_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(WeatherError::Client)
}

/// Send `request` and decode the body as JSON regardless of HTTP status.
pub(crate) async fn fetch_json<T>(service: &'static str, request: RequestBuilder) -> Result<T>
where
    T: DeserializeOwned,
{
    let (status, body) = fetch_text(service, request).await?;

    serde_json::from_str(&body).map_err(|source| WeatherError::Decode {
        service,
        status,
        body: truncate_body(&body),
        source,
    })
}

/// Like [`fetch_json`], but a non-2xx status is a failure.
pub(crate) async fn fetch_json_checked<T>(
    service: &'static str,
    request: RequestBuilder,
) -> Result<T>
where
    T: DeserializeOwned,
{
    let (status, body) = fetch_text(service, request).await?;

    if !(200..300).contains(&status) {
        return Err(WeatherError::Status {
            service,
            status,
            body: truncate_body(&body),
        });
    }

    serde_json::from_str(&body).map_err(|source| WeatherError::Decode {
        service,
        status,
        body: truncate_body(&body),
        source,
    })
}

async fn fetch_text(service: &'static str, request: RequestBuilder) -> Result<(u16, String)> {
    let res = request
        .send()
        .await
        .map_err(|source| WeatherError::Transport { service, source })?;

    let status = res.status().as_u16();
    let body = res
        .text()
        .await
        .map_err(|source| WeatherError::Transport { service, source })?;

    tracing::debug!(service, status, bytes = body.len(), "upstream responded");
    Ok((status, body))
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
