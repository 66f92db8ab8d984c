//! Weather aggregation: current conditions plus forecast, merged into the
//! single record handed to presentation.
//!
//! The current-weather call comes first because the forecast call needs the
//! coordinates it returns. A payload without `coord` (the upstream's answer
//! to an unknown city) ends the aggregation before any forecast request.

use tracing::instrument;

use crate::{
    error::{Result, WeatherError},
    format::{HOUR_MINUTE, WEEKDAY_SHORT, format_local_time},
    model::{
        AggregatedWeather, Coordinates, CurrentWeatherRecord, ForecastBucket, ForecastRecord,
        Query, ThreeHourSlot, UnitSystem,
    },
    provider::{
        WeatherSource,
        payload::{CurrentPayload, OneCallEntry, OneCallPayload, ThreeHourlyPayload},
    },
};

/// Number of buckets kept from each forecast series.
pub const FORECAST_WINDOW: usize = 5;

const CURRENT: &str = "OpenWeather current weather";
const ONE_CALL: &str = "OpenWeather one-call forecast";
const THREE_HOURLY: &str = "OpenWeather 3-hour forecast";

#[derive(Debug, Clone)]
pub struct Aggregator<S> {
    source: S,
}

impl<S: WeatherSource> Aggregator<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Current weather merged with the daily/hourly forecast.
    ///
    /// Returns `None` on any failure; the reason is logged, never raised.
    #[instrument(skip_all, fields(query = %query.describe(), unit = %unit))]
    pub async fn aggregated_weather(
        &self,
        query: &Query,
        unit: UnitSystem,
    ) -> Option<AggregatedWeather> {
        match self.try_aggregate(query, unit).await {
            Ok(Some(weather)) => {
                tracing::info!(
                    name = %weather.current.name,
                    country = %weather.current.country,
                    "weather aggregated"
                );
                Some(weather)
            }
            Ok(None) => None,
            Err(err) => {
                let err = anyhow::Error::new(err);
                tracing::warn!("failed to get weather: {err:#}");
                None
            }
        }
    }

    async fn try_aggregate(
        &self,
        query: &Query,
        unit: UnitSystem,
    ) -> Result<Option<AggregatedWeather>> {
        let payload = self.source.fetch_current(query, unit).await?;

        if payload.coord.is_none() {
            tracing::warn!(
                cod = ?payload.cod,
                upstream = payload.message.as_deref().unwrap_or("-"),
                "no coordinate data available, try another search"
            );
            return Ok(None);
        }

        let current = normalize_current(payload)?;
        let forecast = self
            .source
            .fetch_one_call(current.coordinates(), unit)
            .await?;
        let forecast = normalize_forecast(forecast)?;

        Ok(Some(AggregatedWeather::merge(current, forecast)))
    }

    /// First entries of the 5-day / 3-hour series, taken as they come.
    #[instrument(skip_all, fields(lat = %coords.lat, lon = %coords.lon, unit = %unit))]
    pub async fn short_forecast(
        &self,
        coords: Coordinates,
        unit: UnitSystem,
    ) -> Result<Vec<ThreeHourSlot>> {
        let payload = self.source.fetch_three_hourly(coords, unit).await?;
        normalize_three_hourly(payload)
    }
}

pub fn normalize_current(payload: CurrentPayload) -> Result<CurrentWeatherRecord> {
    let missing = |field| WeatherError::missing(CURRENT, field);

    let coord = payload.coord.ok_or_else(|| missing("coord"))?;
    let main = payload.main.ok_or_else(|| missing("main"))?;
    let sys = payload.sys.ok_or_else(|| missing("sys"))?;
    let wind = payload.wind.ok_or_else(|| missing("wind"))?;
    let condition = payload
        .weather
        .into_iter()
        .next()
        .ok_or_else(|| missing("weather[0]"))?;

    Ok(CurrentWeatherRecord {
        lat: coord.lat,
        lon: coord.lon,
        temp: main.temp,
        feels_like: main.feels_like,
        temp_min: main.temp_min,
        temp_max: main.temp_max,
        humidity: main.humidity,
        name: payload.name.ok_or_else(|| missing("name"))?,
        dt: payload.dt.ok_or_else(|| missing("dt"))?,
        country: sys.country.ok_or_else(|| missing("sys.country"))?,
        sunrise: sys.sunrise.ok_or_else(|| missing("sys.sunrise"))?,
        sunset: sys.sunset.ok_or_else(|| missing("sys.sunset"))?,
        details: condition.main.ok_or_else(|| missing("weather[0].main"))?,
        icon: condition.icon,
        wind_speed: wind.speed,
    })
}

/// Half a forecast counts as none: both series or neither.
pub fn normalize_forecast(payload: OneCallPayload) -> Result<ForecastRecord> {
    let timezone = payload.timezone.unwrap_or_else(|| "UTC".to_string());

    let (Some(daily), Some(hourly)) = (payload.daily, payload.hourly) else {
        tracing::debug!("forecast series incomplete, dropping both");
        return Ok(ForecastRecord {
            timezone,
            daily: Vec::new(),
            hourly: Vec::new(),
        });
    };

    let daily = buckets(&daily, &timezone, WEEKDAY_SHORT)?;
    let hourly = buckets(&hourly, &timezone, HOUR_MINUTE)?;

    Ok(ForecastRecord {
        timezone,
        daily,
        hourly,
    })
}

// Entry 0 repeats the current conditions.
fn buckets(series: &[OneCallEntry], timezone: &str, pattern: &str) -> Result<Vec<ForecastBucket>> {
    series
        .iter()
        .skip(1)
        .take(FORECAST_WINDOW)
        .map(|entry| {
            let icon = entry
                .weather
                .first()
                .map(|w| w.icon.clone())
                .ok_or_else(|| WeatherError::missing(ONE_CALL, "weather[0].icon"))?;

            Ok(ForecastBucket {
                title: format_local_time(entry.dt, timezone, pattern),
                temp: entry.temp.day(),
                icon,
            })
        })
        .collect()
}

pub fn normalize_three_hourly(payload: ThreeHourlyPayload) -> Result<Vec<ThreeHourSlot>> {
    let list = payload
        .list
        .ok_or_else(|| WeatherError::missing(THREE_HOURLY, "list"))?;

    list.into_iter()
        .take(FORECAST_WINDOW)
        .map(|entry| {
            let condition = entry
                .weather
                .into_iter()
                .next()
                .ok_or_else(|| WeatherError::missing(THREE_HOURLY, "weather[0]"))?;

            Ok(ThreeHourSlot {
                dt_txt: entry.dt_txt,
                temp: entry.main.temp,
                feels_like: entry.main.feels_like,
                temp_min: entry.main.temp_min,
                temp_max: entry.main.temp_max,
                description: condition
                    .description
                    .ok_or_else(|| WeatherError::missing(THREE_HOURLY, "weather[0].description"))?,
                icon: condition.icon,
                wind_speed: entry.wind.speed,
                pop: entry.pop.unwrap_or(0.0),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        FakeSource, current_payload, not_found_payload, one_call_payload, three_hourly_payload,
    };
    use serde_json::json;

    fn aggregator(current: serde_json::Value, one_call: serde_json::Value) -> Aggregator<FakeSource> {
        Aggregator::new(FakeSource::new(current, one_call))
    }

    #[tokio::test]
    async fn paris_scenario() {
        let agg = aggregator(current_payload(), one_call_payload(8, 8));

        let weather = agg
            .aggregated_weather(&Query::by_name("Paris"), UnitSystem::Metric)
            .await
            .expect("weather for Paris");

        assert_eq!(weather.current.details, "Clouds");
        assert_eq!(weather.current.icon, "04d");
        assert_eq!(weather.current.country, "FR");
        assert_eq!(weather.current.wind_speed, 4.12);
        assert_eq!(weather.daily.len(), 5);
        assert_eq!(weather.hourly.len(), 5);
        assert_eq!(agg.source().one_call_calls(), 1);
    }

    #[tokio::test]
    async fn city_not_found_skips_forecast() {
        let agg = aggregator(not_found_payload(), one_call_payload(8, 8));

        let weather = agg
            .aggregated_weather(&Query::by_name("Atlantis"), UnitSystem::Metric)
            .await;

        assert!(weather.is_none());
        assert_eq!(agg.source().current_calls(), 1);
        assert_eq!(agg.source().one_call_calls(), 0);
    }

    #[tokio::test]
    async fn coordinates_are_echoed_and_idempotent() {
        let agg = aggregator(current_payload(), one_call_payload(8, 8));
        let query = Query::by_coords(Coordinates { lat: 35.6895, lon: 139.6917 });

        let first = agg.aggregated_weather(&query, UnitSystem::Imperial).await.unwrap();
        let second = agg.aggregated_weather(&query, UnitSystem::Imperial).await.unwrap();

        assert_eq!(first.current.lat, 35.6895);
        assert_eq!(first.current.lon, 139.6917);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn missing_block_fails_whole_record() {
        let mut body = current_payload();
        body.as_object_mut().unwrap().remove("wind");
        let agg = aggregator(body, one_call_payload(8, 8));

        let weather = agg
            .aggregated_weather(&Query::by_name("Paris"), UnitSystem::Metric)
            .await;

        assert!(weather.is_none());
        assert_eq!(agg.source().one_call_calls(), 0);
    }

    #[tokio::test]
    async fn undecodable_forecast_yields_none() {
        let agg = aggregator(current_payload(), json!("not an object"));

        let weather = agg
            .aggregated_weather(&Query::by_name("Paris"), UnitSystem::Metric)
            .await;

        assert!(weather.is_none());
        assert_eq!(agg.source().one_call_calls(), 1);
    }

    #[tokio::test]
    async fn forecast_error_body_keeps_current_weather() {
        let agg = aggregator(
            current_payload(),
            json!({ "cod": 401, "message": "Invalid API key" }),
        );

        let weather = agg
            .aggregated_weather(&Query::by_name("Paris"), UnitSystem::Metric)
            .await
            .unwrap();

        assert!(weather.daily.is_empty());
        assert!(weather.hourly.is_empty());
        assert_eq!(weather.timezone, "UTC");
        assert_eq!(weather.current.name, "Paris");
    }

    #[test]
    fn half_payload_is_no_payload() {
        let mut only_daily = one_call_payload(8, 8);
        only_daily.as_object_mut().unwrap().remove("hourly");
        let record = normalize_forecast(serde_json::from_value(only_daily).unwrap()).unwrap();
        assert!(record.daily.is_empty() && record.hourly.is_empty());

        let mut only_hourly = one_call_payload(8, 8);
        only_hourly.as_object_mut().unwrap().remove("daily");
        let record = normalize_forecast(serde_json::from_value(only_hourly).unwrap()).unwrap();
        assert!(record.daily.is_empty() && record.hourly.is_empty());
    }

    #[test]
    fn series_skip_first_entry_and_cap_at_window() {
        let record = normalize_forecast(serde_json::from_value(one_call_payload(8, 48)).unwrap())
            .unwrap();

        let icons: Vec<&str> = record.daily.iter().map(|b| b.icon.as_str()).collect();
        assert_eq!(icons, ["d1", "d2", "d3", "d4", "d5"]);
        assert_eq!(record.daily[0].temp, 11.0);
        // BASE_TS + 1 day is a Tuesday.
        assert_eq!(record.daily[0].title, "Tue");

        assert_eq!(record.hourly.len(), 5);
        assert_eq!(record.hourly[0].icon, "h1");
        assert_eq!(record.hourly[0].temp, 21.0);
        assert_eq!(record.hourly[0].title, "01:00 PM");
    }

    #[test]
    fn short_series_yield_fewer_buckets() {
        let record =
            normalize_forecast(serde_json::from_value(one_call_payload(3, 1)).unwrap()).unwrap();
        assert_eq!(record.daily.len(), 2);
        assert!(record.hourly.is_empty());
    }

    #[test]
    fn titles_use_forecast_timezone() {
        let mut body = one_call_payload(2, 2);
        body["timezone"] = json!("Asia/Tokyo");
        let record = normalize_forecast(serde_json::from_value(body).unwrap()).unwrap();
        // 13:00 UTC is 22:00 in Tokyo.
        assert_eq!(record.hourly[0].title, "10:00 PM");
    }

    #[tokio::test]
    async fn short_forecast_keeps_first_entries() {
        let mut source = FakeSource::default();
        source.three_hourly = three_hourly_payload(40);
        let agg = Aggregator::new(source);

        let slots = agg
            .short_forecast(Coordinates { lat: 1.0, lon: 2.0 }, UnitSystem::Metric)
            .await
            .unwrap();

        assert_eq!(slots.len(), 5);
        assert_eq!(slots[0].dt_txt, "2024-01-15 12:00:00");
        assert_eq!(slots[0].temp, 10.0);
        assert_eq!(slots[0].description, "light rain");
        assert_eq!(slots[0].pop, 0.4);
    }

    #[test]
    fn short_forecast_takes_min_of_window_and_length() {
        let slots =
            normalize_three_hourly(serde_json::from_value(three_hourly_payload(3)).unwrap())
                .unwrap();
        assert_eq!(slots.len(), 3);

        let err = normalize_three_hourly(ThreeHourlyPayload::default()).unwrap_err();
        assert!(err.to_string().contains("`list`"));
    }
}
