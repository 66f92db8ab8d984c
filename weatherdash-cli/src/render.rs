//! Plain-text rendering of the view model.

use weatherdash_core::{
    AggregatedWeather, UnitSystem,
    format::{HOUR_MINUTE, format_local_time, format_local_time_default, icon_url_from_code},
    cities::CityCatalog,
    model::{CityRecord, ForecastBucket, GeoCity, ThreeHourSlot},
    theme::backdrop_for,
};

pub fn weather(w: &AggregatedWeather, unit: UnitSystem) -> String {
    let c = &w.current;
    let deg = unit.temperature_symbol();
    let tz = w.timezone.as_str();

    let mut lines = vec![
        format!("{}, {}", c.name, c.country),
        format_local_time_default(c.dt, tz),
        String::new(),
        format!("{}  ({})", c.details, icon_url_from_code(&c.icon)),
        format!(
            "Temperature {:.0}{deg}   feels like {:.0}{deg}   low {:.0}{deg}   high {:.0}{deg}",
            c.temp, c.feels_like, c.temp_min, c.temp_max
        ),
        format!(
            "Humidity {:.0}%   Wind {:.1} {}",
            c.humidity,
            c.wind_speed,
            unit.speed_symbol()
        ),
        format!(
            "Sunrise {}   Sunset {}",
            format_local_time(c.sunrise, tz, HOUR_MINUTE),
            format_local_time(c.sunset, tz, HOUR_MINUTE)
        ),
        format!("Backdrop: {}", backdrop_for(w, unit)),
    ];

    push_section(&mut lines, "Hourly forecast", &w.hourly, deg);
    push_section(&mut lines, "Daily forecast", &w.daily, deg);
    lines.join("\n")
}

/// The aggregated record as JSON, with the backdrop alongside its fields.
pub fn weather_json(w: &AggregatedWeather, unit: UnitSystem) -> serde_json::Result<serde_json::Value> {
    let mut value = serde_json::to_value(w)?;
    if let Some(fields) = value.as_object_mut() {
        fields.insert("backdrop".to_string(), serde_json::to_value(backdrop_for(w, unit))?);
    }
    Ok(value)
}

fn push_section(lines: &mut Vec<String>, title: &str, buckets: &[ForecastBucket], deg: &str) {
    lines.push(String::new());
    lines.push(title.to_string());

    if buckets.is_empty() {
        lines.push("  (not available)".to_string());
        return;
    }
    for b in buckets {
        lines.push(format!("  {:<9} {:>4.0}{deg}  {}", b.title, b.temp, b.icon));
    }
}

pub fn three_hour(slots: &[ThreeHourSlot], unit: UnitSystem) -> String {
    if slots.is_empty() {
        return "No forecast slots available.".to_string();
    }

    let deg = unit.temperature_symbol();
    slots
        .iter()
        .map(|s| {
            format!(
                "{}  {:>4.0}{deg}  {:<20} wind {:.1} {}  rain {:.0}%",
                s.dt_txt,
                s.temp,
                s.description,
                s.wind_speed,
                unit.speed_symbol(),
                s.pop * 100.0
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn suggestions(cities: &[GeoCity]) -> String {
    if cities.is_empty() {
        return "No matching cities.".to_string();
    }

    cities
        .iter()
        .map(|c| {
            let at = c.coordinates();
            format!("{}  ({:.4}, {:.4})", c.label(), at.lat, at.lon)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn cities(catalog: &CityCatalog, rows: &[&CityRecord]) -> String {
    if rows.is_empty() {
        return format!("None of {} cities match.", catalog.len());
    }

    let mut lines = vec![format!(
        "{:<28} {:<28} {:<4} {}",
        "City", "Country", "Code", "Timezone"
    )];
    lines.extend(rows.iter().map(|r| {
        format!(
            "{:<28} {:<28} {:<4} {}",
            r.name, r.country, r.country_code, r.timezone
        )
    }));
    lines.push(format!("{} of {} cities", rows.len(), catalog.len()));
    lines.join("\n")
}
