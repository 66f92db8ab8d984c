use inquire::{Confirm, InquireError, Select, Text};
use std::fmt;
use weatherdash_core::{
    Aggregator, Config, GeolocationError, Query, Session, UnitSystem,
    cities::{CatalogClient, CityCatalog, CityFilter, DEFAULT_LIMIT, SortConfig},
    geocoding::GeocodingClient,
    model::QUICK_PICKS,
    resolver::Notice,
    source_from_config,
};

use crate::{
    cli::{locator_from_config, notify, settle},
    render,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    QuickPick,
    SearchName,
    Suggest,
    Browse,
    Locate,
    ToggleUnits(UnitSystem),
    Quit,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::QuickPick => f.write_str("Quick pick"),
            Action::SearchName => f.write_str("Search by city name"),
            Action::Suggest => f.write_str("Find a city (suggestions)"),
            Action::Browse => f.write_str("Browse world cities"),
            Action::Locate => f.write_str("Use my location"),
            Action::ToggleUnits(next) => write!(f, "Switch to {}", next.temperature_symbol()),
            Action::Quit => f.write_str("Quit"),
        }
    }
}

/// Esc and Ctrl-C end the prompt, not the program.
fn cancelled(err: &InquireError) -> bool {
    matches!(
        err,
        InquireError::OperationCanceled | InquireError::OperationInterrupted
    )
}

pub async fn run(config: &Config, unit: UnitSystem) -> anyhow::Result<()> {
    let aggregator = Aggregator::new(source_from_config(config)?);
    let geocoder = GeocodingClient::from_config(config)?;
    let catalog_client = CatalogClient::from_config(config)?;
    let locator = locator_from_config(config);

    let mut session = Session::new(unit);
    let mut catalog: Option<CityCatalog> = None;

    loop {
        let actions = vec![
            Action::QuickPick,
            Action::SearchName,
            Action::Suggest,
            Action::Browse,
            Action::Locate,
            Action::ToggleUnits(session.unit().toggled()),
            Action::Quit,
        ];

        let action = match Select::new("What next?", actions).prompt() {
            Ok(action) => action,
            Err(err) if cancelled(&err) => break,
            Err(err) => return Err(err.into()),
        };

        let query = match action {
            Action::Quit => break,
            Action::ToggleUnits(next) => {
                let transition = session.set_unit(next);
                settle(&aggregator, &mut session, transition, locator.as_ref()).await;
                show(&session);
                continue;
            }
            Action::QuickPick => prompt_quick_pick()?,
            Action::SearchName => prompt_name()?,
            Action::Suggest => prompt_suggestion(&geocoder).await?,
            Action::Browse => {
                if catalog.is_none() {
                    match catalog_client.fetch(DEFAULT_LIMIT).await {
                        Ok(loaded) if loaded.is_empty() => {
                            eprintln!("The city catalog is empty.");
                            continue;
                        }
                        Ok(loaded) => catalog = Some(loaded),
                        Err(err) => {
                            tracing::warn!("failed to fetch city catalog: {err}");
                            continue;
                        }
                    }
                }
                match &catalog {
                    Some(loaded) => prompt_catalog(loaded)?,
                    None => None,
                }
            }
            Action::Locate => prompt_location_consent()?,
        };

        let Some(query) = query else { continue };
        let transition = session.set_query(query);
        settle(&aggregator, &mut session, transition, locator.as_ref()).await;
        show(&session);
    }

    Ok(())
}

fn show(session: &Session) {
    if let Some(weather) = session.displayed() {
        println!("\n{}\n", render::weather(weather, session.unit()));
    }
}

/// Sharing the position needs an explicit yes, like a browser permission prompt.
fn prompt_location_consent() -> anyhow::Result<Option<Query>> {
    let allowed = match Confirm::new("Share your location?").with_default(true).prompt() {
        Ok(allowed) => allowed,
        Err(err) if cancelled(&err) => false,
        Err(err) => return Err(err.into()),
    };

    if allowed {
        return Ok(Some(Query::empty()));
    }
    let err = GeolocationError::Denied("permission declined".to_string());
    notify(&Notice::LocationDenied(err.to_string()));
    Ok(None)
}

fn prompt_quick_pick() -> anyhow::Result<Option<Query>> {
    match Select::new("City:", QUICK_PICKS.to_vec()).prompt() {
        Ok(city) => Ok(Some(Query::by_name(city))),
        Err(err) if cancelled(&err) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn prompt_name() -> anyhow::Result<Option<Query>> {
    match Text::new("City name:").prompt() {
        Ok(name) if name.trim().is_empty() => Ok(None),
        Ok(name) => Ok(Some(Query::by_name(name.trim()))),
        Err(err) if cancelled(&err) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

async fn prompt_suggestion(geocoder: &GeocodingClient) -> anyhow::Result<Option<Query>> {
    let prefix = match Text::new("Name starts with:").prompt() {
        Ok(prefix) if prefix.trim().is_empty() => return Ok(None),
        Ok(prefix) => prefix,
        Err(err) if cancelled(&err) => return Ok(None),
        Err(err) => return Err(err.into()),
    };

    let found = match geocoder.fetch_cities(prefix.trim()).await {
        Ok(found) if !found.is_empty() => found,
        Ok(_) => {
            eprintln!("No matching cities.");
            return Ok(None);
        }
        Err(err) => {
            tracing::warn!("city lookup failed: {err}");
            return Ok(None);
        }
    };

    let labels: Vec<String> = found.iter().map(|c| c.label()).collect();
    match Select::new("Pick a city:", labels).raw_prompt() {
        Ok(choice) => Ok(found.get(choice.index).map(|c| c.to_query())),
        Err(err) if cancelled(&err) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn prompt_catalog(catalog: &CityCatalog) -> anyhow::Result<Option<Query>> {
    let search = match Text::new("Filter by name (blank for all):").prompt() {
        Ok(search) => search,
        Err(err) if cancelled(&err) => return Ok(None),
        Err(err) => return Err(err.into()),
    };

    let filter = CityFilter {
        search: Some(search.trim().to_string()).filter(|s| !s.is_empty()),
        timezone: None,
    };
    let rows = catalog.view(&filter, SortConfig::default());
    if rows.is_empty() {
        eprintln!("None of {} cities match.", catalog.len());
        return Ok(None);
    }

    let labels: Vec<String> = rows
        .iter()
        .map(|r| format!("{} ({}, {})", r.name, r.country, r.timezone))
        .collect();
    match Select::new("Pick a city:", labels).raw_prompt() {
        Ok(choice) => Ok(rows.get(choice.index).map(|r| Query::by_name(r.name.clone()))),
        Err(err) if cancelled(&err) => Ok(None),
        Err(err) => Err(err.into()),
    }
}
