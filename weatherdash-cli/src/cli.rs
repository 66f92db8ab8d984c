use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use inquire::{Confirm, CustomType, Password, PasswordDisplayMode, Select};
use weatherdash_core::{
    Aggregator, Config, Coordinates, Query, Session, Transition, UnitSystem, WeatherSource,
    cities::{CatalogClient, CityFilter, CityKey, DEFAULT_LIMIT, SortConfig},
    config::HomeLocation,
    geocoding::GeocodingClient,
    model::QUICK_PICKS,
    resolver::{FixedLocator, Geolocator, NoLocator, Notice, Outcome, locate_query},
    source_from_config,
};

use crate::{interactive, render};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherdash", version, about = "Terminal weather dashboard")]
pub struct Cli {
    /// Log debug output to stderr (RUST_LOG overrides).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct UnitArgs {
    /// Unit system: metric or imperial. Defaults to the configured one.
    #[arg(short, long)]
    pub units: Option<UnitSystem>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store API keys, default units and an optional home location.
    Configure,

    /// Show current weather plus hourly and daily forecast.
    ///
    /// Without a city or coordinates the configured home location is used.
    Show {
        /// City name, e.g. "Paris" or "Paris, FR".
        city: Option<String>,

        #[arg(long, requires = "lon", conflicts_with = "city", allow_negative_numbers = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", conflicts_with = "city", allow_negative_numbers = true)]
        lon: Option<f64>,

        #[command(flatten)]
        units: UnitArgs,

        /// Print the aggregated record as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show the next 3-hour forecast slots for a position.
    Forecast {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        #[arg(long, allow_negative_numbers = true)]
        lon: f64,

        #[command(flatten)]
        units: UnitArgs,

        #[arg(long)]
        json: bool,
    },

    /// Suggest cities whose name starts with PREFIX.
    Search { prefix: String },

    /// List world cities, filtered and sorted.
    Cities {
        /// Case-insensitive part of the city name.
        #[arg(long)]
        search: Option<String>,

        /// Part of the time zone, e.g. "Europe/Berlin".
        #[arg(long)]
        timezone: Option<String>,

        /// Sort column: name, country, code or timezone.
        #[arg(long, default_value = "name")]
        sort: CityKey,

        #[arg(long)]
        desc: bool,

        /// Number of catalog rows to fetch.
        #[arg(long, default_value_t = DEFAULT_LIMIT)]
        limit: u32,
    },

    /// List the quick-pick cities.
    Picks,

    /// Browse interactively: pick, search, locate and switch units.
    Interactive {
        #[command(flatten)]
        units: UnitArgs,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show {
                city,
                lat,
                lon,
                units,
                json,
            } => {
                let query = match (city, lat, lon) {
                    (Some(city), _, _) => Query::by_name(city),
                    (None, Some(lat), Some(lon)) => Query::by_coords(Coordinates { lat, lon }),
                    _ => Query::empty(),
                };
                show(query, units.units, json).await
            }
            Command::Forecast {
                lat,
                lon,
                units,
                json,
            } => forecast(Coordinates { lat, lon }, units.units, json).await,
            Command::Search { prefix } => search(&prefix).await,
            Command::Cities {
                search,
                timezone,
                sort,
                desc,
                limit,
            } => {
                let filter = CityFilter { search, timezone };
                let sort = SortConfig {
                    key: sort,
                    descending: desc,
                };
                cities(filter, sort, limit).await
            }
            Command::Picks => {
                for (i, city) in QUICK_PICKS.iter().enumerate() {
                    println!("{}. {city}", i + 1);
                }
                Ok(())
            }
            Command::Interactive { units } => {
                let config = load_config()?;
                let unit = units.units.unwrap_or(config.units);
                interactive::run(&config, unit).await
            }
        }
    }
}

/// Config from disk with API keys overridden by the environment.
pub(crate) fn load_config() -> anyhow::Result<Config> {
    let mut config = Config::load()?;
    config.apply_env();
    Ok(config)
}

pub(crate) fn locator_from_config(config: &Config) -> Box<dyn Geolocator> {
    match config.home_coordinates() {
        Some(coords) => Box::new(FixedLocator(coords)),
        None => Box::new(NoLocator {
            reason: "no home location configured (run `weatherdash configure`)".to_string(),
        }),
    }
}

pub(crate) fn notify(notice: &Notice) {
    eprintln!("{notice}");
}

/// Carry a transition through to a displayed record or a failure.
pub(crate) async fn settle<S: WeatherSource>(
    aggregator: &Aggregator<S>,
    session: &mut Session,
    mut transition: Transition,
    locator: &dyn Geolocator,
) -> Option<Outcome> {
    loop {
        match transition {
            Transition::Unchanged => return None,
            Transition::AwaitLocation => {
                notify(&Notice::Locating);
                match locate_query(locator).await {
                    Ok(query) => {
                        notify(&Notice::Located);
                        transition = session.set_query(query);
                    }
                    Err(err) => {
                        notify(&Notice::LocationDenied(err.to_string()));
                        return None;
                    }
                }
            }
            Transition::Fetch(ticket) => {
                notify(&Notice::Fetching(ticket.query.describe()));
                let done = aggregator.resolve(&ticket).await;
                let notice = session.notice_for(&done);
                let outcome = session.complete(done);
                if outcome != Outcome::Stale {
                    notify(&notice);
                }
                return Some(outcome);
            }
        }
    }
}

async fn show(query: Query, units: Option<UnitSystem>, json: bool) -> anyhow::Result<()> {
    let config = load_config()?;
    let unit = units.unwrap_or(config.units);
    let aggregator = Aggregator::new(source_from_config(&config)?);
    let locator = locator_from_config(&config);

    let mut session = Session::new(unit);
    let transition = session.set_query(query);
    settle(&aggregator, &mut session, transition, locator.as_ref()).await;

    let weather = session
        .displayed()
        .ok_or_else(|| anyhow::anyhow!("No weather data available"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&render::weather_json(weather, unit)?)?);
    } else {
        println!("{}", render::weather(weather, unit));
    }
    Ok(())
}

async fn forecast(coords: Coordinates, units: Option<UnitSystem>, json: bool) -> anyhow::Result<()> {
    let config = load_config()?;
    let unit = units.unwrap_or(config.units);
    let aggregator = Aggregator::new(source_from_config(&config)?);

    let slots = aggregator
        .short_forecast(coords, unit)
        .await
        .context("Failed to fetch 3-hour forecast")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&slots)?);
    } else {
        println!("{}", render::three_hour(&slots, unit));
    }
    Ok(())
}

async fn search(prefix: &str) -> anyhow::Result<()> {
    let config = load_config()?;
    let client = GeocodingClient::from_config(&config)?;

    let found = client
        .fetch_cities(prefix)
        .await
        .with_context(|| format!("Failed to look up cities starting with '{prefix}'"))?;

    println!("{}", render::suggestions(&found));
    Ok(())
}

async fn cities(filter: CityFilter, sort: SortConfig, limit: u32) -> anyhow::Result<()> {
    let config = load_config()?;
    let client = CatalogClient::from_config(&config)?;

    let catalog = client
        .fetch(limit)
        .await
        .context("Failed to fetch the city catalog")?;

    println!("{}", render::cities(&catalog, &catalog.view(&filter, sort)));
    Ok(())
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let weather_key = Password::new("OpenWeather API key (blank keeps current):")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()?;
    if !weather_key.trim().is_empty() {
        config.weather_api_key = Some(weather_key.trim().to_string());
    }

    let geo_key = Password::new("GeoDB (RapidAPI) key (blank keeps current):")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()?;
    if !geo_key.trim().is_empty() {
        config.geo_api_key = Some(geo_key.trim().to_string());
    }

    let start = match config.units {
        UnitSystem::Metric => 0,
        UnitSystem::Imperial => 1,
    };
    config.units = Select::new(
        "Default units:",
        vec![UnitSystem::Metric, UnitSystem::Imperial],
    )
    .with_starting_cursor(start)
    .prompt()?;

    if Confirm::new("Set a home location for \"current location\" lookups?")
        .with_default(config.home.is_some())
        .prompt()?
    {
        let latitude = CustomType::<f64>::new("Latitude:")
            .with_error_message("Please type a number, e.g. 48.85")
            .prompt()?;
        let longitude = CustomType::<f64>::new("Longitude:")
            .with_error_message("Please type a number, e.g. 2.35")
            .prompt()?;
        config.home = Some(HomeLocation {
            latitude,
            longitude,
        });
    } else {
        config.home = None;
    }

    config.save()?;
    println!(
        "Configuration saved to {}",
        Config::config_file_path()?.display()
    );
    Ok(())
}
