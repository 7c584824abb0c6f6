use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Select};
use tracing::warn;
use weather_dashboard_core::{Config, Dashboard, DemoGenerator, OpenWeatherClient, UnitSystem};

use crate::render::{RenderOptions, render};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "weather-dashboard",
    version,
    about = "Current weather and 5-day forecast from OpenWeather"
)]
pub struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store an OpenWeather API key and default units.
    Configure {
        /// API key; prompted for when absent.
        #[arg(long)]
        api_key: Option<String>,

        /// Default units: metric or imperial; prompted for when absent.
        #[arg(long)]
        units: Option<UnitSystem>,
    },

    /// Show current weather and the forecast for a city.
    Show {
        /// City name, e.g. "London" or "Paris,FR".
        #[arg(default_value = "London")]
        city: String,

        /// metric (°C, m/s) or imperial (°F, mph); defaults to the configured units.
        #[arg(short, long)]
        units: Option<UnitSystem>,

        /// Use generated demo data instead of calling OpenWeather.
        #[arg(long)]
        demo: bool,

        /// Seed for demo data, for reproducible output.
        #[arg(long)]
        seed: Option<u64>,

        /// Disable colored temperatures.
        #[arg(long)]
        no_color: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { api_key, units } => configure(api_key, units),
            Command::Show { city, units, demo, seed, no_color } => {
                show(city, units, demo, seed, !no_color).await
            }
        }
    }
}

fn configure(api_key: Option<String>, units: Option<UnitSystem>) -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = match api_key {
        Some(key) => key,
        None => Password::new("OpenWeather API key:")
            .with_display_mode(PasswordDisplayMode::Masked)
            .without_confirmation()
            .prompt()
            .context("Failed to read API key")?,
    };
    let api_key = api_key.trim().to_string();
    if api_key.is_empty() {
        bail!("API key must not be empty");
    }

    let units = match units {
        Some(units) => units,
        None => {
            let options = UnitSystem::all().to_vec();
            let cursor = options.iter().position(|u| *u == config.units).unwrap_or(0);
            Select::new("Default units:", options)
                .with_starting_cursor(cursor)
                .prompt()
                .context("Failed to read units")?
        }
    };

    config.set_api_key(api_key);
    config.units = units;
    let path = config.save()?;

    println!("Saved configuration to {}", path.display());
    println!("Note: newly created OpenWeather keys can take a couple of hours to activate.");
    Ok(())
}

async fn show(
    city: String,
    units: Option<UnitSystem>,
    demo: bool,
    seed: Option<u64>,
    color: bool,
) -> anyhow::Result<()> {
    let config = Config::load().unwrap_or_else(|err| {
        warn!(error = %err, "Ignoring unreadable configuration");
        Config::default()
    });
    let units = units.unwrap_or(config.units);

    let client = if demo {
        None
    } else {
        match OpenWeatherClient::from_config(&config) {
            Ok(client) => Some(client),
            Err(err) => {
                warn!(error = %err, "OpenWeather client unavailable, showing demo data");
                None
            }
        }
    };

    let mut generator = seed.map_or_else(DemoGenerator::new, DemoGenerator::with_seed);
    let mut dashboard = Dashboard::new(city, units).with_demo(demo);

    let snapshot = dashboard
        .refresh(client.as_ref(), &mut generator)
        .await
        .context("Error fetching weather data")?;

    print!("{}", render(snapshot, &RenderOptions { color }));
    Ok(())
}
