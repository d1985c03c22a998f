//! Command-line front end.
//!
//! ```text
//! parking-finder search "Piazza Duomo, Milano"
//! parking-finder predict "Stadio San Siro, Milano" --at 2026-10-18T20:30:00+02:00 --duration 120
//! parking-finder register --lat 45.46 --lng 9.19 --address "Via Torino 1, Milano" --paid true
//! parking-finder feedback "Colosseo, Roma"
//! ```

use clap::{Parser, Subcommand};
use dialoguer::{Confirm, Input, Select};
use parking_finder::api::wire::RegisterParkingRequest;
use parking_finder::api::{HttpParkingApi, ParkingApi};
use parking_finder::booking::{self, DurationOption};
use parking_finder::config;
use parking_finder::config::Config;
use parking_finder::controller::AppController;
use parking_finder::error::AppError;
use parking_finder::feedback::{MissingField, Weather};
use parking_finder::model::{FuturePredictionSet, SearchResultSet};
use parking_finder::notify::TracingSink;
use parking_finder::views::{self, EMPTY_LIST_MESSAGE};
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

type Controller = AppController<HttpParkingApi, TracingSink>;

#[derive(Parser)]
#[command(
    name = "parking-finder",
    about = "Find parking near an address and report how it went"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search parkings around an address right now
    Search { address: String },
    /// Predict availability around an address at a future moment
    Predict {
        address: String,
        /// Target moment as RFC 3339 (default: one hour from now)
        #[arg(long, value_parser = parse_moment)]
        at: Option<OffsetDateTime>,
        /// Expected stay in minutes: 60, 120, 180, 240 or 300
        #[arg(long, default_value_t = 60, value_parser = parse_duration)]
        duration: u32,
    },
    /// Register a new parking location
    Register {
        #[arg(long)]
        lat: f64,
        #[arg(long)]
        lng: f64,
        #[arg(long)]
        address: String,
        #[arg(long)]
        covered: Option<bool>,
        #[arg(long)]
        paid: Option<bool>,
        #[arg(long)]
        capacity: Option<u32>,
        #[arg(long)]
        pricing_info: Option<String>,
    },
    /// Search an address, pick a parking and send feedback about it
    Feedback { address: String },
}

fn parse_moment(raw: &str) -> Result<OffsetDateTime, String> {
    OffsetDateTime::parse(raw, &Rfc3339).map_err(|err| format!("expected RFC 3339 time: {err}"))
}

fn parse_duration(raw: &str) -> Result<u32, String> {
    raw.parse::<u32>()
        .ok()
        .and_then(DurationOption::from_minutes)
        .map(DurationOption::minutes)
        .ok_or_else(|| "duration must be one of 60, 120, 180, 240, 300".to_string())
}

fn load_config(path: &Path) -> Result<Config, AppError> {
    Ok(config::load_from_path(path)?)
}

/// Leave with a failure status once the controller has reported the error.
fn exit_failed() -> ! {
    std::process::exit(1)
}

fn init_tracing(level: tracing::Level) {
    let subscriber = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(level)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    init_tracing(config.log_level());

    let base_url = config.api_base_url();
    tracing::debug!(app = %config.app.name, %base_url, "parking-finder starting");
    let api = HttpParkingApi::new(&base_url, config.api_timeout()).map_err(AppError::from)?;

    match cli.command {
        Commands::Register {
            lat,
            lng,
            address,
            covered,
            paid,
            capacity,
            pricing_info,
        } => {
            let request = RegisterParkingRequest {
                latitude: lat,
                longitude: lng,
                address,
                covered,
                paid,
                capacity,
                pricing_info,
            };
            let registered = api
                .register_parking(&request)
                .await
                .map_err(AppError::from)?;
            println!("Parking registered with id {}", registered.id);
        }
        Commands::Search { address } => {
            let mut controller = Controller::new(api, TracingSink);
            if controller.run_search(&address).await.is_err() {
                exit_failed();
            }
            if let Some(results) = controller.state().search_results() {
                print_search(results);
            }
        }
        Commands::Predict {
            address,
            at,
            duration,
        } => {
            let when = at.unwrap_or_else(|| booking::default_target(OffsetDateTime::now_utc()));
            let mut controller = Controller::new(api, TracingSink);
            if controller
                .run_prediction(&address, when, duration)
                .await
                .is_err()
            {
                exit_failed();
            }
            if let Some(results) = controller.state().future_results() {
                print_prediction(results);
            }
        }
        Commands::Feedback { address } => {
            let mut controller = Controller::new(api, TracingSink);
            run_feedback(&mut controller, &address).await?;
        }
    }

    Ok(())
}

fn print_search(results: &SearchResultSet) {
    if let Some(location) = results.user_location {
        println!("Your location: {:.5}, {:.5}", location.lat, location.lng);
    }
    println!();
    println!("Best parkings:");
    print_list(&results.top_parkings, false);
    println!();
    println!("All parkings:");
    print_list(&results.all_parkings, true);
}

fn print_list(parkings: &[parking_finder::model::ParkingCandidate], expanded: bool) {
    let items = views::list_items(parkings, expanded);
    if items.is_empty() {
        println!("  {EMPTY_LIST_MESSAGE}");
        return;
    }
    for (index, item) in items.iter().enumerate() {
        println!(
            "{:>3}. {} {}\n     Distance: {} km - Availability: {}",
            index + 1,
            item.tier.badge(),
            item.address,
            item.distance,
            item.availability
        );
    }
}

fn print_prediction(results: &FuturePredictionSet) {
    match views::prediction_header(results) {
        Some(header) => println!("{header}"),
        None => {
            println!("{EMPTY_LIST_MESSAGE}");
            return;
        }
    }
    println!();
    for card in views::prediction_cards(results) {
        println!(
            "{} {} [{}]\n   Distance: {} km - Covered: {} - Estimated spaces: {}",
            card.tier.badge(),
            card.address,
            card.availability,
            card.distance,
            card.covered,
            card.capacity
        );
    }
}

async fn run_feedback(
    controller: &mut Controller,
    address: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    if controller.run_search(address).await.is_err() {
        exit_failed();
    }
    let Some(parkings) = controller
        .state()
        .search_results()
        .map(|results| results.all_parkings.clone())
    else {
        return Ok(());
    };
    if parkings.is_empty() {
        println!("{EMPTY_LIST_MESSAGE}");
        return Ok(());
    }

    let labels: Vec<String> = parkings
        .iter()
        .map(|p| {
            format!(
                "{} {} ({})",
                p.tier().badge(),
                p.address,
                parking_finder::availability::percent_label(p.availability_prob)
            )
        })
        .collect();
    let idx = Select::new()
        .with_prompt("Which parking did you use?")
        .items(&labels)
        .default(0)
        .interact()?;
    controller.select_parking(parkings[idx].clone()).await;

    ask_missing_fields(controller)?;
    fill_general_form(controller)?;

    loop {
        if !Confirm::new()
            .with_prompt("Send feedback?")
            .default(true)
            .interact()?
        {
            controller.close_feedback();
            println!("Cancelled.");
            return Ok(());
        }
        if controller.submit_current_feedback().await.is_ok() {
            return Ok(());
        }
    }
}

fn ask_missing_fields(controller: &mut Controller) -> Result<(), Box<dyn std::error::Error>> {
    while let Some(machine) = controller.feedback_mut() {
        let Some(field) = machine.current_field().cloned() else {
            break;
        };
        let prompt = field.question().unwrap_or(field.as_str());
        let outcome = match &field {
            MissingField::Covered | MissingField::Paid => {
                let yes = Confirm::new().with_prompt(prompt).default(true).interact()?;
                machine.answer_bool(yes)
            }
            MissingField::Capacity => {
                let raw: String = Input::new()
                    .with_prompt(format!("{prompt} (empty to skip)"))
                    .allow_empty(true)
                    .interact_text()?;
                if raw.trim().is_empty() {
                    machine.skip()
                } else {
                    machine.answer_capacity_input(&raw)
                }
            }
            MissingField::Unsupported(name) => {
                tracing::debug!(field = %name, "Skipping question without a prompt");
                machine.skip()
            }
        };
        if let Err(err) = outcome {
            println!("{err}");
        }
    }
    Ok(())
}

fn fill_general_form(controller: &mut Controller) -> Result<(), Box<dyn std::error::Error>> {
    let Some(machine) = controller.feedback_mut() else {
        return Ok(());
    };
    let general = machine.general_mut()?;

    general.parked_success = Confirm::new()
        .with_prompt("Did you manage to park?")
        .default(general.parked_success)
        .interact()?;
    general.free_spots = Input::new()
        .with_prompt("Free spaces nearby")
        .default(general.free_spots.clone())
        .interact_text()?;

    let weather_labels: Vec<&str> = Weather::ALL.iter().map(|w| w.label()).collect();
    let weather = Select::new()
        .with_prompt("Weather")
        .items(&weather_labels)
        .default(0)
        .interact()?;
    general.weather = Weather::ALL[weather];

    let event: String = Input::new()
        .with_prompt("Special events (optional)")
        .allow_empty(true)
        .interact_text()?;
    general.event_context = Some(event);
    general.photo_url = Input::new()
        .with_prompt("Photo URL (optional)")
        .allow_empty(true)
        .interact_text()?;
    Ok(())
}
