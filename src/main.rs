mod catalog;
mod client;
mod config;
mod location;
mod projection;
mod scheduler;
mod views;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::catalog::{FilterState, TypeFacet};
use crate::client::{CatalogQuery, HttpService, TrackingService};
use crate::config::Config;
use crate::location::LocationStore;
use crate::scheduler::Freshness;
use crate::views::antenna;
use crate::views::sky::{DEFAULT_TRACKED, PREDICTION_DAYS};
use crate::views::{AntennaReadout, AntennaView, Dashboard, SkyView};

#[derive(Parser)]
#[command(name = "satwatch")]
#[command(about = "Observer dashboard for live satellite tracking and antenna pointing")]
struct Cli {
    /// Configuration file (YAML)
    #[arg(long, global = true)]
    config: Option<String>,
    /// Observer city id, overriding the configured default
    #[arg(long, global = true)]
    city: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the satellite catalog with optional filters
    Satellites {
        /// Type facet: all, weather, communications, research, other
        #[arg(long = "type")]
        facet: Option<String>,
        /// Case-insensitive name search, or literal frequency match
        #[arg(long)]
        search: Option<String>,
        /// Only locally relevant satellites
        #[arg(long)]
        local: bool,
    },
    /// Track one satellite and print antenna guidance
    Track {
        /// Satellite name; defaults to the first quick-pick target
        satellite: Option<String>,
        /// Keep refreshing on the tracking cadence
        #[arg(long)]
        watch: bool,
    },
    /// Predict upcoming passes for the default tracked set
    Sky {
        /// Keep refreshing on the prediction cadence
        #[arg(long)]
        watch: bool,
    },
    /// Region overview, station directory and satellite detail
    Dashboard,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match Config::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error reading config: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => Config::default(),
    };

    let timeout = match config.request_timeout() {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error in config: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let service: Arc<dyn TrackingService> =
        match HttpService::new(&config.service.base_url, timeout) {
            Ok(s) => Arc::new(s),
            Err(e) => {
                eprintln!("Error building HTTP client: {}", e);
                return ExitCode::FAILURE;
            }
        };

    let location = LocationStore::new();
    let city = cli.city.as_ref().unwrap_or(&config.observer.city);
    if !location.set_city(city) {
        let known: Vec<&str> = location.cities().iter().map(|c| c.id).collect();
        eprintln!(
            "Unknown city '{}', keeping {} (known: {})",
            city,
            location.current().city,
            known.join(", ")
        );
    }

    match cli.command {
        Commands::Satellites {
            facet,
            search,
            local,
        } => satellites(service, facet, search, local).await,
        Commands::Track { satellite, watch } => {
            track(service, location, &config, satellite, watch).await
        }
        Commands::Sky { watch } => sky(service, location, &config, watch).await,
        Commands::Dashboard => dashboard(service, location).await,
    }
}

async fn satellites(
    service: Arc<dyn TrackingService>,
    facet: Option<String>,
    search: Option<String>,
    local: bool,
) -> ExitCode {
    let facet = match facet.as_deref() {
        None => TypeFacet::All,
        Some(s) => match s.parse() {
            Ok(f) => f,
            Err(e) => {
                eprintln!("{}", e);
                return ExitCode::FAILURE;
            }
        },
    };
    let query = CatalogQuery {
        local_only: local,
        group: None,
    };
    let satellites = match service.list_satellites(&query).await {
        Ok(list) => list,
        Err(e) => {
            eprintln!("Error fetching satellites: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let state = FilterState {
        facet,
        search: search.unwrap_or_default(),
    };
    let result = catalog::filter(&satellites, &state);
    for sat in &result.shown {
        println!(
            "{:<20} {:<15} {:<14} {:<10} norad {}{}",
            sat.name,
            sat.frequency_text,
            sat.sat_type.label(),
            sat.importance.label(),
            sat.norad_id,
            if sat.locally_relevant { "  *" } else { "" }
        );
    }
    println!("{}", result.summary_line());
    ExitCode::SUCCESS
}

async fn track(
    service: Arc<dyn TrackingService>,
    location: LocationStore,
    config: &Config,
    satellite: Option<String>,
    watch: bool,
) -> ExitCode {
    let satellite = satellite.unwrap_or_else(|| antenna::DEFAULT_TARGET.to_string());
    if !watch {
        return match service.track(&satellite, &location.current()).await {
            Ok(result) => {
                print_readout(&AntennaReadout::from_result(&result), Freshness::Fresh, None);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Tracking failed: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    let period = match config.track_period() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error in config: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let mut view = AntennaView::new(service, location.clone(), period);
    view.set_target(&satellite).await;
    view.activate().await;

    let picks: Vec<String> = antenna::QUICK_PICKS
        .iter()
        .map(|(name, freq)| format!("{} ({})", name, freq))
        .collect();
    println!("quick picks: {}", picks.join(", "));
    println!("commands: r = refresh, sat <name>, city <id>, q = quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut render = tokio::time::interval(Duration::from_secs(5));
    loop {
        tokio::select! {
            _ = render.tick() => {
                let snapshot = view.snapshot();
                match view.readout() {
                    Some(readout) => {
                        print_readout(&readout, snapshot.freshness, snapshot.last_updated)
                    }
                    None => println!(
                        "{}: waiting for first fix ({})",
                        view.target(),
                        snapshot.freshness.label()
                    ),
                }
            }
            _ = tokio::signal::ctrl_c() => break,
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(cmd)) => match parse_command(&cmd) {
                    WatchCommand::Refresh => view.refresh(),
                    WatchCommand::Target(name) => view.set_target(&name).await,
                    WatchCommand::City(id) => {
                        if location.set_city(&id) {
                            view.location_changed().await;
                        } else {
                            println!("unknown city '{}'", id);
                        }
                    }
                    WatchCommand::Quit => break,
                    WatchCommand::Unknown(cmd) => println!("unknown command '{}'", cmd),
                },
                _ => stdin_open = false,
            },
        }
    }
    view.deactivate().await;
    ExitCode::SUCCESS
}

enum WatchCommand {
    Refresh,
    Target(String),
    City(String),
    Quit,
    Unknown(String),
}

fn parse_command(line: &str) -> WatchCommand {
    let line = line.trim();
    let (head, rest) = match line.split_once(' ') {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };
    match (head, rest) {
        ("r", "") => WatchCommand::Refresh,
        ("q", "") => WatchCommand::Quit,
        ("sat" | "sats", rest) if !rest.is_empty() => WatchCommand::Target(rest.to_string()),
        ("city", rest) if !rest.is_empty() => WatchCommand::City(rest.to_string()),
        _ => WatchCommand::Unknown(line.to_string()),
    }
}

async fn sky(
    service: Arc<dyn TrackingService>,
    location: LocationStore,
    config: &Config,
    watch: bool,
) -> ExitCode {
    if !watch {
        let tracked: Vec<String> = DEFAULT_TRACKED.iter().map(|s| s.to_string()).collect();
        return match service
            .predict(&location.current(), &tracked, PREDICTION_DAYS)
            .await
        {
            Ok(predictions) => {
                for prediction in &predictions {
                    println!(
                        "{} ({})",
                        prediction.satellite_name, prediction.frequency_text
                    );
                    for pass in &prediction.passes {
                        println!("  pass at {}", pass.time.format("%Y-%m-%d %H:%M:%S UTC"));
                    }
                }
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Prediction failed: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    let period = match config.predict_period() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error in config: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let mut view = SkyView::new(service, location.clone(), period);
    view.activate().await;
    println!("commands: r = refresh, sats <a, b, ...>, city <id>, q = quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut render = tokio::time::interval(Duration::from_secs(5));
    loop {
        tokio::select! {
            _ = render.tick() => {
                let snapshot = view.snapshot();
                println!(
                    "sky over {} [{}] tracking {}",
                    location.current().city,
                    snapshot.freshness.label(),
                    view.tracked().join(", ")
                );
                for placement in view.placements() {
                    let next = placement
                        .next_pass
                        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                        .unwrap_or_else(|| "no pass in window".to_string());
                    println!(
                        "  {:<14} at ({:.0}%, {:.0}%)  next: {}",
                        placement.satellite_name, placement.point.x_pct, placement.point.y_pct, next
                    );
                }
            }
            _ = tokio::signal::ctrl_c() => break,
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(cmd)) => match parse_command(&cmd) {
                    WatchCommand::Refresh => view.refresh(),
                    WatchCommand::Target(names) => {
                        let names: Vec<String> = names
                            .split(',')
                            .map(|s| s.trim().to_string())
                            .filter(|s| !s.is_empty())
                            .collect();
                        if !names.is_empty() {
                            view.set_tracked(names).await;
                        }
                    }
                    WatchCommand::City(id) => {
                        if location.set_city(&id) {
                            view.location_changed().await;
                        } else {
                            println!("unknown city '{}'", id);
                        }
                    }
                    WatchCommand::Quit => break,
                    WatchCommand::Unknown(cmd) => println!("unknown command '{}'", cmd),
                },
                _ => stdin_open = false,
            },
        }
    }
    view.deactivate().await;
    ExitCode::SUCCESS
}

async fn dashboard(service: Arc<dyn TrackingService>, location: LocationStore) -> ExitCode {
    let dashboard = Dashboard::new(service, location.clone());

    match dashboard.developer_credit().await {
        Ok(dev) => {
            let university = dev
                .university
                .map(|u| format!(", {}", u))
                .unwrap_or_default();
            println!("developed by {} ({}{})", dev.name, dev.year, university);
        }
        Err(e) => log::warn!("Developer info unavailable: {}", e),
    }

    match dashboard.region_overview().await {
        Ok(info) => {
            println!("{} ({})", info.system_name, info.country);
            if let Some(purpose) = &info.purpose {
                println!("  {}", purpose);
            }
            for feature in &info.features {
                println!("  - {}", feature);
            }
        }
        Err(e) => log::warn!("Region overview unavailable: {}", e),
    }

    match dashboard.city_directory().await {
        Ok(cities) => {
            let ids: Vec<&str> = cities.keys().map(|s| s.as_str()).collect();
            println!("observer cities: {}", ids.join(", "));
        }
        Err(e) => log::warn!("City directory unavailable: {}", e),
    }

    match dashboard.station_directory().await {
        Ok(stations) => {
            for station in &stations {
                let equipment = station
                    .equipment
                    .as_deref()
                    .or(station.operator.as_deref())
                    .map(|s| format!("  {}", s))
                    .unwrap_or_default();
                println!(
                    "station {:<30} {} ({:.4}, {:.4}){}",
                    station.name, station.location, station.latitude, station.longitude, equipment
                );
            }
        }
        Err(e) => log::warn!("Station directory unavailable: {}", e),
    }

    let relevant = match dashboard.relevant_satellites().await {
        Ok(list) => list,
        Err(e) => {
            eprintln!("Error fetching satellites: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let observer = location.current();
    println!(
        "satellites over {} ({} shown):",
        observer.city,
        relevant.len()
    );
    for sat in &relevant {
        println!("  {:<20} {}", sat.name, sat.frequency_text);
    }

    if let Some(first) = relevant.first() {
        dashboard.selection.select(&first.name).await;
        let detail = dashboard.selection.detail();
        if let Some(result) = detail.value {
            print_readout(
                &AntennaReadout::from_result(&result),
                detail.freshness,
                detail.last_updated,
            );
        }
    }
    ExitCode::SUCCESS
}

fn print_readout(readout: &AntennaReadout, freshness: Freshness, updated: Option<DateTime<Utc>>) {
    let updated = updated
        .map(|t| format!(", updated {}", t.format("%H:%M:%S UTC")))
        .unwrap_or_default();
    println!("{} [{}{}]", readout.satellite_name, freshness.label(), updated);
    println!(
        "  azimuth {:.1}°  elevation {:.1}°  ({} {})",
        readout.azimuth_deg,
        readout.elevation_deg,
        readout.sector.glyph(),
        readout.sector.abbreviation()
    );
    println!(
        "  elevation band: {}  pole rotation: {:.1}°  indicator: {:.1}°",
        readout.band.label(),
        readout.pole.pole_deg,
        readout.pole.indicator_deg
    );
    println!(
        "  dome position: ({:.0}%, {:.0}%)",
        readout.sky_point.x_pct, readout.sky_point.y_pct
    );
    println!(
        "  antenna: {}  difficulty: {}  polarization: {:?}",
        readout.antenna_type, readout.difficulty, readout.polarization
    );
    println!(
        "  local advice: {} ({})",
        readout.advice.antenna_type, readout.advice.difficulty
    );
    println!("  service direction: {}", readout.direction_text);
}
