#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line client for the emergency map.
//!
//! Lists and watches the shared emergency collection, prints summary
//! stats, and submits new reports. Running without a subcommand opens the
//! interactive report form.
//!
//! Uses `indicatif-log-bridge` (via [`emergency_map_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and spinners never fight for the terminal.

mod report;
mod surface;
mod wiring;

use std::time::Duration;

use clap::{Parser, Subcommand};
use emergency_map_config::Settings;
use emergency_map_emergency_models::evacuation::default_centers;
use emergency_map_emergency_models::{Coordinates, EmergencyType};
use emergency_map_map::{EmergencyView, FilterState, MarkerLayer, RecordSet};
use emergency_map_report::ReportEvent;
use tokio::sync::broadcast;

use crate::report::ReportOptions;
use crate::surface::TerminalSurface;
use crate::wiring::Services;

#[derive(Parser)]
#[command(name = "emergency_map", about = "View and report emergencies")]
struct Cli {
    /// Keep reports in memory instead of the shared store
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the emergencies currently on the map
    List {
        /// Comma-separated categories to show (e.g., "fire,flood")
        #[arg(long, value_delimiter = ',', value_parser = parse_type)]
        types: Vec<EmergencyType>,
        /// Also show evacuation centers
        #[arg(long)]
        evacuation: bool,
    },
    /// Submit a new emergency report
    Report {
        /// Emergency category: fire, flood or earthquake
        #[arg(long = "type", value_parser = parse_type)]
        emergency_type: EmergencyType,
        /// What is happening
        #[arg(long)]
        details: String,
        #[command(flatten)]
        location: LocationArgs,
    },
    /// Refresh the map periodically until interrupted
    Watch {
        /// Seconds between refreshes
        #[arg(long, default_value = "30")]
        interval: u64,
        /// Comma-separated categories to show
        #[arg(long, value_delimiter = ',', value_parser = parse_type)]
        types: Vec<EmergencyType>,
    },
    /// Print counts by severity and category
    Stats,
    /// List configured external services and map settings
    Services,
}

#[derive(clap::Args)]
struct LocationArgs {
    /// Reporter latitude
    #[arg(long, requires = "lng", allow_negative_numbers = true)]
    lat: Option<f64>,
    /// Reporter longitude
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lng: Option<f64>,
    /// Name stored as `reportedBy`
    #[arg(long)]
    reporter: Option<String>,
    /// Refuse to submit without a location instead of using the map center
    #[arg(long)]
    require_location: bool,
}

impl LocationArgs {
    fn into_options(self) -> Result<ReportOptions, Box<dyn std::error::Error>> {
        let coordinates = match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some(Coordinates::new(lat, lng)?),
            _ => None,
        };
        Ok(ReportOptions {
            coordinates,
            reporter: self.reporter,
            require_location: self.require_location,
        })
    }
}

fn parse_type(raw: &str) -> Result<EmergencyType, String> {
    raw.trim()
        .to_lowercase()
        .parse()
        .map_err(|_| format!("unknown emergency type '{raw}' (expected fire, flood or earthquake)"))
}

fn filter_for(types: &[EmergencyType]) -> FilterState {
    if types.is_empty() {
        FilterState::new()
    } else {
        FilterState::only(types)
    }
}

fn connect(offline: bool) -> Result<Services, Box<dyn std::error::Error>> {
    if offline {
        Ok(Services::offline())
    } else {
        Services::connect()
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = emergency_map_cli_utils::init_logger();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        let services = connect(cli.offline)?;
        let options = ReportOptions {
            coordinates: None,
            reporter: None,
            require_location: false,
        };
        return report::interactive(&multi, &services, &options).await;
    };

    match command {
        Commands::List { types, evacuation } => {
            let services = connect(cli.offline)?;
            let mut view = EmergencyView::new(TerminalSurface::quiet(), services.store.clone())
                .with_filter(filter_for(&types));
            if evacuation {
                view.show_evacuation_centers(&default_centers());
            }
            let spinner = emergency_map_cli_utils::spinner(&multi, "Loading emergencies...");
            view.refresh().await;
            spinner.finish_and_clear();

            view.surface().print();
            println!(
                "{} of {} emergencies shown",
                view.surface().count(MarkerLayer::Emergencies),
                view.records().len()
            );
            view.teardown();
        }
        Commands::Report {
            emergency_type,
            details,
            location,
        } => {
            let options = location.into_options()?;
            let services = connect(cli.offline)?;
            report::run(&multi, &services, &options, emergency_type, details).await?;
        }
        Commands::Watch { interval, types } => {
            let services = connect(cli.offline)?;
            let mut view = EmergencyView::new(TerminalSurface::new(), services.store.clone())
                .with_filter(filter_for(&types));
            let lifecycle = view.lifecycle();
            let (_events_tx, events) = broadcast::channel::<ReportEvent>(16);

            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    log::info!("Stopping watch");
                }
                lifecycle.teardown();
            });

            log::info!("Refreshing every {interval}s; press Ctrl-C to stop");
            view.run(events, Some(Duration::from_secs(interval.max(1))))
                .await;
        }
        Commands::Stats => {
            let services = connect(cli.offline)?;
            let spinner = emergency_map_cli_utils::spinner(&multi, "Loading emergencies...");
            let result = services.store.fetch_all().await;
            spinner.finish_and_clear();

            let mut records = RecordSet::new();
            records.replace(result?.to_records());
            let stats = records.stats();

            println!("Total: {}", stats.total);
            println!();
            for (severity, count) in &stats.by_severity {
                println!("{:<12} {count}", severity.as_ref());
            }
            println!();
            for (emergency_type, count) in &stats.by_type {
                println!(
                    "{} {:<10} {count}",
                    emergency_type.icon(),
                    emergency_type.label()
                );
            }
        }
        Commands::Services => wiring::print_services(&Settings::from_env()?.map),
    }

    Ok(())
}
