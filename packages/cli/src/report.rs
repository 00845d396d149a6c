//! Report submission from the command line.

use std::sync::Arc;

use emergency_map_cli_utils::MultiProgress;
use emergency_map_emergency_models::{Coordinates, EmergencyType};
use emergency_map_geolocation::{
    FixedLocationProvider, GeolocationResolver, LocationProvider, UnavailableLocationProvider,
};
use emergency_map_report::{LocationPolicy, ReportCoordinator, SubmissionState};

use crate::wiring::Services;

/// Options shared by the flag-driven and interactive flows.
pub struct ReportOptions {
    pub coordinates: Option<Coordinates>,
    pub reporter: Option<String>,
    pub require_location: bool,
}

fn coordinator(services: &Services, options: &ReportOptions) -> ReportCoordinator {
    // Terminals have no position sensor; a fix only exists if one was given.
    let provider: Arc<dyn LocationProvider> = match options.coordinates {
        Some(coords) => Arc::new(FixedLocationProvider::new(coords)),
        None => Arc::new(UnavailableLocationProvider::default()),
    };
    let policy = if options.require_location {
        LocationPolicy::Required
    } else {
        LocationPolicy::FallbackTo(services.map.center)
    };

    let coordinator = ReportCoordinator::new(
        GeolocationResolver::new(provider),
        Arc::clone(&services.geocoder),
        Arc::clone(&services.store),
        services.dispatcher.clone(),
    )
    .with_policy(policy);

    match &options.reporter {
        Some(reporter) => coordinator.with_reporter(reporter.clone()),
        None => coordinator,
    }
}

async fn open(
    multi: &MultiProgress,
    coordinator: &mut ReportCoordinator,
) -> Result<(), Box<dyn std::error::Error>> {
    let spinner = emergency_map_cli_utils::spinner(multi, "Locating...");
    let state = coordinator.open().await.clone();
    spinner.finish_and_clear();

    match state {
        SubmissionState::Ready => {
            if let Some(address) = coordinator.draft().and_then(|d| d.address.as_deref()) {
                println!("Location: {address}");
            }
        }
        SubmissionState::Failed(reason) => {
            println!("Could not get your location: {reason}");
            if coordinator.policy() == LocationPolicy::Required {
                return Err("a location is required; pass --lat and --lng".into());
            }
        }
        other => log::debug!("Report opened in state {other}"),
    }
    Ok(())
}

async fn submit(
    multi: &MultiProgress,
    coordinator: &mut ReportCoordinator,
) -> Result<(), Box<dyn std::error::Error>> {
    let spinner = emergency_map_cli_utils::spinner(multi, "Submitting...");
    let result = coordinator.submit().await;
    spinner.finish_and_clear();

    let receipt = result?;
    println!(
        "Reported {} at {} ({})",
        receipt.record.emergency_type, receipt.record.address, receipt.record.location
    );

    if !receipt.notification.await.unwrap_or(false) {
        log::warn!("Responders were not notified; the report is still saved");
    }
    Ok(())
}

/// Submits one report from command-line flags.
///
/// # Errors
///
/// Returns an error if the report is incomplete or the store round-trip
/// fails.
pub async fn run(
    multi: &MultiProgress,
    services: &Services,
    options: &ReportOptions,
    emergency_type: EmergencyType,
    details: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut coordinator = coordinator(services, options);
    open(multi, &mut coordinator).await?;
    coordinator.select_type(emergency_type)?;
    coordinator.set_details(details)?;
    submit(multi, &mut coordinator).await
}

/// Walks the reporter through the report form.
///
/// A failed submission can be retried without re-entering the report.
///
/// # Errors
///
/// Returns an error if the terminal cannot be read or the location is
/// required but unavailable.
pub async fn interactive(
    multi: &MultiProgress,
    services: &Services,
    options: &ReportOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Report Emergency");
    println!();

    let mut coordinator = coordinator(services, options);
    open(multi, &mut coordinator).await?;

    let labels: Vec<String> = EmergencyType::all()
        .iter()
        .map(|t| format!("{} {} - {}", t.icon(), t.label(), t.description()))
        .collect();
    let idx = emergency_map_cli_utils::select("Emergency type", &labels)?;
    coordinator.select_type(EmergencyType::all()[idx])?;

    loop {
        let details = emergency_map_cli_utils::text("Additional details", false)?;
        coordinator.set_details(details)?;
        if coordinator.is_submittable() {
            break;
        }
        println!("Please describe the emergency.");
    }

    loop {
        match submit(multi, &mut coordinator).await {
            Ok(()) => return Ok(()),
            Err(e) => {
                println!("{e}");
                if !emergency_map_cli_utils::confirm("Try again?", true)? {
                    coordinator.close();
                    return Ok(());
                }
            }
        }
    }
}
