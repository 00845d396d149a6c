#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared CLI utilities for the emergency map binaries.
//!
//! [`init_logger`] sets up `indicatif-log-bridge` so that `log::info!` and
//! friends are suspended while spinners redraw. [`spinner`] wraps the
//! network waits (locating, geocoding, store round-trips) and
//! [`select`] / [`text`] wrap the `dialoguer` prompts used by the
//! interactive report flow.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

pub use indicatif::MultiProgress;

/// Adds a steady-ticking spinner showing `message` to `multi`.
///
/// Finish it with [`ProgressBar::finish_with_message`] or
/// [`ProgressBar::finish_and_clear`].
#[must_use]
pub fn spinner(multi: &MultiProgress, message: &str) -> ProgressBar {
    let bar = multi.add(ProgressBar::new_spinner());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar.set_style(
        ProgressStyle::with_template("{spinner:.red} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(message.to_string());
    bar
}

/// Prompts for one of `labels` and returns its index.
///
/// # Errors
///
/// Returns an error if the terminal cannot be read.
pub fn select(prompt: &str, labels: &[String]) -> Result<usize, dialoguer::Error> {
    dialoguer::Select::new()
        .with_prompt(prompt)
        .items(labels)
        .default(0)
        .interact()
}

/// Prompts for a line of text. Empty input is rejected unless
/// `allow_empty` is set.
///
/// # Errors
///
/// Returns an error if the terminal cannot be read.
pub fn text(prompt: &str, allow_empty: bool) -> Result<String, dialoguer::Error> {
    dialoguer::Input::<String>::new()
        .with_prompt(prompt)
        .allow_empty(allow_empty)
        .interact_text()
}

/// Asks a yes/no question.
///
/// # Errors
///
/// Returns an error if the terminal cannot be read.
pub fn confirm(prompt: &str, default: bool) -> Result<bool, dialoguer::Error> {
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()
}

/// Initializes the global logger wrapped in `indicatif-log-bridge` so that
/// `log::info!` and friends are suspended while spinners redraw.
///
/// Returns the [`MultiProgress`] that all spinners must be added to.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let logger = pretty_env_logger::formatted_builder()
        .parse_env("RUST_LOG")
        .build();
    let level = logger.filter();

    indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .ok(); // Already set in tests

    log::set_max_level(level);

    multi
}
