//! Command-line interface for nearest evacuation destination lookups.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod error;
mod nearest;

pub use error::CliError;
use nearest::NearestArgs;

pub(crate) const ARG_LAT: &str = "lat";
pub(crate) const ARG_LNG: &str = "lng";
pub(crate) const ARG_DESTINATIONS: &str = "destinations";
pub(crate) const ARG_EVAC_POINTS: &str = "evac-points";
pub(crate) const ARG_OSRM_BASE_URL: &str = "osrm-base-url";
pub(crate) const ARG_PRIMARY_RADIUS: &str = "primary-radius";
pub(crate) const ARG_FALLBACK_RADIUS: &str = "fallback-radius";
pub(crate) const ARG_CANDIDATE_CAP: &str = "candidate-cap";
pub(crate) const ARG_MAX_DESTINATIONS: &str = "max-destinations";
pub(crate) const ARG_TIMEOUT_SECS: &str = "timeout-secs";
pub(crate) const ENV_LAT: &str = "REFUGE_CMDS_NEAREST_LAT";
pub(crate) const ENV_LNG: &str = "REFUGE_CMDS_NEAREST_LNG";
pub(crate) const ENV_DESTINATIONS: &str = "REFUGE_CMDS_NEAREST_DESTINATIONS";

/// Run the refuge CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns a [`CliError`] for invalid arguments, unreadable catalogs, or
/// output failures. Resolution itself never fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Nearest(args) => nearest::run_nearest(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "refuge",
    about = "Find the nearest evacuation destination on foot",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Resolve the nearest reachable destination from an origin.
    Nearest(NearestArgs),
}

#[cfg(test)]
mod tests;
