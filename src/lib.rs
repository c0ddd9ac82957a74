#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::struct_excessive_bools)]

use anyhow::Result;

// Declare library modules
mod app;
mod cli;
pub mod providers;
pub mod record;
pub mod report;
mod user_config;

/// Exit code for any failed lookup.
pub const LOOKUP_FAILURE_EXIT_CODE: u8 = 2;

/// Runs the main application logic.
///
/// This function parses command-line arguments, merges them with the user
/// config file, performs the requested lookups one address at a time and
/// prints a report for each of them.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built, if the user config
/// cannot be saved or located, or if any lookup fails.
pub async fn run() -> Result<()> {
  let app = app::App::from_args();
  app.run().await
}
