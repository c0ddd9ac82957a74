#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

use console::style;
use geoip::{run, LOOKUP_FAILURE_EXIT_CODE};
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
  env_logger::Builder::from_env(
    env_logger::Env::default().default_filter_or("warn"),
  )
  .init();

  // Install the default crypto provider for rustls
  let _ = rustls::crypto::ring::default_provider().install_default();

  match run().await {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      eprintln!("{}", style(format!("{e:#}")).red().bold());
      ExitCode::from(LOOKUP_FAILURE_EXIT_CODE)
    }
  }
}
