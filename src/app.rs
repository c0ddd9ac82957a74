use crate::cli::Cli;
use crate::providers::ipdata::Client;
use crate::record::Record;
use crate::report::{self, Options};
use crate::user_config::{self, UserConfig};
use anyhow::{bail, Context, Result};
use clap::Parser;
use console::style;
use log::{debug, info, warn};
use std::io::Write;

fn default_user_agent() -> String {
  format!("geoip/{}", env!("CARGO_PKG_VERSION"))
}

/// Helper: coloured keys so the config summary is easy to scan.
fn key(s: &str) -> console::StyledObject<&str> {
  style(s).bold().cyan()
}

/// Shows only the last four characters of a secret.
fn mask(secret: &str) -> String {
  let count = secret.chars().count();
  if count <= 4 {
    return "****".to_string();
  }
  let tail: String = secret.chars().skip(count - 4).collect();
  format!("****{tail}")
}

pub struct App {
  cli: Cli,
  config: UserConfig,
  options: Options,
}

impl App {
  pub fn from_args() -> Self {
    Self::from_parts(Cli::parse(), user_config::load())
  }

  fn from_parts(cli: Cli, stored: UserConfig) -> Self {
    if cli.no_color {
      console::set_colors_enabled(false);
      console::set_colors_enabled_stderr(false);
    }

    if stored.api_key.is_some() && cli.api_key.is_none() {
      info!("Using API key from the user config file");
    }
    let config =
      stored.merged_with(cli.api_key.clone(), cli.user_agent.clone());
    let options = Options {
      raw_json: cli.json,
      plain_glyphs: cli.no_color,
    };

    Self {
      cli,
      config,
      options,
    }
  }

  fn client(&self) -> Result<Client> {
    let user_agent = self
      .config
      .user_agent
      .clone()
      .unwrap_or_else(default_user_agent);
    let client = Client::new(user_agent)
      .context("Failed to build the HTTP client")?
      .with_api_key(self.config.api_key.clone());
    Ok(client)
  }

  pub async fn run(&self) -> Result<()> {
    if self.cli.save_key {
      self.save_config()?;
    }
    if self.cli.config_show {
      return self.show_config();
    }

    let client = self.client()?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    self.lookup_all(&client, &mut out).await?;
    out.flush()?;
    Ok(())
  }

  /// Runs the lookups the command line asked for, writing each report to
  /// `out` as soon as it is available.
  async fn lookup_all<W: Write>(
    &self,
    client: &Client,
    out: &mut W,
  ) -> Result<()> {
    if self.cli.ip_only {
      debug!("Looking up own public IP (ip only)");
      let record = client
        .fetch_self()
        .await
        .context("Lookup of your public IP failed")?;
      writeln!(out, "{}", record.ip)?;
      return Ok(());
    }

    if self.cli.addresses.is_empty() {
      debug!("Looking up own public IP");
      let record = client
        .fetch_self()
        .await
        .context("Lookup of your public IP failed")?;
      return self.print_record(&record, out);
    }

    let mut failures = Vec::new();
    for address in &self.cli.addresses {
      debug!("Looking up {address}");
      match client.fetch_for_address(address).await {
        Ok(record) => self.print_record(&record, out)?,
        Err(e) if self.cli.keep_going => {
          warn!("Lookup for {address} failed, continuing: {e}");
          failures.push(format!("{address}: {e}"));
        }
        Err(e) => {
          return Err(e)
            .with_context(|| format!("Lookup for {address} failed"));
        }
      }
    }

    if !failures.is_empty() {
      bail!(
        "{} of {} lookups failed:\n  {}",
        failures.len(),
        self.cli.addresses.len(),
        failures.join("\n  ")
      );
    }
    Ok(())
  }

  fn print_record<W: Write>(
    &self,
    record: &Record,
    out: &mut W,
  ) -> Result<()> {
    let rendered = report::render(record, self.options);
    out.write_all(rendered.as_bytes())?;
    // Keep consecutive payloads on separate lines.
    if self.options.raw_json && !rendered.ends_with('\n') {
      out.write_all(b"\n")?;
    }
    Ok(())
  }

  fn save_config(&self) -> Result<()> {
    if self.config.api_key.is_none() && self.config.user_agent.is_none() {
      bail!("--save-key needs --api-key or --user-agent (or their env vars)");
    }
    user_config::store(&self.config).context("Failed to save user config")?;
    info!("Saved configuration to {}", user_config::path()?.display());
    Ok(())
  }

  fn show_config(&self) -> Result<()> {
    let path = user_config::path().context("Failed to locate user config")?;
    println!("{} {}", key("Config file:"), path.display());
    println!(
      "{} {}",
      key("API key:"),
      self
        .config
        .api_key
        .as_deref()
        .map_or_else(|| "(not set)".to_string(), mask)
    );
    println!(
      "{} {}",
      key("User agent:"),
      self
        .config
        .user_agent
        .clone()
        .unwrap_or_else(default_user_agent)
    );
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use wiremock::matchers::{method, path};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  fn cli(addresses: &[&str]) -> Cli {
    Cli {
      addresses: addresses.iter().map(ToString::to_string).collect(),
      api_key: None,
      user_agent: None,
      ip_only: false,
      json: false,
      no_color: false,
      keep_going: false,
      save_key: false,
      config_show: false,
    }
  }

  fn body(ip: &str) -> String {
    format!(r#"{{"ip": "{ip}", "country_name": "Testland", "country_code": "TL"}}"#)
  }

  async fn mock_ok(server: &MockServer, route: &str, ip: &str) {
    Mock::given(method("GET"))
      .and(path(route))
      .respond_with(ResponseTemplate::new(200).set_body_string(body(ip)))
      .mount(server)
      .await;
  }

  fn client_for(server: &MockServer) -> Client {
    Client::new("geoip-test/1.0")
      .expect("client should build")
      .with_base_url(&server.uri())
  }

  async fn run(app: &App, server: &MockServer) -> (Result<()>, String) {
    let mut out = Vec::new();
    let result = app.lookup_all(&client_for(server), &mut out).await;
    (result, String::from_utf8(out).expect("output should be UTF-8"))
  }

  #[test]
  fn test_mask_keeps_last_four() {
    assert_eq!(mask("abcdef123456"), "****3456");
    assert_eq!(mask("abcd"), "****");
    assert_eq!(mask("ab"), "****");
  }

  #[test]
  fn test_flags_win_over_stored_config() {
    let mut args = cli(&[]);
    args.api_key = Some("flag".to_string());
    let stored = UserConfig {
      api_key: Some("stored".to_string()),
      user_agent: Some("stored-agent".to_string()),
    };
    let app = App::from_parts(args, stored);
    assert_eq!(app.config.api_key.as_deref(), Some("flag"));
    assert_eq!(app.config.user_agent.as_deref(), Some("stored-agent"));
  }

  #[tokio::test]
  async fn test_self_lookup_renders_report() {
    let server = MockServer::start().await;
    mock_ok(&server, "/", "203.0.113.7").await;

    let app = App::from_parts(cli(&[]), UserConfig::default());
    let (result, out) = run(&app, &server).await;

    result.expect("self lookup should succeed");
    assert!(out.starts_with("IP: 203.0.113.7\n   Testland (TL)\n"));
    assert!(out.ends_with("\n\n"));
  }

  #[tokio::test]
  async fn test_ip_only_prints_address() {
    let server = MockServer::start().await;
    mock_ok(&server, "/", "203.0.113.7").await;

    let mut args = cli(&["8.8.8.8"]);
    args.ip_only = true;
    let app = App::from_parts(args, UserConfig::default());
    let (result, out) = run(&app, &server).await;

    result.expect("ip-only lookup should succeed");
    assert_eq!(out, "203.0.113.7\n");
  }

  #[tokio::test]
  async fn test_addresses_in_input_order() {
    let server = MockServer::start().await;
    mock_ok(&server, "/1.1.1.1", "1.1.1.1").await;
    mock_ok(&server, "/8.8.8.8", "8.8.8.8").await;

    let app = App::from_parts(cli(&["8.8.8.8", "1.1.1.1"]), UserConfig::default());
    let (result, out) = run(&app, &server).await;

    result.expect("lookups should succeed");
    let first = out.find("IP: 8.8.8.8").expect("8.8.8.8 missing");
    let second = out.find("IP: 1.1.1.1").expect("1.1.1.1 missing");
    assert!(first < second);
  }

  #[tokio::test]
  async fn test_json_passthrough_separates_payloads() {
    let server = MockServer::start().await;
    mock_ok(&server, "/1.1.1.1", "1.1.1.1").await;
    mock_ok(&server, "/8.8.8.8", "8.8.8.8").await;

    let mut args = cli(&["1.1.1.1", "8.8.8.8"]);
    args.json = true;
    let app = App::from_parts(args, UserConfig::default());
    let (result, out) = run(&app, &server).await;

    result.expect("lookups should succeed");
    assert_eq!(out, format!("{}\n{}\n", body("1.1.1.1"), body("8.8.8.8")));
  }

  #[tokio::test]
  async fn test_fail_fast_stops_at_first_error() {
    let server = MockServer::start().await;
    mock_ok(&server, "/1.1.1.1", "1.1.1.1").await;
    Mock::given(method("GET"))
      .and(path("/bogus"))
      .respond_with(
        ResponseTemplate::new(400)
          .set_body_string(r#"{"message": "bogus does not appear to be an IPv4 or IPv6 address"}"#),
      )
      .mount(&server)
      .await;
    Mock::given(method("GET"))
      .and(path("/8.8.8.8"))
      .respond_with(ResponseTemplate::new(200).set_body_string(body("8.8.8.8")))
      .expect(0)
      .mount(&server)
      .await;

    let app = App::from_parts(
      cli(&["1.1.1.1", "bogus", "8.8.8.8"]),
      UserConfig::default(),
    );
    let (result, out) = run(&app, &server).await;

    let err = result.expect_err("bogus address should fail");
    let msg = format!("{err:#}");
    assert!(msg.starts_with("Lookup for bogus failed: "), "{msg}");
    assert!(msg.contains("does not appear to be an IPv4 or IPv6 address"));
    assert!(out.contains("IP: 1.1.1.1"));
    assert!(!out.contains("IP: 8.8.8.8"));
  }

  #[tokio::test]
  async fn test_keep_going_collects_errors() {
    let server = MockServer::start().await;
    mock_ok(&server, "/1.1.1.1", "1.1.1.1").await;
    mock_ok(&server, "/8.8.8.8", "8.8.8.8").await;
    Mock::given(method("GET"))
      .and(path("/10.0.0.1"))
      .respond_with(ResponseTemplate::new(429))
      .mount(&server)
      .await;

    let mut args = cli(&["1.1.1.1", "10.0.0.1", "8.8.8.8"]);
    args.keep_going = true;
    let app = App::from_parts(args, UserConfig::default());
    let (result, out) = run(&app, &server).await;

    let err = result.expect_err("one lookup should fail");
    let msg = err.to_string();
    assert!(msg.starts_with("1 of 3 lookups failed:"), "{msg}");
    assert!(msg.contains("10.0.0.1: you have exceeded requests limit"));
    assert!(out.contains("IP: 1.1.1.1"));
    assert!(out.contains("IP: 8.8.8.8"));
  }
}
