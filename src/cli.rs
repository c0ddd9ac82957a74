use clap::builder::FalseyValueParser;
use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "geoip", version)]
#[command(
  about = "Get info about IP geolocation from ipdata.co",
  long_about = "Look up geolocation, network, currency, time zone and threat information for one or more IP addresses using ipdata.co. Without addresses, your own public IP is looked up."
)]
pub struct Cli {
  /// IP addresses to look up, in order. Leave empty to look up your own.
  #[arg(value_name = "IP")]
  pub addresses: Vec<String>,

  /// ipdata.co API key.
  /// Overrides the key stored in the user config file.
  #[arg(short = 'a', long, env = "GEOIP_API_KEY", value_name = "API_KEY")]
  pub api_key: Option<String>,

  /// HTTP user agent.
  #[arg(short = 'u', long, env = "GEOIP_USER_AGENT", value_name = "AGENT")]
  pub user_agent: Option<String>,

  /// Print your current public IP and exit.
  #[arg(long, visible_alias = "ip")]
  pub ip_only: bool,

  /// Print the JSON returned by ipdata.co instead of the report.
  #[arg(short = 'j', long)]
  pub json: bool,

  /// Disable color and emoji output.
  #[arg(long, env = "NO_COLOR", value_parser = FalseyValueParser::new())]
  pub no_color: bool,

  /// Keep looking up the remaining addresses after one fails.
  /// Errors are reported once every address has been tried.
  #[arg(long)]
  pub keep_going: bool,

  /// Persist the api key and user agent that are in effect into the user
  /// config file.
  #[arg(long)]
  pub save_key: bool,

  /// Print the current merged configuration and exit.
  #[arg(long)]
  pub config_show: bool,
}
