use serde::{Deserialize, Serialize};

const APP_NAME: &str = "geoip";
const FILE_NAME: Option<&str> = None;

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct UserConfig {
  pub api_key: Option<String>,
  pub user_agent: Option<String>,
}

impl UserConfig {
  /// Flag/env values win over whatever is stored on disk.
  #[must_use]
  pub fn merged_with(
    self,
    api_key: Option<String>,
    user_agent: Option<String>,
  ) -> Self {
    Self {
      api_key: api_key.or(self.api_key),
      user_agent: user_agent.or(self.user_agent),
    }
  }
}

/// Read ~/.config/geoip/default-config.toml (or OS equivalent).
pub fn load() -> UserConfig {
  confy::load(APP_NAME, FILE_NAME).unwrap_or_default()
}

pub fn store(cfg: &UserConfig) -> anyhow::Result<()> {
  confy::store(APP_NAME, FILE_NAME, cfg).map_err(Into::into)
}

pub fn path() -> anyhow::Result<std::path::PathBuf> {
  confy::get_configuration_file_path(APP_NAME, FILE_NAME).map_err(Into::into)
}
