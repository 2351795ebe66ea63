//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use crate::application::errors::ConfigError;
use crate::application::services::voice_service::DEFAULT_TEMPORARY_CHANNEL_NAME;
use crate::domain::entities::MemberId;
use crate::domain::listing::DEFAULT_PAGE_LENGTH;

/// Bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub bot: BotConfig,
    /// Users allowed to run `voicetools` commands
    #[serde(default)]
    pub owners: Vec<MemberId>,
    pub storage: StorageConfig,
    pub adapters: AdaptersConfig,
    #[serde(default)]
    pub forcelimit: ForceLimitConfig,
    #[serde(default)]
    pub listing: ListingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BotConfig {
    pub name: String,
    pub prefix: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StorageBackend {
    Sqlite,
    Json,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct AdaptersConfig {
    pub discord: Option<DiscordConfig>,
    pub console: Option<ConsoleConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct DiscordConfig {
    pub enabled: bool,
    pub token: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConsoleConfig {
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ForceLimitConfig {
    pub temporary_channel_name: String,
}

impl Default for ForceLimitConfig {
    fn default() -> Self {
        Self {
            temporary_channel_name: DEFAULT_TEMPORARY_CHANNEL_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ListingConfig {
    pub page_length: usize,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            page_length: DEFAULT_PAGE_LENGTH,
        }
    }
}

/// Adapter chosen for a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterChoice {
    Discord(String),
    Console,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                name: "voicetools-bot".to_string(),
                prefix: "!".to_string(),
            },
            owners: Vec::new(),
            storage: StorageConfig {
                backend: StorageBackend::Sqlite,
                path: PathBuf::from("voicetools.db"),
            },
            adapters: AdaptersConfig {
                discord: Some(DiscordConfig {
                    enabled: false,
                    token: None,
                }),
                console: Some(ConsoleConfig {
                    enabled: true,
                }),
            },
            forcelimit: ForceLimitConfig::default(),
            listing: ListingConfig::default(),
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bot.prefix.trim().is_empty() {
            return Err(ConfigError::MissingField("bot.prefix".to_string()));
        }
        if self.listing.page_length == 0 || self.listing.page_length > DEFAULT_PAGE_LENGTH {
            return Err(ConfigError::InvalidValue(format!(
                "listing.page-length must be between 1 and {}",
                DEFAULT_PAGE_LENGTH
            )));
        }
        if self.forcelimit.temporary_channel_name.trim().is_empty() {
            return Err(ConfigError::MissingField("forcelimit.temporary-channel-name".to_string()));
        }
        Ok(())
    }

    /// Discord token, if the Discord adapter is usable
    pub fn discord_token(&self) -> Option<String> {
        self.adapters
            .discord
            .as_ref()
            .filter(|d| d.enabled)
            .and_then(|d| d.token.clone())
    }

    /// Pick the adapter to run: Discord when a token is available, otherwise
    /// the console simulator if it is enabled
    pub fn select_adapter(&self, token_override: Option<String>) -> Result<AdapterChoice, ConfigError> {
        if let Some(token) = token_override.or_else(|| self.discord_token()) {
            return Ok(AdapterChoice::Discord(token));
        }
        if self.adapters.console.as_ref().map(|c| c.enabled).unwrap_or(false) {
            return Ok(AdapterChoice::Console);
        }
        Err(ConfigError::InvalidValue(
            "no adapter enabled: set adapters.discord.token or enable adapters.console".to_string(),
        ))
    }

    /// Apply environment overrides on top of this config
    pub fn with_env(mut self) -> Self {
        if let Ok(token) = std::env::var("DISCORD_TOKEN") {
            let discord = self.adapters.discord.get_or_insert(DiscordConfig {
                enabled: true,
                token: None,
            });
            discord.token = Some(token);
            discord.enabled = true;
        }

        if let Ok(prefix) = std::env::var("BOT_PREFIX") {
            self.bot.prefix = prefix;
        }

        if let Ok(owners) = std::env::var("BOT_OWNERS") {
            let parsed: Vec<MemberId> = owners
                .split(',')
                .filter_map(|id| id.trim().parse().ok())
                .collect();
            if !parsed.is_empty() {
                self.owners = parsed;
            }
        }

        self
    }

    pub fn load_env() -> Self {
        Config::default().with_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_round_trips_through_yaml() {
        let yaml = Config::default().to_yaml().unwrap();
        assert!(yaml.contains("temporary-channel-name"));
        let config = Config::from_yaml(&yaml).unwrap();
        assert_eq!(config.bot.prefix, "!");
        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
        assert_eq!(config.listing.page_length, 1024);
    }

    #[test]
    fn test_optional_sections_default() {
        let yaml = r#"
bot:
  name: vt
  prefix: "?"
owners: [123456789012345678]
storage:
  backend: json
  path: data
adapters:
  discord:
    enabled: true
    token: abc
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.owners, vec![MemberId(123456789012345678)]);
        assert_eq!(config.storage.backend, StorageBackend::Json);
        assert_eq!(config.discord_token().as_deref(), Some("abc"));
        assert_eq!(config.forcelimit.temporary_channel_name, DEFAULT_TEMPORARY_CHANNEL_NAME);
        assert!(config.adapters.console.is_none());
    }

    #[test]
    fn test_invalid_page_length_is_rejected() {
        let mut config = Config::default();
        config.listing.page_length = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_adapter_selection() {
        let mut config = Config::default();
        assert_eq!(config.select_adapter(None).unwrap(), AdapterChoice::Console);
        assert_eq!(
            config.select_adapter(Some("abc".to_string())).unwrap(),
            AdapterChoice::Discord("abc".to_string())
        );

        if let Some(console) = config.adapters.console.as_mut() {
            console.enabled = false;
        }
        assert!(matches!(config.select_adapter(None), Err(ConfigError::InvalidValue(_))));

        config.adapters.console = None;
        assert!(matches!(config.select_adapter(None), Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_disabled_discord_has_no_token() {
        let mut config = Config::default();
        if let Some(discord) = config.adapters.discord.as_mut() {
            discord.token = Some("abc".to_string());
        }
        assert_eq!(config.discord_token(), None);
    }
}
