pub mod toml_config;

use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE_URL: &str = "https://api.telegram.org";
pub const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;
pub const MAX_POLL_TIMEOUT_SECS: u64 = 90;

pub const ENV_BOT_TOKEN: &str = "BOT_TOKEN";
pub const ENV_BOT_TOKEN_FALLBACK: &str = "TELEGRAM_BOT_TOKEN";
pub const ENV_REG_URL: &str = "REG_URL";

/// Fully resolved runtime settings, produced by merging CLI flags,
/// environment variables and an optional TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    pub token: String,
    pub registration_url: String,
    pub api_base_url: String,
    pub poll_timeout_secs: u64,
}

impl ConfigProvider for BotConfig {
    fn bot_token(&self) -> &str {
        &self.token
    }

    fn registration_url(&self) -> &str {
        &self.registration_url
    }

    fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    fn poll_timeout_secs(&self) -> u64 {
        self.poll_timeout_secs
    }
}

impl Validate for BotConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_token("token", &self.token)?;
        validation::validate_url("registration_url", &self.registration_url)?;
        validation::validate_url("api_base_url", &self.api_base_url)?;
        validation::validate_range(
            "poll_timeout_secs",
            self.poll_timeout_secs,
            0,
            MAX_POLL_TIMEOUT_SECS,
        )?;
        Ok(())
    }
}

#[cfg(feature = "cli")]
pub use cli::CliConfig;

#[cfg(feature = "cli")]
mod cli {
    use super::toml_config::TomlConfig;
    use super::*;
    use crate::utils::error::BotError;
    use clap::Parser;

    #[derive(Debug, Clone, Parser)]
    #[command(name = "fenix-bot")]
    #[command(about = "Telegram registration bot for the FENIX clan")]
    pub struct CliConfig {
        /// Bot API token; falls back to BOT_TOKEN / TELEGRAM_BOT_TOKEN
        #[arg(long)]
        pub token: Option<String>,

        /// Registration form URL; falls back to REG_URL
        #[arg(long)]
        pub reg_url: Option<String>,

        /// Bot API server, overridable for tests and local API servers
        #[arg(long)]
        pub api_base_url: Option<String>,

        /// Long poll timeout in seconds
        #[arg(long)]
        pub poll_timeout: Option<u64>,

        /// Path to a TOML configuration file
        #[arg(short, long)]
        pub config: Option<String>,

        /// Enable verbose output
        #[arg(short, long)]
        pub verbose: bool,

        /// Log process CPU/memory stats while polling
        #[arg(long)]
        pub monitor: bool,

        /// One JSON log object per line instead of human-readable output
        #[arg(long)]
        pub log_json: bool,

        /// Validate configuration and exit without talking to Telegram
        #[arg(long)]
        pub dry_run: bool,
    }

    impl CliConfig {
        pub fn load_file(&self) -> Result<Option<TomlConfig>> {
            match &self.config {
                Some(path) => Ok(Some(TomlConfig::from_file(path)?)),
                None => Ok(None),
            }
        }

        /// 合併優先序:CLI flag > 環境變數 > 配置檔 > 預設值
        pub fn resolve_with(&self, file: Option<&TomlConfig>) -> Result<BotConfig> {
            let token = self
                .token
                .clone()
                .or_else(|| std::env::var(ENV_BOT_TOKEN).ok())
                .or_else(|| std::env::var(ENV_BOT_TOKEN_FALLBACK).ok())
                .or_else(|| file.and_then(|f| f.bot.token.clone()))
                .ok_or_else(|| BotError::MissingConfigError {
                    field: format!("token ({} / {})", ENV_BOT_TOKEN, ENV_BOT_TOKEN_FALLBACK),
                })?;

            let registration_url = self
                .reg_url
                .clone()
                .or_else(|| std::env::var(ENV_REG_URL).ok())
                .or_else(|| file.and_then(|f| f.bot.registration_url.clone()))
                .ok_or_else(|| BotError::MissingConfigError {
                    field: format!("registration_url ({})", ENV_REG_URL),
                })?;

            let api_base_url = self
                .api_base_url
                .clone()
                .or_else(|| file.and_then(|f| f.bot.api_base_url.clone()))
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

            let poll_timeout_secs = self
                .poll_timeout
                .or_else(|| file.and_then(|f| f.poll_timeout_secs()))
                .unwrap_or(DEFAULT_POLL_TIMEOUT_SECS);

            Ok(BotConfig {
                token,
                registration_url,
                api_base_url,
                poll_timeout_secs,
            })
        }

        pub fn resolve(&self) -> Result<BotConfig> {
            let file = self.load_file()?;
            self.resolve_with(file.as_ref())
        }
    }
}
