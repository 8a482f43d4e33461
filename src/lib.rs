pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::telegram::TelegramClient;
pub use config::BotConfig;
pub use core::{dispatcher::RegistrationDispatcher, engine::BotEngine};
pub use utils::error::{BotError, Result};
