/// Database connection and table creation
pub mod database;

/// Application settings from environment variables
pub mod settings;

/// Scraped-site profiles (built-in or from sources.toml)
pub mod sources;

pub use settings::{AppConfig, TelegramConfig};
pub use sources::{SourcePage, SourceProfile};
