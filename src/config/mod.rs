pub mod env;
mod loader;

pub use env::{ApiConfig, AppConfig, ConfigError, PollConfig, ViewConfig};
pub use loader::load_config;
