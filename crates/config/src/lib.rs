//! Configuration for the dealership service agent
//!
//! - `constants`: single source of truth for thresholds and window sizes
//! - `settings`: layered runtime settings (defaults, optional file, env)
//! - `vehicles`: the vehicle-name vocabulary and namespace mapping

pub mod constants;
pub mod settings;
pub mod vehicles;

pub use settings::{IndexSettings, LlmSettings, RetrievalSettings, Settings};
pub use vehicles::VehicleCatalog;

use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<ConfigError> for dealer_agent_core::Error {
    fn from(err: ConfigError) -> Self {
        dealer_agent_core::Error::Configuration(err.to_string())
    }
}
