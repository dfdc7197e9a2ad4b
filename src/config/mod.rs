//! Environment-driven configuration. See [`settings::AppConfig`] for the
//! full tree.

mod settings;

pub use settings::{
    AppConfig, AuthConfig, DatabaseConfig, Environment, ObservabilityConfig, ServerConfig,
};
