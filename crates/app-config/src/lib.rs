// In crates/app-config/src/lib.rs

use config::{Config, Environment, File};
use std::path::Path;

pub mod error;
pub mod types;

// Re-export the most important types for easy access.
pub use error::{Error, Result};
pub use types::{
    AppSettings, HierarchySource, HubSettings, PushSettings, ReconnectSettings,
    ReconnectStrategy, ServiceEndpoint, Settings,
};

/// Loads the application settings from the `config/` directory.
pub fn load_settings() -> Result<Settings> {
    load_settings_from(Path::new("config"))
}

/// Loads the application settings from various sources.
///
/// This function orchestrates the layered configuration loading:
/// 1. Built-in defaults (see `types.rs`).
/// 2. An optional `base.toml` in `dir`.
/// 3. An optional environment-specific file (e.g., `development.toml`).
/// 4. Environment variables (e.g., `APP_PUSH__TOKEN=...`).
pub fn load_settings_from(dir: &Path) -> Result<Settings> {
    // Get the current environment. Default to "development" if not set.
    let environment = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "development".into());
    build_settings(dir, &environment, app_environment())
}

/// The `APP`-prefixed, `__`-separated environment source.
pub fn app_environment() -> Environment {
    Environment::with_prefix("APP")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("subscriptions")
}

/// Layers files from `dir` and the given environment source, then validates.
pub fn build_settings(dir: &Path, environment: &str, env: Environment) -> Result<Settings> {
    let settings = Config::builder()
        .add_source(File::with_name(&dir.join("base").to_string_lossy()).required(false))
        .add_source(File::with_name(&dir.join(environment).to_string_lossy()).required(false))
        .add_source(env)
        .build()?;

    // Deserialize the configuration into our `Settings` struct.
    let mut settings: Settings = settings.try_deserialize()?;
    settings.app.environment = environment.to_string();
    settings.validate()?;

    Ok(settings)
}
