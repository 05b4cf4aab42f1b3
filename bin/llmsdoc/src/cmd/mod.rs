//! Command implementations.

pub mod build;
pub mod check;
pub mod generate;
pub mod serve;
pub mod show;

use std::path::Path;

use color_eyre::eyre::{Result, WrapErr};
use llmsdoc_core::{CategoryRegistry, Config};

/// Load the site configuration and the category registry it points at.
///
/// Malformed registries fail here, before anything is served or written.
pub fn load(config_path: &Path) -> Result<(Config, CategoryRegistry)> {
    let config = Config::load_with_env(config_path).wrap_err("Failed to load configuration")?;
    let registry = CategoryRegistry::load(&config.content.registry)
        .wrap_err("Failed to load category registry")?;
    tracing::debug!(?config, categories = registry.len(), "Loaded configuration");
    Ok((config, registry))
}
