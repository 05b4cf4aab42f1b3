//! llmsdoc CLI Library
//!
//! Serves documentation trees as flat markdown bundles: one document per
//! category, an index linking them all, and a static export of both.
//!
//! # Modules
//!
//! - [`cmd`] - Command implementations (serve, build, generate, check, show)
//! - [`server`] - HTTP server for the llms endpoints
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use llmsdoc::cmd;
//!
//! // Prebuild every category into ./public
//! cmd::build::run(Path::new("llmsdoc.toml"), Some(Path::new("public"))).unwrap();
//! ```

pub mod cmd;
pub mod server;

pub use llmsdoc_core::{CategoryRegistry, Config};
pub use llmsdoc_generator::{Aggregator, BuildStats, Builder};

/// Initialize tracing with the specified verbosity level.
///
/// # Arguments
///
/// * `verbose` - Verbosity level (0 = WARN, 1 = INFO, 2 = DEBUG, 3+ = TRACE)
pub fn init_tracing(verbose: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}
