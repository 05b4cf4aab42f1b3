//! llmsdoc Core Library
//!
//! Core types, configuration, and the category registry for the llmsdoc
//! documentation aggregator.

pub mod category;
pub mod config;
pub mod error;
pub mod frontmatter;
pub mod registry;
pub mod resolver;

pub use category::{CategoryConfig, CategoryKey, IndexSection};
pub use config::Config;
pub use error::{CoreError, Result};
pub use frontmatter::Frontmatter;
pub use registry::{CategoryRegistry, SharedRegistry};
pub use resolver::{Resolution, Resolver};
