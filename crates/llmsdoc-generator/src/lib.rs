//! llmsdoc Generator Library
//!
//! Turns a category registry and a content tree into flat markdown documents.
//!
//! # Modules
//!
//! - [`collector`] - Pattern expansion over the content root
//! - [`aggregator`] - Per-category document concatenation
//! - [`index`] - Table of contents across all categories
//! - [`fallback`] - Not-found and error documents
//! - [`paths`] - Static path enumeration for prebuilt output
//! - [`scan`] - Registry generation from the content tree
//! - [`build`] - Static build orchestration

pub mod aggregator;
pub mod build;
pub mod collector;
pub mod fallback;
pub mod index;
pub mod paths;
pub mod scan;

pub use aggregator::{
    AggregateError, AggregatedArtifact, Aggregator, Document, DocumentFailure, FailureKind,
};
pub use build::{BuildStats, Builder, precompute};
pub use collector::{CollectorError, ContentCollector, ContentFile};
pub use index::{IndexEntry, IndexGenerator};
pub use paths::{enumerate, output_path};
pub use scan::{RegistryScanner, ScanError};
