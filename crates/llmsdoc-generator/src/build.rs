//! Build orchestration.
//!
//! Pre-materializes every enumerated artifact so the output directory can be
//! served by any static host.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    time::Instant,
};

use llmsdoc_core::{CategoryKey, CategoryRegistry, Config};
use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    aggregator::{AggregateError, AggregatedArtifact, Aggregator},
    collector::ContentCollector,
    index::IndexGenerator,
    paths::{enumerate, output_path},
};

/// Build errors.
#[derive(Debug, Error)]
pub enum BuildError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Aggregation error.
    #[error("aggregation error: {0}")]
    Aggregate(#[from] AggregateError),

    /// The routing prefix cannot be used as an output directory name.
    #[error("routes.prefix {0:?} is not a safe output directory name")]
    UnsafePrefix(String),

    /// An enumerated path has no registered category.
    #[error("static path {0:?} does not map to a registered category")]
    UnmappedPath(Vec<String>),
}

/// Result type for build operations.
pub type Result<T> = std::result::Result<T, BuildError>;

/// Build statistics.
#[derive(Debug, Clone, Default)]
pub struct BuildStats {
    /// Number of artifacts written, the index included.
    pub artifacts: usize,

    /// Documents included across all categories.
    pub documents: usize,

    /// Documents that degraded while loading.
    pub failures: usize,

    /// Categories that matched no documents.
    pub empty_categories: usize,

    /// Build duration in milliseconds.
    pub duration_ms: u64,
}

/// Aggregate every registered category against one walk of the content tree.
pub fn precompute(
    aggregator: &Aggregator,
    registry: &CategoryRegistry,
) -> std::result::Result<BTreeMap<CategoryKey, AggregatedArtifact>, AggregateError> {
    let candidates = aggregator.collector().candidates()?;
    let entries: Vec<_> = registry.iter().collect();

    Ok(entries
        .par_iter()
        .map(|(key, config)| {
            (
                (*key).clone(),
                aggregator.aggregate_from(&candidates, config),
            )
        })
        .collect())
}

/// Static site builder.
#[derive(Debug)]
pub struct Builder {
    config: Config,
    registry: CategoryRegistry,
    output_dir: PathBuf,
}

impl Builder {
    /// Create a new builder.
    #[must_use]
    pub fn new(config: Config, registry: CategoryRegistry, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            registry,
            output_dir: output_dir.into(),
        }
    }

    /// Execute the full build.
    pub fn build(&self) -> Result<BuildStats> {
        let start = Instant::now();
        let mut stats = BuildStats::default();

        info!(
            content = %self.config.content.root.display(),
            output = %self.output_dir.display(),
            categories = self.registry.len(),
            "starting build"
        );

        // 1. Aggregate every category; a failure here leaves the last output intact
        let collector = ContentCollector::new(&self.config.content.root)
            .with_extensions(&self.config.content.extensions);
        let artifacts = precompute(&Aggregator::new(collector), &self.registry)?;

        // 2. Clean previous artifacts
        self.clean_output()?;

        // 3. Write one file per enumerated path
        let index = IndexGenerator::new(self.config.clone()).generate(&self.registry);
        for segments in enumerate(&self.registry) {
            let path = output_path(&self.output_dir, &self.config.routes.prefix, &segments);

            if segments.is_empty() {
                write_file(&path, &index)?;
                stats.artifacts += 1;
                continue;
            }

            let artifact = CategoryKey::from_segments(&segments)
                .ok()
                .and_then(|key| artifacts.get(&key))
                .ok_or_else(|| BuildError::UnmappedPath(segments.clone()))?;

            write_file(&path, &artifact.content)?;
            stats.artifacts += 1;
            stats.documents += artifact.documents;
            stats.failures += artifact.failures.len();
            if artifact.is_empty() {
                warn!(category = %artifact.title, "category matched no documents");
                stats.empty_categories += 1;
            }
        }

        // 4. Root-level llms.txt mirrors the index
        write_file(&self.output_dir.join("llms.txt"), &index)?;

        stats.duration_ms = start.elapsed().as_millis() as u64;

        info!(
            artifacts = stats.artifacts,
            documents = stats.documents,
            failures = stats.failures,
            empty = stats.empty_categories,
            duration_ms = stats.duration_ms,
            "build complete"
        );

        Ok(stats)
    }

    /// Remove artifacts from a previous build, leaving other files alone.
    fn clean_output(&self) -> Result<()> {
        let prefix = &self.config.routes.prefix;
        if !CategoryKey::parse(prefix).is_ok_and(|key| key.as_str() == prefix) {
            return Err(BuildError::UnsafePrefix(prefix.clone()));
        }

        let prefix_dir = self.output_dir.join(&self.config.routes.prefix);
        if prefix_dir.exists() {
            debug!(dir = %prefix_dir.display(), "cleaning previous artifacts");
            fs::remove_dir_all(&prefix_dir)?;
        }
        fs::create_dir_all(&self.output_dir)?;
        Ok(())
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    debug!(path = %path.display(), "wrote artifact");
    Ok(())
}
