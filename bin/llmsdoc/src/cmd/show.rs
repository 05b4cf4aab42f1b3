//! Show command - prints one category document to stdout

use std::path::Path;

use color_eyre::eyre::{Result, WrapErr, bail};
use llmsdoc_core::{Resolution, Resolver};
use llmsdoc_generator::{Aggregator, ContentCollector, IndexGenerator, fallback};

/// Run the show command for a category path such as `typescript/sdk/common`.
pub fn run(config_path: &Path, category: &str) -> Result<()> {
    let (config, registry) = super::load(config_path)?;
    let resolver = Resolver::new(config.routes.prefix.clone());

    match resolver.resolve(&registry, category) {
        Resolution::Index => {
            print!("{}", IndexGenerator::new(config).generate(&registry));
        }
        Resolution::NotFound {
            attempted,
            available,
        } => {
            eprint!("{}", fallback::not_found(&resolver, &attempted, &available));
            bail!("Unknown category `{attempted}`");
        }
        Resolution::Found { key, config: category } => {
            let collector = ContentCollector::new(&config.content.root)
                .with_extensions(&config.content.extensions);
            let artifact = Aggregator::new(collector)
                .aggregate(&category)
                .wrap_err_with(|| format!("Failed to aggregate `{key}`"))?;
            for failure in &artifact.failures {
                tracing::warn!(path = %failure.path, reason = %failure.kind, "degraded document");
            }
            print!("{}", artifact.content);
        }
    }

    Ok(())
}
