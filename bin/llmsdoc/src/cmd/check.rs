//! Check command - validate configuration, registry and content

use std::path::Path;

use color_eyre::eyre::{Result, bail};
use llmsdoc_core::{CategoryKey, CategoryRegistry, Config};
use llmsdoc_generator::{Aggregator, ContentCollector, enumerate};

/// Validation result.
#[derive(Debug, Default)]
struct ValidationResult {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationResult {
    fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Run the check command.
pub fn run(config_path: &Path, strict: bool) -> Result<()> {
    tracing::info!(?config_path, strict, "Checking configuration and content");

    let mut result = ValidationResult::default();

    println!("Checking configuration...");
    let config = match Config::load_with_env(config_path) {
        Ok(c) => {
            println!("  ✓ Configuration valid");
            Some(c)
        }
        Err(e) => {
            result.add_error(format!("Configuration error: {e}"));
            println!("  ✗ Configuration invalid: {e}");
            None
        }
    };

    if let Some(ref cfg) = config {
        println!("\nChecking category registry...");
        match CategoryRegistry::load(&cfg.content.registry) {
            Ok(registry) => {
                println!("  ✓ {} categories registered", registry.len());
                check_static_paths(&registry, &mut result);

                println!("\nChecking content...");
                check_content(cfg, &registry, &mut result);
            }
            Err(e) => {
                result.add_error(format!("Registry error: {e}"));
                println!("  ✗ Registry invalid: {e}");
            }
        }
    }

    println!();
    println!("Summary:");
    println!("  Errors:   {}", result.errors.len());
    println!("  Warnings: {}", result.warnings.len());

    if result.has_errors() {
        println!();
        println!("Errors:");
        for err in &result.errors {
            println!("  ✗ {err}");
        }
    }

    if result.has_warnings() {
        println!();
        println!("Warnings:");
        for warn in &result.warnings {
            println!("  ⚠ {warn}");
        }
    }

    if result.has_errors() {
        bail!("Validation failed with {} error(s)", result.errors.len());
    }

    if strict && result.has_warnings() {
        bail!(
            "Validation failed with {} warning(s) (strict mode)",
            result.warnings.len()
        );
    }

    println!();
    println!("✓ All checks passed");

    Ok(())
}

/// Every registered key must have a static path, and nothing else may.
fn check_static_paths(registry: &CategoryRegistry, result: &mut ValidationResult) {
    let paths = enumerate(registry);
    let categories = paths.iter().filter(|p| !p.is_empty()).count();
    if categories != registry.len() {
        result.add_error(format!(
            "{} static paths enumerated for {} categories",
            categories,
            registry.len()
        ));
    }

    for segments in paths.iter().filter(|p| !p.is_empty()) {
        let mapped = CategoryKey::from_segments(segments).is_ok_and(|key| registry.contains(&key));
        if !mapped {
            result.add_error(format!(
                "static path /{} does not map to a registered category",
                segments.join("/")
            ));
        }
    }
}

fn check_content(config: &Config, registry: &CategoryRegistry, result: &mut ValidationResult) {
    let collector =
        ContentCollector::new(&config.content.root).with_extensions(&config.content.extensions);
    let aggregator = Aggregator::new(collector);

    let candidates = match aggregator.collector().candidates() {
        Ok(candidates) => candidates,
        Err(e) => {
            result.add_error(e.to_string());
            println!("  ✗ {e}");
            return;
        }
    };
    println!("  ✓ {} documents found", candidates.len());

    let mut reported = std::collections::BTreeSet::new();
    for (key, category) in registry.iter() {
        let artifact = aggregator.aggregate_from(&candidates, category);
        if artifact.is_empty() {
            result.add_warning(format!("Category `{key}` matches no documents"));
        }
        for failure in artifact.failures {
            if reported.insert(failure.path.clone()) {
                result.add_warning(format!("{}: {}", failure.path, failure.kind));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_paths_map_back_to_registry() {
        let registry = CategoryRegistry::from_toml_str(
            r#"
[categories.api]
title = "API"
patterns = ["api/**/*.md"]

[categories.typescript-sdk-common]
title = "TypeScript SDK"
patterns = ["sdk/typescript/common/**/*.md"]
"#,
        )
        .expect("registry");

        let mut result = ValidationResult::default();
        check_static_paths(&registry, &mut result);

        assert!(result.errors.is_empty(), "{:?}", result.errors);
    }
}
