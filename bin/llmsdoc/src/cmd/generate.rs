//! Generate command - scans the content tree into a category registry file

use std::{fs, path::Path};

use color_eyre::eyre::{Result, WrapErr};
use llmsdoc_core::Config;
use llmsdoc_generator::{ContentCollector, RegistryScanner};

const HEADER: &str = "# Generated by `llmsdoc generate`.\n\
                      # Re-run it whenever content directories are added, moved or removed.\n\n";

/// Run the generate command.
///
/// Writes to `output`, or the configured registry path; `stdout` prints instead.
pub fn run(config_path: &Path, depth: usize, output: Option<&Path>, stdout: bool) -> Result<()> {
    let config = Config::load_with_env(config_path).wrap_err("Failed to load configuration")?;
    tracing::info!(root = %config.content.root.display(), depth, "Scanning content tree");

    let collector =
        ContentCollector::new(&config.content.root).with_extensions(&config.content.extensions);
    let registry = RegistryScanner::new(collector)
        .max_depth(depth)
        .scan()
        .wrap_err("Failed to scan content tree")?;

    let document = format!(
        "{HEADER}{}",
        registry.to_toml().wrap_err("Failed to serialize registry")?
    );

    if stdout {
        print!("{document}");
        return Ok(());
    }

    let path = output.unwrap_or(config.content.registry.as_path());
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, document)
        .wrap_err_with(|| format!("Failed to write registry to {}", path.display()))?;

    println!();
    println!("  Registry written: {}", path.display());
    println!("  Categories:       {}", registry.len());
    println!();

    Ok(())
}
