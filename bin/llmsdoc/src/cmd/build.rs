//! Build command - prebuilds every artifact for static hosting

use std::{path::Path, time::Instant};

use color_eyre::eyre::{Result, WrapErr};
use llmsdoc_generator::Builder;

/// Run the build command.
pub fn run(config_path: &Path, output: Option<&Path>) -> Result<()> {
    let start = Instant::now();
    tracing::info!(?config_path, ?output, "Starting build");

    let (mut config, registry) = super::load(config_path)?;

    if let Some(output) = output {
        config.build.output_dir = output.to_path_buf();
    }
    let output_dir = config.build.output_dir.clone();

    let stats = Builder::new(config, registry, &output_dir)
        .build()
        .wrap_err("Build failed")?;

    let duration = start.elapsed();

    println!();
    println!("  Build completed successfully!");
    println!();
    println!("  Artifacts:  {}", stats.artifacts);
    println!("  Documents:  {}", stats.documents);
    println!("  Empty:      {}", stats.empty_categories);
    println!("  Degraded:   {}", stats.failures);
    println!();
    println!("  Duration:   {:.2}s", duration.as_secs_f64());
    println!("  Output:     {}", output_dir.display());
    println!();

    tracing::info!(?stats, ?duration, "Build completed successfully");

    Ok(())
}
