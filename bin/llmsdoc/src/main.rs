//! llmsdoc CLI
//!
//! Single binary that serves and prebuilds LLM-oriented documentation bundles.
//!
//! This is the binary entry point. The library functionality is in `lib.rs`.

use clap::Parser;
use color_eyre::eyre::Result;
use llmsdoc::cmd::serve::ServeOptions;

/// Command-line interface for llmsdoc.
#[derive(Parser)]
#[command(
    name = "llmsdoc",
    version,
    about = "Flat markdown documentation bundles for language models"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "llmsdoc.toml")]
    config: std::path::PathBuf,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(clap::Subcommand)]
enum Commands {
    /// Serve the index and category documents over HTTP
    Serve {
        /// Interface to bind (overrides server.host)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (overrides server.port)
        #[arg(short, long)]
        port: Option<u16>,
        /// Aggregate every category at startup
        #[arg(long)]
        precompute: bool,
        /// Reload the registry when it or the content changes
        #[arg(long)]
        watch: bool,
    },
    /// Prebuild every category document for static hosting
    Build {
        /// Output directory (overrides build.output_dir)
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,
    },
    /// Scan the content tree and write the category registry
    Generate {
        /// Deepest directory level that becomes a category
        #[arg(short, long, default_value_t = 3)]
        depth: usize,
        /// Registry file to write (overrides content.registry)
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,
        /// Print the registry instead of writing it
        #[arg(long)]
        stdout: bool,
    },
    /// Validate configuration, registry and content
    Check {
        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
    },
    /// Print one category document (e.g. `typescript/sdk/common`)
    Show {
        /// Category path or key; empty prints the index
        #[arg(default_value = "")]
        category: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    llmsdoc::init_tracing(cli.verbose);

    match cli.command {
        Commands::Serve {
            host,
            port,
            precompute,
            watch,
        } => {
            let options = ServeOptions {
                host,
                port,
                precompute,
                watch,
            };
            llmsdoc::cmd::serve::run(&cli.config, options).await?;
        }
        Commands::Build { output } => {
            llmsdoc::cmd::build::run(&cli.config, output.as_deref())?;
        }
        Commands::Generate {
            depth,
            output,
            stdout,
        } => {
            llmsdoc::cmd::generate::run(&cli.config, depth, output.as_deref(), stdout)?;
        }
        Commands::Check { strict } => {
            llmsdoc::cmd::check::run(&cli.config, strict)?;
        }
        Commands::Show { category } => {
            llmsdoc::cmd::show::run(&cli.config, &category)?;
        }
    }

    Ok(())
}
