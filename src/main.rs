//! Studymate - AI study assistant CLI
//!
#![doc = "Studymate - AI study assistant CLI"]
#![doc = "Main entry point for the Studymate application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use studymate::cli::{Cli, Commands};
use studymate::commands;
use studymate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Solve {
            prompt,
            image,
            cheat_sheet,
            practice,
        } => {
            tracing::info!("Solving homework");
            if let Some(path) = &image {
                tracing::debug!("Using image: {}", path.display());
            }
            commands::solve::run_solve(config, prompt, image, cheat_sheet, practice).await?;
            Ok(())
        }
        Commands::Sketch {
            prompt,
            edit,
            output,
        } => {
            tracing::info!("Generating sketch");
            tracing::debug!("Writing sketch to: {}", output.display());
            commands::sketch::run_sketch(config, prompt, edit, output).await?;
            Ok(())
        }
        Commands::Schedule { prompt, json } => {
            tracing::info!("Planning schedule");
            commands::schedule::run_schedule(config, prompt, json).await?;
            Ok(())
        }
        Commands::Chat { mode } => {
            tracing::info!("Starting interactive session");
            if let Some(m) = &mode {
                tracing::debug!("Using mode override: {}", m);
            }
            commands::chat::run_chat(config, mode).await?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so command output on stdout stays machine readable.
fn init_tracing(verbose: bool) {
    let default_level = if verbose {
        "studymate=debug"
    } else {
        "studymate=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
