use anyhow::Result;
use clap::Parser;
use code_suggest_core::SuggestConfig;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
use cli::{Cli, Commands};

fn main() -> Result<()> {
    // Parse CLI arguments first to get verbosity level
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let config = SuggestConfig::load(cli.config.as_deref())?;

    // Rule tables compile before any command runs
    let registry = config.rule_registry()?;
    debug!("{} rules loaded", registry.rule_count());

    match cli.command {
        Commands::Analyze(args) => {
            info!("Analyze command: {:?}", args);
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(cli::commands::analyze::execute(args, &config))?;
        }
        Commands::Extract(args) => {
            info!("Extract command: {:?}", args);
            cli::commands::extract::execute(args, &config)?;
        }
        Commands::Suggestions(command) => {
            info!("Suggestions command: {:?}", command);
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(cli::commands::suggestions::execute(command, &config))?;
        }
        Commands::Runs(command) => {
            info!("Runs command: {:?}", command);
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(cli::commands::runs::execute(command, &config))?;
        }
        Commands::Rules(args) => {
            info!("Rules command: {:?}", args);
            cli::commands::rules::execute(args, &config)?;
        }
        Commands::Chat(args) => {
            info!("Chat command: {:?}", args);
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(cli::commands::chat::execute(args, &config))?;
        }
    }

    Ok(())
}
