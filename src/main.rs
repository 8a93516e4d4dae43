//! Courseflow CLI entry point.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use courseflow::cli::{Cli, Commands};
use courseflow::domain::models::Config;
use courseflow::infrastructure::config::ConfigLoader;

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));
    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match cli.config.as_ref() {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(err) => courseflow::cli::handle_error(err, cli.json),
    };
    init_tracing(&config);

    let result = match cli.command {
        Commands::Migrate => courseflow::cli::commands::migrate::execute(&config, cli.json).await,
        Commands::Config => courseflow::cli::commands::config::execute(&config, cli.json),
        Commands::Evaluate(args) => {
            courseflow::cli::commands::evaluate::execute(args, &config, cli.json).await
        }
    };

    if let Err(err) = result {
        courseflow::cli::handle_error(err, cli.json);
    }
}
