#![forbid(unsafe_code)]

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

use portfolio_cms::cli::{self, Cli, Session};
use portfolio_cms::config::AppConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    if let Some(dir) = &cli.data_dir {
        config.data_dir = Some(dir.clone());
    }

    // --log-level, then LOG_LEVEL, then the config file
    if let Some(level) = cli.log_level.clone().or_else(|| std::env::var("LOG_LEVEL").ok()) {
        config.log_level = level;
        config.validate_and_clamp();
    }

    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.tracing_level())
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!(data_dir = %config.data_dir().display(), "starting portfolio-cms");

    let mut session = Session::open(config)?;
    if let Some(path) = cli.config {
        session.config_path = path;
    }
    cli::run(cli.command, &session)
}
