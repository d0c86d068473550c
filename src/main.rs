use clap::Parser;
use tracing::error;

use urlshort::cli::Cli;
use urlshort::config::{StaticConfig, get_config, init_config};
use urlshort::runtime::{prepare_server_startup, run_server};
use urlshort::system::init_logging;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.generate_config {
        print!("{}", StaticConfig::generate_sample_config());
        return Ok(());
    }

    let config = match StaticConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e.format_colored());
            return Err(e.into());
        }
    };
    init_config(config);
    let config = get_config();

    let _log_guard = init_logging(&config.logging)?;

    let seed_file = cli.seed_file(&config);
    let startup = prepare_server_startup(&seed_file).map_err(|e| {
        error!("Server startup failed: {:#}", e);
        e
    })?;

    run_server(startup).await
}
