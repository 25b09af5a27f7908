//! Vault-Tec Enterprise Suite: a themed terminal dashboard for the monk CLI.

use std::sync::Arc;
use tracing::{error, info};
use vault_tec::cli::Cli;
use vault_tec::config::Config;
use vault_tec::error::{Result, VaultError};
use vault_tec::logging;
use vault_tec::monk::{CommandObserver, MonkClient, ResponseObserver};
use vault_tec::tui::{self, headless, trace::TraceLog};

#[tokio::main]
async fn main() {
    // A missing .env is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse_args();

    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("{}: {}", e.category(), e);
            eprintln!("{}: {}", e.category(), e);
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<i32> {
    cli.validate_headless().map_err(VaultError::config)?;

    let config_path = cli.config_path();
    let mut config = Config::load(Some(&config_path))?;
    cli.apply_to(&mut config);
    config.validate()?;

    if cli.headless {
        logging::init_stderr_logging(config.debug);
    } else {
        logging::init_file_logging(config.debug);
    }
    info!(config = %config_path.display(), "Loaded configuration");

    let trace = Arc::new(TraceLog::new());
    let client = MonkClient::new(config.monk_binary.clone())
        .with_timeout(config.timeout())
        .with_observers(
            Some(trace.clone() as Arc<dyn CommandObserver>),
            Some(trace.clone() as Arc<dyn ResponseObserver>),
        );

    if cli.headless {
        return headless::run_headless(&cli, &config, client, trace).await;
    }

    tui::run(client, &config, trace).await?;
    Ok(0)
}
