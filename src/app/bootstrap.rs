use std::sync::Arc;

use log::{info, warn};
use tokio_util::sync::CancellationToken;

use crate::cli::Cli;
use crate::config::{load_config_file, validate_config, ConfigOverrides, PipelineConfig};
use crate::error::Result;
use crate::fetch::CbrClient;
use crate::pipeline::run_pipeline;
use crate::report::render_outcome;

/// Resolve configuration (defaults, then config file, then flags).
pub fn resolve_config(cli: &Cli) -> Result<PipelineConfig> {
    let file = match &cli.config {
        Some(path) => {
            info!("loading configuration from {}", path.display());
            load_config_file(path)?
        }
        None => ConfigOverrides::default(),
    };

    let config = PipelineConfig::default().apply(&file.merge(cli.overrides()));
    validate_config(&config)?;
    Ok(config)
}

/// Entry point used by `main`: run the pipeline against the archive and print the report.
pub async fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(&cli)?;
    let source = Arc::new(CbrClient::new(&config)?);

    let cancel = CancellationToken::new();
    spawn_interrupt_listener(cancel.clone());

    let outcome = run_pipeline(&config, source, cancel).await?;
    print!("{}", render_outcome(&outcome, &config.designated_currency));
    Ok(())
}

fn spawn_interrupt_listener(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, stopping fetches");
            cancel.cancel();
        }
    });
}
