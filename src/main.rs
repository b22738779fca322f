use anyhow::Result;
use clap::Parser;

use rates_cli::app;
use rates_cli::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    app::run(cli).await?;

    Ok(())
}
