use std::io::Read;

use anyhow::Context;
use scoring::{ScoringConfig, logging::setup_logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ScoringConfig::from_env()?;

    setup_logging(&config);

    tracing::info!(
        config = ?config,
        "Loaded configuration"
    );

    tracing::info!("Loading detection model");
    scoring::init(&config)?;
    tracing::info!("Model loaded successfully");

    let mut raw_data = String::new();
    std::io::stdin()
        .read_to_string(&mut raw_data)
        .context("failed to read request body from stdin")?;

    let result = scoring::run(&raw_data).await?;

    println!("{result}");

    Ok(())
}
