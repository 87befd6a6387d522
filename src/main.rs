// =============================================================================
// RSI Reversal Bot — Main Entry Point
// =============================================================================
//
// One sequential pass over the configured pairs: fetch, evaluate, notify.
// Scheduling (cron, systemd timer, ...) is left to the host.
// =============================================================================

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use rsi_reversal_bot::config::{Args, BotConfig, Settings};
use rsi_reversal_bot::runner::Runner;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & logging ─────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // ── 2. Configuration ─────────────────────────────────────────────────
    let args = Args::parse();
    let settings = Settings::from_env()?;
    let config = BotConfig::resolve(settings, args)?;

    if config.webhook_url.trim().is_empty() {
        info!("DISCORD_WEBHOOK_URL not set, signals will only be logged");
    }

    // ── 3. One pass over the pairs ───────────────────────────────────────
    let runner = Runner::new(config)?;
    let pairs = runner.config().pairs.clone();
    let mut failed = 0usize;

    for pair in &pairs {
        if let Err(e) = runner.run_once(pair).await {
            failed += 1;
            error!(pair = %pair, error = %format!("{e:#}"), "evaluation failed");
        }
    }

    info!(total = pairs.len(), failed, "run complete");

    if failed > 0 {
        anyhow::bail!("{failed} of {} pairs failed", pairs.len());
    }
    Ok(())
}
