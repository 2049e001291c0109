mod cli;
mod config;
mod logging;
mod monitor;

#[cfg(test)]
mod tests;

use afya_core::InMemoryHistory;
use afya_risk::{HttpScorer, RemoteScorer, ScoringService};
use anyhow::Context;
use clap::Parser;
use cli::Cli;
use config::MonitorConfig;
use monitor::{RunOptions, Session};
use prometheus::Registry;
use prometheus_bridge::MonitorMetrics;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.json_logs);

    let mut config = match &cli.config {
        Some(path) => MonitorConfig::load(path)?,
        None => MonitorConfig::default(),
    };
    config.apply_env(|var| std::env::var(var).ok())?;
    cli.apply(&mut config);
    config.validate()?;

    let options = RunOptions {
        seed: cli.seed,
        max_readings: cli.ticks,
    };

    let registry = Registry::new();
    let summary = if config.remote.is_configured() {
        let scorer = HttpScorer::new(config.remote.clone()).context("building http scorer")?;
        monitor_with(&config, options, ScoringService::new(scorer, config.model), &registry).await?
    } else {
        monitor_with(&config, options, ScoringService::local(config.model), &registry).await?
    };

    info!(
        readings = summary.readings,
        assessments = summary.assessments,
        escalations = summary.escalations,
        skipped = summary.skipped_analyses,
        "monitor stopped"
    );

    if let Some(path) = &cli.metrics_out {
        write_metrics(&registry, path)?;
        info!(path = %path.display(), "metrics written");
    }
    Ok(())
}

async fn monitor_with<R: RemoteScorer + 'static>(
    config: &MonitorConfig,
    options: RunOptions,
    service: ScoringService<R>,
    registry: &Registry,
) -> anyhow::Result<monitor::RunSummary> {
    let metrics = MonitorMetrics::new(registry)?;
    let user_id = config.user_id.unwrap_or_else(Uuid::new_v4);
    let history = InMemoryHistory::new(config.history_max_rows);
    let mut session = Session::new(config, user_id, history, metrics);

    let shutdown = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "cannot listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    let summary = monitor::run(config, options, Arc::new(service), &mut session, shutdown).await;
    match session.history_snapshot() {
        Ok(snapshot) => info!(
            readings = snapshot.readings,
            insights = snapshot.insights,
            latest = snapshot.latest.as_ref().map(|row| row.status.as_str()).unwrap_or("none"),
            evicted = session.history().evicted_rows(),
            "history"
        ),
        Err(err) => warn!(error = %err, "cannot read history"),
    }
    Ok(summary)
}

fn write_metrics(registry: &Registry, path: &Path) -> anyhow::Result<()> {
    let text = prometheus_bridge::render(registry)?;
    std::fs::write(path, text).with_context(|| format!("writing metrics to {}", path.display()))
}
