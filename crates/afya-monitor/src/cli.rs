use crate::config::MonitorConfig;
use afya_risk::{ModelKind, Strategy};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "afya-monitor")]
#[command(version)]
#[command(about = "Streams simulated wristband vitals and scores them for hypertension risk", long_about = None)]
pub struct Cli {
    /// JSON config file; defaults apply when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Seed for a reproducible reading stream
    #[arg(long)]
    pub seed: Option<u64>,

    /// Stop after this many readings
    #[arg(long)]
    pub ticks: Option<u64>,

    /// random-forest, xgboost or ensemble
    #[arg(long)]
    pub model: Option<ModelKind>,

    /// rules or model
    #[arg(long)]
    pub strategy: Option<Strategy>,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Write the Prometheus text exposition here on exit
    #[arg(long)]
    pub metrics_out: Option<PathBuf>,
}

impl Cli {
    /// Flags win over the config file.
    pub fn apply(&self, config: &mut MonitorConfig) {
        if let Some(model) = self.model {
            config.model = model;
        }
        if let Some(strategy) = self.strategy {
            config.strategy = strategy;
        }
    }
}
