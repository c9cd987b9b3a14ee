//! Global CLI options shared by every subcommand.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;

use vfleet_engine::{TargetSelector, WorkerConfig};

/// Options that apply to all commands; most can also be set via env vars.
#[derive(Args, Debug, Clone)]
pub struct FleetOpts {
    /// Run against a single named engine from the catalog (env: VFLEET_ENGINE)
    #[arg(long, global = true, env = "VFLEET_ENGINE", conflicts_with = "all")]
    pub engine: Option<String>,

    /// Run against every engine in the catalog
    #[arg(long, global = true)]
    pub all: bool,

    /// Seconds to wait between job polls (env: VFLEET_POLL)
    #[arg(long, global = true, default_value_t = 10, env = "VFLEET_POLL")]
    pub poll: u64,

    /// Path to the engine catalog file (env: VFLEET_CONFIG)
    #[arg(
        long,
        global = true,
        default_value = "./engines.json",
        env = "VFLEET_CONFIG"
    )]
    pub config: PathBuf,

    /// JSON output envelope
    #[arg(long, global = true)]
    pub json: bool,

    /// Pretty-print JSON output (implies --json)
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Suppress progress lines
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

impl FleetOpts {
    /// Engine-selection mode: `--all`, `--engine <name>`, or the catalog's
    /// default engine when neither is given.
    pub fn selector(&self) -> TargetSelector {
        if self.all {
            TargetSelector::All
        } else if let Some(name) = &self.engine {
            TargetSelector::Named(name.clone())
        } else {
            TargetSelector::Default
        }
    }

    pub fn worker_config(&self) -> WorkerConfig {
        WorkerConfig {
            poll_interval: Duration::from_secs(self.poll),
            ..WorkerConfig::default()
        }
    }
}
