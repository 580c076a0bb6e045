//! Runtime configuration, loaded from YAML.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Settings for running a tree, usually read from `treely.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Seed for the random composites. Unset means seeded from the clock.
    pub seed: Option<u64>,

    /// Interval between periodic ticks
    #[serde(default = "default_tick_interval_secs")]
    pub tick_interval_secs: f64,

    /// Stop after this many ticks even if the tree has not stopped itself
    pub max_ticks: Option<u64>,

    /// Record a trace event per node evaluation in the tree's blackboard
    pub trace: bool,

    /// Keep at most this many trace events, dropping the oldest. Unset keeps every event.
    #[serde(default = "default_trace_capacity")]
    pub trace_capacity: Option<usize>,
}

fn default_tick_interval_secs() -> f64 {
    1.0
}

fn default_trace_capacity() -> Option<usize> {
    Some(10_000)
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            seed: None,
            tick_interval_secs: default_tick_interval_secs(),
            max_ticks: None,
            trace: false,
            trace_capacity: default_trace_capacity(),
        }
    }
}

impl TreeConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        Ok(config)
    }

    /// Load from `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Tick interval as a `Duration`. Non-positive or non-finite values fall back to the default.
    pub fn tick_interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.tick_interval_secs)
            .ok()
            .filter(|d| !d.is_zero())
            .unwrap_or_else(|| Duration::from_secs_f64(default_tick_interval_secs()))
    }
}
