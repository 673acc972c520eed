// Configuration management module
// Loads instrumentation settings from environment variables. Build metadata
// can be overridden here so the process entry point injects it instead of
// relying on compiled-in globals.

use anyhow::Result;
use serde::Deserialize;

use crate::metrics::BuildInfo;

pub const DEFAULT_NAMESPACE: &str = "timer_metrics";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Enables the named timer registry; disabled registries ignore every call
    pub timers_enabled: Option<bool>,
    /// Prometheus namespace prefixed to the build_info counter
    pub metrics_namespace: Option<String>,
    /// Overrides the crate version reported in build_info
    pub build_version: Option<String>,
    /// Overrides the VCS revision captured at compile time
    pub build_revision: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default().separator("__"))
            .build()?;
        Self::from_config(cfg)
    }

    pub fn from_config(cfg: config::Config) -> Result<Self> {
        Ok(cfg.try_deserialize()?)
    }

    pub fn timers_enabled(&self) -> bool {
        self.timers_enabled.unwrap_or(false)
    }

    pub fn namespace(&self) -> &str {
        match self.metrics_namespace.as_deref() {
            Some(ns) if !ns.is_empty() => ns,
            _ => DEFAULT_NAMESPACE,
        }
    }

    /// Build metadata for this process, with config overrides applied.
    pub fn build_info(&self) -> BuildInfo {
        let current = BuildInfo::current();
        BuildInfo::new(
            self.build_version.clone().unwrap_or(current.version),
            self.build_revision.clone().unwrap_or(current.revision),
        )
    }
}
