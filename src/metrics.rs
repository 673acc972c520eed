// Build information metric
// Publishes a single labeled counter carrying the version and revision of
// the running binary. It is incremented once at startup and never touched
// again, so scrapers can join it against other series.

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use prometheus::{IntCounterVec, Opts, Registry};
use tracing::info;

pub const BUILD_INFO_METRIC: &str = "build_info";
pub const VERSION_LABEL: &str = "version";
pub const REVISION_LABEL: &str = "revision";

/// Revision captured by the build script, `unknown` outside a git checkout.
const BUILD_REVISION: &str = env!("TIMER_METRICS_REVISION");

static PROCESS_BUILD_INFO: OnceCell<IntCounterVec> = OnceCell::new();

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfo {
    pub version: String,
    pub revision: String,
}

impl BuildInfo {
    pub fn new(version: impl Into<String>, revision: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            revision: revision.into(),
        }
    }

    /// Version and revision this binary was compiled from.
    pub fn current() -> Self {
        Self::new(env!("CARGO_PKG_VERSION"), BUILD_REVISION)
    }
}

/// Define `<namespace>_build_info{version, revision}`, bump the series for
/// `build` by one and register the counter with `registry`.
pub fn register_build_info(
    registry: &Registry,
    namespace: &str,
    build: &BuildInfo,
) -> Result<IntCounterVec> {
    let opts = Opts::new(BUILD_INFO_METRIC, format!("{namespace} build information"))
        .namespace(namespace);
    let counter = IntCounterVec::new(opts, &[VERSION_LABEL, REVISION_LABEL])
        .context("define build_info counter")?;
    counter
        .with_label_values(&[build.version.as_str(), build.revision.as_str()])
        .inc();
    registry
        .register(Box::new(counter.clone()))
        .with_context(|| format!("register {namespace}_{BUILD_INFO_METRIC}"))?;

    info!(
        namespace = %namespace,
        version = %build.version,
        revision = %build.revision,
        "build info registered"
    );
    Ok(counter)
}

/// Register build info with the process-wide Prometheus registry.
///
/// Only the first call registers and increments; later calls hand back the
/// same counter.
pub fn init_build_info(namespace: &str, build: &BuildInfo) -> Result<&'static IntCounterVec> {
    PROCESS_BUILD_INFO
        .get_or_try_init(|| register_build_info(prometheus::default_registry(), namespace, build))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series_value(registry: &Registry, name: &str, build: &BuildInfo) -> Option<f64> {
        registry
            .gather()
            .into_iter()
            .find(|family| family.get_name() == name)?
            .get_metric()
            .iter()
            .find(|metric| {
                let labels = metric.get_label();
                labels.iter().any(|l| {
                    l.get_name() == VERSION_LABEL && l.get_value() == build.version
                }) && labels.iter().any(|l| {
                    l.get_name() == REVISION_LABEL && l.get_value() == build.revision
                })
            })
            .map(|metric| metric.get_counter().get_value())
    }

    #[test]
    fn registers_namespaced_counter_with_single_increment() {
        let registry = Registry::new();
        let build = BuildInfo::new("1.7.0", "abc1234");

        let counter = register_build_info(&registry, "containerd", &build).unwrap();

        assert_eq!(
            counter.with_label_values(&["1.7.0", "abc1234"]).get(),
            1
        );
        assert_eq!(
            series_value(&registry, "containerd_build_info", &build),
            Some(1.0)
        );
    }

    #[test]
    fn help_text_names_the_namespace() {
        let registry = Registry::new();
        register_build_info(&registry, "svc", &BuildInfo::new("0.1.0", "deadbee")).unwrap();

        let family = registry
            .gather()
            .into_iter()
            .find(|family| family.get_name() == "svc_build_info")
            .unwrap();
        assert_eq!(family.get_help(), "svc build information");
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let registry = Registry::new();
        let build = BuildInfo::new("0.1.0", "unknown");

        register_build_info(&registry, "svc", &build).unwrap();
        let err = register_build_info(&registry, "svc", &build).unwrap_err();
        assert!(err.to_string().contains("svc_build_info"));
        assert_eq!(series_value(&registry, "svc_build_info", &build), Some(1.0));
    }

    #[test]
    fn process_init_runs_once() {
        let build = BuildInfo::new("9.9.9", "oncetest");

        let first = init_build_info("once_check", &build).unwrap();
        let second = init_build_info("once_check", &build).unwrap();

        assert!(std::ptr::eq(first, second));
        assert_eq!(first.with_label_values(&["9.9.9", "oncetest"]).get(), 1);
        assert_eq!(
            series_value(prometheus::default_registry(), "once_check_build_info", &build),
            Some(1.0)
        );
    }

    #[test]
    fn current_build_uses_crate_version() {
        let build = BuildInfo::current();
        assert_eq!(build.version, env!("CARGO_PKG_VERSION"));
        assert!(!build.revision.is_empty());
    }
}
