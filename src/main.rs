use anyhow::{anyhow, Context, Result};
use timer_metrics::{init_build_info, AppConfig, TimerRegistry};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    init_tracing().context("initialize tracing subscriber")?;

    if let Err(err) = run() {
        tracing::error!(error = ?err, "fatal startup error");
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> Result<()> {
    let config = AppConfig::load().context("load configuration from environment")?;
    let timers = TimerRegistry::from_config(&config);

    timers.start_timer("startup")?;

    timers.start_timer("build_info")?;
    let build = config.build_info();
    init_build_info(config.namespace(), &build).context("register build info metric")?;
    timers.finish_timer("build_info")?;

    timers.finish_timer("startup")?;

    info!(
        namespace = %config.namespace(),
        version = %build.version,
        revision = %build.revision,
        timers_enabled = timers.is_enabled(),
        "timer-metrics online"
    );

    timers.report();
    Ok(())
}

fn init_tracing() -> Result<()> {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(env_filter))
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow!("tracing subscriber init: {err}"))
}
