// Library root module for timer-metrics
// Named latency timers reported through tracing, and the build_info
// counter published to Prometheus at startup.

pub mod config;
pub mod errors;
pub mod metrics;
pub mod timer;

pub use config::AppConfig;
pub use errors::TimerError;
pub use metrics::{init_build_info, register_build_info, BuildInfo};
pub use timer::{ReportOutcome, TimerRegistry};
