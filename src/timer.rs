// Named timer registry
//
// Call sites bracket an operation with start_timer/finish_timer under a
// unique name; report() emits every elapsed duration of the cycle as one
// structured log record and resets the registry for the next cycle.
//
// The registry is an explicit object owned by whoever drives the reporting
// cycle. Both maps sit behind one mutex, so it can be shared through an Arc.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use serde_json::{Map, Value};
use tracing::{debug, error, info};

use crate::config::AppConfig;
use crate::errors::TimerError;

/// Log target of report records, for filtering in log pipelines.
pub const REPORT_TARGET: &str = "time_metric";

#[derive(Debug, Default)]
struct TimerState {
    start: BTreeMap<String, Instant>,
    // every key here is also a key of `start`
    elapsed: BTreeMap<String, Duration>,
}

/// What a call to [`TimerRegistry::report`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    /// Registry disabled; nothing logged.
    Disabled,
    /// Report record logged with these timers, in name order.
    Emitted(Vec<(String, Duration)>),
    /// The named timer was started but never finished; only an error was logged.
    Incomplete(String),
}

#[derive(Debug)]
pub struct TimerRegistry {
    enabled: bool,
    state: Mutex<TimerState>,
}

impl Default for TimerRegistry {
    fn default() -> Self {
        Self::new(false)
    }
}

impl TimerRegistry {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            state: Mutex::new(TimerState::default()),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.timers_enabled())
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Number of timers started in the current cycle.
    pub fn len(&self) -> usize {
        self.lock().start.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Record the current instant under `name`.
    ///
    /// Names are unique within a reporting cycle: starting a name that was
    /// already started, finished or not, is rejected until the next report
    /// or clean.
    pub fn start_timer(&self, name: &str) -> Result<(), TimerError> {
        if !self.enabled {
            return Ok(());
        }
        let mut state = self.lock();
        if state.start.contains_key(name) {
            return Err(TimerError::Duplicate(name.to_string()));
        }
        state.start.insert(name.to_string(), Instant::now());
        Ok(())
    }

    /// Store the time elapsed since `name` was started.
    pub fn finish_timer(&self, name: &str) -> Result<(), TimerError> {
        if !self.enabled {
            return Ok(());
        }
        let mut state = self.lock();
        let started = *state
            .start
            .get(name)
            .ok_or_else(|| TimerError::NotStarted(name.to_string()))?;
        let elapsed = started.elapsed();
        state.elapsed.insert(name.to_string(), elapsed);
        debug!(timer = %name, elapsed = ?elapsed, "timer finished");
        Ok(())
    }

    /// Log every finished timer as one record, then clear the registry.
    ///
    /// If any started timer is unfinished nothing is reported: an error
    /// naming the first such timer is logged instead. The registry is cleared
    /// in both cases.
    ///
    /// tracing fields are fixed at compile time, so the per-timer durations
    /// travel in a single `timers` field holding a JSON object keyed by timer
    /// name. Subscribers see it as a display string, not as nested fields.
    pub fn report(&self) -> ReportOutcome {
        if !self.enabled {
            return ReportOutcome::Disabled;
        }
        let TimerState { start, elapsed } = std::mem::take(&mut *self.lock());

        if let Some(name) = start.keys().find(|name| !elapsed.contains_key(*name)) {
            error!(target: REPORT_TARGET, timer = %name, "timer not finished, report dropped");
            return ReportOutcome::Incomplete(name.clone());
        }

        let timers: Map<String, Value> = elapsed
            .iter()
            .map(|(name, took)| (name.clone(), Value::String(format!("{took:?}"))))
            .collect();
        let count = timers.len();
        let timers = Value::Object(timers);
        info!(
            target: REPORT_TARGET,
            timer = "report",
            count = count,
            timers = %timers,
            "time metric report"
        );
        ReportOutcome::Emitted(elapsed.into_iter().collect())
    }

    /// Drop every started and finished timer.
    pub fn clean(&self) {
        if !self.enabled {
            return;
        }
        *self.lock() = TimerState::default();
    }

    fn lock(&self) -> MutexGuard<'_, TimerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
