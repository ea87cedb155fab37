//! Per-interval deltas from cumulative disk counters.
//!
//! The kernel reports disk activity as counters that only ever grow. The
//! [`DeltaEngine`] keeps the previous cycle's snapshot and turns each new
//! snapshot into "activity since last report". Before it can do that it needs
//! a baseline, captured once at startup by [`DeltaEngine::prime`].

use std::time::Duration;

use log::{debug, info, warn};

use crate::collectors::source::StatsSource;
use crate::constants::{METRIC_PREFIX_DISK_COUNT, METRIC_PREFIX_DISK_IO, METRIC_PREFIX_DISK_TIME};
use crate::error::{CollectionResult, EngineError};
use crate::models::{CounterSnapshot, MetricSet, MetricValue};

/// Measurement category of a disk counter, derived from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterCategory {
    /// Cumulative read/write time, milliseconds
    Time,
    /// Read/write operation counts
    Count,
    /// Everything else: byte totals
    Bytes,
}

impl CounterCategory {
    pub fn classify(key: &str) -> Self {
        if key.contains("time") {
            CounterCategory::Time
        } else if key.contains("count") {
            CounterCategory::Count
        } else {
            CounterCategory::Bytes
        }
    }

    pub fn prefix(self) -> &'static str {
        match self {
            CounterCategory::Time => METRIC_PREFIX_DISK_TIME,
            CounterCategory::Count => METRIC_PREFIX_DISK_COUNT,
            CounterCategory::Bytes => METRIC_PREFIX_DISK_IO,
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            CounterCategory::Time => "ms",
            CounterCategory::Count => "integer",
            CounterCategory::Bytes => "bytes",
        }
    }
}

/// Fully-qualified metric name for a disk counter.
pub fn disk_metric_name(key: &str) -> String {
    let category = CounterCategory::classify(key);
    format!("{}/{}[{}]", category.prefix(), key, category.unit())
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum EngineState {
    Uninitialized,
    Primed { prior: CounterSnapshot },
}

/// Holds the previous snapshot and computes deltas against it.
#[derive(Debug)]
pub struct DeltaEngine {
    state: EngineState,
}

impl Default for DeltaEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DeltaEngine {
    pub fn new() -> Self {
        Self {
            state: EngineState::Uninitialized,
        }
    }

    /// An engine that is already primed with `baseline`.
    pub fn from_baseline(baseline: CounterSnapshot) -> Self {
        Self {
            state: EngineState::Primed { prior: baseline },
        }
    }

    pub fn is_primed(&self) -> bool {
        matches!(self.state, EngineState::Primed { .. })
    }

    /// The snapshot the next delta will be computed against.
    pub fn prior(&self) -> Option<&CounterSnapshot> {
        match &self.state {
            EngineState::Primed { prior } => Some(prior),
            EngineState::Uninitialized => None,
        }
    }

    /// Capture the baseline snapshot, then wait `wait` so the first real
    /// delta covers a full interval.
    ///
    /// Nothing is reported until the wait has elapsed. Calling this on a
    /// primed engine is a no-op.
    ///
    /// # Errors
    ///
    /// Returns the source's error if the baseline cannot be read. The engine
    /// then stays uninitialized and priming must be retried.
    pub async fn prime<S>(&mut self, source: &S, wait: Duration) -> CollectionResult<()>
    where
        S: StatsSource + ?Sized,
    {
        if self.is_primed() {
            debug!("Delta engine already primed");
            return Ok(());
        }

        let baseline = source.disk_io_counters()?;
        info!(
            "Captured baseline of {} disk counters, waiting {}s before the first report",
            baseline.len(),
            wait.as_secs()
        );

        tokio::time::sleep(wait).await;

        self.state = EngineState::Primed { prior: baseline };
        info!("Delta engine primed");
        Ok(())
    }

    /// Diff `current` against the stored snapshot, then store `current`.
    ///
    /// Only keys present in both snapshots produce a metric. A counter that
    /// went backwards (device removed, counter wrapped) yields `0` and
    /// `current` becomes its new baseline.
    pub fn compute_deltas(&mut self, current: CounterSnapshot) -> Result<MetricSet, EngineError> {
        let prior = match &self.state {
            EngineState::Primed { prior } => prior,
            EngineState::Uninitialized => return Err(EngineError::NotPrimed),
        };

        let mut metrics = MetricSet::new();
        for (key, value) in current.iter() {
            let Some(previous) = prior.get(key) else {
                debug!("Counter {key} has no prior value, reporting from next cycle");
                continue;
            };

            let delta = match value.checked_sub(previous) {
                Some(delta) => delta,
                None => {
                    warn!("Counter {key} went backwards ({previous} -> {value}), treating as reset");
                    0
                }
            };

            metrics.insert(disk_metric_name(key), MetricValue::Integer(delta));
        }

        self.state = EngineState::Primed { prior: current };
        Ok(metrics)
    }
}
