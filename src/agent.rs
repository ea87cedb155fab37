//! The collection loop.
//!
//! One cycle is: prime if needed, gather filesystem utilization and disk
//! deltas, build the report, submit it, reset. Cycles never overlap and no
//! failure inside a cycle ends the loop.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::time::{interval, MissedTickBehavior};

use crate::collectors::delta::DeltaEngine;
use crate::collectors::filesystem::collect_filesystem_usage;
use crate::collectors::source::StatsSource;
use crate::constants::USAGE_QUERY_TIMEOUT_SECS;
use crate::models::{AgentIdentity, MetricSet};
use crate::report::ReportBuilder;
use crate::transport::Transport;

/// What happened in one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The baseline could not be captured; nothing was built or sent.
    PrimingFailed,
    /// A report with this many metrics was delivered.
    Submitted { metrics: usize },
    /// A report with this many metrics was built but delivery failed.
    SubmitFailed { metrics: usize },
}

/// Owns all long-lived state and drives the cycles.
pub struct Agent<S, T> {
    source: Arc<S>,
    transport: T,
    engine: DeltaEngine,
    builder: ReportBuilder,
    interval: Duration,
    prime_wait: Duration,
}

impl<S, T> Agent<S, T>
where
    S: StatsSource + 'static,
    T: Transport,
{
    /// An agent reporting every `interval`. The first cycle waits one
    /// interval after capturing its baseline.
    pub fn new(source: S, transport: T, identity: AgentIdentity, interval: Duration) -> Self {
        Self {
            source: Arc::new(source),
            transport,
            engine: DeltaEngine::new(),
            builder: ReportBuilder::new(identity, interval),
            interval,
            prime_wait: interval,
        }
    }

    /// Override the one-time priming wait, leaving the interval unchanged.
    pub fn with_prime_wait(mut self, prime_wait: Duration) -> Self {
        self.prime_wait = prime_wait;
        self
    }

    pub fn engine(&self) -> &DeltaEngine {
        &self.engine
    }

    pub fn builder(&self) -> &ReportBuilder {
        &self.builder
    }

    /// Run one full cycle. The report is reset before returning, whatever
    /// the outcome.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        if !self.engine.is_primed() {
            if let Err(e) = self.engine.prime(self.source.as_ref(), self.prime_wait).await {
                error!("Failed to capture baseline counters, will retry next cycle: {e}");
                return CycleOutcome::PrimingFailed;
            }
        }

        let usage_timeout = Duration::from_secs(USAGE_QUERY_TIMEOUT_SECS);
        let fs_usage = collect_filesystem_usage(&self.source, usage_timeout).await;
        let disk_metrics = self.collect_disk_metrics();

        let report = self.builder.build_report(&fs_usage, disk_metrics);
        let metrics = report.metric_count();

        let outcome = match self.transport.submit(report).await {
            Ok(()) => {
                debug!("Submitted report with {metrics} metrics");
                CycleOutcome::Submitted { metrics }
            }
            Err(e) => {
                error!("Failed to submit report: {e}");
                CycleOutcome::SubmitFailed { metrics }
            }
        };

        self.builder.reset();
        outcome
    }

    fn collect_disk_metrics(&mut self) -> MetricSet {
        let current = match self.source.disk_io_counters() {
            Ok(current) => current,
            Err(e) => {
                warn!("Disk I/O counters unavailable this cycle: {e}");
                return MetricSet::new();
            }
        };

        match self.engine.compute_deltas(current) {
            Ok(metrics) => metrics,
            Err(e) => {
                error!("Skipping disk metrics: {e}");
                MetricSet::new()
            }
        }
    }

    /// Run cycles every interval until `shutdown` completes.
    ///
    /// A cycle in progress when `shutdown` fires is abandoned; reports are
    /// not durable so there is nothing to clean up.
    pub async fn run_until<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut tick = interval(self.interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!("Starting collection loop, interval {}s", self.interval.as_secs());

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = tick.tick() => {
                    let was_primed = self.engine.is_primed();
                    tokio::select! {
                        outcome = self.run_cycle() => debug!("Cycle finished: {outcome:?}"),
                        _ = &mut shutdown => break,
                    }
                    // The priming wait already spanned one interval
                    if !was_primed && self.engine.is_primed() {
                        tick.reset();
                    }
                }
                _ = &mut shutdown => break,
            }
        }

        self.builder.reset();
        info!("Collection loop stopped");
    }
}
