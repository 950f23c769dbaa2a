//! Periodic feed scheduler
//!
//! One tokio task per family, each ticking on its own fixed interval. The first firing comes
//! one full interval after start unless `run_on_startup` is set. Missed ticks are skipped, so a
//! run that overruns its interval does not cause a burst of catch-up runs.
//!
//! A run already in progress is allowed to finish on shutdown; the handle waits for it up to a
//! grace period.

use futures::future::join_all;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::ingest::config::IngestConfig;
use crate::ingest::coordinator::IngestionCoordinator;
use crate::ingest::models::FeedFamily;

/// Period for one family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedSchedule {
    pub family: FeedFamily,
    pub interval: Duration,
}

/// Builder for the background scheduler
pub struct FeedScheduler {
    coordinator: IngestionCoordinator,
    schedules: Vec<FeedSchedule>,
    run_on_startup: bool,
}

impl FeedScheduler {
    pub fn new(coordinator: IngestionCoordinator) -> Self {
        Self {
            coordinator,
            schedules: Vec::new(),
            run_on_startup: false,
        }
    }

    /// Schedule every family the coordinator knows at the intervals in `config`
    pub fn from_config(coordinator: IngestionCoordinator, config: &IngestConfig) -> Self {
        let schedules = coordinator
            .families()
            .into_iter()
            .map(|family| FeedSchedule {
                family,
                interval: config.interval_for(family),
            })
            .collect();

        Self {
            coordinator,
            schedules,
            run_on_startup: config.run_on_startup,
        }
    }

    pub fn with_schedule(mut self, family: FeedFamily, interval: Duration) -> Self {
        self.schedules.retain(|s| s.family != family);
        self.schedules.push(FeedSchedule { family, interval });
        self
    }

    pub fn run_on_startup(mut self, enabled: bool) -> Self {
        self.run_on_startup = enabled;
        self
    }

    pub fn schedules(&self) -> &[FeedSchedule] {
        &self.schedules
    }

    /// Spawn one task per schedule. Must be called inside a tokio runtime.
    pub fn start(self) -> SchedulerHandle {
        let token = CancellationToken::new();

        let tasks = self
            .schedules
            .iter()
            .map(|schedule| {
                info!(
                    family = %schedule.family,
                    interval_secs = schedule.interval.as_secs(),
                    run_on_startup = self.run_on_startup,
                    "scheduling feed"
                );
                tokio::spawn(run_schedule(
                    self.coordinator.clone(),
                    *schedule,
                    self.run_on_startup,
                    token.child_token(),
                ))
            })
            .collect();

        SchedulerHandle {
            token,
            tasks,
            schedules: self.schedules,
        }
    }
}

async fn run_schedule(
    coordinator: IngestionCoordinator,
    schedule: FeedSchedule,
    run_on_startup: bool,
    token: CancellationToken,
) {
    let first = if run_on_startup {
        Instant::now()
    } else {
        Instant::now() + schedule.interval
    };
    let mut ticker = interval_at(first, schedule.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = ticker.tick() => {
                debug!(family = %schedule.family, "scheduled run firing");
                // Outcome is already logged and recorded by the coordinator
                if let Err(e) = coordinator.run_ingestion(schedule.family).await {
                    warn!(family = %schedule.family, error = %e, "scheduled run could not be recorded");
                }
            }
        }
    }

    debug!(family = %schedule.family, "schedule stopped");
}

/// Owns the scheduler tasks; dropping it leaves them running until the runtime stops
pub struct SchedulerHandle {
    token: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
    schedules: Vec<FeedSchedule>,
}

impl SchedulerHandle {
    pub fn schedules(&self) -> &[FeedSchedule] {
        &self.schedules
    }

    /// Token that stops every schedule when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.tasks.iter().all(JoinHandle::is_finished)
    }

    /// Stop firing new runs and wait up to `grace` for in-flight runs.
    ///
    /// Tasks still running after the grace period are aborted.
    pub async fn shutdown(self, grace: Duration) {
        info!("stopping feed scheduler");
        self.token.cancel();

        let aborts: Vec<_> = self.tasks.iter().map(JoinHandle::abort_handle).collect();
        match tokio::time::timeout(grace, join_all(self.tasks)).await {
            Ok(results) => {
                for result in results {
                    if let Err(e) = result {
                        warn!(error = %e, "scheduler task ended abnormally");
                    }
                }
                info!("feed scheduler stopped");
            },
            Err(_) => {
                warn!(grace_secs = grace.as_secs(), "in-flight feed runs exceeded shutdown grace, aborting");
                for abort in aborts {
                    abort.abort();
                }
            },
        }
    }
}
