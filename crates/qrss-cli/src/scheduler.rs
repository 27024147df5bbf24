//! Wall-clock aligned session scheduling, one task per band.
//!
//! Each band waits for the next multiple of the period (plus its stagger),
//! records for `period - gap`, and immediately starts waiting for the next
//! boundary while the finished session renders in the background. A band
//! never has two sessions recording at once.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use qrss_intake::Intake;
use qrss_spec::GrabConfig;
use tokio::sync::oneshot;
use tokio::task::{JoinError, JoinSet};

use crate::clock::Clock;
use crate::session::{RecordingSession, SessionOutcome, SessionPlan, SessionReport};

/// File name timestamp layout, UTC.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d--%H-%M-%S";

/// First multiple of `period` strictly after `now`.
pub fn next_boundary(now: Duration, period: Duration) -> Duration {
    let period_ns = period.as_nanos().max(1);
    let next = (now.as_nanos() / period_ns + 1) * period_ns;
    let secs = (next / 1_000_000_000) as u64;
    let nanos = (next % 1_000_000_000) as u32;
    Duration::new(secs, nanos)
}

/// Format a time since the Unix epoch for file names.
pub fn format_timestamp(at: Duration) -> String {
    match DateTime::<Utc>::from_timestamp(at.as_secs() as i64, at.subsec_nanos()) {
        Some(t) => t.format(TIMESTAMP_FORMAT).to_string(),
        None => at.as_secs().to_string(),
    }
}

/// Remaining number of sessions for one band.
///
/// Negative is unbounded; zero runs nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Budget(i64);

impl Budget {
    pub fn new(times: i64) -> Self {
        Self(times)
    }

    /// Claim one session, if any are left.
    pub fn take(&mut self) -> bool {
        match self.0 {
            0 => false,
            n if n < 0 => true,
            _ => {
                self.0 -= 1;
                true
            }
        }
    }
}

/// Timing knobs shared by every band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub period: Duration,
    pub gap: Duration,
    pub stagger: Duration,
    pub times: i64,
}

impl Schedule {
    pub fn from_config(config: &GrabConfig) -> Self {
        Self {
            period: Duration::from_secs(config.period_secs),
            gap: Duration::from_secs(config.gap_secs),
            stagger: Duration::from_secs(config.stagger_secs),
            times: config.times,
        }
    }

    /// How long each session records.
    pub fn recording(&self) -> Duration {
        self.period.saturating_sub(self.gap)
    }

    /// Delay after each boundary for the band at `index`.
    pub fn stagger_for(&self, index: usize) -> Duration {
        self.stagger.saturating_mul(u32::try_from(index).unwrap_or(u32::MAX))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    WaitingForBoundary,
    Recording,
    HandoffGap,
    Done,
}

/// Summary of one band's run.
#[derive(Debug)]
pub struct BandReport {
    pub index: usize,
    pub label: String,
    pub sessions: Vec<SessionReport>,
    /// Session tasks that panicked.
    pub crashed: usize,
}

impl BandReport {
    fn new(index: usize, label: &str) -> Self {
        Self {
            index,
            label: label.to_string(),
            sessions: Vec::new(),
            crashed: 0,
        }
    }

    fn record(&mut self, joined: Result<SessionReport, JoinError>) {
        match joined {
            Ok(session) => self.sessions.push(session),
            Err(e) => {
                tracing::error!(band = %self.label, error = %e, "session task panicked");
                self.crashed += 1;
            }
        }
    }

    pub fn written(&self) -> usize {
        self.count(|o| matches!(o, SessionOutcome::Written(_)))
    }

    pub fn empty(&self) -> usize {
        self.count(|o| matches!(o, SessionOutcome::Empty))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, SessionOutcome::Failed(_))) + self.crashed
    }

    fn count(&self, pred: impl Fn(&SessionOutcome) -> bool) -> usize {
        self.sessions.iter().filter(|s| pred(&s.outcome)).count()
    }
}

/// Drives the sessions of one band.
pub struct BandScheduler {
    index: usize,
    plan: Arc<SessionPlan>,
    schedule: Schedule,
    budget: Budget,
    state: SchedulerState,
    intake: Arc<dyn Intake>,
    clock: Arc<dyn Clock>,
}

impl BandScheduler {
    pub fn new(
        index: usize,
        plan: SessionPlan,
        schedule: Schedule,
        intake: Arc<dyn Intake>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            index,
            plan: Arc::new(plan),
            budget: Budget::new(schedule.times),
            schedule,
            state: SchedulerState::Idle,
            intake,
            clock,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    fn transition(&mut self, to: SchedulerState) {
        tracing::trace!(band = %self.plan.band.label, from = ?self.state, ?to, "scheduler");
        self.state = to;
    }

    /// Run until the budget is spent and every session has been stored.
    pub async fn run(mut self) -> BandReport {
        let mut report = BandReport::new(self.index, &self.plan.band.label);
        let mut sessions = JoinSet::new();
        let mut recording: Option<oneshot::Receiver<()>> = None;
        let mut last_boundary: Option<Duration> = None;
        let stagger = self.schedule.stagger_for(self.index);

        while self.budget.take() {
            self.transition(SchedulerState::WaitingForBoundary);

            // Never reuse a boundary, even if the clock reads slightly early.
            let now = self.clock.now();
            let from = last_boundary.map_or(now, |b| now.max(b));
            let boundary = next_boundary(from, self.schedule.period);
            tracing::debug!(
                band = %self.plan.band.label,
                now = now.as_secs(),
                boundary = boundary.as_secs(),
                wait = boundary.saturating_add(stagger).saturating_sub(now).as_secs(),
                "waiting for boundary"
            );

            let wake = tokio::time::sleep_until(self.clock.instant_at(boundary.saturating_add(stagger)));
            tokio::pin!(wake);
            loop {
                tokio::select! {
                    _ = &mut wake => break,
                    Some(joined) = sessions.join_next(), if !sessions.is_empty() => {
                        report.record(joined);
                    }
                }
            }

            if let Some(previous) = recording.take() {
                // Sender dropped also counts as done.
                let _ = previous.await;
            }

            self.transition(SchedulerState::Recording);
            let timestamp = format_timestamp(boundary);
            let (done_tx, done_rx) = oneshot::channel();
            let session = RecordingSession::new(
                Arc::clone(&self.plan),
                timestamp,
                self.schedule.recording(),
                Arc::clone(&self.intake),
            );
            sessions.spawn(session.run(done_tx));
            recording = Some(done_rx);
            last_boundary = Some(boundary);

            self.transition(SchedulerState::HandoffGap);
        }

        while let Some(joined) = sessions.join_next().await {
            report.record(joined);
        }
        self.transition(SchedulerState::Done);
        tracing::info!(
            band = %report.label,
            written = report.written(),
            empty = report.empty(),
            failed = report.failed(),
            "band finished"
        );
        report
    }
}

/// Run one scheduler per configured band and wait for all of them.
///
/// Reports come back in band order.
pub async fn run_bands(
    config: &GrabConfig,
    intake: Arc<dyn Intake>,
    clock: Arc<dyn Clock>,
) -> Vec<BandReport> {
    let schedule = Schedule::from_config(config);
    let mut bands = JoinSet::new();
    for (index, band) in config.bands.iter().enumerate() {
        let scheduler = BandScheduler::new(
            index,
            SessionPlan::new(config, band),
            schedule,
            Arc::clone(&intake),
            Arc::clone(&clock),
        );
        bands.spawn(scheduler.run());
    }

    let mut reports = Vec::with_capacity(config.bands.len());
    while let Some(joined) = bands.join_next().await {
        match joined {
            Ok(report) => reports.push(report),
            Err(e) => tracing::error!(error = %e, "band task panicked"),
        }
    }
    reports.sort_by_key(|r| r.index);
    reports
}
