//! Daily schedules: one background thread per schedule, owned by whoever
//! started it.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use agent_logging::{agent_error, agent_info, agent_warn};
use chrono::{Local, NaiveDateTime, NaiveTime};
use jobagent_core::{next_daily_run, JobProfile, ScheduleEvent, ScheduleState, StatusSnapshot};

use crate::pipeline::Pipeline;

/// Local wall-clock source.
pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

pub fn system_clock() -> Clock {
    Arc::new(|| Local::now().naive_local())
}

const MAX_POLL_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct ScheduleSettings {
    /// Upper bound on how long the loop sleeps between checks; capped at 60s.
    pub poll_interval: Duration,
    pub clock: Clock,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            poll_interval: MAX_POLL_INTERVAL,
            clock: system_clock(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("profile has no preferred time for the daily run")]
    MissingTime,
    #[error("failed to spawn schedule thread: {0}")]
    Spawn(#[from] std::io::Error),
}

#[derive(Debug, Default)]
struct Shared {
    state: ScheduleState,
    next_run_at: Option<NaiveDateTime>,
    runs: u64,
}

/// Read-only view of a schedule's state that outlives the handle.
#[derive(Clone)]
pub struct ScheduleProbe {
    shared: Arc<Mutex<Shared>>,
}

impl ScheduleProbe {
    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn state(&self) -> ScheduleState {
        self.lock().state
    }

    pub fn next_run_at(&self) -> Option<NaiveDateTime> {
        self.lock().next_run_at
    }

    /// Number of pipeline runs attempted so far, failed ones included.
    pub fn runs(&self) -> u64 {
        self.lock().runs
    }
}

/// One recurring daily search-and-deliver schedule.
pub struct ScheduleHandle {
    profile: JobProfile,
    at: NaiveTime,
    probe: ScheduleProbe,
    stop_flag: Arc<AtomicBool>,
    stop_tx: mpsc::Sender<()>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl ScheduleHandle {
    /// Spawn the background loop for `profile` at its preferred time.
    pub fn spawn(
        profile: JobProfile,
        pipeline: Arc<Pipeline>,
        settings: ScheduleSettings,
    ) -> Result<Self, ScheduleError> {
        let at = profile.preferred_time.ok_or(ScheduleError::MissingTime)?;
        let first_run = next_daily_run((settings.clock)(), at);
        let shared = Arc::new(Mutex::new(Shared {
            state: ScheduleState::default().apply(ScheduleEvent::Started),
            next_run_at: Some(first_run),
            runs: 0,
        }));
        let stop_flag = Arc::new(AtomicBool::new(false));
        let (stop_tx, stop_rx) = mpsc::channel();

        let worker = Worker {
            profile: profile.clone(),
            at,
            first_run,
            pipeline,
            poll_interval: settings.poll_interval.min(MAX_POLL_INTERVAL),
            clock: settings.clock,
            shared: shared.clone(),
            stop_flag: stop_flag.clone(),
            stop_rx,
        };
        let thread = thread::Builder::new()
            .name(format!("schedule-{}", profile.recipient_email))
            .spawn(move || worker.run())?;

        agent_info!(
            "Job search scheduled for {} daily ({}), next run at {}",
            at.format("%H:%M"),
            profile.recipient_email,
            first_run
        );

        Ok(Self {
            profile,
            at,
            probe: ScheduleProbe { shared },
            stop_flag,
            stop_tx,
            thread: Mutex::new(Some(thread)),
        })
    }

    /// Signal the loop to stop and clear the pending trigger. A run already
    /// in flight finishes first. Safe to call more than once.
    pub fn stop(&self) {
        {
            let mut shared = self.probe.lock();
            if self.stop_flag.swap(true, Ordering::SeqCst) {
                return;
            }
            shared.state = shared.state.apply(ScheduleEvent::StopRequested);
            shared.next_run_at = None;
        }
        let _ = self.stop_tx.send(());
        agent_info!("Scheduler stop signal sent ({})", self.profile.recipient_email);
    }

    /// Block until the background loop has exited.
    pub fn wait_stopped(&self) {
        let thread = match self.thread.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(thread) = thread {
            if thread.join().is_err() {
                agent_error!("Schedule thread for {} panicked", self.profile.recipient_email);
                let mut shared = self.probe.lock();
                shared.state = shared.state.apply(ScheduleEvent::LoopExited);
                shared.next_run_at = None;
            }
        }
    }

    pub fn profile(&self) -> &JobProfile {
        &self.profile
    }

    pub fn probe(&self) -> ScheduleProbe {
        self.probe.clone()
    }

    pub fn state(&self) -> ScheduleState {
        self.probe.state()
    }

    pub fn is_scheduled(&self) -> bool {
        let shared = self.probe.lock();
        shared.state.is_running() && shared.next_run_at.is_some()
    }

    pub fn next_run_at(&self) -> Option<NaiveDateTime> {
        self.probe.next_run_at()
    }

    pub fn status_snapshot(&self) -> StatusSnapshot {
        let shared = self.probe.lock();
        StatusSnapshot {
            role: self.profile.role.clone(),
            location: self.profile.location.clone(),
            job_type: self.profile.job_type,
            email: self.profile.recipient_email.clone(),
            preferred_time: self.at.format("%H:%M").to_string(),
            running: shared.state.is_running(),
            scheduled: shared.state.is_running() && shared.next_run_at.is_some(),
            state: shared.state,
            next_run_at: shared.next_run_at,
        }
    }
}

impl Drop for ScheduleHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

struct Worker {
    profile: JobProfile,
    at: NaiveTime,
    first_run: NaiveDateTime,
    pipeline: Arc<Pipeline>,
    poll_interval: Duration,
    clock: Clock,
    shared: Arc<Mutex<Shared>>,
    stop_flag: Arc<AtomicBool>,
    stop_rx: mpsc::Receiver<()>,
}

impl Worker {
    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn stopped(&self) -> bool {
        self.stop_flag.load(Ordering::SeqCst)
    }

    /// Re-arm the trigger unless a stop already cleared it.
    fn rearm(&self, next: NaiveDateTime) {
        let mut shared = self.lock();
        if self.stopped() {
            return;
        }
        shared.next_run_at = Some(next);
    }

    fn run(self) {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                agent_error!("Failed to build runtime for schedule: {}", err);
                self.finish();
                return;
            }
        };

        let mut next = self.first_run;
        loop {
            if self.stopped() {
                break;
            }

            let now = (self.clock)();
            if now >= next {
                self.run_once(&runtime);
                if self.stopped() {
                    break;
                }
                next = next_daily_run((self.clock)(), self.at);
                self.rearm(next);
                agent_info!("Next run for {} at {}", self.profile.recipient_email, next);
                continue;
            }

            let until_due = (next - now).to_std().unwrap_or(Duration::ZERO);
            match self.stop_rx.recv_timeout(until_due.min(self.poll_interval)) {
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {}
            }
        }

        self.finish();
    }

    fn run_once(&self, runtime: &tokio::runtime::Runtime) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            runtime.block_on(self.pipeline.run(&self.profile))
        }));
        self.lock().runs += 1;

        match outcome {
            Ok(report) => agent_info!(
                "Scheduled run for {} found {} jobs (saved {}, delivery {:?})",
                self.profile.recipient_email,
                report.found(),
                report.saved,
                report.delivery
            ),
            Err(payload) => agent_error!(
                "Scheduled run for {} aborted: {}",
                self.profile.recipient_email,
                panic_message(payload.as_ref())
            ),
        }
    }

    fn finish(&self) {
        let mut shared = self.lock();
        shared.state = shared.state.apply(ScheduleEvent::LoopExited);
        shared.next_run_at = None;
        agent_info!("Scheduler stopped ({})", self.profile.recipient_email);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Holds at most one schedule. Starting a new one stops the previous one and
/// waits for its loop to exit before the new trigger is armed.
pub struct ScheduleOwner {
    pipeline: Arc<Pipeline>,
    settings: ScheduleSettings,
    current: Option<ScheduleHandle>,
}

impl ScheduleOwner {
    pub fn new(pipeline: Arc<Pipeline>, settings: ScheduleSettings) -> Self {
        Self {
            pipeline,
            settings,
            current: None,
        }
    }

    pub fn start(&mut self, profile: JobProfile) -> Result<&ScheduleHandle, ScheduleError> {
        if profile.preferred_time.is_none() {
            return Err(ScheduleError::MissingTime);
        }
        if let Some(previous) = self.current.take() {
            agent_warn!(
                "Superseding schedule for {}",
                previous.profile().recipient_email
            );
            previous.stop();
            previous.wait_stopped();
        }
        let handle = ScheduleHandle::spawn(profile, self.pipeline.clone(), self.settings.clone())?;
        Ok(self.current.insert(handle))
    }

    /// Stop and join the current schedule, if any.
    pub fn stop(&mut self) {
        if let Some(handle) = self.current.take() {
            handle.stop();
            handle.wait_stopped();
        }
    }

    pub fn current(&self) -> Option<&ScheduleHandle> {
        self.current.as_ref()
    }

    pub fn status_snapshot(&self) -> Option<StatusSnapshot> {
        self.current.as_ref().map(ScheduleHandle::status_snapshot)
    }
}

impl Drop for ScheduleOwner {
    fn drop(&mut self) {
        self.stop();
    }
}
