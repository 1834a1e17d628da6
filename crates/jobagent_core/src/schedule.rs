use chrono::{Duration, NaiveDateTime, NaiveTime, Timelike};

use crate::JobType;

/// Lifecycle of one recurring schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScheduleState {
    #[default]
    Idle,
    Running,
    Stopping,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleEvent {
    /// The background loop armed its first trigger.
    Started,
    /// The owner asked the schedule to stop.
    StopRequested,
    /// The background loop returned.
    LoopExited,
}

impl ScheduleState {
    /// Pure transition function. Events that make no sense in the current
    /// state leave it unchanged; `Stopped` is terminal.
    pub fn apply(self, event: ScheduleEvent) -> ScheduleState {
        use ScheduleEvent::*;
        use ScheduleState::*;

        match (self, event) {
            (Stopped, _) => Stopped,
            (Idle, Started) => Running,
            (Idle, StopRequested) => Stopping,
            (Running, StopRequested) => Stopping,
            (_, LoopExited) => Stopped,
            (state, _) => state,
        }
    }

    pub fn is_running(self) -> bool {
        self == ScheduleState::Running
    }
}

/// Next daily firing at `at` strictly after `now`, at minute resolution.
pub fn next_daily_run(now: NaiveDateTime, at: NaiveTime) -> NaiveDateTime {
    let at = at
        .with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(at);
    let today = now.date().and_time(at);
    if today > now {
        today
    } else {
        today + Duration::days(1)
    }
}

/// What the presentation layer shows about an active schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub role: String,
    pub location: String,
    pub job_type: JobType,
    pub email: String,
    /// `HH:MM`, empty when the profile carries no time.
    pub preferred_time: String,
    pub running: bool,
    pub scheduled: bool,
    pub state: ScheduleState,
    pub next_run_at: Option<NaiveDateTime>,
}
