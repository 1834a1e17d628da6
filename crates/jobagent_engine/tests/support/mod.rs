#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Mutex, Once};
use std::time::{Duration, Instant};

use chrono::{NaiveDate, NaiveDateTime};
use jobagent_core::{Digest, JobPosting, JobRecord, JobSource, ResultTier};
use jobagent_engine::{
    Clock, DeliveryError, FailureKind, FetchError, JobStore, Mailer, SearchTier, StoreError,
};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(agent_logging::initialize_for_tests);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedJob {
    pub title: String,
    pub link: String,
    pub email: String,
    pub source: JobSource,
    pub search_query: String,
}

/// Records every save; optionally fails the n-th call (1-based).
#[derive(Default)]
pub struct RecordingStore {
    pub saved: Mutex<Vec<SavedJob>>,
    pub fail_on_call: Option<usize>,
    pub calls: AtomicUsize,
}

impl RecordingStore {
    pub fn failing_on(call: usize) -> Self {
        Self {
            fail_on_call: Some(call),
            ..Self::default()
        }
    }

    pub fn saved(&self) -> Vec<SavedJob> {
        self.saved.lock().unwrap().clone()
    }
}

impl JobStore for RecordingStore {
    fn save_job(
        &self,
        title: &str,
        link: &str,
        email: &str,
        source: JobSource,
        search_query: &str,
    ) -> Result<i64, StoreError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on_call == Some(call) {
            return Err(StoreError::Poisoned);
        }
        let mut saved = self.saved.lock().unwrap();
        saved.push(SavedJob {
            title: title.to_string(),
            link: link.to_string(),
            email: email.to_string(),
            source,
            search_query: search_query.to_string(),
        });
        Ok(saved.len() as i64)
    }

    fn get_logs(&self, _email: Option<&str>, _limit: usize) -> Result<Vec<JobRecord>, StoreError> {
        Ok(Vec::new())
    }

    fn get_recent_jobs(&self, _email: &str, _hours: u32) -> Result<Vec<JobRecord>, StoreError> {
        Ok(Vec::new())
    }

    fn total_count(&self) -> Result<u64, StoreError> {
        Ok(self.saved.lock().unwrap().len() as u64)
    }

    fn clear_all(&self) -> Result<usize, StoreError> {
        let mut saved = self.saved.lock().unwrap();
        let removed = saved.len();
        saved.clear();
        Ok(removed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MailerMode {
    #[default]
    Deliver,
    NotConfigured,
    PanicOnFirst,
}

/// Records delivered digests. Signals `started` when a send begins and can
/// hold each send for `delay`.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<(String, Digest)>>,
    pub mode: MailerMode,
    pub delay: Duration,
    pub started: Mutex<Option<mpsc::Sender<()>>>,
    pub panicked: AtomicBool,
}

impl RecordingMailer {
    pub fn with_mode(mode: MailerMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<(String, Digest)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl Mailer for RecordingMailer {
    async fn send_digest(&self, recipient: &str, digest: &Digest) -> Result<(), DeliveryError> {
        if let Some(tx) = self.started.lock().unwrap().as_ref() {
            let _ = tx.send(());
        }
        if self.mode == MailerMode::PanicOnFirst && !self.panicked.swap(true, Ordering::SeqCst) {
            panic!("mailer exploded");
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.mode == MailerMode::NotConfigured {
            return Err(DeliveryError::NotConfigured);
        }
        self.sent
            .lock()
            .unwrap()
            .push((recipient.to_string(), digest.clone()));
        Ok(())
    }

    async fn send_test(&self, _recipient: &str) -> Result<(), DeliveryError> {
        Ok(())
    }
}

/// A tier whose lookups always fail.
pub struct FailingTier(pub ResultTier);

#[async_trait::async_trait]
impl SearchTier for FailingTier {
    fn tier(&self) -> ResultTier {
        self.0
    }

    async fn search(&self, _query: &str, _max: usize) -> Result<Vec<JobPosting>, FetchError> {
        Err(FetchError::new(FailureKind::Timeout, "mocked failure"))
    }
}

/// A tier that answers with a fixed list.
pub struct FixedTier(pub ResultTier, pub Vec<JobPosting>);

#[async_trait::async_trait]
impl SearchTier for FixedTier {
    fn tier(&self) -> ResultTier {
        self.0
    }

    async fn search(&self, _query: &str, _max: usize) -> Result<Vec<JobPosting>, FetchError> {
        Ok(self.1.clone())
    }
}

/// Test clock that only moves when told to.
#[derive(Clone)]
pub struct ManualClock {
    now: Arc<Mutex<NaiveDateTime>>,
}

impl ManualClock {
    pub fn at(now: NaiveDateTime) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub fn set(&self, now: NaiveDateTime) {
        *self.now.lock().unwrap() = now;
    }

    pub fn clock(&self) -> Clock {
        let now = self.now.clone();
        Arc::new(move || *now.lock().unwrap())
    }
}

pub fn datetime(day: u32, h: u32, m: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 4, day)
        .unwrap()
        .and_hms_opt(h, m, s)
        .unwrap()
}

/// Poll `condition` until it holds or `timeout` elapses.
pub fn wait_for(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    condition()
}
