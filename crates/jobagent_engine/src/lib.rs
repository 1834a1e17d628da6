//! Job agent engine: search tiers, persistence, delivery and the schedule runner.
mod decode;
mod extract;
mod fetch;
mod mail;
mod pipeline;
mod runner;
mod search;
mod store;
mod types;

pub use decode::{decode_page, DecodeError, DecodedPage};
pub use extract::{unwrap_redirect, ExtractionStrategy, RankedExtractor, RawHit, SelectorStrategy};
pub use fetch::{FetchSettings, FetchedPage, Fetcher, ReqwestFetcher};
pub use mail::{DeliveryError, MailSettings, Mailer, SmtpCredentials, SmtpMailer};
pub use pipeline::{DeliveryStatus, Pipeline, RunReport};
pub use runner::{
    system_clock, Clock, ScheduleError, ScheduleHandle, ScheduleOwner, ScheduleProbe,
    ScheduleSettings,
};
pub use search::{
    Backoff, DirectSourceTier, SearchEngine, SearchSettings, SearchTier, SyntheticFallbackTier,
    WebSearchSettings, WebSearchTier, DEFAULT_MAX_RESULTS,
};
pub use store::{JobStore, SqliteJobStore, StoreError, DEFAULT_LOG_LIMIT};
pub use types::{FailureKind, FetchError};
