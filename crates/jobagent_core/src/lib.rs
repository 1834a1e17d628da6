//! Job agent core: pure domain model, query and result shaping, digests and
//! the schedule state machine. No IO happens in this crate.
mod dedupe;
mod digest;
mod model;
mod query;
mod relevance;
mod schedule;
mod synthetic;

pub use dedupe::dedupe_postings;
pub use digest::{assemble_digest, Digest, DigestBody, DigestEntry, NO_RESULTS_MESSAGE};
pub use model::{
    JobPosting, JobProfile, JobRecord, JobSource, JobType, ParseJobTypeError, ResultTier,
    SearchResults,
};
pub use query::build_search_query;
pub use relevance::{is_job_relevant, source_from_link, IRRELEVANT_KEYWORDS, KNOWN_JOB_SITES};
pub use schedule::{next_daily_run, ScheduleEvent, ScheduleState, StatusSnapshot};
pub use synthetic::{synthesize_postings, SyntheticProfile};
