use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveTime, Utc};

use crate::query::build_search_query;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobType {
    Internship,
    FresherJob,
    Experience,
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobType::Internship => write!(f, "Internship"),
            JobType::FresherJob => write!(f, "Fresher Job"),
            JobType::Experience => write!(f, "Experience"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseJobTypeError(pub String);

impl fmt::Display for ParseJobTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown job type {:?} (expected Internship, Fresher Job or Experience)",
            self.0
        )
    }
}

impl std::error::Error for ParseJobTypeError {}

impl FromStr for JobType {
    type Err = ParseJobTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "internship" | "intern" => Ok(JobType::Internship),
            "fresherjob" | "fresher" => Ok(JobType::FresherJob),
            "experience" | "experienced" => Ok(JobType::Experience),
            _ => Err(ParseJobTypeError(s.to_string())),
        }
    }
}

/// Job board a posting was attributed to, derived from its link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobSource {
    LinkedIn,
    Indeed,
    Glassdoor,
    Naukri,
    Monster,
    Other,
    Unknown,
}

impl JobSource {
    pub fn label(self) -> &'static str {
        match self {
            JobSource::LinkedIn => "LinkedIn",
            JobSource::Indeed => "Indeed",
            JobSource::Glassdoor => "Glassdoor",
            JobSource::Naukri => "Naukri",
            JobSource::Monster => "Monster",
            JobSource::Other => "Other",
            JobSource::Unknown => "Unknown",
        }
    }

    /// Inverse of [`JobSource::label`]; unrecognised labels map to `Unknown`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "LinkedIn" => JobSource::LinkedIn,
            "Indeed" => JobSource::Indeed,
            "Glassdoor" => JobSource::Glassdoor,
            "Naukri" => JobSource::Naukri,
            "Monster" => JobSource::Monster,
            "Other" => JobSource::Other,
            _ => JobSource::Unknown,
        }
    }
}

impl fmt::Display for JobSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobPosting {
    pub title: String,
    pub link: String,
    pub source: JobSource,
}

impl JobPosting {
    pub fn new(title: impl Into<String>, link: impl Into<String>, source: JobSource) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            source,
        }
    }
}

/// What the user is looking for and where the digest goes.
///
/// A profile is never edited once a search or schedule has started from it;
/// a changed search means a new profile value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobProfile {
    pub role: String,
    pub location: String,
    pub job_type: JobType,
    pub experience_years: Option<String>,
    pub recipient_email: String,
    pub preferred_time: Option<NaiveTime>,
}

impl JobProfile {
    pub fn new(
        role: impl Into<String>,
        location: impl Into<String>,
        job_type: JobType,
        recipient_email: impl Into<String>,
    ) -> Self {
        Self {
            role: role.into(),
            location: location.into(),
            job_type,
            experience_years: None,
            recipient_email: recipient_email.into(),
            preferred_time: None,
        }
    }

    pub fn with_experience(mut self, years: impl Into<String>) -> Self {
        self.experience_years = Some(years.into());
        self
    }

    pub fn with_preferred_time(mut self, time: NaiveTime) -> Self {
        self.preferred_time = Some(time);
        self
    }

    pub fn search_query(&self) -> String {
        build_search_query(
            &self.role,
            &self.location,
            self.job_type,
            self.experience_years.as_deref(),
        )
    }
}

/// A posting as persisted for one recipient and query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRecord {
    pub id: i64,
    pub title: String,
    pub link: String,
    pub email: String,
    pub source: JobSource,
    pub search_query: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultTier {
    DirectSource,
    WebSearch,
    SyntheticFallback,
    /// Every tier came back empty.
    Empty,
}

impl fmt::Display for ResultTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultTier::DirectSource => write!(f, "direct-source"),
            ResultTier::WebSearch => write!(f, "web-search"),
            ResultTier::SyntheticFallback => write!(f, "synthetic-fallback"),
            ResultTier::Empty => write!(f, "empty"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResults {
    pub postings: Vec<JobPosting>,
    pub tier: ResultTier,
    /// True when the postings are generated placeholders rather than real listings.
    pub degraded: bool,
}

impl SearchResults {
    pub fn empty() -> Self {
        Self {
            postings: Vec::new(),
            tier: ResultTier::Empty,
            degraded: false,
        }
    }

    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }
}
