use url::Url;

use crate::JobSource;

/// Title words that mark a search hit as content about jobs rather than a job.
pub const IRRELEVANT_KEYWORDS: &[&str] = &[
    "courses",
    "training",
    "salary",
    "interview questions",
    "resume",
    "tips",
    "news",
    "blog",
    "article",
];

const JOB_PATH_PATTERNS: &[&str] = &[
    "/jobs/",
    "/job/",
    "/career/",
    "/vacancy/",
    "/opening/",
    "jobs.html",
    "job-",
    "career-",
];

/// Known job boards, in attribution order.
pub const KNOWN_JOB_SITES: &[(&str, JobSource)] = &[
    ("linkedin.com", JobSource::LinkedIn),
    ("indeed.com", JobSource::Indeed),
    ("glassdoor.com", JobSource::Glassdoor),
    ("naukri.com", JobSource::Naukri),
    ("monster.com", JobSource::Monster),
];

/// Attribute a link to a job board by its host.
///
/// Links that do not parse as absolute URLs are matched as raw text.
pub fn source_from_link(link: &str) -> JobSource {
    if link.is_empty() {
        return JobSource::Unknown;
    }
    let host = link_host(link);
    KNOWN_JOB_SITES
        .iter()
        .find(|(site, _)| host.contains(site))
        .map(|(_, source)| *source)
        .unwrap_or(JobSource::Other)
}

/// Decide whether a raw search hit looks like an actual job posting.
pub fn is_job_relevant(title: &str, link: &str) -> bool {
    if title.is_empty() || link.is_empty() {
        return false;
    }

    let title_lower = title.to_lowercase();
    if IRRELEVANT_KEYWORDS
        .iter()
        .any(|keyword| title_lower.contains(keyword))
    {
        return false;
    }

    let link_lower = link.to_lowercase();
    if JOB_PATH_PATTERNS
        .iter()
        .any(|pattern| link_lower.contains(pattern))
    {
        return true;
    }

    let host = link_host(&link_lower);
    KNOWN_JOB_SITES.iter().any(|(site, _)| host.contains(site))
}

fn link_host(link: &str) -> String {
    Url::parse(link)
        .ok()
        .and_then(|url| url.host_str().map(str::to_ascii_lowercase))
        .unwrap_or_else(|| link.to_ascii_lowercase())
}
