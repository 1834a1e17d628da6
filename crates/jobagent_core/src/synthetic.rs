use url::form_urlencoded;

use crate::{JobPosting, JobSource};

const CITIES: &[&str] = &[
    "india",
    "bangalore",
    "mumbai",
    "delhi",
    "hyderabad",
    "pune",
    "chennai",
];

/// Category, level and location inferred from a query, the inputs that
/// shape every synthetic posting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticProfile {
    pub category: &'static str,
    pub level: &'static str,
    pub location: String,
}

impl SyntheticProfile {
    pub fn infer(query: &str) -> Self {
        let lower = query.to_lowercase();
        let terms: Vec<&str> = lower.split_whitespace().collect();
        let has_term = |word: &str| terms.iter().any(|t| *t == word);

        let category = if has_term("ai") || lower.contains("machine learning") {
            "AI/ML"
        } else if lower.contains("full stack") {
            "Full Stack"
        } else if lower.contains("frontend") || lower.contains("react") {
            "Frontend"
        } else if lower.contains("backend") {
            "Backend"
        } else if has_term("data") {
            "Data"
        } else {
            "developer"
        };

        let level = if has_term("intern") || has_term("internship") {
            "intern"
        } else if has_term("senior") || query.contains("5+") {
            "senior"
        } else if has_term("junior") || has_term("fresher") {
            "junior"
        } else {
            "mid"
        };

        let location = terms
            .iter()
            .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()))
            .find(|t| CITIES.contains(t))
            .unwrap_or("remote")
            .to_string();

        Self {
            category,
            level,
            location,
        }
    }
}

/// Deterministic placeholder postings derived from the query text.
///
/// Always produces the same eight postings, spread across the five known
/// boards, with links pointing at each board's search page.
pub fn synthesize_postings(query: &str) -> Vec<JobPosting> {
    let profile = SyntheticProfile::infer(query);
    let category = profile.category;
    let level = capitalize(profile.level);
    let keywords = quote_plus(&format!("{} {}", category, profile.level));
    let location = quote_plus(&profile.location);
    let slug = category.to_lowercase().replace(['/', ' '], "-");

    vec![
        JobPosting::new(
            format!("{level} {category} Developer at TechCorp"),
            format!("https://linkedin.com/jobs/search/?keywords={keywords}&location={location}"),
            JobSource::LinkedIn,
        ),
        JobPosting::new(
            format!("{category} Engineer - Remote Opportunity"),
            format!("https://indeed.com/jobs?q={keywords}&l={location}"),
            JobSource::Indeed,
        ),
        JobPosting::new(
            format!("{category} Developer Position at StartupXYZ"),
            format!("https://glassdoor.com/Job/{slug}-jobs-SRCH_KO0,9.htm"),
            JobSource::Glassdoor,
        ),
        JobPosting::new(
            format!("{level} {category} Role at Innovation Labs"),
            format!("https://naukri.com/{slug}-jobs"),
            JobSource::Naukri,
        ),
        JobPosting::new(
            format!("{category} Software Engineer at Global Tech"),
            format!("https://monster.com/jobs/search/?q={keywords}"),
            JobSource::Monster,
        ),
        JobPosting::new(
            format!("Remote {category} Developer - Flexible Hours"),
            format!("https://linkedin.com/jobs/search/?keywords={keywords}%20remote"),
            JobSource::LinkedIn,
        ),
        JobPosting::new(
            format!("{category} Engineer at Fortune 500 Company"),
            format!("https://indeed.com/jobs?q={keywords}%20engineer"),
            JobSource::Indeed,
        ),
        JobPosting::new(
            format!("{level} {category} Position - Great Benefits"),
            format!("https://glassdoor.com/Job/{slug}-engineer-jobs-SRCH_KO0,17.htm"),
            JobSource::Glassdoor,
        ),
    ]
}

fn quote_plus(input: &str) -> String {
    form_urlencoded::byte_serialize(input.as_bytes()).collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
