use crate::JobType;

/// Build the enriched search string for a profile: `"{role} {location}"`
/// followed by terms for the job type and, for experienced roles, the
/// seniority implied by the years text.
pub fn build_search_query(
    role: &str,
    location: &str,
    job_type: JobType,
    experience_years: Option<&str>,
) -> String {
    let mut query = format!("{role} {location}");

    match job_type {
        JobType::Internship => query.push_str(" internship intern student"),
        JobType::FresherJob => query.push_str(" fresher jobs graduate entry level"),
        JobType::Experience => {
            if let Some(years) = experience_years.filter(|y| !y.is_empty()) {
                query.push(' ');
                query.push_str(&experience_terms(years));
            }
        }
    }

    query
}

// First match wins, so "10" lands in the junior bucket like "1-3" does.
fn experience_terms(years: &str) -> String {
    if years.contains("1-3") || years.contains('1') {
        "1+ years 2+ years junior".to_string()
    } else if years.contains("3-5") || years.contains('3') {
        "3+ years mid-level".to_string()
    } else if years.contains('5') || years.to_lowercase().contains("senior") {
        "5+ years senior".to_string()
    } else {
        format!("{years} years")
    }
}
