use std::collections::HashSet;

use crate::JobPosting;

/// Keep the first posting for each link, stopping once `max_results`
/// distinct links are collected.
pub fn dedupe_postings<I>(postings: I, max_results: usize) -> Vec<JobPosting>
where
    I: IntoIterator<Item = JobPosting>,
{
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for posting in postings {
        if unique.len() >= max_results {
            break;
        }
        if seen.insert(posting.link.clone()) {
            unique.push(posting);
        }
    }
    unique
}
