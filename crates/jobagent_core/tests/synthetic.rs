use std::collections::HashSet;

use jobagent_core::{
    dedupe_postings, synthesize_postings, JobPosting, JobSource, SyntheticProfile,
};
use pretty_assertions::assert_eq;

const FRESHER_QUERY: &str =
    "AI Full Stack Developer Remote, India fresher jobs graduate entry level";

#[test]
fn infers_category_level_and_location() {
    let profile = SyntheticProfile::infer(FRESHER_QUERY);
    assert_eq!(profile.category, "AI/ML");
    assert_eq!(profile.level, "junior");
    assert_eq!(profile.location, "india");

    let profile = SyntheticProfile::infer("Senior Backend Engineer Bangalore, Karnataka");
    assert_eq!(profile.category, "Backend");
    assert_eq!(profile.level, "senior");
    assert_eq!(profile.location, "bangalore");

    let profile = SyntheticProfile::infer("Gardener Oslo");
    assert_eq!(profile.category, "developer");
    assert_eq!(profile.level, "mid");
    assert_eq!(profile.location, "remote");
}

#[test]
fn react_maps_to_frontend_and_internship_to_intern() {
    let profile = SyntheticProfile::infer("React Developer Chennai internship intern student");
    assert_eq!(profile.category, "Frontend");
    assert_eq!(profile.level, "intern");
    assert_eq!(profile.location, "chennai");
}

#[test]
fn generates_eight_distinct_postings_over_all_boards() {
    let postings = synthesize_postings(FRESHER_QUERY);
    assert_eq!(postings.len(), 8);

    let links: HashSet<_> = postings.iter().map(|p| p.link.as_str()).collect();
    assert_eq!(links.len(), 8);

    let sources: HashSet<_> = postings.iter().map(|p| p.source).collect();
    for board in [
        JobSource::LinkedIn,
        JobSource::Indeed,
        JobSource::Glassdoor,
        JobSource::Naukri,
        JobSource::Monster,
    ] {
        assert!(sources.contains(&board), "missing {board}");
    }
}

#[test]
fn templates_titles_and_links_from_the_profile() {
    let postings = synthesize_postings(FRESHER_QUERY);
    assert_eq!(postings[0].title, "Junior AI/ML Developer at TechCorp");
    assert_eq!(
        postings[0].link,
        "https://linkedin.com/jobs/search/?keywords=AI%2FML+junior&location=india"
    );
    assert_eq!(postings[3].link, "https://naukri.com/ai-ml-jobs");
}

#[test]
fn generation_is_deterministic() {
    assert_eq!(
        synthesize_postings("Data Engineer Mumbai"),
        synthesize_postings("Data Engineer Mumbai")
    );
}

#[test]
fn dedupe_keeps_first_occurrence_and_caps_length() {
    let postings = vec![
        JobPosting::new("A", "https://x/jobs/1", JobSource::Other),
        JobPosting::new("B", "https://x/jobs/1", JobSource::Other),
        JobPosting::new("C", "https://x/jobs/2", JobSource::Other),
        JobPosting::new("D", "https://x/jobs/3", JobSource::Other),
    ];

    let unique = dedupe_postings(postings.clone(), 10);
    let titles: Vec<_> = unique.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["A", "C", "D"]);

    let capped = dedupe_postings(postings, 2);
    let titles: Vec<_> = capped.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["A", "C"]);
}

#[test]
fn dedupe_with_zero_limit_is_empty() {
    assert!(dedupe_postings(synthesize_postings(FRESHER_QUERY), 0).is_empty());
}
