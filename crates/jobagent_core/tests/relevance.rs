use jobagent_core::{is_job_relevant, source_from_link, JobSource};

#[test]
fn listicle_titles_are_rejected_regardless_of_link() {
    assert!(!is_job_relevant(
        "Top 10 Interview Tips",
        "https://www.linkedin.com/jobs/view/123"
    ));
    assert!(!is_job_relevant(
        "Rust Developer Salary Guide",
        "https://example.org/jobs/1"
    ));
    assert!(!is_job_relevant("Company BLOG: we are hiring", "https://indeed.com/x"));
}

#[test]
fn job_path_on_unlisted_host_is_accepted() {
    assert!(is_job_relevant("Rust Developer", "https://example.org/jobs/1"));
    assert!(is_job_relevant("Rust Developer", "https://acme.io/CAREER/backend"));
    assert!(is_job_relevant("Rust Developer", "https://acme.io/openings/job-42"));
}

#[test]
fn known_host_without_job_path_is_accepted() {
    assert!(is_job_relevant("Rust Developer", "https://www.naukri.com/rust-dev"));
}

#[test]
fn unrelated_links_and_empty_fields_are_rejected() {
    assert!(!is_job_relevant("Rust Developer", "https://example.org/about"));
    assert!(!is_job_relevant("", "https://example.org/jobs/1"));
    assert!(!is_job_relevant("Rust Developer", ""));
}

#[test]
fn source_is_attributed_by_host() {
    assert_eq!(
        source_from_link("https://www.linkedin.com/jobs/view/123"),
        JobSource::LinkedIn
    );
    assert_eq!(source_from_link("https://in.indeed.com/viewjob"), JobSource::Indeed);
    assert_eq!(source_from_link("https://glassdoor.com/Job/x"), JobSource::Glassdoor);
    assert_eq!(source_from_link("https://www.naukri.com/x"), JobSource::Naukri);
    assert_eq!(source_from_link("https://monster.com/jobs"), JobSource::Monster);
    assert_eq!(source_from_link("https://example.org/jobs/1"), JobSource::Other);
    assert_eq!(source_from_link(""), JobSource::Unknown);
}

#[test]
fn source_ignores_job_board_names_outside_the_host() {
    assert_eq!(
        source_from_link("https://example.org/jobs?ref=linkedin.com"),
        JobSource::Other
    );
}

#[test]
fn source_labels_round_trip() {
    for source in [
        JobSource::LinkedIn,
        JobSource::Indeed,
        JobSource::Glassdoor,
        JobSource::Naukri,
        JobSource::Monster,
        JobSource::Other,
        JobSource::Unknown,
    ] {
        assert_eq!(JobSource::from_label(source.label()), source);
    }
}
