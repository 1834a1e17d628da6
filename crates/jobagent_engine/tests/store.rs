use jobagent_core::JobSource;
use jobagent_engine::{JobStore, SqliteJobStore, DEFAULT_LOG_LIMIT};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

#[test]
fn saves_and_filters_logs_by_recipient() {
    let dir = tempdir().unwrap();
    let store = SqliteJobStore::open(dir.path().join("jobs.db")).unwrap();

    let first = store
        .save_job(
            "Rust Developer",
            "https://www.linkedin.com/jobs/view/1",
            "a@b.com",
            JobSource::LinkedIn,
            "rust developer",
        )
        .unwrap();
    let second = store
        .save_job(
            "Data Engineer",
            "https://www.indeed.com/viewjob?jk=2",
            "c@d.com",
            JobSource::Indeed,
            "data engineer",
        )
        .unwrap();
    assert!(second > first);

    let mine = store.get_logs(Some("a@b.com"), DEFAULT_LOG_LIMIT).unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].id, first);
    assert_eq!(mine[0].title, "Rust Developer");
    assert_eq!(mine[0].source, JobSource::LinkedIn);
    assert_eq!(mine[0].search_query, "rust developer");

    let all = store.get_logs(None, DEFAULT_LOG_LIMIT).unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(store.get_logs(None, 1).unwrap().len(), 1);
    assert_eq!(store.total_count().unwrap(), 2);
}

#[test]
fn recent_jobs_include_fresh_saves() {
    let store = SqliteJobStore::open_in_memory().unwrap();
    store
        .save_job("Rust Developer", "https://x/jobs/1", "a@b.com", JobSource::Other, "q")
        .unwrap();

    assert_eq!(store.get_recent_jobs("a@b.com", 24).unwrap().len(), 1);
    assert!(store.get_recent_jobs("nobody@b.com", 24).unwrap().is_empty());
}

#[test]
fn duplicate_links_are_logged_each_time() {
    let store = SqliteJobStore::open_in_memory().unwrap();
    for _ in 0..2 {
        store
            .save_job("Same", "https://x/jobs/1", "a@b.com", JobSource::Other, "q")
            .unwrap();
    }
    assert_eq!(store.total_count().unwrap(), 2);
}

#[test]
fn clear_all_removes_everything() {
    let store = SqliteJobStore::open_in_memory().unwrap();
    for n in 0..3 {
        store
            .save_job("Job", &format!("https://x/jobs/{n}"), "a@b.com", JobSource::Other, "q")
            .unwrap();
    }
    assert_eq!(store.clear_all().unwrap(), 3);
    assert_eq!(store.total_count().unwrap(), 0);
    assert_eq!(store.clear_all().unwrap(), 0);
}

#[test]
fn records_survive_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("jobs.db");
    {
        let store = SqliteJobStore::open(&path).unwrap();
        store
            .save_job("Kept", "https://x/jobs/1", "a@b.com", JobSource::Naukri, "q")
            .unwrap();
    }

    let reopened = SqliteJobStore::open(&path).unwrap();
    let logs = reopened.get_logs(None, DEFAULT_LOG_LIMIT).unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].title, "Kept");
    assert_eq!(logs[0].source, JobSource::Naukri);
}

#[test]
fn concurrent_writers_on_one_store_lose_nothing() {
    const THREADS: usize = 8;
    const SAVES: usize = 50;
    let dir = tempdir().unwrap();
    let store = SqliteJobStore::open(dir.path().join("jobs.db")).unwrap();

    std::thread::scope(|scope| {
        for t in 0..THREADS {
            let store = &store;
            scope.spawn(move || {
                let email = format!("worker{t}@b.com");
                for n in 0..SAVES {
                    store
                        .save_job(
                            "Job",
                            &format!("https://x/jobs/{t}/{n}"),
                            &email,
                            JobSource::Other,
                            "q",
                        )
                        .unwrap();
                }
            });
        }
    });

    assert_eq!(store.total_count().unwrap(), (THREADS * SAVES) as u64);
    for t in 0..THREADS {
        let logs = store
            .get_logs(Some(&format!("worker{t}@b.com")), THREADS * SAVES)
            .unwrap();
        assert_eq!(logs.len(), SAVES);
    }
}
