//! SQLite-backed log of every posting delivered to a recipient.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use agent_logging::agent_info;
use chrono::{DateTime, Duration, Utc};
use jobagent_core::{JobRecord, JobSource};
use rusqlite::{params, Connection, Row};

/// Default row cap for [`JobStore::get_logs`].
pub const DEFAULT_LOG_LIMIT: usize = 1000;

const SCHEMA_VERSION: i64 = 1;

const CREATE_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS jobs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    link TEXT NOT NULL,
    email TEXT NOT NULL,
    source TEXT,
    search_query TEXT,
    timestamp INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_email ON jobs(email);
CREATE INDEX IF NOT EXISTS idx_timestamp ON jobs(timestamp);
";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("job store lock poisoned")]
    Poisoned,
    #[error("unsupported job store schema version {0}")]
    SchemaVersion(i64),
}

/// Append-only job log. Implementations serialize concurrent writers.
pub trait JobStore: Send + Sync {
    /// Append one posting; returns the new row id.
    fn save_job(
        &self,
        title: &str,
        link: &str,
        email: &str,
        source: JobSource,
        search_query: &str,
    ) -> Result<i64, StoreError>;

    /// Newest first, optionally restricted to one recipient.
    fn get_logs(&self, email: Option<&str>, limit: usize) -> Result<Vec<JobRecord>, StoreError>;

    /// Records for `email` saved within the last `hours` hours, newest first.
    fn get_recent_jobs(&self, email: &str, hours: u32) -> Result<Vec<JobRecord>, StoreError>;

    fn total_count(&self) -> Result<u64, StoreError>;

    /// Delete every record; returns how many were removed.
    fn clear_all(&self) -> Result<usize, StoreError>;
}

pub struct SqliteJobStore {
    conn: Mutex<Connection>,
}

impl SqliteJobStore {
    /// Open (or create) the database at `db_path`.
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(&db_path)?;
        let store = Self::init(conn)?;
        agent_info!("Opened job store at {:?}", db_path.as_ref());
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        let version: i64 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
        match version {
            0 => {
                conn.execute_batch(CREATE_SCHEMA)?;
                conn.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))?;
            }
            SCHEMA_VERSION => {}
            other => return Err(StoreError::SchemaVersion(other)),
        }
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    fn insert_at(
        &self,
        title: &str,
        link: &str,
        email: &str,
        source: JobSource,
        search_query: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO jobs (title, link, email, source, search_query, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                title,
                link,
                email,
                source.label(),
                search_query,
                timestamp.timestamp()
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(id)
    }

    fn row_to_record(row: &Row) -> rusqlite::Result<JobRecord> {
        let source: Option<String> = row.get("source")?;
        let seconds: i64 = row.get("timestamp")?;
        Ok(JobRecord {
            id: row.get("id")?,
            title: row.get("title")?,
            link: row.get("link")?,
            email: row.get("email")?,
            source: source
                .as_deref()
                .map(JobSource::from_label)
                .unwrap_or(JobSource::Unknown),
            search_query: row
                .get::<_, Option<String>>("search_query")?
                .unwrap_or_default(),
            timestamp: DateTime::from_timestamp(seconds, 0).unwrap_or_default(),
        })
    }
}

const SELECT_COLUMNS: &str =
    "SELECT id, title, link, email, source, search_query, timestamp FROM jobs";

impl JobStore for SqliteJobStore {
    fn save_job(
        &self,
        title: &str,
        link: &str,
        email: &str,
        source: JobSource,
        search_query: &str,
    ) -> Result<i64, StoreError> {
        self.insert_at(title, link, email, source, search_query, Utc::now())
    }

    fn get_logs(&self, email: Option<&str>, limit: usize) -> Result<Vec<JobRecord>, StoreError> {
        let conn = self.lock()?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let records = match email {
            Some(email) => {
                let mut stmt = conn.prepare(&format!(
                    "{SELECT_COLUMNS} WHERE email = ?1 ORDER BY timestamp DESC, id DESC LIMIT ?2"
                ))?;
                let rows = stmt.query_map(params![email, limit], Self::row_to_record)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            }
            None => {
                let mut stmt = conn.prepare(&format!(
                    "{SELECT_COLUMNS} ORDER BY timestamp DESC, id DESC LIMIT ?1"
                ))?;
                let rows = stmt.query_map(params![limit], Self::row_to_record)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            }
        };
        Ok(records)
    }

    fn get_recent_jobs(&self, email: &str, hours: u32) -> Result<Vec<JobRecord>, StoreError> {
        let cutoff = (Utc::now() - Duration::hours(i64::from(hours))).timestamp();
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "{SELECT_COLUMNS} WHERE email = ?1 AND timestamp > ?2 ORDER BY timestamp DESC, id DESC"
        ))?;
        let rows = stmt.query_map(params![email, cutoff], Self::row_to_record)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn total_count(&self) -> Result<u64, StoreError> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM jobs", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    fn clear_all(&self) -> Result<usize, StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let removed = tx.execute("DELETE FROM jobs", [])?;
        tx.commit()?;
        Ok(removed)
    }
}
