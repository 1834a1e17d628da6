//! Agent configuration, loaded from an optional RON file.
//!
//! Mail credentials are read from `GMAIL_USER` / `GMAIL_PASSWORD` and take
//! precedence over anything in the file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use agent_logging::LogDestination;
use jobagent_engine::{
    system_clock, Backoff, FetchSettings, MailSettings, ScheduleSettings, SearchSettings,
    SmtpCredentials, WebSearchSettings, DEFAULT_MAX_RESULTS,
};
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILENAME: &str = "jobagent.ron";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub enum LogTarget {
    Terminal,
    File(PathBuf),
    Both(PathBuf),
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::File(path) => LogDestination::File(path),
            LogTarget::Both(path) => LogDestination::Both(path),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub db_path: PathBuf,
    pub max_results: usize,
    /// Answer from the synthetic generator before trying live web search.
    pub demo_mode: bool,
    pub search_base_url: String,
    pub request_timeout_secs: u64,
    pub backoff_min_ms: u64,
    pub backoff_max_ms: u64,
    pub poll_interval_secs: u64,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub gmail_user: Option<String>,
    pub gmail_password: Option<String>,
    pub log: LogTarget,
}

impl Default for AgentConfig {
    fn default() -> Self {
        let mail = MailSettings::default();
        let web = WebSearchSettings::default();
        Self {
            db_path: PathBuf::from("jobs.db"),
            max_results: DEFAULT_MAX_RESULTS,
            demo_mode: true,
            search_base_url: web.base_url,
            request_timeout_secs: FetchSettings::default().request_timeout.as_secs(),
            backoff_min_ms: web.backoff.min.as_millis() as u64,
            backoff_max_ms: web.backoff.max.as_millis() as u64,
            poll_interval_secs: 60,
            smtp_host: mail.smtp_host,
            smtp_port: mail.smtp_port,
            gmail_user: None,
            gmail_password: None,
            log: LogTarget::Terminal,
        }
    }
}

impl AgentConfig {
    /// A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        ron::from_str(&content).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    /// Non-empty values replace the credentials from the file.
    pub fn with_credentials(mut self, user: Option<String>, password: Option<String>) -> Self {
        if let Some(user) = user.filter(|u| !u.is_empty()) {
            self.gmail_user = Some(user);
        }
        if let Some(password) = password.filter(|p| !p.is_empty()) {
            self.gmail_password = Some(password);
        }
        self
    }

    pub fn with_env_credentials(self) -> Self {
        self.with_credentials(
            std::env::var("GMAIL_USER").ok(),
            std::env::var("GMAIL_PASSWORD").ok(),
        )
    }

    pub fn log_destination(&self) -> LogDestination {
        self.log.clone().into()
    }

    pub fn search_settings(&self) -> SearchSettings {
        let timeout = Duration::from_secs(self.request_timeout_secs);
        SearchSettings {
            demo_mode: self.demo_mode,
            fetch: FetchSettings {
                connect_timeout: timeout,
                request_timeout: timeout,
                ..FetchSettings::default()
            },
            web: WebSearchSettings {
                base_url: self.search_base_url.clone(),
                backoff: Backoff {
                    min: Duration::from_millis(self.backoff_min_ms),
                    max: Duration::from_millis(self.backoff_max_ms.max(self.backoff_min_ms)),
                },
            },
        }
    }

    pub fn mail_settings(&self) -> MailSettings {
        MailSettings {
            smtp_host: self.smtp_host.clone(),
            smtp_port: self.smtp_port,
            credentials: SmtpCredentials::new(self.gmail_user.clone(), self.gmail_password.clone()),
            ..MailSettings::default()
        }
    }

    /// The runner caps the poll interval at 60 seconds regardless.
    pub fn schedule_settings(&self) -> ScheduleSettings {
        ScheduleSettings {
            poll_interval: Duration::from_secs(self.poll_interval_secs.max(1)),
            clock: system_clock(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = AgentConfig::load(&dir.path().join(DEFAULT_CONFIG_FILENAME)).unwrap();
        assert_eq!(config, AgentConfig::default());
        assert_eq!(config.db_path, PathBuf::from("jobs.db"));
        assert_eq!(config.max_results, 10);
        assert_eq!(config.smtp_host, "smtp.gmail.com");
        assert_eq!(config.smtp_port, 587);
        assert!(config.mail_settings().credentials.is_none());
    }

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILENAME);
        fs::write(
            &path,
            r#"(
                db_path: "data/agent.db",
                max_results: 5,
                demo_mode: false,
                backoff_min_ms: 100,
                backoff_max_ms: 200,
                log: Both("agent.log"),
            )"#,
        )
        .unwrap();

        let config = AgentConfig::load(&path).unwrap();
        assert_eq!(config.db_path, PathBuf::from("data/agent.db"));
        assert_eq!(config.max_results, 5);
        assert_eq!(config.smtp_port, 587);
        assert_eq!(
            config.log_destination(),
            LogDestination::Both(PathBuf::from("agent.log"))
        );

        let search = config.search_settings();
        assert!(!search.demo_mode);
        assert_eq!(search.web.backoff.min, Duration::from_millis(100));
        assert_eq!(search.web.backoff.max, Duration::from_millis(200));
        assert_eq!(search.fetch.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn unparseable_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILENAME);
        fs::write(&path, "(max_results: \"many\")").unwrap();
        assert!(matches!(
            AgentConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn credentials_override_file_values_when_present() {
        let config = AgentConfig {
            gmail_user: Some("file@gmail.com".into()),
            gmail_password: Some("file-secret".into()),
            ..AgentConfig::default()
        };

        let kept = config.clone().with_credentials(None, Some(String::new()));
        assert_eq!(kept.gmail_user.as_deref(), Some("file@gmail.com"));
        assert_eq!(kept.gmail_password.as_deref(), Some("file-secret"));

        let replaced = config.with_credentials(Some("env@gmail.com".into()), Some("env".into()));
        let credentials = replaced.mail_settings().credentials.unwrap();
        assert_eq!(credentials.username, "env@gmail.com");
        assert_eq!(credentials.password, "env");
    }

    #[test]
    fn poll_interval_is_never_zero() {
        let config = AgentConfig {
            poll_interval_secs: 0,
            ..AgentConfig::default()
        };
        assert_eq!(config.schedule_settings().poll_interval, Duration::from_secs(1));
    }
}
