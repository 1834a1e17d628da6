use std::path::PathBuf;

use chrono::NaiveTime;
use clap::{Args, Parser, Subcommand};
use jobagent_core::{JobProfile, JobType};
use jobagent_engine::DEFAULT_LOG_LIMIT;

use crate::config::DEFAULT_CONFIG_FILENAME;

#[derive(Debug, Parser)]
#[command(name = "jobagent", version, about = "Search job boards and mail a daily digest")]
pub struct Cli {
    /// RON configuration file.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILENAME)]
    pub config: PathBuf,

    /// Log at debug level.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search now, save the results and email the digest.
    Search {
        #[command(flatten)]
        profile: ProfileArgs,
        /// Print the results without saving or emailing them.
        #[arg(long)]
        dry_run: bool,
    },
    /// Run the search every day at a fixed local time until stopped.
    Schedule {
        #[command(flatten)]
        profile: ProfileArgs,
        /// Local time of day, HH:MM.
        #[arg(long, value_parser = parse_time)]
        at: NaiveTime,
    },
    /// List saved postings, newest first.
    Logs {
        #[arg(long)]
        email: Option<String>,
        #[arg(long, default_value_t = DEFAULT_LOG_LIMIT)]
        limit: usize,
    },
    /// Show how many postings have been saved.
    Stats {
        /// Also count postings saved for this recipient in the last day.
        #[arg(long)]
        email: Option<String>,
    },
    /// Delete every saved posting.
    Clear {
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
    /// Send a test email to check the SMTP configuration.
    TestEmail {
        #[arg(long)]
        to: String,
    },
}

#[derive(Debug, Clone, Args)]
pub struct ProfileArgs {
    #[arg(long)]
    pub role: String,
    #[arg(long)]
    pub location: String,
    /// Internship, "Fresher Job" or Experience.
    #[arg(long, default_value = "Fresher Job")]
    pub job_type: JobType,
    /// Years of experience, used with --job-type Experience.
    #[arg(long)]
    pub experience: Option<String>,
    /// Recipient of the digest.
    #[arg(long)]
    pub email: String,
}

impl ProfileArgs {
    pub fn into_profile(self) -> JobProfile {
        let profile = JobProfile::new(self.role, self.location, self.job_type, self.email);
        match self.experience {
            Some(years) if self.job_type == JobType::Experience => profile.with_experience(years),
            _ => profile,
        }
    }
}

fn parse_time(value: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|err| format!("expected HH:MM, got {value:?}: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_a_schedule_command() {
        let cli = Cli::try_parse_from([
            "jobagent",
            "schedule",
            "--role",
            "Data Engineer",
            "--location",
            "Pune",
            "--job-type",
            "experience",
            "--experience",
            "3",
            "--email",
            "a@b.com",
            "--at",
            "07:45",
        ])
        .unwrap();

        let Command::Schedule { profile, at } = cli.command else {
            panic!("expected schedule");
        };
        assert_eq!(at, NaiveTime::from_hms_opt(7, 45, 0).unwrap());
        let profile = profile.into_profile();
        assert_eq!(profile.job_type, JobType::Experience);
        assert_eq!(
            profile.search_query(),
            "Data Engineer Pune 3+ years mid-level"
        );
        assert_eq!(cli.config, PathBuf::from("jobagent.ron"));
    }

    #[test]
    fn experience_is_ignored_for_other_job_types() {
        let cli = Cli::try_parse_from([
            "jobagent", "search", "--role", "Designer", "--location", "Delhi", "--experience",
            "5", "--email", "a@b.com",
        ])
        .unwrap();
        let Command::Search { profile, dry_run } = cli.command else {
            panic!("expected search");
        };
        assert!(!dry_run);
        let profile = profile.into_profile();
        assert_eq!(profile.job_type, JobType::FresherJob);
        assert_eq!(profile.experience_years, None);
    }

    #[test]
    fn rejects_a_malformed_time() {
        assert!(parse_time("7pm").is_err());
        assert!(parse_time("25:00").is_err());
        assert_eq!(parse_time(" 09:05 ").unwrap(), NaiveTime::from_hms_opt(9, 5, 0).unwrap());
    }

    #[test]
    fn logs_limit_defaults_to_the_store_cap() {
        let cli = Cli::try_parse_from(["jobagent", "logs"]).unwrap();
        let Command::Logs { email, limit } = cli.command else {
            panic!("expected logs");
        };
        assert_eq!(email, None);
        assert_eq!(limit, DEFAULT_LOG_LIMIT);
    }
}
