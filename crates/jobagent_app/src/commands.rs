use std::io::{self, BufRead, Write};
use std::sync::Arc;

use agent_logging::{agent_info, agent_warn};
use anyhow::{bail, Context};
use jobagent_core::{JobProfile, StatusSnapshot};
use jobagent_engine::{
    system_clock, DeliveryStatus, JobStore, Mailer, Pipeline, RunReport, ScheduleOwner,
    SearchEngine, SmtpMailer, SqliteJobStore,
};

use crate::cli::Command;
use crate::config::AgentConfig;

pub fn run(command: Command, config: &AgentConfig) -> anyhow::Result<()> {
    match command {
        Command::Search { profile, dry_run } => search(config, profile.into_profile(), dry_run),
        Command::Schedule { profile, at } => {
            schedule(config, profile.into_profile().with_preferred_time(at))
        }
        Command::Logs { email, limit } => logs(config, email.as_deref(), limit),
        Command::Stats { email } => stats(config, email.as_deref()),
        Command::Clear { yes } => clear(config, yes),
        Command::TestEmail { to } => test_email(config, &to),
    }
}

fn open_store(config: &AgentConfig) -> anyhow::Result<SqliteJobStore> {
    SqliteJobStore::open(&config.db_path)
        .with_context(|| format!("failed to open job store {:?}", config.db_path))
}

fn build_pipeline(config: &AgentConfig) -> anyhow::Result<Pipeline> {
    let store: Arc<dyn JobStore> = Arc::new(open_store(config)?);
    let mailer = SmtpMailer::new(config.mail_settings());
    if !mailer.is_configured() {
        agent_warn!("GMAIL_USER / GMAIL_PASSWORD not set; digests will not be emailed");
    }
    let engine = SearchEngine::from_settings(config.search_settings())
        .context("failed to set up the search engine")?;
    Ok(Pipeline::new(
        engine,
        store,
        Arc::new(mailer),
        system_clock(),
        config.max_results,
    ))
}

fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")
}

fn search(config: &AgentConfig, profile: JobProfile, dry_run: bool) -> anyhow::Result<()> {
    let pipeline = build_pipeline(config)?;
    let runtime = runtime()?;

    if dry_run {
        let (query, results) = runtime.block_on(pipeline.search(&profile));
        println!("Query: {query}");
        println!("Found {} jobs via {}", results.len(), results.tier);
        for (idx, job) in results.postings.iter().enumerate() {
            println!("{:>3}. {} [{}]\n     {}", idx + 1, job.title, job.source, job.link);
        }
        return Ok(());
    }

    let report = runtime.block_on(pipeline.run(&profile));
    print_report(&report);
    if let DeliveryStatus::Failed(message) = &report.delivery {
        bail!("digest delivery failed: {message}");
    }
    Ok(())
}

fn print_report(report: &RunReport) {
    println!("Query: {}", report.query);
    println!(
        "Found {} jobs via {}{}",
        report.found(),
        report.results.tier,
        if report.degraded() { " (demo listings)" } else { "" }
    );
    println!("Saved {} ({} failed)", report.saved, report.save_failures);
    match &report.delivery {
        DeliveryStatus::Sent => println!("Digest emailed"),
        DeliveryStatus::NotConfigured => println!("Digest not emailed: credentials not set"),
        DeliveryStatus::Failed(message) => println!("Digest not emailed: {message}"),
    }
}

fn print_status(status: &StatusSnapshot) {
    println!(
        "{} in {} ({}) -> {} daily at {}",
        status.role, status.location, status.job_type, status.email, status.preferred_time
    );
    match status.next_run_at {
        Some(next) => println!("State: {:?}, next run {}", status.state, next),
        None => println!("State: {:?}, nothing scheduled", status.state),
    }
}

fn schedule(config: &AgentConfig, profile: JobProfile) -> anyhow::Result<()> {
    let pipeline = Arc::new(build_pipeline(config)?);
    let mut owner = ScheduleOwner::new(pipeline, config.schedule_settings());
    owner.start(profile).context("failed to start schedule")?;

    if let Some(status) = owner.status_snapshot() {
        print_status(&status);
    }
    println!("Type `status` to show the schedule, or `stop` (or an empty line) to stop.");

    let exit = read_controls(io::stdin().lock(), || match owner.status_snapshot() {
        Some(status) => print_status(&status),
        None => println!("No schedule"),
    })
    .context("failed to read stdin")?;

    if exit == ControlExit::InputClosed {
        agent_info!("stdin closed; schedule keeps running until interrupted");
        runtime()?
            .block_on(tokio::signal::ctrl_c())
            .context("failed to wait for Ctrl-C")?;
    }

    agent_info!("Stopping schedule");
    owner.stop();
    println!("Schedule stopped");
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ControlExit {
    StopRequested,
    /// Input ended without a stop request, e.g. when detached from a terminal.
    InputClosed,
}

fn read_controls(input: impl BufRead, mut on_status: impl FnMut()) -> io::Result<ControlExit> {
    for line in input.lines() {
        match line?.trim() {
            "" | "stop" => return Ok(ControlExit::StopRequested),
            "status" => on_status(),
            other => println!("Unknown command {other:?}; type `status` or `stop`"),
        }
    }
    Ok(ControlExit::InputClosed)
}

fn logs(config: &AgentConfig, email: Option<&str>, limit: usize) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let records = store.get_logs(email, limit)?;
    if records.is_empty() {
        println!("No saved jobs");
        return Ok(());
    }
    for record in records {
        println!(
            "{}  {:<10} {}  <{}>\n    {}",
            record.timestamp.format("%Y-%m-%d %H:%M:%S"),
            record.source.label(),
            record.title,
            record.email,
            record.link
        );
    }
    Ok(())
}

fn stats(config: &AgentConfig, email: Option<&str>) -> anyhow::Result<()> {
    let store = open_store(config)?;
    println!("Total saved jobs: {}", store.total_count()?);
    if let Some(email) = email {
        let recent = store.get_recent_jobs(email, 24)?;
        println!("Saved for {email} in the last 24 hours: {}", recent.len());
    }
    Ok(())
}

fn clear(config: &AgentConfig, yes: bool) -> anyhow::Result<()> {
    let store = open_store(config)?;
    if !yes {
        print!("Delete all {} saved jobs? [y/N] ", store.total_count()?);
        io::stdout().flush()?;
        let mut answer = String::new();
        io::stdin().read_line(&mut answer)?;
        if !matches!(answer.trim(), "y" | "Y" | "yes") {
            println!("Nothing deleted");
            return Ok(());
        }
    }
    let removed = store.clear_all()?;
    agent_info!("Cleared {} saved jobs", removed);
    println!("Deleted {removed} jobs");
    Ok(())
}

fn test_email(config: &AgentConfig, to: &str) -> anyhow::Result<()> {
    let mailer = SmtpMailer::new(config.mail_settings());
    runtime()?
        .block_on(mailer.send_test(to))
        .with_context(|| format!("test email to {to} failed"))?;
    println!("Test email sent to {to}");
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn controls(input: &str) -> (ControlExit, usize) {
        let mut status_calls = 0;
        let exit = read_controls(Cursor::new(input), || status_calls += 1).unwrap();
        (exit, status_calls)
    }

    #[test]
    fn closed_input_does_not_request_a_stop() {
        assert_eq!(controls(""), (ControlExit::InputClosed, 0));
        assert_eq!(controls("status\n"), (ControlExit::InputClosed, 1));
        assert_eq!(controls("status\nhelp\n"), (ControlExit::InputClosed, 1));
    }

    #[test]
    fn stop_or_empty_line_requests_a_stop() {
        assert_eq!(controls("status\nstop\nstatus\n"), (ControlExit::StopRequested, 1));
        assert_eq!(controls("\n"), (ControlExit::StopRequested, 0));
        assert_eq!(controls("  stop  \n"), (ControlExit::StopRequested, 0));
    }
}
