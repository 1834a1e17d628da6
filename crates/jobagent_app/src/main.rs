mod cli;
mod commands;
mod config;

use agent_logging::agent_warn;
use clap::Parser;
use log::LevelFilter;

use crate::cli::Cli;
use crate::config::AgentConfig;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (config, load_error) = match AgentConfig::load(&cli.config) {
        Ok(config) => (config, None),
        Err(err) => (AgentConfig::default(), Some(err)),
    };
    let config = config.with_env_credentials();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    agent_logging::initialize(config.log_destination(), level);
    if let Some(err) = load_error {
        agent_warn!("{}; using defaults", err);
    }

    commands::run(cli.command, &config)
}
