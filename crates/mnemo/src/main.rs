// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mnemo - a personal AI assistant with long-term memory.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod shell;

use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;
use colored::Colorize;
use mnemo_agent::AgentKind;
use mnemo_config::MnemoConfig;

/// Mnemo - a personal AI assistant with long-term memory.
#[derive(Parser, Debug)]
#[command(name = "mnemo", version, about, long_about = None)]
struct Cli {
    /// Agent to run: `simple` or `memory`. Asked interactively when omitted.
    #[arg(long, value_parser = parse_agent_kind)]
    agent: Option<AgentKind>,

    /// User to serve. Overrides `agent.user_name`.
    #[arg(long)]
    user: Option<String>,

    /// Read configuration from this file instead of the standard locations.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn parse_agent_kind(s: &str) -> Result<AgentKind, String> {
    AgentKind::from_str(s).map_err(|_| format!("unknown agent `{s}` (expected simple or memory)"))
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // `.env` must be in the environment before figment reads it.
    dotenvy::dotenv().ok();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(errors) => {
            mnemo_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    if let Err(e) = mnemo_config::require_api_key(&config) {
        mnemo_config::render_errors(&[e]);
        std::process::exit(1);
    }

    init_tracing(&config.agent.log_level);

    if let Err(e) = shell::run_shell(config, cli.agent).await {
        eprintln!("{}: {e}", "error".red());
        std::process::exit(1);
    }
}

/// Load, apply command-line overrides, validate.
fn load_config(cli: &Cli) -> Result<MnemoConfig, Vec<mnemo_config::ConfigError>> {
    let mut config = match &cli.config {
        Some(path) => mnemo_config::load_and_validate_path(path)?,
        None => mnemo_config::load_and_validate()?,
    };
    if let Some(user) = &cli.user {
        config.agent.user_name = user.clone();
        mnemo_config::validation::validate_config(&config)?;
    }
    Ok(config)
}

/// Logs go to stderr so they never interleave with the conversation on stdout.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("mnemo={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Only jemalloc can advance the stats epoch.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_parses_agent_and_user() {
        let cli = Cli::try_parse_from(["mnemo", "--agent", "Memory", "--user", "alice"]).unwrap();
        assert_eq!(cli.agent, Some(AgentKind::Memory));
        assert_eq!(cli.user.as_deref(), Some("alice"));
        assert!(cli.config.is_none());
    }

    #[test]
    fn cli_rejects_unknown_agent() {
        assert!(Cli::try_parse_from(["mnemo", "--agent", "clever"]).is_err());
    }

    #[test]
    fn user_override_is_validated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mnemo.toml");
        std::fs::write(&path, "[agent]\nuser_name = \"bob\"\n").unwrap();

        let cli = Cli::try_parse_from([
            "mnemo",
            "--config",
            path.to_str().unwrap(),
            "--user",
            "../etc",
        ])
        .unwrap();
        assert!(load_config(&cli).is_err());

        let cli = Cli::try_parse_from(["mnemo", "--config", path.to_str().unwrap()]).unwrap();
        let config = load_config(&cli).unwrap();
        assert!(!config.agent.user_name.is_empty());
    }
}
