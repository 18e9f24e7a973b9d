// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interactive chat loop.
//!
//! Free text goes to the agent. `clear`, `history`, `profile`, and `quit`
//! (alias `exit`) are commands, matched case-insensitively. Ctrl-C and
//! Ctrl-D also leave the loop.

use std::sync::Arc;

use colored::Colorize;
use mnemo_agent::{build_agent, Agent, AgentKind};
use mnemo_config::MnemoConfig;
use mnemo_core::error::MnemoError;
use mnemo_core::{MessageRole, PluginAdapter};
use mnemo_memory::{Turn, UserProfile};
use mnemo_openai::{OpenAiEmbedder, OpenAiProvider};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::{info, warn};

/// One line of shell input, classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellCommand<'a> {
    Quit,
    Clear,
    History,
    Profile,
    Empty,
    Message(&'a str),
}

pub fn parse_command(line: &str) -> ShellCommand<'_> {
    let trimmed = line.trim();
    match trimmed.to_lowercase().as_str() {
        "" => ShellCommand::Empty,
        "quit" | "exit" => ShellCommand::Quit,
        "clear" => ShellCommand::Clear,
        "history" => ShellCommand::History,
        "profile" => ShellCommand::Profile,
        _ => ShellCommand::Message(trimmed),
    }
}

/// `1`/`simple` or `2`/`memory`.
pub fn parse_agent_choice(line: &str) -> Option<AgentKind> {
    match line.trim().to_lowercase().as_str() {
        "1" | "simple" => Some(AgentKind::Simple),
        "2" | "memory" => Some(AgentKind::Memory),
        _ => None,
    }
}

pub fn format_history(turns: &[Turn]) -> String {
    if turns.is_empty() {
        return "no conversation history yet".to_string();
    }
    turns
        .iter()
        .map(|turn| {
            let who = match turn.role {
                MessageRole::User => "user",
                _ => "assistant",
            };
            format!("[{who}]: {}", turn.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_profile(profile: Option<&UserProfile>) -> String {
    match profile {
        Some(profile) => profile.to_pretty_json(),
        None => "this agent keeps no user profile".to_string(),
    }
}

/// Runs the interactive shell until the user quits.
pub async fn run_shell(config: MnemoConfig, kind: Option<AgentKind>) -> Result<(), MnemoError> {
    let mut rl = DefaultEditor::new()
        .map_err(|e| MnemoError::Internal(format!("failed to initialize readline: {e}")))?;

    let kind = match kind {
        Some(kind) => kind,
        None => match choose_agent(&mut rl)? {
            Some(kind) => kind,
            None => return Ok(()),
        },
    };

    let provider = Arc::new(OpenAiProvider::new(&config)?);
    let embedder = Arc::new(OpenAiEmbedder::new(&config)?);
    info!(
        provider = provider.name(),
        provider_version = %provider.version(),
        embedder = embedder.name(),
        "adapters ready"
    );
    let user_name = config.agent.user_name.clone();
    let mut agent = build_agent(kind, &config, &user_name, provider, embedder).await?;

    println!("{}", "mnemo".bold().green());
    println!("user: {}  agent: {}", user_name.cyan(), kind.to_string().cyan());
    println!(
        "Commands: {}, {}, {}, {}\n",
        "clear".yellow(),
        "history".yellow(),
        "profile".yellow(),
        "quit".yellow()
    );

    let prompt = format!("{}> ", user_name.green());
    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let command = parse_command(&line);
                if command != ShellCommand::Empty {
                    let _ = rl.add_history_entry(line.as_str());
                }
                match command {
                    ShellCommand::Quit => break,
                    ShellCommand::Empty => continue,
                    command => handle_command(agent.as_mut(), command).await,
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }

    if let Err(e) = agent.shutdown().await {
        warn!(error = %e, "pending memory work was not finished");
    }
    info!("shell closed");
    println!("{}", "goodbye".dimmed());
    Ok(())
}

/// Ask which agent to run. `None` when the user leaves instead.
fn choose_agent(rl: &mut DefaultEditor) -> Result<Option<AgentKind>, MnemoError> {
    println!("Choose an agent:");
    println!("  1. simple  (conversation only)");
    println!("  2. memory  (profile and long-term memory)");

    loop {
        match rl.readline("agent [1/2]> ") {
            Ok(line) => match parse_agent_choice(&line) {
                Some(kind) => return Ok(Some(kind)),
                None => println!("{}", "please enter 1 or 2".yellow()),
            },
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => return Ok(None),
            Err(e) => return Err(MnemoError::Internal(format!("readline failed: {e}"))),
        }
    }
}

async fn handle_command(agent: &mut dyn Agent, command: ShellCommand<'_>) {
    match command {
        ShellCommand::Clear => match agent.clear_memory().await {
            Ok(()) => println!("{}", "memory cleared".dimmed()),
            Err(e) => eprintln!("{}: {e}", "error".red()),
        },
        ShellCommand::History => println!("{}", format_history(&agent.history())),
        ShellCommand::Profile => println!("{}", format_profile(agent.profile().await.as_ref())),
        ShellCommand::Message(text) => match agent.chat(text).await {
            Ok(reply) => println!("{}: {reply}\n", "assistant".cyan()),
            Err(e) => eprintln!("{}: {e}", "error".red()),
        },
        ShellCommand::Quit | ShellCommand::Empty => {}
    }
}
