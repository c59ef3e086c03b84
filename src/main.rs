//! Duel automation control loop.
//!
//! Scaffolds and validates configuration, and replays recorded duel traces
//! through the full control loop. Live client transports plug in through the
//! library's `Client` trait.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use duelbot::config::{BotConfig, load_config, write_config};
use duelbot::exit_codes;
use duelbot::profile::{DeckProfile, default_profile, load_profile, write_profile};
use duelbot::replay::{load_trace, run_trace};

#[derive(Parser)]
#[command(name = "duelbot", version, about = "Turn-based duel automation loop")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a starter config and deck profile.
    Init {
        /// Overwrite existing files.
        #[arg(short, long)]
        force: bool,
        /// Config file to create.
        #[arg(long, default_value = "duelbot.toml")]
        config: PathBuf,
    },
    /// Check the config and its deck profile.
    Validate {
        #[arg(long, default_value = "duelbot.toml")]
        config: PathBuf,
    },
    /// Run the control loop over a recorded trace.
    Replay {
        #[arg(long, default_value = "duelbot.toml")]
        config: PathBuf,
        /// JSON trace of per-tick observations.
        trace: PathBuf,
    },
}

fn main() {
    duelbot::logging::init();
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(exit_codes::INVALID);
    }
    std::process::exit(exit_codes::OK);
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Init { force, config } => cmd_init(force, &config),
        Command::Validate { config } => cmd_validate(&config),
        Command::Replay { config, trace } => cmd_replay(&config, &trace),
    }
}

fn cmd_init(force: bool, config_path: &std::path::Path) -> Result<()> {
    if config_path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        );
    }
    let config = BotConfig::default();
    write_config(config_path, &config)
        .with_context(|| format!("write {}", config_path.display()))?;
    if force || !config.profile_path.exists() {
        write_profile(&config.profile_path, &default_profile())
            .with_context(|| format!("write {}", config.profile_path.display()))?;
    }
    info!(
        config = %config_path.display(),
        profile = %config.profile_path.display(),
        "initialized"
    );
    Ok(())
}

fn cmd_validate(config_path: &std::path::Path) -> Result<()> {
    let config = load_config(config_path)?;
    let profile = load_profile(&config.profile_path)
        .with_context(|| format!("load profile {}", config.profile_path.display()))?;
    info!(deck = %profile.deck_name, "config and profile valid");
    println!("ok");
    Ok(())
}

/// Replays tolerate a missing profile, but the substitution is logged so a
/// typo'd `profile_path` does not silently degrade the plans.
fn load_profile_or_default(path: &std::path::Path) -> DeckProfile {
    match load_profile(path) {
        Ok(profile) => profile,
        Err(err) => {
            warn!(path = %path.display(), %err, "profile unavailable, using defaults");
            default_profile()
        }
    }
}

fn cmd_replay(config_path: &std::path::Path, trace_path: &std::path::Path) -> Result<()> {
    let config = load_config(config_path)?;
    let profile = load_profile_or_default(&config.profile_path);
    let trace = load_trace(trace_path)?;
    let report = run_trace(&config, profile, trace)?;
    println!(
        "replayed {} ticks over {} turns, {} client calls",
        report.ticks,
        report.turns_seen,
        report.calls.len()
    );
    for call in &report.calls {
        println!("  {call}");
    }
    Ok(())
}
