#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
//! ** fishrig **
//! Command line front end for the reward queue file.

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use colored::Colorize;
use log::info;
use ron::ser::PrettyConfig;

use fishrig_data::Reward;
use fishrig_engine::{Dequeued, EngineConfig, FISHRIG_VERSION, SentinelReason, default_config_path, load_config};

#[derive(Parser)]
#[command(author, version, about = "Hand out fishing rewards from a human-edited queue file.")]
struct Cli {
    /// Config file (defaults to `<config dir>/fishrig/fishrig.toml`).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Queue file, overriding the one named in the config.
    #[arg(long)]
    file: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take the next reward out of the queue.
    Next,
    /// Report whether the queue has any entries, without touching the file.
    Status,
    /// Annotate every broken line without taking anything out.
    Check,
    /// List the item names a queue line may use.
    Items,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    info!("fishrig {FISHRIG_VERSION} starting");

    let mut config = resolve_config(cli.config)?;
    if let Some(file) = cli.file {
        config.queue_file = file;
    }
    let mut engine = config.open_engine().context("while setting up the reward queue")?;

    match cli.command {
        Commands::Next => match engine.dequeue_front() {
            Dequeued::Reward(reward) => {
                println!("{}", "Next reward:".bright_green().bold());
                println!("{}", render_reward(&reward)?);
            },
            Dequeued::Sentinel(reason) => {
                println!("{}", describe_sentinel(reason).yellow());
                println!("{}", render_reward(&Reward::barrier())?);
            },
        },
        Commands::Status => {
            let state = if engine.is_active() {
                "active".bright_green()
            } else {
                "inactive".dimmed()
            };
            println!("{} is {state}", engine.storage().path().display().to_string().bold());
        },
        Commands::Check => {
            let report = engine.check().context("while checking the queue file")?;
            println!(
                "{} entries, {} with mistakes",
                report.descriptors.to_string().bold(),
                report.annotated.to_string().bold()
            );
            if report.descriptors > 0 && !report.front_valid {
                println!("{}", "The first entry needs fixing before it can be handed out.".yellow());
            }
        },
        Commands::Items => {
            for entry in engine.catalog().entries() {
                match &entry.note {
                    Some(note) => println!("{}{}", format!("{:<28}", entry.name).bright_cyan(), note.dimmed()),
                    None => println!("{}", entry.name.bright_cyan()),
                }
            }
        },
    }
    Ok(())
}

fn resolve_config(explicit: Option<PathBuf>) -> Result<EngineConfig> {
    let path = explicit
        .or_else(default_config_path)
        .ok_or_else(|| anyhow!("no config directory on this platform; pass --config"))?;
    Ok(load_config(&path))
}

fn render_reward(reward: &Reward) -> Result<String> {
    ron::ser::to_string_pretty(reward, PrettyConfig::default()).context("while formatting reward")
}

fn describe_sentinel(reason: SentinelReason) -> &'static str {
    match reason {
        SentinelReason::QueueEmpty => "The queue is empty.",
        SentinelReason::FrontInvalid => "No entry could be handed out; check the file for annotated lines.",
        SentinelReason::StorageUnavailable => "The queue file couldn't be read or written.",
    }
}
