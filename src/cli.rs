//! Command-line surface over the habit registry.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use habitkeep_core::models::*;
use habitkeep_core::{HabitRegistry, HabitStore, HabitTracker};

use crate::config::AppConfig;
use crate::render;

#[derive(Parser)]
#[command(name = "habit")]
#[command(about = "Track recurring habits and their daily history")]
pub struct Cli {
    /// Path of the habit document (overrides HABITKEEP_DATA and config)
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new habit
    Add {
        name: String,
        /// Repetitions per period
        #[arg(short, long, default_value = "1")]
        target: u32,
        /// daily, every-2-days or weekly
        #[arg(short, long, default_value = "daily", value_parser = parse_frequency)]
        frequency: Frequency,
        /// pills, glass, man, music or card
        #[arg(short, long, value_parser = parse_icon)]
        icon: Option<IconTag>,
        #[arg(short, long, default_value = "")]
        note: String,
    },
    /// Change fields of an existing habit
    Edit {
        /// Habit id or unique prefix
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(short, long)]
        target: Option<u32>,
        #[arg(short, long, value_parser = parse_frequency)]
        frequency: Option<Frequency>,
        #[arg(short, long, value_parser = parse_icon)]
        icon: Option<IconTag>,
        #[arg(short, long)]
        note: Option<String>,
    },
    /// Record one repetition for today
    Done {
        /// Habit id or unique prefix
        id: String,
    },
    /// Delete a habit and its history
    Rm {
        /// Habit id or unique prefix
        id: String,
    },
    /// List active habits
    List,
    /// Show one habit in detail
    Show {
        /// Habit id or unique prefix
        id: String,
    },
    /// Show daily completion for one week
    Week {
        /// Habit id or unique prefix
        id: String,
        /// First day of the week (defaults to this week's Monday)
        #[arg(long, value_parser = parse_day)]
        start: Option<NaiveDate>,
    },
}

fn parse_frequency(s: &str) -> Result<Frequency, String> {
    Frequency::from_str(&s.to_ascii_lowercase())
        .ok_or_else(|| format!("unknown frequency `{s}` (daily, every-2-days, weekly)"))
}

fn parse_icon(s: &str) -> Result<IconTag, String> {
    IconTag::from_str(&s.to_ascii_lowercase())
        .ok_or_else(|| format!("unknown icon `{s}` (pills, glass, man, music, card)"))
}

fn parse_day(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("invalid date `{s}`: {e}"))
}

/// Opens the configured store and runs one command, writing to `out`.
pub fn run(cli: Cli, config: &AppConfig, out: &mut impl Write) -> Result<()> {
    let path = config.resolve_data_file(cli.data.as_deref())?;
    let store = HabitStore::open(&path);
    let registry = HabitRegistry::start(HabitTracker::with_system_clock(store), config.slot_capacity);
    execute(registry, cli.command.unwrap_or(Commands::List), out)
}

/// Runs one command against an already started registry.
pub fn execute(mut registry: HabitRegistry, command: Commands, out: &mut impl Write) -> Result<()> {
    match command {
        Commands::Add {
            name,
            target,
            frequency,
            icon,
            note,
        } => {
            let habit = registry.create_habit(CreateHabitInput {
                name,
                target,
                frequency,
                icon: icon.unwrap_or_default(),
                note,
            })?;
            writeln!(out, "Created {} ({})", habit.name, habit.id)?;
        }
        Commands::Edit {
            id,
            name,
            target,
            frequency,
            icon,
            note,
        } => {
            let id = registry.tracker().resolve_id(&id)?;
            let habit = registry.edit_habit(
                id,
                UpdateHabitInput {
                    name,
                    target,
                    frequency,
                    icon,
                    note,
                },
            )?;
            write!(out, "{}", render::render_habit(&habit))?;
        }
        Commands::Done { id } => {
            let id = registry.tracker().resolve_id(&id)?;
            let increment = registry.increment_habit(id)?;
            if increment.incremented {
                writeln!(out, "Progress {}/{}", increment.progress, increment.target)?;
            } else {
                writeln!(
                    out,
                    "Already complete for this period ({}/{})",
                    increment.progress, increment.target
                )?;
            }
        }
        Commands::Rm { id } => {
            let id = registry.tracker().resolve_id(&id)?;
            registry.delete_habit(id)?;
            writeln!(out, "Deleted {id}")?;
        }
        Commands::List => {
            write!(out, "{}", render::render_habits(&registry.list_active()))?;
        }
        Commands::Show { id } => {
            let id = registry.tracker().resolve_id(&id)?;
            let habit = registry.tracker().get_habit(id)?;
            write!(out, "{}", render::render_habit(&habit))?;
        }
        Commands::Week { id, start } => {
            let tracker = registry.tracker();
            let id = tracker.resolve_id(&id)?;
            let start = start.unwrap_or_else(|| week_start_of(tracker.today()));
            let fractions = tracker.weekly_history(id, start)?;
            write!(out, "{}", render::render_week(start, &fractions))?;
        }
    }

    if let Some(error) = registry.tracker().store().last_save_error() {
        tracing::warn!("Changes are kept in memory only: {}", error);
    }
    Ok(())
}
