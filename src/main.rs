mod commands;
mod render;

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use daybook_core::{DaybookConfig, ScheduleId, ScheduleQuery, UserId, logging};

use crate::commands::Context;

#[derive(Parser)]
#[command(name = "daybook")]
#[command(about = "Manage calendars and query schedules in your daybook database")]
struct Cli {
    /// Config file to use instead of $DAYBOOK_CONFIG or the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage users
    User {
        #[command(subcommand)]
        command: UserCommand,
    },
    /// Manage a user's calendars
    Calendar {
        /// User the calendars belong to
        #[arg(short, long)]
        user: UserId,

        #[command(subcommand)]
        command: CalendarCommand,
    },
    /// Create and list schedules
    Schedule {
        /// User the schedules belong to
        #[arg(short, long)]
        user: UserId,

        #[command(subcommand)]
        command: ScheduleCommand,
    },
    /// Write a config file with every option commented out
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum UserCommand {
    /// Register a user
    Add {
        #[arg(long)]
        email: String,

        #[arg(long)]
        nickname: Option<String>,
    },
}

#[derive(Subcommand)]
enum CalendarCommand {
    /// List calendars
    List,
    /// Create a calendar
    Add {
        title: String,
    },
    /// Rename a calendar
    Rename {
        title: String,
        new_title: String,
    },
    /// Delete a calendar and all of its schedules
    Delete {
        title: String,
    },
}

#[derive(Subcommand)]
enum ScheduleCommand {
    /// Create a schedule
    Add {
        /// Title of the calendar to add the schedule to
        #[arg(short, long)]
        calendar: String,

        #[arg(short, long)]
        title: String,

        /// First day (e.g., "2024-11-06")
        #[arg(short, long)]
        start: String,

        /// Last day, when the schedule spans several days
        #[arg(short, long)]
        end: Option<String>,

        /// Start time (e.g., "10:00")
        #[arg(long)]
        start_time: Option<String>,

        /// End time
        #[arg(long)]
        end_time: Option<String>,

        /// Mark the schedule as repeating
        #[arg(long)]
        repeat: bool,

        /// Participating user (repeatable)
        #[arg(long = "participant")]
        participants: Vec<UserId>,

        /// Memo to attach
        #[arg(long)]
        memo: Option<i64>,
    },
    /// List schedules in the day, week or month around a date
    List {
        /// Reference date (e.g., "2024-11-06" or "2024-11-06T09:30:00")
        #[arg(short, long)]
        start: String,

        /// daily, weekly or monthly (defaults to daily)
        #[arg(short, long)]
        view: Option<String>,

        /// Only include this calendar (repeatable)
        #[arg(short, long = "calendar")]
        calendars: Vec<String>,

        #[arg(long)]
        page: Option<String>,

        #[arg(long)]
        page_size: Option<String>,
    },
    /// Show a schedule
    Show {
        id: ScheduleId,
    },
    /// Delete a schedule
    Delete {
        id: ScheduleId,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Init { force } = cli.command {
        return commands::config::run(cli.config.as_deref(), force);
    }

    let config = DaybookConfig::load_from(cli.config.as_deref())
        .context("Failed to load configuration")?;
    logging::init(&config.log.filter);
    let ctx = Context::open(&config, cli.json)?;

    match cli.command {
        Commands::User { command } => match command {
            UserCommand::Add { email, nickname } => {
                commands::user::add(&ctx, &email, nickname.as_deref())
            }
        },
        Commands::Calendar { user, command } => match command {
            CalendarCommand::List => commands::calendar::list(&ctx, user),
            CalendarCommand::Add { title } => commands::calendar::add(&ctx, user, &title),
            CalendarCommand::Rename { title, new_title } => {
                commands::calendar::rename(&ctx, user, &title, &new_title)
            }
            CalendarCommand::Delete { title } => commands::calendar::delete(&ctx, user, &title),
        },
        Commands::Schedule { user, command } => match command {
            ScheduleCommand::Add {
                calendar,
                title,
                start,
                end,
                start_time,
                end_time,
                repeat,
                participants,
                memo,
            } => commands::schedule::add(
                &ctx,
                user,
                commands::schedule::AddArgs {
                    calendar,
                    title,
                    start,
                    end,
                    start_time,
                    end_time,
                    repeat,
                    participants,
                    memo,
                },
            ),
            ScheduleCommand::List {
                start,
                view,
                calendars,
                page,
                page_size,
            } => commands::schedule::list(
                &ctx,
                user,
                &ScheduleQuery {
                    start_date: Some(start),
                    view,
                    calendars,
                    page,
                    page_size,
                },
            ),
            ScheduleCommand::Show { id } => commands::schedule::show(&ctx, user, id),
            ScheduleCommand::Delete { id } => commands::schedule::delete(&ctx, user, id),
        },
        Commands::Init { .. } => Ok(()),
    }
}
