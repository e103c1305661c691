//! Hearth calendar entry point.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use hearth::config::NotifierBackend;
use hearth::{
    CalendarManager, CalendarQueryEngine, Config, EmbeddedEventStore, EventDraft, Notifier,
    NtfyNotifier, Recurrence, ReminderDispatcher, RepeatDay, TelegramNotifier,
};

/// Hearth: household calendar with weekly recurrence and reminders
#[derive(Parser, Debug)]
#[command(name = "hearth")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Book an event
    Add {
        /// Owning household member
        owner: String,
        /// Date (YYYY-MM-DD)
        date: NaiveDate,
        /// Start time (HH:MM)
        time: String,
        /// Title
        title: String,
        /// Description
        #[arg(long)]
        description: Option<String>,
        /// Duration in whole hours
        #[arg(long, default_value_t = 1)]
        duration: u8,
        /// Repeat weekly on this weekday (mån..sön)
        #[arg(long)]
        repeat: Option<String>,
        /// Last date of the repetition (YYYY-MM-DD)
        #[arg(long)]
        repeat_until: Option<NaiveDate>,
        /// Send a reminder before start
        #[arg(long)]
        reminder: bool,
    },
    /// List occurrences in a date range
    List {
        /// Start date (YYYY-MM-DD), default today
        #[arg(long)]
        start: Option<NaiveDate>,
        /// End date (YYYY-MM-DD), default a week after start
        #[arg(long)]
        end: Option<NaiveDate>,
    },
    /// Delete an event (drops the whole series)
    Delete {
        /// Event id
        id: String,
    },
    /// Remove occurrences from a date onward
    Truncate {
        /// Event id
        id: String,
        /// First date to remove (YYYY-MM-DD)
        from: NaiveDate,
    },
    /// Show the household roster
    Users,
    /// Run one reminder sweep
    Sweep,
    /// Sweep on an interval, until interrupted
    Watch {
        /// Seconds between sweeps
        #[arg(long, default_value_t = 60)]
        interval_secs: u64,
    },
    /// Print the assistant tool schemas as JSON
    Schema,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };

    let tz = config.household.timezone()?;
    let roster = config.household.roster();

    let store = if config.storage.persist {
        Arc::new(EmbeddedEventStore::with_persistence(&config.data_dir()).await?)
    } else {
        Arc::new(EmbeddedEventStore::new())
    };
    let manager = CalendarManager::new(Arc::clone(&store), roster.clone());

    match args.command {
        Command::Add {
            owner,
            date,
            time,
            title,
            description,
            duration,
            repeat,
            repeat_until,
            reminder,
        } => {
            let time = chrono::NaiveTime::parse_from_str(&time, "%H:%M")
                .map_err(|_| anyhow::anyhow!("time must be HH:MM, got '{time}'"))?;
            let mut draft = EventDraft::new(owner, date, time, title).with_duration(duration);
            draft.description = description;
            draft.reminder = reminder;
            if let Some(label) = repeat {
                let weekday = RepeatDay::from_label(&label)
                    .ok_or_else(|| anyhow::anyhow!("repeat must be one of mån..sön"))?;
                draft.recurrence = Some(Recurrence {
                    weekday,
                    until: repeat_until,
                });
            }
            let event = manager.create(draft).await?;
            println!("{}  {} {} {} ({})", event.id, event.date, event.time, event.title, event.owner);
        }
        Command::List { start, end } => {
            let engine = CalendarQueryEngine::new(manager, tz);
            let start = start.unwrap_or_else(|| engine.today());
            let end = end.unwrap_or(start + chrono::Duration::days(7));
            for occurrence in engine.query_range(start, end).await? {
                let marker = if occurrence.is_virtual { "↻" } else { " " };
                println!(
                    "{} {} {}–{} {} ({})",
                    marker,
                    occurrence.date,
                    occurrence.start.format("%H:%M"),
                    occurrence.end.format("%H:%M"),
                    occurrence.title,
                    occurrence.owner,
                );
            }
        }
        Command::Delete { id } => {
            manager.delete(&id).await?;
            println!("Borttagen: {id}");
        }
        Command::Truncate { id, from } => {
            let outcome = manager.truncate_before(&id, from).await?;
            println!("{outcome:?}");
        }
        Command::Users => {
            for member in roster.members() {
                println!("{}  {}", member.name, member.color);
            }
        }
        Command::Sweep => {
            let dispatcher = build_dispatcher(&config, store, roster)?;
            let stats = dispatcher.sweep().await?;
            println!(
                "scanned={} fired={} failed={}",
                stats.scanned, stats.fired, stats.failed
            );
        }
        Command::Watch { interval_secs } => {
            let dispatcher = build_dispatcher(&config, store, roster)?;
            dispatcher.run(Duration::from_secs(interval_secs)).await?;
        }
        Command::Schema => {
            println!("{}", serde_json::to_string_pretty(&hearth::tool_schemas())?);
        }
    }

    Ok(())
}

fn build_dispatcher(
    config: &Config,
    store: Arc<EmbeddedEventStore>,
    roster: hearth::Roster,
) -> anyhow::Result<ReminderDispatcher<EmbeddedEventStore>> {
    let r = &config.reminders;
    let timeout = Duration::from_secs(r.send_timeout_secs);
    let notifier: Arc<dyn Notifier> = match r.backend {
        NotifierBackend::Telegram => {
            Arc::new(TelegramNotifier::new(r.telegram.bot_token.clone(), timeout))
        }
        NotifierBackend::Ntfy => Arc::new(NtfyNotifier::new(
            r.ntfy.base_url.clone(),
            r.ntfy.topic.clone(),
            timeout,
        )),
    };
    Ok(ReminderDispatcher::new(
        store,
        notifier,
        roster,
        config.household.timezone()?,
        r.lead_minutes,
        r.window_slack_minutes,
    ))
}
