//! Vocabnotify CLI entry point

use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use tracing::info;

use vocabnotify::cli::{Cli, Command, SettingsCommand};
use vocabnotify::config::Config;
use vocabnotify::{ConsoleNotifier, Event, EventBus, NotificationScheduler, SettingsWatcher, SystemClock};
use wordstore::{Difficulty, FileSettingsStore, FileWordStore, NewWord, SettingsStore, Word, WordStore};

fn setup_logging(cli_log_level: Option<&str>) -> Result<()> {
    let level = match cli_log_level.map(str::to_uppercase).as_deref() {
        Some("TRACE") => tracing::Level::TRACE,
        Some("DEBUG") => tracing::Level::DEBUG,
        Some("INFO") | None => tracing::Level::INFO,
        Some("WARN") | Some("WARNING") => tracing::Level::WARN,
        Some("ERROR") => tracing::Level::ERROR,
        Some(other) => {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", other);
            tracing::Level::INFO
        }
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    let words: Arc<dyn WordStore> =
        Arc::new(FileWordStore::open(config.storage.data_dir()).context("Failed to open word store")?);
    let settings_store: Arc<dyn SettingsStore> =
        Arc::new(FileSettingsStore::open(config.storage.data_dir()).context("Failed to open settings store")?);

    match cli.command {
        Command::Add {
            word,
            meaning,
            example,
            difficulty,
            inactive,
        } => cmd_add(&words, word, meaning, example, difficulty, inactive).await,
        Command::List { all } => cmd_list(&words, all).await,
        Command::Remove { id } => cmd_remove(&words, &id).await,
        Command::Activate { id } => cmd_set_active(&words, &id, true).await,
        Command::Deactivate { id } => cmd_set_active(&words, &id, false).await,
        Command::Settings { command } => match command {
            SettingsCommand::Show => cmd_settings_show(&settings_store).await,
            SettingsCommand::Set {
                enabled,
                disabled,
                daily_count,
                start,
                end,
            } => cmd_settings_set(&settings_store, enabled, disabled, daily_count, start, end).await,
        },
        Command::Run => cmd_run(&config, words, settings_store).await,
    }
}

async fn cmd_add(
    words: &Arc<dyn WordStore>,
    word: String,
    meaning: String,
    example: Option<String>,
    difficulty: Difficulty,
    inactive: bool,
) -> Result<()> {
    let mut draft = NewWord::new(word.clone(), meaning).with_difficulty(difficulty);
    if let Some(example) = example {
        draft = draft.with_example(example);
    }
    if inactive {
        draft = draft.inactive();
    }

    let id = words.create(draft).await?;
    println!("Added {} ({})", word.green().bold(), short_id(&id).dimmed());
    Ok(())
}

async fn cmd_list(words: &Arc<dyn WordStore>, all: bool) -> Result<()> {
    let list = if all { words.list().await? } else { words.list_active().await? };

    if list.is_empty() {
        println!("No words yet. Add one with: vn add <word> <meaning>");
        return Ok(());
    }

    for word in &list {
        let marker = if word.is_active { "●".green() } else { "○".dimmed() };
        let reviews = format!("{} reviews", word.review_count);
        println!(
            "{} {} {}  {} — {}  [{}] {}",
            marker,
            short_id(&word.id).dimmed(),
            word.created_at.format("%Y-%m-%d").to_string().dimmed(),
            word.word.bold(),
            word.meaning,
            word.difficulty,
            reviews.dimmed(),
        );
    }
    Ok(())
}

async fn cmd_remove(words: &Arc<dyn WordStore>, needle: &str) -> Result<()> {
    let word = resolve_word(words, needle).await?;
    words.delete(&word.id).await?;
    println!("Removed {}", word.word.red());
    Ok(())
}

async fn cmd_set_active(words: &Arc<dyn WordStore>, needle: &str, active: bool) -> Result<()> {
    let word = resolve_word(words, needle).await?;
    words.set_active(&word.id, active).await?;
    if active {
        println!("Activated {}", word.word.green());
    } else {
        println!("Deactivated {}", word.word.yellow());
    }
    Ok(())
}

async fn cmd_settings_show(settings_store: &Arc<dyn SettingsStore>) -> Result<()> {
    let settings = settings_store.get().await?;
    print!("{}", serde_yaml::to_string(&settings)?);
    Ok(())
}

async fn cmd_settings_set(
    settings_store: &Arc<dyn SettingsStore>,
    enabled: bool,
    disabled: bool,
    daily_count: Option<u32>,
    start: Option<u32>,
    end: Option<u32>,
) -> Result<()> {
    let mut settings = settings_store.get().await?;

    if enabled {
        settings.enabled = true;
    }
    if disabled {
        settings.enabled = false;
    }
    if let Some(count) = daily_count {
        settings.daily_count = count;
    }
    if let Some(start) = start {
        settings.active_hours.start = start;
    }
    if let Some(end) = end {
        settings.active_hours.end = end;
    }

    settings.validate()?;
    settings_store.set(&settings).await?;

    println!("Settings updated:");
    print!("{}", serde_yaml::to_string(&settings)?);
    Ok(())
}

async fn cmd_run(
    config: &Config,
    words: Arc<dyn WordStore>,
    settings_store: Arc<dyn SettingsStore>,
) -> Result<()> {
    let events = Arc::new(EventBus::with_default_capacity());
    let notifier = Arc::new(ConsoleNotifier::new());
    let clock = Arc::new(SystemClock);

    let scheduler = Arc::new(
        NotificationScheduler::connect(
            words.clone(),
            settings_store.clone(),
            notifier,
            events.clone(),
            clock,
        )
        .await,
    );

    let list = words.list().await.context("Failed to load words")?;
    scheduler.schedule_all(&list).await;

    let watcher = SettingsWatcher::new(
        scheduler.clone(),
        words.clone(),
        settings_store.clone(),
        config.watcher.poll_interval(),
    );
    let watcher_handle = tokio::spawn(watcher.run());

    let mut rx = events.subscribe();
    info!(words = list.len(), "scheduler running, press Ctrl-C to stop");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = rx.recv() => match event {
                Ok(Event::ReviewIncremented { word_id, review_count, .. }) => {
                    println!("{} {} reviewed {} times", "·".dimmed(), short_id(&word_id), review_count);
                }
                Ok(Event::SettingsApplied { settings }) => {
                    println!(
                        "{} settings applied: {}/day, {}:00-{}:00",
                        "·".dimmed(),
                        settings.daily_count,
                        settings.active_hours.start,
                        settings.active_hours.end,
                    );
                }
                // NotificationSent is already rendered by the console notifier
                Ok(_) => {}
                // Lagged subscribers just pick up from the next event
                Err(_) => {}
            }
        }
    }

    watcher_handle.abort();
    scheduler.cancel_all().await;
    info!("scheduler stopped");
    Ok(())
}

/// Resolve a word by id, id prefix, or exact text
async fn resolve_word(words: &Arc<dyn WordStore>, needle: &str) -> Result<Word> {
    let all = words.list().await?;

    if let Some(word) = all.iter().find(|w| w.id == needle) {
        return Ok(word.clone());
    }

    let matches: Vec<&Word> = all
        .iter()
        .filter(|w| w.id.starts_with(needle) || w.word == needle)
        .collect();

    match matches.len() {
        0 => Err(eyre::eyre!("No word matches '{}'", needle)),
        1 => Ok(matches[0].clone()),
        n => Err(eyre::eyre!(
            "'{}' matches {} words, use a longer id prefix",
            needle,
            n
        )),
    }
}

/// First hex block of a word id, enough to paste back
fn short_id(id: &str) -> &str {
    id.split('-').next().unwrap_or(id)
}
