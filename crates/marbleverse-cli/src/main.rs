//! Marbleverse command-line surface.
//!
//! Each invocation is one user event: load the vault, mutate, persist
//! locally, then push to the cloud vault in the background when sync is
//! configured. `tend` keeps a session open for rapid check-ins and debounces
//! its pushes.

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};

use marbleverse_core::jar::DropSpec;
use marbleverse_core::store::Store;
use marbleverse_core::{
    ai_configured, category, normalize_label, sync_configured, JarTheme, MarbleSize, TonePreference,
    Vault, UNDO_WINDOW_MS,
};
use marbleverse_encourage::encouragement;
use marbleverse_sync::{DebouncedPusher, RemoteVault};

#[derive(Parser)]
#[command(name = "marbleverse")]
#[command(about = "A jar that fills with marbles for small daily wins")]
struct Cli {
    /// Use an alternate vault directory instead of ~/.marbleverse.
    #[arg(long, global = true)]
    vault: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the jar: count, last check-in and tracked dates.
    Jar,
    /// Drop a marble (or a backdated batch) into the jar.
    Drop {
        /// What the win is about.
        #[arg(long, value_enum, default_value_t = CategoryCli::General)]
        category: CategoryCli,
        /// Short label shown on the marble (max 8 characters, uppercased).
        #[arg(long)]
        label: Option<String>,
        /// Custom hex color overriding the category color.
        #[arg(long)]
        color: Option<String>,
        #[arg(long, value_enum, default_value_t = SizeCli::Lg)]
        size: SizeCli,
        /// A tiny note, attached to the first marble of the batch.
        #[arg(long)]
        note: Option<String>,
        /// Honor past wins: add this many backdated marbles (1-20).
        #[arg(long)]
        past: Option<usize>,
    },
    /// List recorded wins, newest first.
    History {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Named day counters ("42 days since...").
    Dates {
        #[command(subcommand)]
        command: DatesCommand,
    },
    /// Show or change preferences.
    Settings {
        #[command(subcommand)]
        command: Option<SettingsCommand>,
    },
    /// Store the access code (and endpoint) used for the cloud vault.
    Login {
        /// Access code identifying this jar's cloud row.
        code: String,
        /// Cloud endpoint base URL.
        #[arg(long)]
        url: Option<String>,
        /// Cloud API key.
        #[arg(long)]
        key: Option<String>,
    },
    /// Forget the stored access code.
    Logout,
    /// Save the jar to the cloud vault now.
    Save,
    /// Replace the local jar with the cloud copy. Undo stays open briefly.
    Restore,
    /// Undo a recent restore while its window is still open.
    Undo,
    /// Interactive session for quick check-ins.
    Tend,
}

#[derive(Subcommand)]
enum DatesCommand {
    /// Track a new date (YYYY-MM-DD).
    Add { name: String, date: String },
    /// Stop tracking a date.
    Remove { name: String },
    /// Show all tracked dates with elapsed days.
    List,
}

#[derive(Subcommand)]
enum SettingsCommand {
    /// Print current preferences.
    Show,
    /// Voice used for milestone messages.
    Tone {
        #[arg(value_enum)]
        tone: ToneCli,
    },
    /// Visual palette of the jar.
    Theme {
        #[arg(value_enum)]
        theme: ThemeCli,
    },
    /// Drop chime.
    Sound {
        #[arg(value_enum)]
        switch: SwitchCli,
    },
    /// Warm ambient hum.
    Ambient {
        #[arg(value_enum)]
        switch: SwitchCli,
    },
    /// Configure the AI provider for generated milestone copy.
    Ai {
        provider: String,
        model: String,
        /// API key; omit to keep the stored one.
        #[arg(long)]
        key: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum CategoryCli {
    Sober,
    Water,
    Move,
    Rest,
    General,
}

impl CategoryCli {
    fn id(self) -> &'static str {
        match self {
            Self::Sober => "sober",
            Self::Water => "water",
            Self::Move => "move",
            Self::Rest => "rest",
            Self::General => "general",
        }
    }
}

/// Sizes offered by the picker. `xl` is not listed; milestone drops claim it.
#[derive(Clone, Copy, ValueEnum)]
enum SizeCli {
    Sm,
    Md,
    Lg,
}

impl From<SizeCli> for MarbleSize {
    fn from(s: SizeCli) -> Self {
        match s {
            SizeCli::Sm => MarbleSize::Sm,
            SizeCli::Md => MarbleSize::Md,
            SizeCli::Lg => MarbleSize::Lg,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ToneCli {
    Zen,
    Poetic,
    Grounded,
}

impl From<ToneCli> for TonePreference {
    fn from(t: ToneCli) -> Self {
        match t {
            ToneCli::Zen => TonePreference::Zen,
            ToneCli::Poetic => TonePreference::Poetic,
            ToneCli::Grounded => TonePreference::Grounded,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ThemeCli {
    Classic,
    Midnight,
    Ceramic,
}

impl From<ThemeCli> for JarTheme {
    fn from(t: ThemeCli) -> Self {
        match t {
            ThemeCli::Classic => JarTheme::Classic,
            ThemeCli::Midnight => JarTheme::Midnight,
            ThemeCli::Ceramic => JarTheme::Ceramic,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SwitchCli {
    On,
    Off,
}

impl SwitchCli {
    fn is_on(self) -> bool {
        matches!(self, Self::On)
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let vault = cli.vault.map(Vault::at).unwrap_or_else(Vault::open_default);

    if let Err(e) = run(cli.command.unwrap_or(Commands::Jar), vault).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(command: Commands, vault: Vault) -> Result<(), String> {
    match command {
        Commands::Jar => show_jar(vault),
        Commands::Drop { category, label, color, size, note, past } => {
            drop_marbles(vault, category, label, color, size, note, past).await
        }
        Commands::History { limit } => show_history(vault, limit),
        Commands::Dates { command } => dates(vault, command).await,
        Commands::Settings { command } => settings(vault, command.unwrap_or(SettingsCommand::Show)).await,
        Commands::Login { code, url, key } => login(vault, code, url, key),
        Commands::Logout => logout(vault),
        Commands::Save => save(vault).await,
        Commands::Restore => restore(vault).await,
        Commands::Undo => undo(vault).await,
        Commands::Tend => tend(vault).await,
    }
}

fn show_jar(vault: Vault) -> Result<(), String> {
    let mut store = Store::open(vault);

    if !store.state().onboarding_complete {
        println!("Welcome to Marbleverse.");
        println!("Every small win counts: rest, water, a kept promise. Each one is a marble.");
        println!("Drop one with `marbleverse drop`, watch the jar fill up.\n");
        store.complete_onboarding()?;
    }

    let state = store.state();
    println!("{} marbles in the jar.", state.marbles.len());
    if let Some(ts) = state.last_check_in {
        println!("Last check-in: {}", format_day(ts));
    }
    if !state.milestones_reached.is_empty() {
        let reached: Vec<String> =
            state.milestones_reached.iter().map(|m| m.to_string()).collect();
        println!("Milestones celebrated: {}", reached.join(", "));
    }
    for d in &state.tracked_dates {
        println!("{}: {} days", d.name, d.elapsed_days(marbleverse_core::now_ms()));
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn drop_marbles(
    vault: Vault,
    category_cli: CategoryCli,
    label: Option<String>,
    color: Option<String>,
    size: SizeCli,
    note: Option<String>,
    past: Option<usize>,
) -> Result<(), String> {
    if let Some(n) = past {
        if !(1..=20).contains(&n) {
            return Err("--past must be between 1 and 20".to_string());
        }
    }

    let cat = category(category_cli.id()).ok_or_else(|| "unknown category".to_string())?;
    let spec = DropSpec {
        count: past.unwrap_or(1),
        honoring: past.is_some(),
        note,
        color: color.unwrap_or_else(|| cat.color.to_string()),
        category: cat.id.to_string(),
        label: normalize_label(&label.unwrap_or_else(|| cat.label.to_string())),
        size: size.into(),
    };

    let mut store = Store::open(vault.clone());
    let outcome = store.drop_marbles(spec)?;

    if store.state().sound_enabled {
        println!("plink.");
    }
    println!("Dropped {}. {} in the jar.", outcome.added, outcome.total);

    if let Some(crossed) = outcome.crossed {
        let settings = vault.read_settings();
        let message = encouragement(crossed, store.state().tone, &settings.ai).await;
        println!("\n★ {} gathered. {}", crossed, message);
    }

    push_background(&vault, &store).await;
    Ok(())
}

fn show_history(vault: Vault, limit: usize) -> Result<(), String> {
    let store = Store::open(vault);
    let state = store.state();

    if state.marbles.is_empty() {
        println!("No marbles yet. Drop your first one.");
        return Ok(());
    }

    for m in state.marbles.iter().rev().take(limit) {
        let mut line = format_day(m.timestamp);
        if let Some(cat) = &m.category {
            line.push_str(&format!("  [{}]", cat));
        }
        if m.is_milestone() {
            line.push_str("  ★");
        }
        if m.is_honoring.unwrap_or(false) {
            line.push_str("  (honored)");
        }
        line.push_str("  ");
        line.push_str(m.note.as_deref().filter(|n| !n.is_empty()).unwrap_or("A little win."));
        println!("{line}");
    }
    Ok(())
}

async fn dates(vault: Vault, command: DatesCommand) -> Result<(), String> {
    let mut store = Store::open(vault.clone());
    match command {
        DatesCommand::Add { name, date } => {
            let start = parse_day(&date)?;
            store.add_tracked_date(&name, start)?;
            println!("Tracking '{}' since {}.", name.trim(), date);
            push_background(&vault, &store).await;
        }
        DatesCommand::Remove { name } => {
            if store.remove_tracked_date(&name)? {
                println!("Stopped tracking '{}'.", name);
                push_background(&vault, &store).await;
            } else {
                println!("'{}' is not tracked.", name);
            }
        }
        DatesCommand::List => {
            let state = store.state();
            if state.tracked_dates.is_empty() {
                println!("No tracked dates.");
            }
            let now = marbleverse_core::now_ms();
            for d in &state.tracked_dates {
                println!("{}: {} days (since {})", d.name, d.elapsed_days(now), format_day(d.start_date));
            }
        }
    }
    Ok(())
}

async fn settings(vault: Vault, command: SettingsCommand) -> Result<(), String> {
    match command {
        SettingsCommand::Show => {
            let store = Store::open(vault.clone());
            let state = store.state();
            let settings = vault.read_settings();
            println!("Voice:       {:?}", state.tone);
            println!("Atmosphere:  {:?}", state.theme);
            println!("Drop chime:  {}", on_off(state.sound_enabled));
            println!("Ambient hum: {}", on_off(state.ambient_enabled));
            if sync_configured(&settings.sync) {
                println!("Cloud vault: {} @ {}", settings.sync.identity, settings.sync.url);
            } else {
                println!("Cloud vault: not configured");
            }
            if ai_configured(&settings.ai) {
                // Never print the key, only whether one is stored.
                println!("AI voice:    {}/{} (key set)", settings.ai.provider, settings.ai.model);
            } else {
                println!("AI voice:    not configured (pool messages)");
            }
            return Ok(());
        }
        SettingsCommand::Tone { tone } => {
            let mut store = Store::open(vault.clone());
            store.set_tone(tone.into())?;
            println!("Voice set.");
            push_background(&vault, &store).await;
        }
        SettingsCommand::Theme { theme } => {
            let mut store = Store::open(vault.clone());
            store.set_theme(theme.into())?;
            println!("Atmosphere set.");
            push_background(&vault, &store).await;
        }
        SettingsCommand::Sound { switch } => {
            let mut store = Store::open(vault.clone());
            store.set_sound(switch.is_on())?;
            println!("Drop chime {}.", on_off(switch.is_on()));
            push_background(&vault, &store).await;
        }
        SettingsCommand::Ambient { switch } => {
            let mut store = Store::open(vault.clone());
            store.set_ambient(switch.is_on())?;
            println!("Ambient hum {}.", on_off(switch.is_on()));
            push_background(&vault, &store).await;
        }
        SettingsCommand::Ai { provider, model, key } => {
            let mut settings = vault.read_settings();
            settings.ai.provider = provider;
            settings.ai.model = model;
            // Omitted key keeps the stored one.
            if let Some(key) = key {
                settings.ai.api_key = key;
            }
            vault.write_settings(&settings)?;
            println!("AI voice configured.");
        }
    }
    Ok(())
}

fn login(vault: Vault, code: String, url: Option<String>, key: Option<String>) -> Result<(), String> {
    let mut settings = vault.read_settings();
    settings.sync.identity = code.trim().to_string();
    if let Some(url) = url {
        settings.sync.url = url;
    }
    if let Some(key) = key {
        settings.sync.api_key = key;
    }
    vault.write_settings(&settings)?;

    if sync_configured(&settings.sync) {
        println!("Cloud vault linked as '{}'.", settings.sync.identity);
    } else {
        println!("Access code stored. Set the endpoint too: --url and --key.");
    }
    Ok(())
}

fn logout(vault: Vault) -> Result<(), String> {
    let mut settings = vault.read_settings();
    settings.sync.identity.clear();
    vault.write_settings(&settings)?;
    println!("Signed out. The jar stays on this device.");
    Ok(())
}

async fn save(vault: Vault) -> Result<(), String> {
    let store = Store::open(vault.clone());
    let remote = RemoteVault::new(&vault.read_settings().sync)?;
    remote.upsert(store.state()).await?;
    println!("Jar saved to your cloud vault.");
    Ok(())
}

async fn restore(vault: Vault) -> Result<(), String> {
    let remote = RemoteVault::new(&vault.read_settings().sync)?;
    let mut store = Store::open(vault);

    match remote.fetch().await? {
        None => println!("No cloud copy for this access code. Nothing changed."),
        Some(incoming) => {
            let count = incoming.marbles.len();
            store.restore(incoming)?;
            println!("Jar restored from cloud ({count} marbles).");
            println!("Changed your mind? `marbleverse undo` within {}s.", UNDO_WINDOW_MS / 1_000);
        }
    }
    Ok(())
}

async fn undo(vault: Vault) -> Result<(), String> {
    let mut store = Store::open(vault.clone());
    if store.undo_restore()? {
        println!("Restore undone. {} marbles back in the jar.", store.state().marbles.len());
        push_background(&vault, &store).await;
    } else {
        println!("Nothing to undo. The window may have expired.");
    }
    Ok(())
}

/// Interactive session: every non-command line drops one marble with that
/// note. Pushes are debounced so a burst of check-ins lands as one upsert.
async fn tend(vault: Vault) -> Result<(), String> {
    let mut store = Store::open(vault.clone());
    let settings = vault.read_settings();

    let mut pusher = match RemoteVault::new(&settings.sync) {
        Ok(remote) => {
            // Startup reconciliation: the cloud copy wins wholesale.
            match remote.fetch().await {
                Ok(Some(incoming)) => {
                    store.adopt_remote(incoming)?;
                    println!("Synced from cloud.");
                }
                Ok(None) => {}
                Err(e) => log::warn!("startup sync failed: {e}"),
            }
            Some(DebouncedPusher::new(Arc::new(remote)))
        }
        Err(_) => None,
    };

    let general = category("general").ok_or_else(|| "missing general category".to_string())?;
    println!(
        "{} marbles. Type a note to drop one, 'count' for the tally, 'quit' to leave.",
        store.state().marbles.len()
    );

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line.map_err(|e| e.to_string())?;
        let input = line.trim();
        match input {
            "" => continue,
            "quit" | "q" | "exit" => break,
            "count" => println!("{}", store.state().marbles.len()),
            note => {
                let spec = DropSpec {
                    count: 1,
                    honoring: false,
                    note: Some(note.to_string()),
                    color: general.color.to_string(),
                    category: general.id.to_string(),
                    label: None,
                    size: MarbleSize::Lg,
                };
                let outcome = store.drop_marbles(spec)?;
                if store.state().sound_enabled {
                    println!("plink. ({} in the jar)", outcome.total);
                } else {
                    println!("({} in the jar)", outcome.total);
                }
                if let Some(crossed) = outcome.crossed {
                    let message = encouragement(crossed, store.state().tone, &settings.ai).await;
                    println!("\n★ {} gathered. {}", crossed, message);
                }
                if let Some(p) = pusher.as_mut() {
                    p.schedule(store.state().clone());
                }
            }
        }
    }

    // Don't leave with an unsent jar.
    if let Some(mut p) = pusher {
        if let Err(e) = p.flush(store.state().clone()).await {
            eprintln!("cloud save failed: {e}");
        }
    }
    Ok(())
}

/// Background push after a mutation: best effort, log-only on failure.
async fn push_background(vault: &Vault, store: &Store) {
    let settings = vault.read_settings();
    if !sync_configured(&settings.sync) {
        return;
    }
    match RemoteVault::new(&settings.sync) {
        Ok(remote) => {
            if let Err(e) = remote.upsert(store.state()).await {
                log::warn!("background sync failed: {e}");
            }
        }
        Err(e) => log::warn!("{e}"),
    }
}

fn parse_day(s: &str) -> Result<i64, String> {
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| format!("invalid date '{s}' (expected YYYY-MM-DD): {e}"))?;
    let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(|| "invalid date".to_string())?;
    Ok(midnight.and_utc().timestamp_millis())
}

fn format_day(ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "?".to_string())
}

fn on_off(v: bool) -> &'static str {
    if v {
        "on"
    } else {
        "off"
    }
}

#[cfg(test)]
mod tests {
    use super::{format_day, parse_day};

    #[test]
    fn day_parsing_roundtrips() {
        let ms = parse_day("2026-08-06").expect("valid date should parse");
        assert_eq!(format_day(ms), "2026-08-06");
    }

    #[test]
    fn bad_dates_are_rejected() {
        assert!(parse_day("yesterday").is_err());
        assert!(parse_day("2026-13-01").is_err());
    }
}
