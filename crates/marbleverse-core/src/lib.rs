pub mod jar;
pub mod store;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

// --- Types (matching the web client's types.ts) ---

/// Voice used for milestone messages.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TonePreference {
    Zen,
    Poetic,
    Grounded,
}

/// Visual palette of the jar view.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum JarTheme {
    Classic,
    Midnight,
    Ceramic,
}

/// Size tier of one marble. `Xl` is reserved for milestone drops.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MarbleSize {
    Sm,
    Md,
    Lg,
    Xl,
}

/// Percentage coordinates inside the jar. Purely visual.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// One recorded small win.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Marble {
    pub id: String,
    /// Unix epoch milliseconds. Backdated for retroactive entries.
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub color: String,
    #[serde(default)]
    pub position: Position,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_honoring: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<MarbleSize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_milestone: Option<bool>,
}

impl Marble {
    pub fn size_or_default(&self) -> MarbleSize {
        self.size.unwrap_or(MarbleSize::Lg)
    }

    pub fn is_milestone(&self) -> bool {
        self.is_milestone.unwrap_or(false)
    }
}

/// A user-named start date whose elapsed-day count is shown alongside the jar.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrackedDate {
    pub name: String,
    /// Unix epoch milliseconds of the tracked start day.
    pub start_date: i64,
}

impl TrackedDate {
    pub fn elapsed_days(&self, now: i64) -> i64 {
        (now - self.start_date).max(0) / DAY_MS
    }
}

/// The single persisted aggregate. Serialized whole on every change; field
/// names match the web client so vault documents stay interchangeable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    #[serde(default)]
    pub marbles: Vec<Marble>,
    #[serde(default = "default_tone")]
    pub tone: TonePreference,
    #[serde(default = "default_theme")]
    pub theme: JarTheme,
    #[serde(default)]
    pub last_check_in: Option<i64>,
    #[serde(default)]
    pub milestones_reached: Vec<u32>,
    #[serde(default = "default_sound")]
    pub sound_enabled: bool,
    #[serde(default)]
    pub ambient_enabled: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tracked_dates: Vec<TrackedDate>,
    #[serde(default)]
    pub onboarding_complete: bool,
}

fn default_tone() -> TonePreference {
    TonePreference::Zen
}

fn default_theme() -> JarTheme {
    JarTheme::Classic
}

fn default_sound() -> bool {
    true
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            marbles: Vec::new(),
            tone: default_tone(),
            theme: default_theme(),
            last_check_in: None,
            milestones_reached: Vec::new(),
            sound_enabled: true,
            ambient_enabled: false,
            tracked_dates: Vec::new(),
            onboarding_complete: false,
        }
    }
}

// --- Catalogs ---

/// Cumulative counts that trigger a one-time celebration, ascending.
pub const MILESTONES: [u32; 7] = [7, 13, 30, 60, 90, 100, 365];

/// Palette offered by the advanced color picker.
pub const MARBLE_COLORS: [&str; 8] = [
    "#4ECDC4", "#FF8C42", "#FFD700", "#4361EE", "#F72585", "#70E000", "#9B5DE5", "#00BBF9",
];

/// A win category with its default marble label and color.
#[derive(Debug, Clone, Copy)]
pub struct Category {
    pub id: &'static str,
    pub name: &'static str,
    pub label: &'static str,
    pub color: &'static str,
}

pub const CATEGORIES: [Category; 5] = [
    Category { id: "sober", name: "Sobriety", label: "SOBER", color: "#4361EE" },
    Category { id: "water", name: "Hydration", label: "WATER", color: "#4ECDC4" },
    Category { id: "move", name: "Movement", label: "MOVE", color: "#70E000" },
    Category { id: "rest", name: "Rest", label: "REST", color: "#9B5DE5" },
    Category { id: "general", name: "General", label: "", color: "#FFD700" },
];

pub fn category(id: &str) -> Option<&'static Category> {
    CATEGORIES.iter().find(|c| c.id == id)
}

pub const DAY_MS: i64 = 86_400_000;

/// Marble labels are capped at eight characters and shown uppercased.
pub const LABEL_MAX_CHARS: usize = 8;

/// Uppercase and cap a marble label; blank input means no label.
pub fn normalize_label(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(LABEL_MAX_CHARS).collect::<String>().to_uppercase())
}

pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Next marble sequence number by scanning existing ids ("marble-N").
/// Restored jars may carry foreign ids; those simply don't advance the scan.
pub fn next_marble_seq(state: &AppState) -> u64 {
    let max = state
        .marbles
        .iter()
        .filter_map(|m| m.id.strip_prefix("marble-").and_then(|s| s.parse::<u64>().ok()))
        .max()
        .unwrap_or(0);
    max + 1
}

pub fn marble_id(seq: u64) -> String {
    format!("marble-{}", seq)
}

// --- Storage (vault) ---

const STATE_FILE: &str = "state.json";
const UNDO_FILE: &str = "undo.json";
const SETTINGS_FILE: &str = "settings.json";

/// How long a rollback snapshot stays valid after a restore.
pub const UNDO_WINDOW_MS: i64 = 30_000;

/// Local vault directory holding the state document, the settings document
/// and the single-slot rollback snapshot.
#[derive(Debug, Clone)]
pub struct Vault {
    dir: PathBuf,
}

impl Vault {
    /// Resolve the default vault directory (~/.marbleverse/).
    pub fn open_default() -> Self {
        let dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".marbleverse");
        Self { dir }
    }

    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn read_state_raw(&self) -> Result<String, String> {
        fs::read_to_string(self.dir.join(STATE_FILE)).map_err(|e| e.to_string())
    }

    pub fn read_state(&self) -> Result<AppState, String> {
        let raw = self.read_state_raw()?;
        serde_json::from_str(&raw).map_err(|e| e.to_string())
    }

    /// Read the state document, falling back to defaults when it is missing
    /// or malformed. Never an error: a broken vault must not block the app.
    pub fn load_or_default(&self) -> AppState {
        let path = self.dir.join(STATE_FILE);
        if !path.exists() {
            return AppState::default();
        }
        match self.read_state() {
            Ok(state) => state,
            Err(e) => {
                log::warn!("unreadable state document, starting fresh: {e}");
                AppState::default()
            }
        }
    }

    /// Write the full state document.
    ///
    /// Uses atomic write (temp file + rename) so a crash mid-write leaves the
    /// previous document intact instead of a truncated one.
    pub fn write_state(&self, state: &AppState) -> Result<(), String> {
        let json = serde_json::to_string_pretty(state).map_err(|e| e.to_string())?;
        self.write_atomic(STATE_FILE, &json)
    }

    fn write_atomic(&self, name: &str, data: &str) -> Result<(), String> {
        fs::create_dir_all(&self.dir).map_err(|e| e.to_string())?;
        let tmp = self.dir.join(format!(".{}.tmp", name));
        let path = self.dir.join(name);
        fs::write(&tmp, data).map_err(|e| e.to_string())?;
        fs::rename(&tmp, &path).map_err(|e| e.to_string())
    }

    // --- Rollback snapshot ---

    /// Save the single-slot rollback snapshot taken right before a restore
    /// overwrites local state.
    pub fn save_undo(&self, state: &AppState, now: i64) -> Result<(), String> {
        let snap = UndoSnapshot { saved_at: now, state: state.clone() };
        let json = serde_json::to_string_pretty(&snap).map_err(|e| e.to_string())?;
        self.write_atomic(UNDO_FILE, &json)
    }

    /// Read the snapshot if its undo window is still open. Expired or
    /// unreadable snapshots are discarded on the spot.
    pub fn read_undo(&self, now: i64) -> Option<UndoSnapshot> {
        let path = self.dir.join(UNDO_FILE);
        let raw = fs::read_to_string(&path).ok()?;
        let snap: UndoSnapshot = match serde_json::from_str(&raw) {
            Ok(s) => s,
            Err(_) => {
                self.clear_undo();
                return None;
            }
        };
        if now - snap.saved_at > UNDO_WINDOW_MS {
            self.clear_undo();
            return None;
        }
        Some(snap)
    }

    pub fn clear_undo(&self) {
        let _ = fs::remove_file(self.dir.join(UNDO_FILE));
    }

    // --- Settings ---

    pub fn read_settings(&self) -> Settings {
        let path = self.dir.join(SETTINGS_FILE);
        if !path.exists() {
            return Settings::default();
        }
        fs::read_to_string(&path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default()
    }

    pub fn write_settings(&self, settings: &Settings) -> Result<(), String> {
        let json = serde_json::to_string_pretty(settings).map_err(|e| e.to_string())?;
        self.write_atomic(SETTINGS_FILE, &json)
    }
}

/// Pre-restore backup of the whole aggregate, valid for [`UNDO_WINDOW_MS`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UndoSnapshot {
    pub saved_at: i64,
    pub state: AppState,
}

impl UndoSnapshot {
    pub fn remaining_secs(&self, now: i64) -> i64 {
        ((self.saved_at + UNDO_WINDOW_MS - now).max(0) + 999) / 1_000
    }
}

// --- Settings ---

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AiSettings {
    pub provider: String,
    pub api_key: String,
    pub model: String,
}

/// Cloud vault endpoint plus the access code identifying this jar's row.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SyncSettings {
    pub url: String,
    pub api_key: String,
    pub identity: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub ai: AiSettings,
    #[serde(default)]
    pub sync: SyncSettings,
}

pub fn ai_configured(settings: &AiSettings) -> bool {
    !settings.provider.is_empty()
        && !settings.model.is_empty()
        && (settings.provider == "ollama" || !settings.api_key.is_empty())
}

pub fn sync_configured(settings: &SyncSettings) -> bool {
    !settings.url.is_empty() && !settings.api_key.is_empty() && !settings.identity.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_label_uppercases_and_caps() {
        assert_eq!(normalize_label("happy").as_deref(), Some("HAPPY"));
        assert_eq!(normalize_label("  gratitude  ").as_deref(), Some("GRATITUD"));
        assert_eq!(normalize_label("   "), None);
    }

    #[test]
    fn next_marble_seq_skips_foreign_ids() {
        let mut state = AppState::default();
        state.marbles.push(Marble {
            id: "lx9k2abc0".to_string(),
            timestamp: 0,
            note: None,
            color: "#FFD700".to_string(),
            position: Position::default(),
            is_honoring: None,
            category: None,
            label: None,
            size: None,
            is_milestone: None,
        });
        assert_eq!(next_marble_seq(&state), 1);

        state.marbles.push(Marble { id: marble_id(4), ..state.marbles[0].clone() });
        assert_eq!(next_marble_seq(&state), 5);
    }

    #[test]
    fn elapsed_days_never_negative() {
        let d = TrackedDate { name: "quit".to_string(), start_date: 1_000 * DAY_MS };
        assert_eq!(d.elapsed_days(1_003 * DAY_MS), 3);
        assert_eq!(d.elapsed_days(999 * DAY_MS), 0);
    }

    #[test]
    fn milestone_catalog_is_ascending() {
        assert!(MILESTONES.windows(2).all(|w| w[0] < w[1]));
    }
}
