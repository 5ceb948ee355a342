//! The state container: single authoritative in-memory copy of [`AppState`],
//! written whole to the vault on every mutation.
//!
//! Mutations run on one thread in response to discrete user events. Local
//! persistence is synchronous, so a crash after a mutation loses at most an
//! unsent remote copy; scheduling any remote push is the caller's job and
//! always happens after the local write returned.

use crate::jar::{plan_drop, DropSpec, JarLayout};
use crate::{
    next_marble_seq, now_ms, AppState, JarTheme, TonePreference, TrackedDate, Vault, MILESTONES,
};

/// Result of committing one drop batch.
#[derive(Debug, Clone, Copy)]
pub struct DropOutcome {
    pub added: usize,
    pub total: usize,
    /// Threshold crossed by this batch. The caller requests the celebratory
    /// message for it, never more than one per batch.
    pub crossed: Option<u32>,
}

pub struct Store {
    vault: Vault,
    layout: JarLayout,
    state: AppState,
}

impl Store {
    /// Load the vault state, falling back to defaults when absent or broken.
    pub fn open(vault: Vault) -> Self {
        let state = vault.load_or_default();
        Self { vault, layout: JarLayout::default(), state }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn vault(&self) -> &Vault {
        &self.vault
    }

    fn persist(&self) -> Result<(), String> {
        self.vault.write_state(&self.state)
    }

    /// Commit one drop batch: plan placement, append, stamp the check-in,
    /// record a crossed threshold, persist.
    pub fn drop_marbles(&mut self, spec: DropSpec) -> Result<DropOutcome, String> {
        if spec.count == 0 {
            return Err("a drop must add at least one marble".to_string());
        }

        let now = now_ms();
        let plan = plan_drop(
            self.state.marbles.len(),
            next_marble_seq(&self.state),
            &spec,
            &MILESTONES,
            &self.state.milestones_reached,
            &self.layout,
            now,
            &mut rand::rng(),
        );

        self.state.marbles.extend(plan.marbles);
        self.state.last_check_in = Some(now);
        if let Some(m) = plan.crossed {
            self.state.milestones_reached.push(m);
        }
        self.persist()?;

        Ok(DropOutcome {
            added: spec.count,
            total: self.state.marbles.len(),
            crossed: plan.crossed,
        })
    }

    pub fn set_tone(&mut self, tone: TonePreference) -> Result<(), String> {
        self.state.tone = tone;
        self.persist()
    }

    pub fn set_theme(&mut self, theme: JarTheme) -> Result<(), String> {
        self.state.theme = theme;
        self.persist()
    }

    pub fn set_sound(&mut self, enabled: bool) -> Result<(), String> {
        self.state.sound_enabled = enabled;
        self.persist()
    }

    pub fn set_ambient(&mut self, enabled: bool) -> Result<(), String> {
        self.state.ambient_enabled = enabled;
        self.persist()
    }

    pub fn complete_onboarding(&mut self) -> Result<(), String> {
        if self.state.onboarding_complete {
            return Ok(());
        }
        self.state.onboarding_complete = true;
        self.persist()
    }

    /// Add a named day counter. Blank names and duplicates are rejected so
    /// the surface can simply disable the submit.
    pub fn add_tracked_date(&mut self, name: &str, start_date: i64) -> Result<(), String> {
        let name = name.trim();
        if name.is_empty() {
            return Err("a tracked date needs a name".to_string());
        }
        if self.state.tracked_dates.iter().any(|d| d.name == name) {
            return Err(format!("'{}' is already tracked", name));
        }
        self.state.tracked_dates.push(TrackedDate { name: name.to_string(), start_date });
        self.persist()
    }

    /// Remove a tracked date by name. Ok(false) when nothing matched.
    pub fn remove_tracked_date(&mut self, name: &str) -> Result<bool, String> {
        let before = self.state.tracked_dates.len();
        self.state.tracked_dates.retain(|d| d.name != name.trim());
        if self.state.tracked_dates.len() == before {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    /// Adopt a remote copy wholesale (startup reconciliation). No rollback
    /// snapshot: nothing was asked for, nothing to undo.
    pub fn adopt_remote(&mut self, incoming: AppState) -> Result<(), String> {
        self.state = incoming;
        self.persist()
    }

    /// Overwrite local state with a fetched remote copy, keeping a rollback
    /// snapshot for the undo window first.
    pub fn restore(&mut self, incoming: AppState) -> Result<(), String> {
        self.vault.save_undo(&self.state, now_ms())?;
        self.state = incoming;
        self.persist()
    }

    /// Re-apply the rollback snapshot. Ok(false) when there is none left or
    /// the window expired.
    pub fn undo_restore(&mut self) -> Result<bool, String> {
        match self.vault.read_undo(now_ms()) {
            Some(snap) => {
                self.state = snap.state;
                self.vault.clear_undo();
                self.persist()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Seconds left on the rollback snapshot, if one is pending.
    pub fn undo_remaining_secs(&self) -> Option<i64> {
        let now = now_ms();
        self.vault.read_undo(now).map(|snap| snap.remaining_secs(now))
    }
}
