//! Deck profile: metadata used for dialog picks and main-phase planning.
//!
//! A profile is a JSON file naming the cards a deck cares about: which entry
//! to prefer when a dialog shows a list, which hand cards are worth summoning
//! or setting, and the extra-deck follow-up order. Missing fields default to
//! empty, which degrades the planner to phase-advance behavior rather than
//! failing.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Deck profile (JSON). Intended to be edited by humans.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeckProfile {
    pub deck_name: String,
    /// Dialog entries to prefer, most wanted first.
    pub dialog_pick_priority: Vec<String>,
    /// Monsters worth normal-summoning, best first.
    pub starters: Vec<String>,
    /// Monsters worth summoning once a starter is already down.
    pub extenders: Vec<String>,
    pub spells: Vec<String>,
    pub traps: Vec<String>,
    /// Extra-deck monsters in follow-up order.
    pub extra_deck_priority: Vec<String>,
}

impl DeckProfile {
    pub fn validate(&self) -> Result<()> {
        if self.deck_name.trim().is_empty() {
            return Err(anyhow!("deck_name must not be empty"));
        }
        for (field, names) in [
            ("dialog_pick_priority", &self.dialog_pick_priority),
            ("starters", &self.starters),
            ("extenders", &self.extenders),
            ("spells", &self.spells),
            ("traps", &self.traps),
            ("extra_deck_priority", &self.extra_deck_priority),
        ] {
            if names.iter().any(|name| name.trim().is_empty()) {
                return Err(anyhow!("{field} contains an empty card name"));
            }
        }
        Ok(())
    }

    /// Which dialog entry to select: the first priority name that appears,
    /// falling back to the first entry. `None` only for an empty dialog.
    pub fn pick_dialog_index(&self, dialog: &[String]) -> Option<usize> {
        if dialog.is_empty() {
            return None;
        }
        for wanted in &self.dialog_pick_priority {
            if let Some(index) = dialog.iter().position(|entry| entry == wanted) {
                return Some(index);
            }
        }
        Some(0)
    }

    /// Summon candidates in priority order: starters first, then extenders.
    pub fn summon_priority(&self) -> impl Iterator<Item = &String> {
        self.starters.iter().chain(self.extenders.iter())
    }

    /// Whether a card is worth setting to the backrow.
    pub fn is_backrow(&self, name: &str) -> bool {
        self.spells.iter().any(|spell| spell == name)
            || self.traps.iter().any(|trap| trap == name)
    }
}

/// Load a profile from a JSON file. The file must exist.
pub fn load_profile(path: &Path) -> Result<DeckProfile> {
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let profile: DeckProfile =
        serde_json::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    profile.validate()?;
    Ok(profile)
}

/// Atomically write a profile to disk (temp file + rename).
pub fn write_profile(path: &Path, profile: &DeckProfile) -> Result<()> {
    profile.validate()?;
    let mut payload = serde_json::to_string_pretty(profile).context("serialize profile json")?;
    payload.push('\n');
    let parent = path
        .parent()
        .with_context(|| format!("profile path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, payload)
        .with_context(|| format!("write temp profile {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace profile {}", path.display()))?;
    Ok(())
}

/// Starter profile written by `duelbot init`.
pub fn default_profile() -> DeckProfile {
    DeckProfile {
        deck_name: "unnamed".to_string(),
        ..DeckProfile::default()
    }
}
