//! Dialog resolution with repeat detection and a one-shot bailout.
//!
//! Dialogs in this domain can become wedged when the client exposes a prompt
//! the strategy layer does not recognize. The resolver prefers a bounded
//! deterministic escape over retried heuristics: once the same dialog has
//! repeated past the threshold, it runs the bailout sequence exactly once and
//! forces the repeat counter back to zero so the outer loop always makes
//! progress.

use std::thread::sleep;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::client::{BoardSnapshot, Client, ConfirmMode, DialogButton};
use crate::core::fingerprint::RepeatTracker;
use crate::planner::{Planner, Selection};
use crate::profile::DeckProfile;

/// Outcome of one resolver pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogOutcome {
    /// No prompt is open; tracker state was reset.
    NoDialog,
    /// An entry was selected and a confirm click issued.
    Selected,
    /// No card was chosen; a lone confirm click was issued.
    Canceled,
    /// The repeat threshold was hit and the bailout sequence ran.
    Bailout,
}

/// How to pick an index when the same dialog repeats.
///
/// `Rotate` advances the fallback choice by the repeat count to break ties
/// among duplicate entries; `Fixed` re-selects the same index every time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReselectPolicy {
    Fixed,
    Rotate,
}

/// Tunables for the resolver. Threshold and window are both configuration
/// constants; source deployments disagree on their values.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Consecutive identical observations before bailing out.
    pub repeat_threshold: u32,
    /// Maximum gap between observations that still counts as a repeat.
    pub repeat_window: Duration,
    /// Pause between the tentative select click and the confirm click.
    pub click_delay: Duration,
    pub reselect: ReselectPolicy,
    /// Confirmation mode to restore after a bailout.
    pub restore_confirm_mode: ConfirmMode,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            repeat_threshold: 3,
            repeat_window: Duration::from_millis(2500),
            click_delay: Duration::from_millis(120),
            reselect: ReselectPolicy::Fixed,
            restore_confirm_mode: ConfirmMode::On,
        }
    }
}

/// Resolves selection dialogs deterministically.
///
/// Preference order: planner opinion, then profile priority, then pick-first.
pub struct DialogResolver {
    config: ResolverConfig,
    tracker: RepeatTracker,
}

impl DialogResolver {
    pub fn new(config: ResolverConfig) -> Self {
        let tracker = RepeatTracker::new(config.repeat_window);
        Self { config, tracker }
    }

    /// Handle the currently displayed dialog, if any.
    ///
    /// Issues at most one select-and-confirm sequence per call; whether the
    /// prompt actually cleared is left to the next poll's fingerprint
    /// comparison rather than re-checked here.
    #[instrument(skip_all)]
    pub fn resolve<C: Client, P: Planner>(
        &mut self,
        client: &mut C,
        planner: &mut P,
        profile: &DeckProfile,
        snapshot: &BoardSnapshot,
    ) -> DialogOutcome {
        let items = match client.dialog_card_list() {
            Ok(items) => items,
            Err(err) => {
                warn!(%err, "dialog list unavailable");
                return DialogOutcome::NoDialog;
            }
        };
        if items.is_empty() {
            self.tracker.reset();
            return DialogOutcome::NoDialog;
        }

        let count = self.tracker.observe(&items);
        if count >= self.config.repeat_threshold {
            warn!(count, dialog = ?items, "dialog repeat threshold hit, bailing out");
            self.bailout(client);
            self.tracker.clear_count();
            return DialogOutcome::Bailout;
        }

        let selection = self.choose(planner, profile, &items, snapshot, count);
        match selection.index {
            None => {
                info!(dialog = ?items, "no card chosen, confirming");
                self.confirm(client);
                DialogOutcome::Canceled
            }
            Some(index) => {
                info!(index, dialog = ?items, "selecting dialog entry");
                self.select_and_confirm(client, index, selection.button);
                DialogOutcome::Selected
            }
        }
    }

    /// Reset repeat tracking, as when leaving a duel.
    pub fn reset(&mut self) {
        self.tracker.reset();
    }

    fn choose<P: Planner>(
        &self,
        planner: &mut P,
        profile: &DeckProfile,
        items: &[String],
        snapshot: &BoardSnapshot,
        count: u32,
    ) -> Selection {
        match planner.on_dialog(items, snapshot) {
            Ok(Some(preference)) => return preference,
            Ok(None) => {}
            Err(err) => debug!(%err, "planner dialog preference failed"),
        }
        let base = profile.pick_dialog_index(items).unwrap_or(0);
        let index = apply_reselect(base, count, items.len(), self.config.reselect);
        Selection::card(index)
    }

    fn select_and_confirm<C: Client>(&self, client: &mut C, index: usize, button: DialogButton) {
        if let Err(err) = client.select_card_from_dialog(Some(index), button) {
            warn!(index, %err, "select click failed");
        }
        sleep(self.config.click_delay);
        self.confirm(client);
    }

    fn confirm<C: Client>(&self, client: &mut C) {
        if let Err(err) = client.select_card_from_dialog(None, DialogButton::Right) {
            debug!(%err, "confirm click failed");
        }
    }

    /// Fixed escape sequence, run start-to-finish once per trigger; it never
    /// recurses and every call inside it is best-effort.
    fn bailout<C: Client>(&self, client: &mut C) {
        if let Err(err) = client.cancel_activation_prompts() {
            debug!(%err, "cancel_activation_prompts failed during bailout");
        }
        if let Err(err) = client.set_activation_confirmation(ConfirmMode::Default) {
            debug!(%err, "set_activation_confirmation failed during bailout");
        }
        for _ in 0..2 {
            self.confirm(client);
            sleep(self.config.click_delay);
        }
        if let Err(err) = client.set_activation_confirmation(self.config.restore_confirm_mode) {
            debug!(%err, "restoring confirmation mode failed after bailout");
        }
    }
}

fn apply_reselect(base: usize, count: u32, len: usize, policy: ReselectPolicy) -> usize {
    match policy {
        ReselectPolicy::Fixed => base,
        ReselectPolicy::Rotate if count > 1 => (base + count as usize - 1) % len.max(1),
        ReselectPolicy::Rotate => base,
    }
}
