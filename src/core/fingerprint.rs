//! Consecutive-repeat tracking over dialog signatures.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct Observation {
    signature: Vec<String>,
    seen_at: Instant,
}

/// Counts how many times the same dialog has been observed in a row.
///
/// The signature is the exact ordered list of item identifiers shown in the
/// prompt. Order and duplicates matter: the UI exposes duplicate cards as
/// repeated identical entries at different positions, so a reordering is a
/// different dialog and resets the count.
#[derive(Debug, Clone)]
pub struct RepeatTracker {
    window: Duration,
    last: Option<Observation>,
    count: u32,
}

impl RepeatTracker {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last: None,
            count: 0,
        }
    }

    /// Record an observation at the current instant. See [`Self::observe_at`].
    pub fn observe(&mut self, items: &[String]) -> u32 {
        self.observe_at(items, Instant::now())
    }

    /// Record an observation and return the new consecutive count.
    ///
    /// The count increments only when the signature equals the previous one
    /// element-for-element and the previous observation is within the window;
    /// any difference resets it to 1. An empty item list means no prompt is
    /// open and resets the tracker entirely.
    pub fn observe_at(&mut self, items: &[String], now: Instant) -> u32 {
        if items.is_empty() {
            self.reset();
            return 0;
        }
        let repeated = match &self.last {
            Some(prev) => {
                prev.signature == items && now.duration_since(prev.seen_at) < self.window
            }
            None => false,
        };
        self.count = if repeated { self.count + 1 } else { 1 };
        self.last = Some(Observation {
            signature: items.to_vec(),
            seen_at: now,
        });
        self.count
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Force the counter back to zero without forgetting the signature.
    ///
    /// Used after a bailout: the next identical observation starts counting
    /// from 1 again instead of immediately re-triggering.
    pub fn clear_count(&mut self) {
        self.count = 0;
    }

    /// Forget everything, as when no prompt is open.
    pub fn reset(&mut self) {
        self.last = None;
        self.count = 0;
    }
}
