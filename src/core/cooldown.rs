//! Per-turn effect attempt counters.

use std::collections::HashMap;

/// Tracks which effects have already been attempted this turn so a planner
/// re-invoked next tick does not propose the identical just-used or
/// just-failed effect again.
///
/// Created at turn start, reset on new turn detection, discarded at duel end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnCooldowns {
    attempts: HashMap<String, u32>,
}

impl TurnCooldowns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, key: &str) {
        *self.attempts.entry(key.to_string()).or_insert(0) += 1;
    }

    pub fn attempts(&self, key: &str) -> u32 {
        self.attempts.get(key).copied().unwrap_or(0)
    }

    pub fn attempted(&self, key: &str) -> bool {
        self.attempts(key) > 0
    }

    /// Forget everything; called when a new turn is detected.
    pub fn reset(&mut self) {
        self.attempts.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_counts_per_key() {
        let mut cooldowns = TurnCooldowns::new();
        cooldowns.record("activate_hand:0");
        cooldowns.record("activate_hand:0");
        cooldowns.record("normal_summon:1");
        assert_eq!(cooldowns.attempts("activate_hand:0"), 2);
        assert_eq!(cooldowns.attempts("normal_summon:1"), 1);
        assert!(!cooldowns.attempted("set_spell_trap:0"));
    }

    #[test]
    fn reset_clears_all_counters() {
        let mut cooldowns = TurnCooldowns::new();
        cooldowns.record("pass");
        cooldowns.reset();
        assert!(cooldowns.is_empty());
        assert_eq!(cooldowns.attempts("pass"), 0);
    }
}
