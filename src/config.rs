//! Bot configuration: a TOML file of loop tunables.
//!
//! Every field has a default, so an empty file is a valid configuration and
//! new fields never break existing deployments. Millisecond fields stay plain
//! integers in the file and are converted to [`Duration`] at the seams.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::client::ConfirmMode;
use crate::controller::ControllerConfig;
use crate::dialog::{ReselectPolicy, ResolverConfig};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Poll interval during a duel, in milliseconds.
    pub tick_ms: u64,
    /// Poll interval while no duel is in progress, in milliseconds.
    pub idle_delay_ms: u64,
    /// Delay between a dialog select click and its confirm click.
    pub click_delay_ms: u64,
    /// Settle delay after a successfully dispatched action.
    pub post_action_delay_ms: u64,
    /// Pause between the battle and end phase moves of a pass action.
    pub pass_delay_ms: u64,
    /// Default delay between retry attempts of one action.
    pub default_retry_delay_ms: u64,
    /// Default attempt budget for actions that do not set their own.
    pub default_max_attempts: u32,
    /// Identical dialog observations before the bailout runs.
    pub repeat_threshold: u32,
    /// Maximum gap between observations that still counts as a repeat.
    pub repeat_window_ms: u64,
    /// Actions issued per turn before the loop goes passive.
    pub max_actions_per_turn: u32,
    /// Activation confirmation mode applied at duel start and restored
    /// after a bailout.
    pub confirm_mode: ConfirmMode,
    /// How to pick a dialog index when the same dialog repeats.
    pub dialog_reselect: ReselectPolicy,
    /// Deck profile file, resolved relative to the working directory.
    pub profile_path: PathBuf,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            tick_ms: 250,
            idle_delay_ms: 500,
            click_delay_ms: 120,
            post_action_delay_ms: 150,
            pass_delay_ms: 100,
            default_retry_delay_ms: 120,
            default_max_attempts: 1,
            repeat_threshold: 3,
            repeat_window_ms: 2500,
            max_actions_per_turn: 30,
            confirm_mode: ConfirmMode::On,
            dialog_reselect: ReselectPolicy::Fixed,
            profile_path: PathBuf::from("profile.json"),
        }
    }
}

impl BotConfig {
    pub fn validate(&self) -> Result<()> {
        if self.tick_ms == 0 {
            return Err(anyhow!("tick_ms must be positive"));
        }
        if self.repeat_threshold == 0 {
            return Err(anyhow!("repeat_threshold must be positive"));
        }
        if self.repeat_window_ms == 0 {
            return Err(anyhow!("repeat_window_ms must be positive"));
        }
        if self.default_max_attempts == 0 {
            return Err(anyhow!("default_max_attempts must be positive"));
        }
        if self.max_actions_per_turn == 0 {
            return Err(anyhow!("max_actions_per_turn must be positive"));
        }
        if self.profile_path.as_os_str().is_empty() {
            return Err(anyhow!("profile_path must not be empty"));
        }
        Ok(())
    }

    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            repeat_threshold: self.repeat_threshold,
            repeat_window: Duration::from_millis(self.repeat_window_ms),
            click_delay: Duration::from_millis(self.click_delay_ms),
            reselect: self.dialog_reselect,
            restore_confirm_mode: self.confirm_mode,
        }
    }

    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            tick: Duration::from_millis(self.tick_ms),
            idle_delay: Duration::from_millis(self.idle_delay_ms),
            max_actions_per_turn: self.max_actions_per_turn,
            confirm_mode: self.confirm_mode,
        }
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.default_retry_delay_ms)
    }

    pub fn post_action_delay(&self) -> Duration {
        Duration::from_millis(self.post_action_delay_ms)
    }

    pub fn pass_delay(&self) -> Duration {
        Duration::from_millis(self.pass_delay_ms)
    }
}

/// Load configuration from a TOML file, falling back to defaults when the
/// file does not exist.
pub fn load_config(path: &Path) -> Result<BotConfig> {
    if !path.exists() {
        let config = BotConfig::default();
        config.validate()?;
        return Ok(config);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let config: BotConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

/// Atomically write a configuration file (temp file + rename).
pub fn write_config(path: &Path, config: &BotConfig) -> Result<()> {
    config.validate()?;
    let payload = toml::to_string_pretty(config).context("serialize config toml")?;
    let parent = path
        .parent()
        .with_context(|| format!("config path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, payload)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = BotConfig::default();
        config.validate().expect("defaults validate");
        assert_eq!(config.tick_ms, 250);
        assert_eq!(config.repeat_threshold, 3);
        assert_eq!(config.repeat_window_ms, 2500);
        assert_eq!(config.pass_delay_ms, 100);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let config = load_config(&temp.path().join("absent.toml")).expect("load");
        assert_eq!(config, BotConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("duelbot.toml");
        fs::write(&path, "tick_ms = 100\nconfirm_mode = \"off\"\n").expect("write");
        let config = load_config(&path).expect("load");
        assert_eq!(config.tick_ms, 100);
        assert_eq!(config.confirm_mode, ConfirmMode::Off);
        assert_eq!(config.repeat_threshold, 3);
    }

    #[test]
    fn write_then_load_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("duelbot.toml");
        let config = BotConfig {
            tick_ms: 50,
            dialog_reselect: ReselectPolicy::Rotate,
            ..BotConfig::default()
        };
        write_config(&path, &config).expect("write");
        assert_eq!(load_config(&path).expect("load"), config);
    }

    #[test]
    fn zero_tunables_are_rejected() {
        for mutate in [
            (|c: &mut BotConfig| c.tick_ms = 0) as fn(&mut BotConfig),
            |c| c.repeat_threshold = 0,
            |c| c.repeat_window_ms = 0,
            |c| c.default_max_attempts = 0,
            |c| c.max_actions_per_turn = 0,
        ] {
            let mut config = BotConfig::default();
            mutate(&mut config);
            assert!(config.validate().is_err());
        }
    }

    #[test]
    fn resolver_config_converts_milliseconds() {
        let config = BotConfig::default();
        let resolver = config.resolver_config();
        assert_eq!(resolver.repeat_window, Duration::from_millis(2500));
        assert_eq!(resolver.click_delay, Duration::from_millis(120));
        assert_eq!(resolver.restore_confirm_mode, ConfirmMode::On);
    }
}
