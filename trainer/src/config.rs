//! Configuration for the opening trainer.
//!
//! Handles data directory configuration with the following precedence:
//! 1. OPENING_TRAINER_DATA_DIR environment variable
//! 2. ~/.config/opening-trainer/data (production default)
//! 3. ./data (fallback for development)
//!
//! Session timings have compile-time defaults and can each be overridden with
//! an `OPENING_TRAINER_*_MS` variable.

use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_CONFIG_DIR: &str = ".config/opening-trainer/data";
const DEV_DATA_DIR: &str = "./data";

/// Delay between demo moves.
pub const DEFAULT_DEMO_INTERVAL_MS: u64 = 1000;
/// "Think time" before the scripted opponent replies.
pub const DEFAULT_OPPONENT_DELAY_MS: u64 = 500;
/// How long Correct/Incorrect feedback stays visible.
pub const DEFAULT_FEEDBACK_MS: u64 = 2000;
/// How long a hint stays visible.
pub const DEFAULT_HINT_MS: u64 = 3000;

/// Get the data directory for persistence.
///
/// Priority:
/// 1. OPENING_TRAINER_DATA_DIR env variable if set
/// 2. $HOME/.config/opening-trainer/data if HOME is set
/// 3. ./data as fallback
pub fn get_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("OPENING_TRAINER_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(DEFAULT_CONFIG_DIR);
    }

    PathBuf::from(DEV_DATA_DIR)
}

/// Durations used by a training session for its deferred actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub demo_interval: Duration,
    pub opponent_delay: Duration,
    pub feedback_duration: Duration,
    pub hint_duration: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            demo_interval: Duration::from_millis(DEFAULT_DEMO_INTERVAL_MS),
            opponent_delay: Duration::from_millis(DEFAULT_OPPONENT_DELAY_MS),
            feedback_duration: Duration::from_millis(DEFAULT_FEEDBACK_MS),
            hint_duration: Duration::from_millis(DEFAULT_HINT_MS),
        }
    }
}

impl Timings {
    /// Defaults, each overridable from the environment. Values that do not
    /// parse as a `u64` fall back to the default.
    pub fn from_env() -> Self {
        Self {
            demo_interval: env_ms("OPENING_TRAINER_DEMO_INTERVAL_MS", DEFAULT_DEMO_INTERVAL_MS),
            opponent_delay: env_ms("OPENING_TRAINER_OPPONENT_DELAY_MS", DEFAULT_OPPONENT_DELAY_MS),
            feedback_duration: env_ms("OPENING_TRAINER_FEEDBACK_MS", DEFAULT_FEEDBACK_MS),
            hint_duration: env_ms("OPENING_TRAINER_HINT_MS", DEFAULT_HINT_MS),
        }
    }
}

fn env_ms(var: &str, default: u64) -> Duration {
    let ms = std::env::var(var)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default);
    Duration::from_millis(ms)
}
