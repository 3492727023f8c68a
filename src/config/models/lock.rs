//! Job lock configuration

use super::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Job lock configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockSettings {
    /// Directory holding lock files; `None` keeps locks in memory
    #[serde(default = "default_lock_dir")]
    pub dir: Option<PathBuf>,
    /// How long a job waits for its lock, in seconds
    #[serde(default = "default_lock_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LockSettings {
    fn default() -> Self {
        Self {
            dir: default_lock_dir(),
            timeout_secs: default_lock_timeout_secs(),
        }
    }
}

impl LockSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
