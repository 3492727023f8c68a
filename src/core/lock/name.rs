//! Lock key sanitization

use crate::utils::error::{CuratorError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static UNSAFE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9._-]").expect("Invalid lock name regex"));

/// A lock key reduced to a safe file stem
///
/// Characters outside `[A-Za-z0-9._-]` become `_` and leading dots are
/// stripped, so no name can contain a separator, start a hidden file, or
/// resolve to `.` or `..`. Distinct keys may map to the same name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LockName(String);

impl LockName {
    pub fn new(key: &str) -> Result<Self> {
        let replaced = UNSAFE_CHARS.replace_all(key, "_");
        let sanitized = replaced.trim_start_matches('.');
        if sanitized.is_empty() {
            return Err(CuratorError::validation(format!(
                "lock key {:?} has no usable characters",
                key
            )));
        }
        Ok(Self(sanitized.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name of the lock, `<name>.lock`
    pub fn file_name(&self) -> String {
        format!("{}.lock", self.0)
    }
}

impl fmt::Display for LockName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
