//! Severity levels shared by validation issues.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity level for validation issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Should be addressed but does not fail a check
    Warning,
    /// Must be fixed
    Error,
}

impl Severity {
    /// Check if this severity is considered a failure
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Error)
    }

    /// Short label used in human-readable reports.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Error => "ERROR",
            Severity::Warning => "WARN",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
