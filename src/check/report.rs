use std::fmt;

use super::compare::CheckResult;
use crate::shared::error::PluginStatus;

/// Ordered status fragments collected while checks run.
#[derive(Debug, Default)]
pub struct Report {
    fragments: Vec<String>,
}

/// The final plugin line and the status it exits with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub status: PluginStatus,
    pub line: String,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, result: &CheckResult) {
        self.fragments.extend(result.fragments());
    }

    pub fn finish(mut self, ok: bool) -> Outcome {
        let status = if ok {
            self.fragments.insert(0, "OK".to_string());
            PluginStatus::Ok
        } else {
            PluginStatus::Warning
        };
        Outcome {
            status,
            line: self.fragments.join(". "),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.line)
    }
}
