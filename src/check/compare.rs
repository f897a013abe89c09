use tracing::debug;

use crate::protocol::ports::PortSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Ok,
    Mismatch,
}

/// Outcome of comparing one protocol's listening ports with expectations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub status: CheckStatus,

    /// Required ports that are not listening.
    pub missing: PortSet,

    /// Listening ports that are neither required nor optional.
    pub extras: PortSet,

    /// Everything that was found listening.
    pub actual: PortSet,

    pub description: String,
}

impl CheckResult {
    pub fn is_ok(&self) -> bool {
        self.status == CheckStatus::Ok
    }

    /// Status fragments for this result, in reporting order.
    pub fn fragments(&self) -> Vec<String> {
        if self.is_ok() {
            return vec![format!("{} {}", self.description, self.actual)];
        }

        let mut fragments = vec![format!("Incorrect {} listening ports", self.description)];
        if !self.missing.is_empty() {
            fragments.push(format!("Missing: {}", self.missing));
        }
        if !self.extras.is_empty() {
            fragments.push(format!("Unexpected: {}", self.extras));
        }
        fragments
    }
}

pub fn compare(
    actual: &PortSet,
    required: &PortSet,
    optional: &PortSet,
    description: &str,
) -> CheckResult {
    let missing = required.difference(actual);
    let extras = actual.difference(required).difference(optional);
    let status = if missing.is_empty() && extras.is_empty() {
        CheckStatus::Ok
    } else {
        debug!(%required, %optional, %actual, "{description} ports do not match");
        CheckStatus::Mismatch
    };

    CheckResult {
        status,
        missing,
        extras,
        actual: actual.clone(),
        description: description.to_string(),
    }
}
