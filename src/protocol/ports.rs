use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::shared::error::PortSpecError;

/// A set of port numbers, kept in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortSet(BTreeSet<u16>);

impl PortSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, port: u16) -> bool {
        self.0.insert(port)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        self.0.iter().copied()
    }

    /// Ports in `self` that are not in `other`.
    pub fn difference(&self, other: &PortSet) -> PortSet {
        PortSet(self.0.difference(&other.0).copied().collect())
    }
}

impl FromIterator<u16> for PortSet {
    fn from_iter<I: IntoIterator<Item = u16>>(iter: I) -> Self {
        PortSet(iter.into_iter().collect())
    }
}

impl Extend<u16> for PortSet {
    fn extend<I: IntoIterator<Item = u16>>(&mut self, iter: I) {
        self.0.extend(iter)
    }
}

/// Parses a list like `80,443,8000-8100`. Empty entries are skipped and
/// whitespace is not trimmed.
impl FromStr for PortSet {
    type Err = PortSpecError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let mut ports = PortSet::new();
        for part in spec.split(',') {
            if part.contains('-') {
                let mut bounds = part.split('-');
                let (lower, upper) = match (bounds.next(), bounds.next(), bounds.next()) {
                    (Some(lower), Some(upper), None) => (lower, upper),
                    _ => return Err(PortSpecError::InvalidRange(part.to_string())),
                };
                let (lower, upper) = match (parse_port(lower), parse_port(upper)) {
                    (Some(lower), Some(upper)) => (lower, upper),
                    _ => return Err(PortSpecError::InvalidRange(part.to_string())),
                };
                if lower > upper {
                    return Err(PortSpecError::ReversedRange(part.to_string()));
                }
                ports.extend(lower..=upper);
            } else if !part.is_empty() {
                let port =
                    parse_port(part).ok_or_else(|| PortSpecError::InvalidPort(part.to_string()))?;
                ports.insert(port);
            }
        }
        Ok(ports)
    }
}

fn parse_port(value: &str) -> Option<u16> {
    value.parse().ok()
}

impl fmt::Display for PortSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (idx, port) in self.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{port}")?;
        }
        f.write_str("]")
    }
}
