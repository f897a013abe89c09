//! Building the `netstat` invocation and reading the listening ports back out
//! of its output.

use std::fmt;
use std::net::IpAddr;

use tracing::trace;

use super::{ports::PortSet, Protocol};
use crate::shared::error::DiscoveryError;

const NETSTAT: &str = "netstat";
const LOOPBACK: &str = "127.0.0.1";

/// Program and argument vector for one enumeration run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ListenerCommand {
    /// `netstat -nl<t|u>` on this machine.
    pub fn local(protocol: Protocol) -> Self {
        Self {
            program: NETSTAT.to_string(),
            args: vec![protocol.netstat_flag().to_string()],
        }
    }

    /// `netstat -nl<t|u>` run through `shell`, with `host` as the last
    /// argument of the shell command. `shell` is split into words with POSIX
    /// shell quoting rules.
    pub fn remote(shell: &str, host: &str, protocol: Protocol) -> Result<Self, DiscoveryError> {
        let words =
            shlex::split(shell).ok_or_else(|| DiscoveryError::InvalidShellCommand(shell.to_string()))?;
        let mut words = words.into_iter();
        let program = words.next().ok_or(DiscoveryError::EmptyShellCommand)?;
        let mut args: Vec<String> = words.collect();
        args.push(host.to_string());
        args.push(NETSTAT.to_string());
        args.push(protocol.netstat_flag().to_string());
        Ok(Self { program, args })
    }
}

impl fmt::Display for ListenerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Collect the ports of every non-loopback listener in `netstat -nl` output.
pub fn parse_listening(output: &str) -> Result<PortSet, DiscoveryError> {
    let mut ports = PortSet::new();
    for line in output.lines() {
        if line.contains(LOOPBACK) || !line.contains(':') {
            continue;
        }
        let (address, port) = match local_endpoint(line) {
            Some(Endpoint::Listener(address, port)) => (address, port),
            Some(Endpoint::NoPort) => {
                trace!(line, "skipping line without a port");
                continue;
            }
            None => return Err(DiscoveryError::UnparsableLine(line.trim().to_string())),
        };
        if is_loopback(address) {
            trace!(address, port, "skipping loopback listener");
            continue;
        }
        ports.insert(port);
    }
    Ok(ports)
}

#[derive(Debug, PartialEq, Eq)]
enum Endpoint<'a> {
    /// Address in front of the port, and the port.
    Listener(&'a str, u16),

    /// A `:` followed directly by whitespace.
    NoPort,
}

/// Finds the last `:` followed by optional digits and then whitespace.
fn local_endpoint(line: &str) -> Option<Endpoint<'_>> {
    line.match_indices(':').rev().find_map(|(idx, _)| {
        let rest = &line[idx + 1..];
        let end = rest.find(|c: char| !c.is_ascii_digit())?;
        if !rest[end..].starts_with(char::is_whitespace) {
            return None;
        }
        if end == 0 {
            return Some(Endpoint::NoPort);
        }
        let port = rest[..end].parse().ok()?;
        let address = line[..idx].rsplit(char::is_whitespace).next().unwrap_or_default();
        Some(Endpoint::Listener(address, port))
    })
}

fn is_loopback(address: &str) -> bool {
    address
        .trim_start_matches('[')
        .trim_end_matches(']')
        .parse::<IpAddr>()
        .map_or(false, |ip| ip.is_loopback())
}
