use std::future::Future;
use std::process::Stdio;

use anyhow::Result;
use tokio::process::Command;
use tracing::debug;

use crate::protocol::{
    netstat::{parse_listening, ListenerCommand},
    ports::PortSet,
    Protocol,
};
use crate::shared::error::DiscoveryError;

/// Anything that can report which ports are listening for a protocol.
pub trait ListenerSource {
    fn listening_ports(
        &self,
        protocol: Protocol,
    ) -> impl Future<Output = Result<PortSet>> + Send;
}

/// Remote shell used to reach a host other than this one.
#[derive(Debug, Clone)]
struct RemoteShell {
    host: String,
    command: String,
}

/// Enumerates listening sockets on this machine or, through a remote shell,
/// on another one.
#[derive(Debug, Clone)]
pub struct HostClient {
    remote: Option<RemoteShell>,
}

impl HostClient {
    pub fn local() -> Self {
        Self { remote: None }
    }

    /// `shell` is the remote-shell command and its arguments, e.g. `ssh -i key`.
    pub fn remote(host: &str, shell: &str) -> Self {
        Self {
            remote: Some(RemoteShell {
                host: host.to_string(),
                command: shell.to_string(),
            }),
        }
    }

    fn command(&self, protocol: Protocol) -> Result<ListenerCommand, DiscoveryError> {
        match &self.remote {
            Some(remote) => ListenerCommand::remote(&remote.command, &remote.host, protocol),
            None => Ok(ListenerCommand::local(protocol)),
        }
    }
}

impl ListenerSource for HostClient {
    async fn listening_ports(&self, protocol: Protocol) -> Result<PortSet> {
        let command = self.command(protocol)?;
        let output = run(&command).await?;
        let ports = parse_listening(&output)?;
        debug!(%protocol, %ports, "listening ports");
        Ok(ports)
    }
}

/// Run `command` to completion and return its standard output.
async fn run(command: &ListenerCommand) -> Result<String, DiscoveryError> {
    debug!(%command, "running command");
    let output = Command::new(&command.program)
        .args(&command.args)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|source| DiscoveryError::Spawn {
            program: command.program.clone(),
            source,
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr);
    debug!(%command, %stdout, %stderr, status = ?output.status, "command finished");

    if !output.status.success() {
        return Err(DiscoveryError::CommandFailed {
            code: output.status.code().unwrap_or(-1),
            stderr: stderr.trim().to_string(),
        });
    }
    Ok(stdout)
}
