use tracing::{debug, info};

use crate::clients::client::ListenerSource;
use crate::protocol::{ports::PortSet, Protocol};
use crate::shared::error::{CheckError, PortSpecError};

pub mod compare;
pub mod report;

use compare::compare;
use report::{Outcome, Report};

/// Required and optional ports for one protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolCheck {
    pub protocol: Protocol,
    pub required: PortSet,
    pub optional: PortSet,
}

impl ProtocolCheck {
    /// Build a check from two port lists such as `80,443` and `8000-8100`.
    pub fn new(
        protocol: Protocol,
        required: &str,
        optional: &str,
    ) -> Result<Self, PortSpecError> {
        let required: PortSet = required.parse()?;
        let optional: PortSet = optional.parse()?;
        debug!(%protocol, %required, %optional, "parsed port lists");
        Ok(Self {
            protocol,
            required,
            optional,
        })
    }

    /// A protocol with no ports listed at all is not checked.
    pub fn is_enabled(&self) -> bool {
        !self.required.is_empty() || !self.optional.is_empty()
    }
}

/// The whole plugin run: every enabled protocol compared against what a
/// [`ListenerSource`] reports.
#[derive(Debug, Clone)]
pub struct PortCheck {
    checks: Vec<ProtocolCheck>,
}

impl PortCheck {
    pub fn new(tcp: ProtocolCheck, udp: ProtocolCheck) -> Self {
        Self {
            checks: vec![tcp, udp],
        }
    }

    /// Run each enabled check in order. Any failure to discover ports aborts
    /// the run without a partial report.
    pub async fn run<S: ListenerSource>(&self, source: &S) -> Result<Outcome, CheckError> {
        let mut report = Report::new();
        let mut ok = true;

        for check in &self.checks {
            if !check.is_enabled() {
                debug!(protocol = %check.protocol, "no ports given, skipping");
                continue;
            }

            let actual = source
                .listening_ports(check.protocol)
                .await
                .map_err(CheckError::from_source)?;
            let result = compare(
                &actual,
                &check.required,
                &check.optional,
                &check.protocol.to_string(),
            );
            info!(protocol = %check.protocol, status = ?result.status, "checked listening ports");

            ok &= result.is_ok();
            report.record(&result);
        }

        Ok(report.finish(ok))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::error::{DiscoveryError, PluginStatus};
    use anyhow::{anyhow, Result};
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Answers with fixed port lists and records which protocols were asked for.
    #[derive(Default)]
    struct ScriptedSource {
        ports: HashMap<Protocol, Vec<u16>>,
        fail_with: Option<fn() -> anyhow::Error>,
        calls: Mutex<Vec<Protocol>>,
    }

    impl ScriptedSource {
        fn with(mut self, protocol: Protocol, ports: &[u16]) -> Self {
            self.ports.insert(protocol, ports.to_vec());
            self
        }

        fn calls(&self) -> Vec<Protocol> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ListenerSource for ScriptedSource {
        async fn listening_ports(&self, protocol: Protocol) -> Result<PortSet> {
            self.calls.lock().unwrap().push(protocol);
            if let Some(fail) = self.fail_with {
                return Err(fail());
            }
            Ok(self
                .ports
                .get(&protocol)
                .map(|ports| ports.iter().copied().collect())
                .unwrap_or_default())
        }
    }

    fn port_check(t: &str, tt: &str, u: &str, uu: &str) -> Result<PortCheck> {
        Ok(PortCheck::new(
            ProtocolCheck::new(Protocol::Tcp, t, tt)?,
            ProtocolCheck::new(Protocol::Udp, u, uu)?,
        ))
    }

    #[tokio::test]
    async fn test_nothing_to_check() -> Result<()> {
        let source = ScriptedSource::default();
        let outcome = port_check("", "", "", "")?.run(&source).await?;

        assert_eq!(outcome.line, "OK");
        assert_eq!(outcome.status, PluginStatus::Ok);
        assert!(source.calls().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_tcp_only() -> Result<()> {
        let source = ScriptedSource::default().with(Protocol::Tcp, &[80, 443]);
        let outcome = port_check("80,443", "8080", "", "")?.run(&source).await?;

        assert_eq!(outcome.line, "OK. TCP [80, 443]");
        assert_eq!(outcome.status, PluginStatus::Ok);
        assert_eq!(source.calls(), vec![Protocol::Tcp]);
        Ok(())
    }

    #[tokio::test]
    async fn test_optional_only_enables_check() -> Result<()> {
        let source = ScriptedSource::default().with(Protocol::Udp, &[1500]);
        let outcome = port_check("", "", "", "500,1000-2000")?.run(&source).await?;

        assert_eq!(outcome.line, "OK. UDP [1500]");
        assert_eq!(source.calls(), vec![Protocol::Udp]);
        Ok(())
    }

    #[tokio::test]
    async fn test_mismatch_in_one_protocol() -> Result<()> {
        let source = ScriptedSource::default()
            .with(Protocol::Tcp, &[80, 8080, 9999])
            .with(Protocol::Udp, &[999]);
        let outcome = port_check("80", "8080", "999", "")?.run(&source).await?;

        assert_eq!(outcome.status, PluginStatus::Warning);
        assert_eq!(
            outcome.line,
            "Incorrect TCP listening ports. Unexpected: [9999]. UDP [999]"
        );
        assert_eq!(source.calls(), vec![Protocol::Tcp, Protocol::Udp]);
        Ok(())
    }

    #[tokio::test]
    async fn test_discovery_failure_is_unknown() -> Result<()> {
        let source = ScriptedSource {
            fail_with: Some(|| {
                anyhow::Error::from(DiscoveryError::CommandFailed {
                    code: 255,
                    stderr: "Permission denied (publickey).".into(),
                })
            }),
            ..Default::default()
        }
        .with(Protocol::Tcp, &[22]);

        let err = port_check("22", "", "", "")?.run(&source).await.unwrap_err();
        assert!(matches!(err, CheckError::Discovery(_)));
        assert_eq!(err.status(), PluginStatus::Unknown);
        assert_eq!(
            err.to_string(),
            "Internal error: Unable to run command[code 255]: Permission denied (publickey)."
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_unexpected_source_failure() -> Result<()> {
        let source = ScriptedSource {
            fail_with: Some(|| anyhow!("connection reset")),
            ..Default::default()
        };

        let err = port_check("", "", "53", "")?.run(&source).await.unwrap_err();
        assert!(matches!(err, CheckError::Internal(_)));
        assert_eq!(err.status().code(), 3);
        Ok(())
    }

    #[test]
    fn test_protocol_check_rejects_bad_spec() {
        assert_eq!(
            ProtocolCheck::new(Protocol::Tcp, "10-", ""),
            Err(PortSpecError::InvalidRange("10-".into()))
        );
        assert_eq!(
            ProtocolCheck::new(Protocol::Udp, "", "abc"),
            Err(PortSpecError::InvalidPort("abc".into()))
        );
    }
}
