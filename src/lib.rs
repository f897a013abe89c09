//! Monitoring plugin that checks a host's listening TCP and UDP ports against
//! lists of required and optional ports.

pub mod check;
pub mod clients;
pub mod protocol;
pub mod shared;

pub use check::{report::Outcome, PortCheck, ProtocolCheck};
pub use clients::client::{HostClient, ListenerSource};
pub use protocol::{ports::PortSet, Protocol};
pub use shared::error::{CheckError, PluginStatus};
