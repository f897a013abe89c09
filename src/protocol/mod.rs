use std::fmt;

pub mod netstat;
pub mod ports;

/// Transport protocol whose listening sockets are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    Tcp,
    Udp,
}

impl Protocol {
    /// The netstat flag selecting listening sockets of this protocol.
    pub fn netstat_flag(self) -> &'static str {
        match self {
            Protocol::Tcp => "-nlt",
            Protocol::Udp => "-nlu",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Tcp => f.write_str("TCP"),
            Protocol::Udp => f.write_str("UDP"),
        }
    }
}
