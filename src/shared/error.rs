use clap::error::ErrorKind;
use thiserror::Error;

/// Plugin states and the exit codes monitoring systems expect for them.
///
/// All four states of the convention are listed; a port check itself only
/// ends in `Ok`, `Warning` or `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginStatus {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl PluginStatus {
    pub fn code(self) -> u8 {
        match self {
            PluginStatus::Ok => 0,
            PluginStatus::Warning => 1,
            PluginStatus::Critical => 2,
            PluginStatus::Unknown => 3,
        }
    }
}

/// A port list given on the command line could not be understood.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PortSpecError {
    #[error("invalid port `{0}`")]
    InvalidPort(String),

    #[error("invalid port range `{0}`")]
    InvalidRange(String),

    #[error("port range `{0}` has its lower bound above its upper bound")]
    ReversedRange(String),
}

/// The listening-socket enumeration could not produce a port list.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Unable to run command `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to run command[code {code}]: {stderr}")]
    CommandFailed { code: i32, stderr: String },

    #[error("unexpected line in listener output: `{0}`")]
    UnparsableLine(String),

    #[error("remote shell command is empty")]
    EmptyShellCommand,

    #[error("remote shell command has unbalanced quotes: `{0}`")]
    InvalidShellCommand(String),
}

/// Everything that ends a run before a status line can be produced.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error(transparent)]
    Usage(#[from] clap::Error),

    #[error("Unable to parse arguments: {0}")]
    Parse(#[from] PortSpecError),

    #[error("Internal error: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("Internal error: {0:#}")]
    Internal(anyhow::Error),
}

impl CheckError {
    /// Sort a broad failure from a port source back into its tagged variant.
    pub fn from_source(err: anyhow::Error) -> Self {
        match err.downcast::<DiscoveryError>() {
            Ok(err) => CheckError::Discovery(err),
            Err(err) => CheckError::Internal(err),
        }
    }

    /// The single line printed for this error. Help and version output are
    /// kept whole.
    pub fn message(&self) -> String {
        match self {
            CheckError::Usage(err)
                if !matches!(
                    err.kind(),
                    ErrorKind::DisplayHelp
                        | ErrorKind::DisplayVersion
                        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) =>
            {
                let rendered = err.to_string();
                rendered.lines().next().unwrap_or_default().to_string()
            }
            _ => self.to_string(),
        }
    }

    pub fn status(&self) -> PluginStatus {
        PluginStatus::Unknown
    }
}
