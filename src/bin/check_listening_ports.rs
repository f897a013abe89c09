use std::process::ExitCode;

use check_listening_ports::{CheckError, HostClient, Outcome, PortCheck, Protocol, ProtocolCheck};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::filter::LevelFilter;

const EXAMPLES: &str = "\
Examples:
  Check TCP ports on localhost (8080 is optional, down is OK):
    -t 80,443 -T 8080
  Same on a remote host:
    -H remote_host -t 80,443 -T 8080
  UDP also (-U is optional):
    -H remote_host -t 80,443 -T 8080 -u 999 -U 500,1000-2000
  Customizing ssh:
    -H remote_host --sshcmd 'ssh -i /some/key -oStrictHostKeyChecking=no' ...";

#[derive(Parser, Debug)]
#[clap(
    author,
    version,
    about = "Check for correct listening ports on a local or remote machine.\n\
             Ports can be given as ranges, ie 80,443,8000-8100,10000",
    after_help = EXAMPLES
)]
struct Args {
    /// Host to reach over the remote shell (checks localhost otherwise).
    #[clap(short = 'H', value_name = "HOST")]
    host: Option<String>,

    /// Remote shell command and optional arguments.
    #[clap(
        long,
        value_name = "CMD",
        env = "CHECK_LISTENING_PORTS_SSHCMD",
        default_value = "ssh"
    )]
    sshcmd: String,

    /// List of required TCP ports or ranges, comma-delimited.
    #[clap(short = 't', value_name = "SPEC")]
    required_tcp: Option<String>,

    /// List of optional TCP ports or ranges, comma-delimited.
    #[clap(short = 'T', value_name = "SPEC")]
    optional_tcp: Option<String>,

    /// List of required UDP ports or ranges, comma-delimited.
    #[clap(short = 'u', value_name = "SPEC")]
    required_udp: Option<String>,

    /// List of optional UDP ports or ranges, comma-delimited.
    #[clap(short = 'U', value_name = "SPEC")]
    optional_udp: Option<String>,

    /// Debug output.
    #[clap(short = 'd')]
    debug: bool,
}

impl Args {
    fn port_check(&self) -> Result<PortCheck, CheckError> {
        let tcp = ProtocolCheck::new(
            Protocol::Tcp,
            spec(&self.required_tcp),
            spec(&self.optional_tcp),
        )?;
        let udp = ProtocolCheck::new(
            Protocol::Udp,
            spec(&self.required_udp),
            spec(&self.optional_udp),
        )?;
        Ok(PortCheck::new(tcp, udp))
    }

    fn client(&self) -> HostClient {
        match &self.host {
            Some(host) => HostClient::remote(host, &self.sshcmd),
            None => HostClient::local(),
        }
    }
}

fn spec(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

/// Plugin output goes to stdout, so logging stays off unless asked for.
fn init_logging(debug: bool) {
    let level = if debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::OFF
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stdout)
        .with_ansi(false)
        .with_target(false)
        .init();
}

async fn run() -> Result<Outcome, CheckError> {
    let args = Args::try_parse()?;
    init_logging(args.debug);
    debug!(?args, "parsed arguments");

    let check = args.port_check()?;
    check.run(&args.client()).await
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let (line, status) = match run().await {
        Ok(outcome) => (outcome.line, outcome.status),
        Err(err) => (err.message(), err.status()),
    };
    println!("{}", line.trim_end());
    ExitCode::from(status.code())
}
