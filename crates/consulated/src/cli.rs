//! Command-line surface.

use std::time::Duration;

use clap::Parser;
use consulate_agent::config::{AgentOptions, DEFAULT_REGISTRY_ADDR};
use consulate_agent::parse_duration;

const LONG_ABOUT: &str = "\
Registers a service with the local Consul agent and tracks its health. If the
command exits without an error, the service is deregistered. Otherwise, its
check is marked as failing.

To monitor an external command, add the command arguments after all consulate
options, e.g.

    consulate --name my-service -- my_script.sh arg1 arg2

stdin, stdout and stderr are piped through from the monitored command. Without
a command, consulate heartbeats the service until it is terminated.";

#[derive(Debug, Parser)]
#[command(
    name = "consulate",
    about = "Register a command as a Consul service and track its health",
    long_about = LONG_ABOUT,
    version,
)]
pub struct Cli {
    /// The Consul agent to connect to.
    #[arg(long, default_value = DEFAULT_REGISTRY_ADDR)]
    pub consul: String,

    /// The service name to register with.
    #[arg(long)]
    pub name: String,

    /// The ID to register with. Defaults to NAME, or NAME:PORT when a port is given.
    #[arg(long)]
    pub id: Option<String>,

    /// TTL of the generated health check.
    #[arg(long, default_value = "30s", value_parser = parse_duration)]
    pub ttl: Duration,

    /// Health check update interval.
    #[arg(long, default_value = "10s", value_parser = parse_duration)]
    pub interval: Duration,

    /// JSON containing a check. If given, replaces the default TTL check.
    #[arg(long)]
    pub check: Option<String>,

    /// The port the service operates on.
    #[arg(long)]
    pub port: Option<u16>,

    /// Comma delimited tags to add when registering the service.
    #[arg(long)]
    pub tags: Option<String>,

    /// Command to monitor, followed by its arguments.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

impl Cli {
    pub fn into_options(self) -> AgentOptions {
        AgentOptions {
            registry_addr: self.consul,
            name: self.name,
            id: self.id,
            port: self.port,
            tags: self.tags,
            ttl: self.ttl,
            interval: self.interval,
            check: self.check,
            command: self.command,
        }
    }
}
