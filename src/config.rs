//! Check configuration and its validated form.

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use clap::ValueEnum;
use strum_macros::{AsRefStr, EnumString};

use crate::error::ConfigError;
use crate::transport::Transport;

pub const DEFAULT_PORT: u16 = 53;
pub const DEFAULT_PROTOCOL: &str = "udp";
pub const DEFAULT_RECORD: &str = "sensu.io";

/// DNS transport selected by name on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Protocol {
    Udp,
    Tcp,
    Dot,
}

/// What to do with an answer whose type differs from the queried type,
/// e.g. a CNAME sitting in front of the A records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum AnswerPolicy {
    /// Treat it as a fatal fault and report CRITICAL.
    #[default]
    Strict,
    /// Ignore it and keep collecting addresses.
    Skip,
}

/// Raw configuration for one check run, as supplied by flags and environment.
///
/// Nothing here is trusted; [`ProbeTarget::try_from`] does the validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckConfig {
    pub server: String,
    pub port: u16,
    pub protocol: String,
    pub record: String,
    pub server_name: String,
    pub answer_policy: AnswerPolicy,
}

impl Default for CheckConfig {
    fn default() -> Self {
        CheckConfig {
            server: String::new(),
            port: DEFAULT_PORT,
            protocol: DEFAULT_PROTOCOL.to_owned(),
            record: DEFAULT_RECORD.to_owned(),
            server_name: String::new(),
            answer_policy: AnswerPolicy::default(),
        }
    }
}

/// A configuration that passed validation and can be probed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTarget {
    pub server: IpAddr,
    pub port: u16,
    pub transport: Transport,
    pub record: String,
    pub answer_policy: AnswerPolicy,
}

impl ProbeTarget {
    /// The `host:port` string the query is sent to. IPv6 literals are bracketed.
    pub fn endpoint(&self) -> String {
        SocketAddr::new(self.server, self.port).to_string()
    }
}

impl TryFrom<&CheckConfig> for ProbeTarget {
    type Error = ConfigError;

    // Checks run in order and stop at the first failure.
    fn try_from(config: &CheckConfig) -> Result<Self, Self::Error> {
        if config.server.is_empty() {
            return Err(ConfigError::MissingServer);
        }
        let server = IpAddr::from_str(&config.server).map_err(|_| ConfigError::InvalidServer(config.server.clone()))?;
        let protocol =
            Protocol::from_str(&config.protocol).map_err(|_| ConfigError::UnknownProtocol(config.protocol.clone()))?;
        if protocol == Protocol::Dot && config.server_name.is_empty() {
            return Err(ConfigError::MissingServerName);
        }

        Ok(ProbeTarget {
            server,
            port: config.port,
            transport: Transport::for_protocol(protocol, &config.server_name),
            record: config.record.clone(),
            answer_policy: config.answer_policy,
        })
    }
}
