//! Command-line arguments and logging setup for the check binary.

use clap::{ArgAction, Parser};
use log::LevelFilter;

use crate::config::{AnswerPolicy, CheckConfig, DEFAULT_PORT, DEFAULT_PROTOCOL, DEFAULT_RECORD};

/// Check DNS Server functionality
///
/// Resolves a record against a DNS server over UDP, TCP or DNS-over-TLS and
/// exits 0 (OK), 1 (WARNING) or 2 (CRITICAL).
#[derive(Parser, Debug)]
#[command(name = "sensu-dns-server-check")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Port to check
    #[arg(short = 'p', long, env = "CHECK_PORT", default_value_t = DEFAULT_PORT,
          value_parser = clap::value_parser!(u16).range(1..))]
    pub port: u16,

    /// DNS Protocol to check (udp, tcp, dot)
    #[arg(short = 'P', long, env = "CHECK_PROTOCOL", default_value = DEFAULT_PROTOCOL)]
    pub protocol: String,

    /// DNS Record to check
    #[arg(short = 'r', long, env = "CHECK_RECORD", default_value = DEFAULT_RECORD)]
    pub record: String,

    /// DNS Server to check
    #[arg(short = 's', long, env = "CHECK_SERVER", default_value = "")]
    pub server: String,

    /// Hostname for DoT
    #[arg(short = 'n', long, env = "CHECK_SERVER_NAME", default_value = "")]
    pub server_name: String,

    /// How to treat answers whose type differs from the query type
    #[arg(long, env = "CHECK_ANSWER_POLICY", value_enum, default_value_t = AnswerPolicy::Strict)]
    pub answer_policy: AnswerPolicy,

    /// Log diagnostics to stderr (-v info, -vv debug)
    #[arg(short = 'v', long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn into_config(self) -> CheckConfig {
        CheckConfig {
            server: self.server,
            port: self.port,
            protocol: self.protocol,
            record: self.record,
            server_name: self.server_name,
            answer_policy: self.answer_policy,
        }
    }

    /// Level for this crate's own log output. `None` leaves `RUST_LOG` in charge.
    pub fn log_level(&self) -> Option<LevelFilter> {
        match self.verbose {
            0 => None,
            1 => Some(LevelFilter::Info),
            _ => Some(LevelFilter::Debug),
        }
    }
}

/// Initializes `env_logger` on stderr. Stdout carries only the summary line.
///
/// The level defaults to `warn`, `RUST_LOG` can change it, and `-v` wins
/// over both for this crate.
pub fn init_logger(level: Option<LevelFilter>) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(LevelFilter::Warn);
    builder.parse_env(env_logger::Env::default());
    if let Some(level) = level {
        builder.filter_module("dns_server_check", level);
    }
    builder.target(env_logger::Target::Stderr);
    // Another logger may already be installed when embedded; that's fine.
    let _ = builder.try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["sensu-dns-server-check"];
        argv.extend(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn short_flags_bind_every_option() {
        let cli = parse(&["-s", "::1", "-p", "853", "-P", "dot", "-n", "dns.example", "-r", "example.org"]);
        let config = cli.into_config();
        assert_eq!(config.server, "::1");
        assert_eq!(config.port, 853);
        assert_eq!(config.protocol, "dot");
        assert_eq!(config.server_name, "dns.example");
        assert_eq!(config.record, "example.org");
        assert_eq!(config.answer_policy, AnswerPolicy::Strict);
    }

    #[test]
    fn long_flags_bind_every_option() {
        let cli = parse(&[
            "--server",
            "9.9.9.9",
            "--port",
            "5353",
            "--protocol",
            "tcp",
            "--record",
            "example.net",
            "--answer-policy",
            "skip",
        ]);
        assert_eq!(cli.log_level(), None);
        let config = cli.into_config();
        assert_eq!(config.server, "9.9.9.9");
        assert_eq!(config.port, 5353);
        assert_eq!(config.protocol, "tcp");
        assert_eq!(config.answer_policy, AnswerPolicy::Skip);
    }

    #[test]
    fn unknown_protocols_reach_validation() {
        let config = parse(&["-P", "quic"]).into_config();
        assert_eq!(config.protocol, "quic");
    }

    #[test]
    fn port_must_be_positive() {
        assert!(Cli::try_parse_from(["check", "-p", "0"]).is_err());
        assert!(Cli::try_parse_from(["check", "-p", "http"]).is_err());
    }

    #[test]
    fn verbosity_raises_log_level() {
        assert_eq!(parse(&["-v"]).log_level(), Some(LevelFilter::Info));
        assert_eq!(parse(&["-vv"]).log_level(), Some(LevelFilter::Debug));
    }
}
