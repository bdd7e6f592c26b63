//! Validation, probing and the verdict they produce.
//!
//! A run goes `validate` → `probe`. Validation failures end the run with a
//! WARNING before anything touches the network. Probing issues an A query and
//! then an AAAA query; the first failed exchange ends the run with CRITICAL.

use std::fmt;
use std::net::IpAddr;

use itertools::Itertools;
use log::debug;
use strum_macros::{AsRefStr, Display};

use crate::config::{AnswerPolicy, CheckConfig, ProbeTarget};
use crate::domain_name::DomainName;
use crate::error::{DNSCheckError, Result};
use crate::message::DNSMessage;
use crate::resource_record::RecordData;
use crate::rr_types::RRType;
use crate::transport::{DnsClient, Exchange, Transport};
use crate::utils;

/// Name the check reports itself under.
pub const CHECK_NAME: &str = "sensu-dns-server-check";

/// Tri-state health outcome, in the order monitoring backends rank them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, AsRefStr, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Status {
    Ok,
    Warning,
    Critical,
}

impl Status {
    pub fn exit_code(self) -> u8 {
        match self {
            Status::Ok => 0,
            Status::Warning => 1,
            Status::Critical => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub status: Status,
    pub message: Option<String>,
}

impl Verdict {
    pub fn ok(message: impl Into<String>) -> Verdict {
        Verdict {
            status: Status::Ok,
            message: Some(message.into()),
        }
    }

    pub fn warning(message: impl Into<String>) -> Verdict {
        Verdict {
            status: Status::Warning,
            message: Some(message.into()),
        }
    }

    pub fn critical(message: impl Into<String>) -> Verdict {
        Verdict {
            status: Status::Critical,
            message: Some(message.into()),
        }
    }

    /// The single summary line printed for the monitoring backend.
    pub fn render(&self, check_name: &str) -> String {
        match &self.message {
            Some(message) => format!("{} {}: {}", check_name, self.status, message),
            None => format!("{} {}", check_name, self.status),
        }
    }
}

/// Addresses gathered across both queries, in the order the server sent them.
/// Duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressSet(Vec<IpAddr>);

impl AddressSet {
    pub fn push(&mut self, ip: impl Into<IpAddr>) {
        self.0.push(ip.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[IpAddr] {
        &self.0
    }
}

impl fmt::Display for AddressSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.iter().join(" "))
    }
}

/// Outcome of validation: either a target to probe or the verdict to report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Proceed(ProbeTarget),
    Rejected(Verdict),
}

pub fn validate(config: &CheckConfig) -> Validation {
    match ProbeTarget::try_from(config) {
        Ok(target) => Validation::Proceed(target),
        Err(e) => Validation::Rejected(Verdict::warning(e.to_string())),
    }
}

/// Runs both queries and maps the outcome to a verdict.
pub async fn probe<E>(target: &ProbeTarget, client: &mut E) -> Verdict
where
    E: Exchange + Send + ?Sized,
{
    match collect_addresses(target, client).await {
        Err(e) => Verdict::critical(format!("failed to run check, error: {e}")),
        Ok(addresses) if addresses.is_empty() => Verdict::warning(format!("no records found for {}", target.record)),
        Ok(addresses) => Verdict::ok(format!("{} returns {}", target.record, addresses)),
    }
}

/// Queries A then AAAA for the target record and gathers every address
/// returned. The first failed exchange aborts; nothing is retried.
pub async fn collect_addresses<E>(target: &ProbeTarget, client: &mut E) -> Result<AddressSet>
where
    E: Exchange + Send + ?Sized,
{
    let endpoint = target.endpoint();
    let mut addresses = AddressSet::default();
    let mut query = DNSMessage::default();

    for q_type in [RRType::A, RRType::AAAA] {
        query.set_question(DomainName::new(target.record.as_str()), q_type, rand::random::<u16>());
        debug!("querying {} for {} {}", endpoint, target.record, q_type.as_ref());

        let response = client.exchange(&query, &endpoint).await?;
        extract_addresses(&response, q_type, target.answer_policy, &mut addresses)?;
    }
    Ok(addresses)
}

// Appends every answer of the queried type, in response order. Answers of any
// other type are handled according to `policy`.
fn extract_addresses(
    response: &DNSMessage,
    q_type: RRType,
    policy: AnswerPolicy,
    addresses: &mut AddressSet,
) -> Result<()> {
    for answer in response.answers() {
        match (q_type, answer.data()) {
            (RRType::A, RecordData::A(ip)) => addresses.push(*ip),
            (RRType::AAAA, RecordData::AAAA(ip)) => addresses.push(*ip),
            (_, data) => match policy {
                AnswerPolicy::Strict => {
                    return Err(DNSCheckError::UnexpectedAnswerType(
                        answer.type_name(),
                        q_type.as_ref().to_owned(),
                    ))
                }
                AnswerPolicy::Skip => {
                    let raw = match data {
                        RecordData::Other { raw, .. } => utils::hex_dump(raw),
                        other => format!("{other:?}"),
                    };
                    debug!(
                        "skipping {} answer for {} in {} response: {}",
                        answer.type_name(),
                        answer.name(),
                        q_type.as_ref(),
                        raw
                    );
                }
            },
        }
    }
    Ok(())
}

/// Validates `config` and, if it holds up, probes with a client built by
/// `connect` for the selected transport.
pub async fn execute_with<E, F>(config: &CheckConfig, connect: F) -> Verdict
where
    E: Exchange + Send,
    F: FnOnce(&Transport) -> E,
{
    let target = match validate(config) {
        Validation::Proceed(target) => target,
        Validation::Rejected(verdict) => return verdict,
    };
    debug!("checking {} over {}", target.endpoint(), target.transport);
    let mut client = connect(&target.transport);
    probe(&target, &mut client).await
}

/// Validates and probes using the real network client.
pub async fn execute(config: &CheckConfig) -> Verdict {
    execute_with(config, |transport| DnsClient::new(transport.clone())).await
}
