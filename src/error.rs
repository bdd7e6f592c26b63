use std::error::Error;
use std::time::Duration;

use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum DNSCheckError {
    #[error("error while decoding `{0}`: `{1}`")]
    Decode(String, String),
    #[error("error while encoding `{0}`: `{1}`")]
    Encode(String, String),
    #[error("error while parsing bytes")]
    Parse,
    #[error("invalid record type: `{0}`")]
    InvalidRecordType(String),
    #[error("failed while trying to connect to `{0}`: `{1}`")]
    ConnectionFailure(String, String),
    #[error("failed while trying to `{0}` data: `{1}`")]
    IOFailure(String, String),
    #[error("timed out after {1:?} while trying to `{0}`")]
    Timeout(String, Duration),
    #[error("tls session with `{0}` failed: `{1}`")]
    TlsFailure(String, String),
    #[error("response id `{0}` does not match query id `{1}`")]
    IdMismatch(u16, u16),
    #[error("unexpected {0} record in answer to {1} query")]
    UnexpectedAnswerType(String, String),
}

pub type Result<T> = std::result::Result<T, DNSCheckError>;

pub fn map_decode_err(step: &str, err: &impl Error) -> DNSCheckError {
    DNSCheckError::Decode(String::from(step), err.to_string())
}

pub fn map_encode_err(step: &str, err: &impl Error) -> DNSCheckError {
    DNSCheckError::Encode(String::from(step), err.to_string())
}

pub fn map_io_err(step: &str, err: &impl Error) -> DNSCheckError {
    DNSCheckError::IOFailure(String::from(step), err.to_string())
}

// Reasons a check cannot run at all. These never reach the network.
#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("--server or CHECK_SERVER environment variable is required")]
    MissingServer,
    #[error("no valid server IP: `{0}`")]
    InvalidServer(String),
    #[error("unknown protocol `{0}`, expected one of udp, tcp, dot")]
    UnknownProtocol(String),
    #[error("--server-name or CHECK_SERVER_NAME environment variable is required for protocol DoT")]
    MissingServerName,
}
