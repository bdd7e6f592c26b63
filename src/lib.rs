//! A monitoring check that verifies a DNS server resolves a record over UDP,
//! TCP or DNS-over-TLS and reports OK, WARNING or CRITICAL.

pub mod check;
pub mod cli;
pub mod config;
pub mod domain_name;
pub mod error;
pub mod message;
pub mod query;
pub mod resource_record;
pub mod rr_types;
pub mod transport;
pub mod utils;
