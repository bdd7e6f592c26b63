use std::future::Future;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use std::{fmt, io};

use async_trait::async_trait;
use log::{debug, warn};
use rustls::pki_types::ServerName;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpStream, UdpSocket};
use tokio::time::timeout;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tokio_rustls::TlsConnector;

use crate::config::Protocol;
use crate::error::{map_encode_err, map_io_err, DNSCheckError, Result};
use crate::message::{check_response_id, DNSMessage};

// Timeouts for a single exchange. The check itself never overrides them.
pub const DEFAULT_DIAL_TIMEOUT: Duration = Duration::from_secs(2);
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(2);
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(2);

// No EDNS0 record is sent, so a compliant server never answers with more
// than the classic 512 byte limit over UDP.
pub const MAX_UDP_MESSAGE_SIZE: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    // Covers the TCP connect and, for TLS, the handshake.
    pub dial: Duration,
    pub read: Duration,
    pub write: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Timeouts {
            dial: DEFAULT_DIAL_TIMEOUT,
            read: DEFAULT_READ_TIMEOUT,
            write: DEFAULT_WRITE_TIMEOUT,
        }
    }
}

// The network/encryption mode used for an exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transport {
    Udp,
    Tcp,
    Tls { server_name: String },
}

impl Transport {
    pub fn for_protocol(protocol: Protocol, server_name: &str) -> Transport {
        match protocol {
            Protocol::Udp => Transport::Udp,
            Protocol::Tcp => Transport::Tcp,
            Protocol::Dot => Transport::Tls {
                server_name: server_name.to_owned(),
            },
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Udp => write!(f, "udp"),
            Transport::Tcp => write!(f, "tcp"),
            Transport::Tls { server_name } => write!(f, "tls ({server_name})"),
        }
    }
}

// One request/response round trip against a DNS server.
#[async_trait]
pub trait Exchange {
    async fn exchange(&mut self, query: &DNSMessage, endpoint: &str) -> Result<DNSMessage>;
}

// DnsClient performs exchanges over a real network transport.
pub struct DnsClient {
    transport: Transport,
    timeouts: Timeouts,
    tls: Option<TlsConnector>,
}

impl DnsClient {
    pub fn new(transport: Transport) -> DnsClient {
        DnsClient::with_timeouts(transport, Timeouts::default())
    }

    pub fn with_timeouts(transport: Transport, timeouts: Timeouts) -> DnsClient {
        let tls = match transport {
            Transport::Tls { .. } => Some(tls_connector()),
            _ => None,
        };
        DnsClient {
            transport,
            timeouts,
            tls,
        }
    }

    // Replaces the Mozilla root store used for DoT, e.g. to trust a private CA.
    pub fn with_tls_config(mut self, config: Arc<ClientConfig>) -> DnsClient {
        self.tls = Some(TlsConnector::from(config));
        self
    }

    async fn exchange_udp(&self, payload: &[u8], addr: SocketAddr) -> Result<Vec<u8>> {
        let local: SocketAddr = if addr.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };
        let socket = UdpSocket::bind(local)
            .await
            .map_err(|e| DNSCheckError::ConnectionFailure(local.to_string(), e.to_string()))?;
        socket
            .connect(addr)
            .await
            .map_err(|e| DNSCheckError::ConnectionFailure(addr.to_string(), e.to_string()))?;

        deadline("send", self.timeouts.write, socket.send(payload)).await?;

        let mut buf = vec![0; MAX_UDP_MESSAGE_SIZE];
        let no = deadline("receive", self.timeouts.read, socket.recv(&mut buf)).await?;
        buf.truncate(no);
        Ok(buf)
    }

    async fn exchange_tcp(&self, payload: &[u8], addr: SocketAddr) -> Result<Vec<u8>> {
        let connecting = async {
            TcpStream::connect(addr)
                .await
                .map_err(|e| DNSCheckError::ConnectionFailure(addr.to_string(), e.to_string()))
        };
        let mut stream = dial(addr, self.timeouts.dial, connecting).await?;
        exchange_framed(&mut stream, payload, &self.timeouts).await
    }

    async fn exchange_tls(&self, payload: &[u8], addr: SocketAddr, server_name: &str) -> Result<Vec<u8>> {
        let connector = self.tls.clone().unwrap_or_else(tls_connector);
        let name = ServerName::try_from(server_name.to_owned())
            .map_err(|e| DNSCheckError::TlsFailure(server_name.to_owned(), e.to_string()))?;

        let connecting = async {
            let tcp = TcpStream::connect(addr)
                .await
                .map_err(|e| DNSCheckError::ConnectionFailure(addr.to_string(), e.to_string()))?;
            connector
                .connect(name, tcp)
                .await
                .map_err(|e| DNSCheckError::TlsFailure(server_name.to_owned(), e.to_string()))
        };
        let mut stream = dial(addr, self.timeouts.dial, connecting).await?;
        exchange_framed(&mut stream, payload, &self.timeouts).await
    }
}

#[async_trait]
impl Exchange for DnsClient {
    async fn exchange(&mut self, query: &DNSMessage, endpoint: &str) -> Result<DNSMessage> {
        let addr: SocketAddr = endpoint
            .parse()
            .map_err(|e: std::net::AddrParseError| DNSCheckError::ConnectionFailure(endpoint.to_owned(), e.to_string()))?;
        let payload = query.encode()?;

        debug!("sending {} byte query id {} to {} over {}", payload.len(), query.id(), addr, self.transport);
        let reply = match &self.transport {
            Transport::Udp => self.exchange_udp(&payload, addr).await?,
            Transport::Tcp => self.exchange_tcp(&payload, addr).await?,
            Transport::Tls { server_name } => self.exchange_tls(&payload, addr, server_name).await?,
        };

        let response = DNSMessage::decode(&reply)?;
        check_response_id(query, &response)?;
        debug!(
            "received {} byte response id {}: {} answers, rcode {}",
            reply.len(),
            response.id(),
            response.answers().len(),
            response.header().rcode()
        );
        if response.header().is_truncated() {
            warn!("response from {} is truncated, using the partial answer section", addr);
        }
        Ok(response)
    }
}

fn tls_connector() -> TlsConnector {
    let mut root_store = RootCertStore::empty();
    root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let config = ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();
    TlsConnector::from(Arc::new(config))
}

async fn dial<S>(addr: SocketAddr, limit: Duration, connecting: impl Future<Output = Result<S>>) -> Result<S> {
    match timeout(limit, connecting).await {
        Ok(stream) => stream,
        Err(_) => Err(DNSCheckError::Timeout(format!("connect to {addr}"), limit)),
    }
}

async fn deadline<T>(step: &str, limit: Duration, op: impl Future<Output = io::Result<T>>) -> Result<T> {
    match timeout(limit, op).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(map_io_err(step, &e)),
        Err(_) => Err(DNSCheckError::Timeout(step.to_owned(), limit)),
    }
}

// Stream transports prefix every message with its length as a u16.
async fn exchange_framed<S>(stream: &mut S, payload: &[u8], timeouts: &Timeouts) -> Result<Vec<u8>>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    let len = u16::try_from(payload.len()).map_err(|e| map_encode_err("length prefix", &e))?;
    let mut framed = Vec::with_capacity(payload.len() + 2);
    framed.extend(len.to_be_bytes());
    framed.extend(payload);

    deadline("send", timeouts.write, async {
        stream.write_all(&framed).await?;
        stream.flush().await
    })
    .await?;

    // One read deadline covers the length prefix and the body.
    deadline("receive", timeouts.read, async {
        let mut len_bytes = [0u8; 2];
        stream.read_exact(&mut len_bytes).await?;
        let mut reply = vec![0; usize::from(u16::from_be_bytes(len_bytes))];
        stream.read_exact(&mut reply).await?;
        Ok(reply)
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_protocols_to_transports() {
        assert_eq!(Transport::for_protocol(Protocol::Udp, ""), Transport::Udp);
        assert_eq!(Transport::for_protocol(Protocol::Tcp, "ignored"), Transport::Tcp);
        assert_eq!(
            Transport::for_protocol(Protocol::Dot, "dns.example"),
            Transport::Tls {
                server_name: String::from("dns.example")
            }
        );
    }

    #[test]
    fn default_timeouts_are_two_seconds() {
        let timeouts = Timeouts::default();
        assert_eq!(timeouts.dial, Duration::from_secs(2));
        assert_eq!(timeouts.read, Duration::from_secs(2));
        assert_eq!(timeouts.write, Duration::from_secs(2));
    }

    // Waits `delay` before the length prefix and again before the body.
    async fn slow_framed_reply(delay: Duration) -> Result<Vec<u8>> {
        let (mut client, mut server) = tokio::io::duplex(64);
        tokio::spawn(async move {
            let mut query = [0u8; 5];
            server.read_exact(&mut query).await?;
            tokio::time::sleep(delay).await;
            server.write_all(&[0, 3]).await?;
            tokio::time::sleep(delay).await;
            server.write_all(&[1, 2, 3]).await
        });
        let timeouts = Timeouts {
            read: Duration::from_millis(200),
            ..Timeouts::default()
        };
        exchange_framed(&mut client, &[9, 9, 9], &timeouts).await
    }

    #[tokio::test]
    async fn framed_reply_shares_one_read_deadline() {
        assert_eq!(slow_framed_reply(Duration::from_millis(10)).await.unwrap(), vec![1, 2, 3]);

        // each half arrives within the deadline, the whole reply does not
        let err = slow_framed_reply(Duration::from_millis(150)).await.unwrap_err();
        assert!(matches!(err, DNSCheckError::Timeout(..)), "{err}");
    }

    #[test]
    fn only_tls_builds_a_connector() {
        assert!(DnsClient::new(Transport::Udp).tls.is_none());
        assert!(DnsClient::new(Transport::Tls {
            server_name: String::from("dns.example")
        })
        .tls
        .is_some());
    }
}
