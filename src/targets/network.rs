//! Network target (UDP and TCP).
//!
//! # Responsibilities
//! - Parse `scheme://host:port` addresses (`udp`, `udp4`, `udp6`, `tcp`, `tcp4`, `tcp6`)
//! - Resolve and connect lazily on first write
//! - Reconnect when the address is changed at runtime
//! - Enforce a maximum message size (split, discard, or fail)

use std::any::Any;
use std::fmt;
use std::io::Write;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs, UdpSocket};
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use url::{Host, Url};

use crate::layout::Layout;
use crate::service::LogEvent;
use crate::targets::{Target, TargetError, TargetKind};

/// Default maximum message size in bytes.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 65_000;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Transport protocol of a network address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Udp,
    Tcp,
}

/// Address family restriction implied by the scheme (`udp4`, `tcp6`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Any,
    V4,
    V6,
}

/// What to do with a rendered message larger than `max_message_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Overflow {
    /// Send the message in consecutive chunks.
    #[default]
    Split,
    /// Drop the message.
    Discard,
    /// Report `TargetError::MessageTooLarge`.
    Error,
}

/// A parsed `scheme://host:port` address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkAddress {
    pub protocol: Protocol,
    pub family: Family,
    pub host: String,
    pub port: u16,
}

impl NetworkAddress {
    pub fn parse(address: &str) -> Result<Self, TargetError> {
        let invalid = |reason: &str| TargetError::InvalidAddress {
            address: address.to_string(),
            reason: reason.to_string(),
        };

        let url = Url::parse(address).map_err(|e| invalid(&e.to_string()))?;

        let (protocol, family) = match url.scheme() {
            "udp" => (Protocol::Udp, Family::Any),
            "udp4" => (Protocol::Udp, Family::V4),
            "udp6" => (Protocol::Udp, Family::V6),
            "tcp" => (Protocol::Tcp, Family::Any),
            "tcp4" => (Protocol::Tcp, Family::V4),
            "tcp6" => (Protocol::Tcp, Family::V6),
            other => return Err(invalid(&format!("unsupported scheme '{}'", other))),
        };

        let host = match url.host() {
            Some(Host::Domain(domain)) if !domain.is_empty() => domain.to_string(),
            Some(Host::Ipv4(ip)) => ip.to_string(),
            Some(Host::Ipv6(ip)) => ip.to_string(),
            _ => return Err(invalid("missing host")),
        };
        let port = url.port().ok_or_else(|| invalid("missing port"))?;

        Ok(Self {
            protocol,
            family,
            host,
            port,
        })
    }

    /// Resolve to the first socket address matching the family restriction.
    pub fn resolve(&self) -> Result<SocketAddr, TargetError> {
        let resolve_error = |reason: String| TargetError::Resolve {
            address: self.to_string(),
            reason,
        };

        let candidates = (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|e| resolve_error(e.to_string()))?;

        candidates
            .into_iter()
            .find(|addr| match self.family {
                Family::Any => true,
                Family::V4 => addr.is_ipv4(),
                Family::V6 => addr.is_ipv6(),
            })
            .ok_or_else(|| resolve_error("no address of the requested family".to_string()))
    }
}

impl fmt::Display for NetworkAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scheme = match (self.protocol, self.family) {
            (Protocol::Udp, Family::Any) => "udp",
            (Protocol::Udp, Family::V4) => "udp4",
            (Protocol::Udp, Family::V6) => "udp6",
            (Protocol::Tcp, Family::Any) => "tcp",
            (Protocol::Tcp, Family::V4) => "tcp4",
            (Protocol::Tcp, Family::V6) => "tcp6",
        };
        if self.host.contains(':') {
            write!(f, "{}://[{}]:{}", scheme, self.host, self.port)
        } else {
            write!(f, "{}://{}:{}", scheme, self.host, self.port)
        }
    }
}

impl FromStr for NetworkAddress {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NetworkAddress::parse(s)
    }
}

enum Transport {
    Udp { socket: UdpSocket, peer: SocketAddr },
    Tcp(TcpStream),
}

struct Connection {
    /// Address string this connection was opened for.
    address: Arc<String>,
    transport: Transport,
}

impl Connection {
    fn open(target: &str, address: Arc<String>) -> Result<Self, TargetError> {
        let parsed = NetworkAddress::parse(&address)?;
        let peer = parsed.resolve()?;
        let io_error = |e: std::io::Error| TargetError::io(target, e);

        let transport = match parsed.protocol {
            Protocol::Udp => {
                let local: SocketAddr = if peer.is_ipv4() {
                    ([0, 0, 0, 0], 0).into()
                } else {
                    (std::net::Ipv6Addr::UNSPECIFIED, 0).into()
                };
                let socket = UdpSocket::bind(local).map_err(io_error)?;
                Transport::Udp { socket, peer }
            }
            Protocol::Tcp => {
                let stream = TcpStream::connect_timeout(&peer, CONNECT_TIMEOUT).map_err(io_error)?;
                stream.set_nodelay(true).map_err(io_error)?;
                Transport::Tcp(stream)
            }
        };

        tracing::debug!(address = %address, peer = %peer, "Network target connected");
        Ok(Self { address, transport })
    }

    fn send(&mut self, payload: &[u8]) -> std::io::Result<()> {
        match &mut self.transport {
            Transport::Udp { socket, peer } => socket.send_to(payload, *peer).map(|_| ()),
            Transport::Tcp(stream) => stream.write_all(payload),
        }
    }
}

/// Sends rendered events to a UDP or TCP endpoint.
///
/// The address can be changed at runtime with [`NetworkTarget::set_address`];
/// the next write reconnects to the new endpoint.
pub struct NetworkTarget {
    name: String,
    layout: Layout,
    address: ArcSwap<String>,
    max_message_size: usize,
    on_overflow: Overflow,
    newline: bool,
    connection: Mutex<Option<Connection>>,
}

impl NetworkTarget {
    pub fn new(name: &str, address: &str, layout: Layout) -> Result<Self, TargetError> {
        NetworkAddress::parse(address)?;
        Ok(Self {
            name: name.to_string(),
            layout,
            address: ArcSwap::from_pointee(address.to_string()),
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            on_overflow: Overflow::Split,
            newline: false,
            connection: Mutex::new(None),
        })
    }

    pub fn with_max_message_size(mut self, max_message_size: usize) -> Self {
        self.max_message_size = max_message_size;
        self
    }

    pub fn with_overflow(mut self, on_overflow: Overflow) -> Self {
        self.on_overflow = on_overflow;
        self
    }

    /// Append `\n` to every message.
    pub fn with_newline(mut self, newline: bool) -> Self {
        self.newline = newline;
        self
    }

    /// Current address, exactly as it was last set.
    pub fn address(&self) -> String {
        self.address.load().as_ref().clone()
    }

    /// Point the target at a new endpoint.
    ///
    /// The address is validated but not resolved; resolution happens on the
    /// next write.
    pub fn set_address(&self, address: &str) -> Result<(), TargetError> {
        NetworkAddress::parse(address)?;
        let previous = self.address.swap(Arc::new(address.to_string()));
        self.connection
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        tracing::info!(
            target_name = %self.name,
            previous = %previous,
            address = %address,
            "Network target address changed"
        );
        Ok(())
    }

    fn payload(&self, event: &LogEvent) -> String {
        let mut payload = self.layout.render(event);
        if self.newline {
            payload.push('\n');
        }
        payload
    }
}

impl fmt::Debug for NetworkTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkTarget")
            .field("name", &self.name)
            .field("address", &self.address())
            .field("max_message_size", &self.max_message_size)
            .field("on_overflow", &self.on_overflow)
            .field("newline", &self.newline)
            .finish()
    }
}

impl Target for NetworkTarget {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> TargetKind {
        TargetKind::Network
    }

    fn write(&self, event: &LogEvent) -> Result<(), TargetError> {
        let payload = self.payload(event);
        let bytes = payload.as_bytes();
        let max = self.max_message_size.max(1);

        if bytes.len() > max {
            match self.on_overflow {
                Overflow::Error => {
                    return Err(TargetError::MessageTooLarge {
                        target: self.name.clone(),
                        size: bytes.len(),
                        max,
                    })
                }
                Overflow::Discard => {
                    tracing::debug!(target_name = %self.name, size = bytes.len(), "Oversized message discarded");
                    return Ok(());
                }
                Overflow::Split => {}
            }
        }

        let mut guard = self.connection.lock().unwrap_or_else(PoisonError::into_inner);
        let current = self.address.load_full();
        let stale = guard
            .as_ref()
            .map_or(true, |conn| conn.address.as_str() != current.as_str());
        if stale {
            *guard = Some(Connection::open(&self.name, current)?);
        }

        if let Some(conn) = guard.as_mut() {
            for chunk in bytes.chunks(max) {
                if let Err(e) = conn.send(chunk) {
                    *guard = None;
                    return Err(TargetError::io(&self.name, e));
                }
            }
        }
        Ok(())
    }

    fn flush(&self) -> Result<(), TargetError> {
        let mut guard = self.connection.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(Connection {
            transport: Transport::Tcp(stream),
            ..
        }) = guard.as_mut()
        {
            stream.flush().map_err(|e| TargetError::io(&self.name, e))?;
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
