//! Shared utilities for integration testing.

use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;
use std::time::Duration;

use logger_service::config::LoggingRule;
use logger_service::layout::Layout;
use logger_service::targets::{MemoryTarget, NetworkTarget};
use logger_service::{LogLevel, LoggingConfiguration, StructuredLoggingService};

/// A local UDP socket standing in for a remote log collector.
pub struct UdpCollector {
    socket: UdpSocket,
}

impl UdpCollector {
    pub fn bind() -> Self {
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        socket
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        Self { socket }
    }

    pub fn addr(&self) -> SocketAddr {
        self.socket.local_addr().unwrap()
    }

    /// Address in the form a network target accepts.
    pub fn url(&self) -> String {
        format!("udp4://{}", self.addr())
    }

    /// Next datagram as text; panics on timeout.
    pub fn recv(&self) -> String {
        let mut buf = [0u8; 65_536];
        let (len, _) = self.socket.recv_from(&mut buf).expect("no datagram received");
        String::from_utf8_lossy(&buf[..len]).into_owned()
    }

    /// Whether anything arrives within `wait`.
    #[allow(dead_code)]
    pub fn is_quiet_for(&self, wait: Duration) -> bool {
        self.socket.set_read_timeout(Some(wait)).unwrap();
        let mut buf = [0u8; 65_536];
        let quiet = self.socket.recv_from(&mut buf).is_err();
        self.socket
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        quiet
    }
}

/// Structured service with a `udp` target pointed at `address` and a `mem`
/// target capturing `${message}`, both receiving `Info` and above.
#[allow(dead_code)]
pub fn udp_service(address: &str) -> StructuredLoggingService {
    let mut configuration = LoggingConfiguration::default();
    configuration
        .add_target(Arc::new(
            NetworkTarget::new("udp", address, Layout::parse("${message}").unwrap()).unwrap(),
        ))
        .unwrap();
    configuration
        .add_target(Arc::new(MemoryTarget::new(
            "mem",
            Layout::parse("${message}").unwrap(),
        )))
        .unwrap();
    configuration.add_rule(LoggingRule::new(LogLevel::Info, &["udp", "mem"]));
    StructuredLoggingService::new(configuration)
}
