//! Check modules for tls-probe
//!
//! This module contains the TCP connector and the TLS handshake probe.

pub mod handshake;
pub mod tcp;

pub use handshake::{parse_status_line, HandshakeProbe};
pub use tcp::TcpConnector;
