//! Data models for tls-probe
//!
//! This module contains the data structures a probe consumes and produces.

pub mod probe_result;
pub mod ssl_result;
pub mod target;

pub use probe_result::{ErrorKind, ProbeReport, ProbeResult};
pub use ssl_result::{CipherSuiteInfo, SessionInfo, TlsProtocol};
pub use target::ProbeTarget;
