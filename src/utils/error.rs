//! Custom error types for tls-probe
//!
//! This module defines domain-specific error types using `thiserror` for
//! the failure modes of a single probe: target validation, policy
//! application, TCP connection, TLS handshake, and the HTTP status read.

use crate::models::ErrorKind;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

/// Everything that can end a probe attempt
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Invalid target: {0}")]
    InvalidTarget(#[from] TargetError),

    #[error("TLS policy error: {0}")]
    Policy(#[from] PolicyError),

    #[error("TCP connection error: {0}")]
    Tcp(#[from] TcpError),

    #[error("TLS handshake with {host} failed: {source}")]
    Tls {
        host: String,
        #[source]
        source: rustls::Error,
    },

    #[error("{host} closed the connection during the TLS handshake")]
    HandshakeClosed { host: String },

    #[error("TLS handshake with {host} timed out after {timeout:?}")]
    HandshakeTimeout { host: String, timeout: Duration },

    #[error("Timed out after {timeout:?} waiting for the HTTP response from {host}")]
    ReadTimeout { host: String, timeout: Duration },

    #[error("Malformed HTTP response from {host}: {message}")]
    Http { host: String, message: String },

    #[error("I/O error while {stage}: {source}")]
    Io {
        stage: &'static str,
        #[source]
        source: io::Error,
    },
}

impl ProbeError {
    /// Map this failure onto the closed diagnostic classification
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProbeError::InvalidTarget(_) => ErrorKind::Other,
            ProbeError::Policy(_) => ErrorKind::HandshakeFailure,
            ProbeError::Tcp(e) => e.kind(),
            ProbeError::Tls { source, .. } => classify_tls(source),
            ProbeError::HandshakeClosed { .. } => ErrorKind::HandshakeFailure,
            ProbeError::HandshakeTimeout { .. } | ProbeError::ReadTimeout { .. } => {
                ErrorKind::Timeout
            }
            ProbeError::Io { source, .. } if source.kind() == io::ErrorKind::TimedOut => {
                ErrorKind::Timeout
            }
            ProbeError::Http { .. } | ProbeError::Io { .. } => ErrorKind::Other,
        }
    }

    /// Build an error from an I/O failure on the TLS stream.
    ///
    /// `tokio-rustls` reports protocol failures as `io::Error`s wrapping the
    /// `rustls::Error`; those are unwrapped so they classify by type.
    pub fn from_tls_io(host: &str, stage: &'static str, err: io::Error) -> Self {
        if let Some(source) = err
            .get_ref()
            .and_then(|inner| inner.downcast_ref::<rustls::Error>())
        {
            return ProbeError::Tls {
                host: host.to_string(),
                source: source.clone(),
            };
        }

        match err.kind() {
            io::ErrorKind::UnexpectedEof
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
                if stage == HANDSHAKE_STAGE =>
            {
                ProbeError::HandshakeClosed {
                    host: host.to_string(),
                }
            }
            _ => ProbeError::Io { stage, source: err },
        }
    }

    /// Human-readable descriptions of every underlying cause, outermost first
    pub fn causes(&self) -> Vec<String> {
        let mut causes = Vec::new();
        let mut current = std::error::Error::source(self);
        while let Some(err) = current {
            causes.push(err.to_string());
            current = err.source();
        }
        causes
    }
}

/// Stage label used for the TLS handshake
pub const HANDSHAKE_STAGE: &str = "performing the TLS handshake";

/// Classify a rustls error by its type
pub fn classify_tls(err: &rustls::Error) -> ErrorKind {
    use rustls::AlertDescription as Alert;
    use rustls::Error as E;

    match err {
        E::InvalidCertificate(_) | E::NoCertificatesPresented | E::InvalidCertRevocationList(_) => {
            ErrorKind::CertificateError
        }
        E::AlertReceived(alert) => match alert {
            Alert::BadCertificate
            | Alert::UnsupportedCertificate
            | Alert::CertificateRevoked
            | Alert::CertificateExpired
            | Alert::CertificateUnknown
            | Alert::UnknownCA
            | Alert::CertificateRequired
            | Alert::BadCertificateStatusResponse => ErrorKind::CertificateError,
            _ => ErrorKind::HandshakeFailure,
        },
        E::PeerIncompatible(_)
        | E::PeerMisbehaved(_)
        | E::InappropriateMessage { .. }
        | E::InappropriateHandshakeMessage { .. }
        | E::InvalidMessage(_)
        | E::UnsupportedNameType
        | E::DecryptError
        | E::HandshakeNotComplete
        | E::NoApplicationProtocol
        | E::PeerSentOversizedRecord => ErrorKind::HandshakeFailure,
        _ => ErrorKind::Other,
    }
}

/// Probe target validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TargetError {
    #[error("URL is empty")]
    Empty,

    #[error("URL has no scheme: {url}")]
    MissingScheme { url: String },

    #[error("Unsupported scheme '{scheme}', only https is probed")]
    UnsupportedScheme { scheme: String },

    #[error("URL has no host: {url}")]
    MissingHost { url: String },

    #[error("Invalid host '{host}'")]
    InvalidHost { host: String },

    #[error("Invalid port '{port}'")]
    InvalidPort { port: String },
}

/// Errors raised when a disabled-algorithm policy is applied to the TLS provider
#[derive(Error, Debug)]
pub enum PolicyError {
    #[error("every protocol version is disabled by policy '{policy}'")]
    NoProtocolVersions { policy: String },

    #[error("every cipher suite is disabled by policy '{policy}'")]
    NoCipherSuites { policy: String },

    #[error("every key exchange group is disabled by policy '{policy}'")]
    NoKeyExchangeGroups { policy: String },

    #[error("TLS provider rejected policy '{policy}': {source}")]
    Rejected {
        policy: String,
        #[source]
        source: rustls::Error,
    },

    #[error("Failed to build certificate verifier: {message}")]
    Verifier { message: String },
}

/// TCP connection errors
#[derive(Error, Debug)]
pub enum TcpError {
    #[error("Failed to resolve {host}: {message}")]
    ResolutionFailed { host: String, message: String },

    #[error("No addresses found for {host}")]
    NoAddresses { host: String },

    #[error("Connection refused to {addr}")]
    ConnectionRefused { addr: SocketAddr },

    #[error("Connection to {target} timed out after {timeout:?}")]
    Timeout { target: String, timeout: Duration },

    #[error("Connection to {addr} timed out")]
    TimedOut { addr: SocketAddr },

    #[error("Host unreachable: {addr}")]
    HostUnreachable { addr: SocketAddr },

    #[error("Network unreachable: {addr}")]
    NetworkUnreachable { addr: SocketAddr },

    #[error("TCP connection failed to {addr}: {message}")]
    ConnectionFailed { addr: SocketAddr, message: String },
}

impl TcpError {
    /// Classify a socket-level failure
    pub fn kind(&self) -> ErrorKind {
        match self {
            TcpError::Timeout { .. } | TcpError::TimedOut { .. } => ErrorKind::Timeout,
            TcpError::ConnectionFailed { .. } => ErrorKind::Other,
            _ => ErrorKind::NetworkUnreachable,
        }
    }

    /// Convert a `connect()` failure for `addr`
    pub fn from_connect(addr: SocketAddr, err: &io::Error) -> Self {
        if err.kind() == io::ErrorKind::ConnectionRefused {
            return TcpError::ConnectionRefused { addr };
        }
        if err.kind() == io::ErrorKind::TimedOut {
            return TcpError::TimedOut { addr };
        }

        let error_str = err.to_string().to_lowercase();
        if error_str.contains("refused") {
            TcpError::ConnectionRefused { addr }
        } else if error_str.contains("unreachable") {
            if error_str.contains("network") {
                TcpError::NetworkUnreachable { addr }
            } else {
                TcpError::HostUnreachable { addr }
            }
        } else {
            TcpError::ConnectionFailed {
                addr,
                message: err.to_string(),
            }
        }
    }
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to parse configuration: {message}")]
    ParseError { message: String },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to read CA certificates from {path}: {message}")]
    CaFile { path: String, message: String },
}
