//! Probe outcome types

use super::SessionInfo;
use crate::utils::ProbeError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Closed classification of probe failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Protocol version or cipher suite negotiation failed
    HandshakeFailure,
    /// The server certificate was not trusted or not valid
    CertificateError,
    /// DNS, routing, or refused connection
    NetworkUnreachable,
    /// A connect, handshake, or read deadline elapsed
    Timeout,
    Other,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::HandshakeFailure => write!(f, "HandshakeFailure"),
            ErrorKind::CertificateError => write!(f, "CertificateError"),
            ErrorKind::NetworkUnreachable => write!(f, "NetworkUnreachable"),
            ErrorKind::Timeout => write!(f, "Timeout"),
            ErrorKind::Other => write!(f, "Other"),
        }
    }
}

/// Outcome of a single probe
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ProbeResult {
    /// The handshake completed and an HTTP status line was read
    Success {
        response_code: u16,
        session: SessionInfo,
    },
    /// The attempt ended before a response code was obtained
    Failure {
        error_kind: ErrorKind,
        message: String,
        /// Underlying causes, outermost first
        causes: Vec<String>,
    },
}

impl ProbeResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ProbeResult::Success { .. })
    }

    /// Response code for successful probes
    pub fn response_code(&self) -> Option<u16> {
        match self {
            ProbeResult::Success { response_code, .. } => Some(*response_code),
            ProbeResult::Failure { .. } => None,
        }
    }

    /// Failure classification, if the probe failed
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            ProbeResult::Success { .. } => None,
            ProbeResult::Failure { error_kind, .. } => Some(*error_kind),
        }
    }

    /// Label identifying the outcome kind, used to compare runs
    pub fn outcome_label(&self) -> String {
        match self {
            ProbeResult::Success { .. } => "Success".to_string(),
            ProbeResult::Failure { error_kind, .. } => error_kind.to_string(),
        }
    }
}

impl From<ProbeError> for ProbeResult {
    fn from(err: ProbeError) -> Self {
        ProbeResult::Failure {
            error_kind: err.kind(),
            message: err.to_string(),
            causes: err.causes(),
        }
    }
}

/// A probe result together with what was probed and when
#[derive(Debug, Clone, Serialize)]
pub struct ProbeReport {
    /// URL as given by the caller
    pub target: String,
    /// Policy name (`strict`, `relaxed`, or `custom`)
    pub policy: String,
    /// Disabled-algorithm tokens in effect
    pub disabled_algorithms: Vec<String>,
    pub probed_at: DateTime<Utc>,
    pub result: ProbeResult,
}
