//! Negotiated TLS session details

use serde::Serialize;
use std::fmt;

/// TLS protocol versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum TlsProtocol {
    Ssl30,
    Tls10,
    Tls11,
    Tls12,
    Tls13,
}

impl fmt::Display for TlsProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TlsProtocol::Ssl30 => write!(f, "SSLv3"),
            TlsProtocol::Tls10 => write!(f, "TLS 1.0"),
            TlsProtocol::Tls11 => write!(f, "TLS 1.1"),
            TlsProtocol::Tls12 => write!(f, "TLS 1.2"),
            TlsProtocol::Tls13 => write!(f, "TLS 1.3"),
        }
    }
}

impl TlsProtocol {
    /// Map a rustls wire version; versions rustls cannot negotiate map to `None`
    pub fn from_rustls(version: rustls::ProtocolVersion) -> Option<Self> {
        match version {
            rustls::ProtocolVersion::SSLv3 => Some(TlsProtocol::Ssl30),
            rustls::ProtocolVersion::TLSv1_0 => Some(TlsProtocol::Tls10),
            rustls::ProtocolVersion::TLSv1_1 => Some(TlsProtocol::Tls11),
            rustls::ProtocolVersion::TLSv1_2 => Some(TlsProtocol::Tls12),
            rustls::ProtocolVersion::TLSv1_3 => Some(TlsProtocol::Tls13),
            _ => None,
        }
    }
}

/// Breakdown of a negotiated cipher suite name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CipherSuiteInfo {
    /// IANA-style suite name (e.g., TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256)
    pub name: String,
    /// Key exchange algorithm named by the suite, if any
    pub key_exchange: Option<String>,
    /// Bulk encryption algorithm
    pub encryption: String,
}

impl CipherSuiteInfo {
    /// Parse a suite name as printed by rustls
    pub fn from_name(name: &str) -> Self {
        let name = name.replacen("TLS13_", "TLS_", 1);

        // TLS 1.3 suites leave key exchange to the negotiated group
        let key_exchange = name
            .split_once("_WITH_")
            .map(|(kx, _)| kx.trim_start_matches("TLS_").to_string());

        let encryption = if name.contains("AES_256_GCM") {
            "AES-256-GCM"
        } else if name.contains("AES_128_GCM") {
            "AES-128-GCM"
        } else if name.contains("CHACHA20") {
            "ChaCha20-Poly1305"
        } else if name.contains("AES_256") {
            "AES-256"
        } else if name.contains("AES_128") {
            "AES-128"
        } else {
            "Unknown"
        };

        Self {
            name,
            key_exchange,
            encryption: encryption.to_string(),
        }
    }
}

/// Details of the session a successful probe negotiated
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    /// Negotiated protocol
    pub protocol: Option<TlsProtocol>,
    /// Negotiated cipher suite
    pub cipher_suite: Option<CipherSuiteInfo>,
    /// Key exchange group (e.g., X25519)
    pub key_exchange_group: Option<String>,
    /// ALPN protocol agreed with the server
    pub alpn: Option<String>,
    /// Time from TCP connect to handshake completion
    pub handshake_ms: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tls12_suite_breakdown() {
        let info = CipherSuiteInfo::from_name("TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384");
        assert_eq!(info.key_exchange.as_deref(), Some("ECDHE_ECDSA"));
        assert_eq!(info.encryption, "AES-256-GCM");
    }

    #[test]
    fn test_tls13_suite_breakdown() {
        let info = CipherSuiteInfo::from_name("TLS13_CHACHA20_POLY1305_SHA256");
        assert_eq!(info.name, "TLS_CHACHA20_POLY1305_SHA256");
        assert_eq!(info.key_exchange, None);
        assert_eq!(info.encryption, "ChaCha20-Poly1305");
    }

    #[test]
    fn test_protocol_mapping() {
        assert_eq!(
            TlsProtocol::from_rustls(rustls::ProtocolVersion::TLSv1_3),
            Some(TlsProtocol::Tls13)
        );
        assert_eq!(
            TlsProtocol::from_rustls(rustls::ProtocolVersion::TLSv1_2),
            Some(TlsProtocol::Tls12)
        );
    }
}
