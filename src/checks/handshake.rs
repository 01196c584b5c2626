//! TLS handshake probe
//!
//! Opens one HTTPS connection under a disabled-algorithm policy, sends a GET,
//! and reports the response code or a classified failure. The policy only
//! shapes the client configuration of that one connection.

use crate::checks::TcpConnector;
use crate::config::{ProbeSettings, TlsPolicy};
use crate::models::{
    CipherSuiteInfo, ProbeReport, ProbeResult, ProbeTarget, SessionInfo, TlsProtocol,
};
use crate::utils::error::HANDSHAKE_STAGE;
use crate::utils::{PolicyError, ProbeError};
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::client::WebPkiServerVerifier;
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{
    ClientConfig, DigitallySignedStruct, Error as RustlsError, PeerIncompatible, RootCertStore,
    SignatureScheme,
};
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tracing::Instrument;

/// Longest status line accepted before the response is deemed malformed
const MAX_STATUS_LINE: u64 = 8 * 1024;

/// A verifier wrapper that withholds the signature schemes a policy disables.
///
/// Disabled schemes are not advertised, and a server signature made with one
/// is rejected before it reaches the inner verifier.
#[derive(Debug)]
struct PolicyVerifier {
    inner: Arc<dyn ServerCertVerifier>,
    disabled: Vec<SignatureScheme>,
}

impl PolicyVerifier {
    fn new(inner: Arc<dyn ServerCertVerifier>, policy: &TlsPolicy) -> Self {
        let disabled = inner
            .supported_verify_schemes()
            .into_iter()
            .filter(|scheme| policy.disables_scheme(*scheme))
            .collect();
        Self { inner, disabled }
    }

    fn check_scheme(&self, scheme: SignatureScheme) -> Result<(), RustlsError> {
        if self.disabled.contains(&scheme) {
            tracing::debug!("Server signed with disabled scheme {:?}", scheme);
            return Err(RustlsError::PeerIncompatible(
                PeerIncompatible::NoSignatureSchemesInCommon,
            ));
        }
        Ok(())
    }
}

impl ServerCertVerifier for PolicyVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        ocsp_response: &[u8],
        now: UnixTime,
    ) -> Result<ServerCertVerified, RustlsError> {
        self.inner
            .verify_server_cert(end_entity, intermediates, server_name, ocsp_response, now)
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, RustlsError> {
        self.check_scheme(dss.scheme)?;
        self.inner.verify_tls12_signature(message, cert, dss)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, RustlsError> {
        self.check_scheme(dss.scheme)?;
        self.inner.verify_tls13_signature(message, cert, dss)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.inner
            .supported_verify_schemes()
            .into_iter()
            .filter(|scheme| !self.disabled.contains(scheme))
            .collect()
    }
}

/// Performs one TLS handshake and HTTP GET per call
pub struct HandshakeProbe {
    settings: ProbeSettings,
    roots: Arc<RootCertStore>,
}

impl HandshakeProbe {
    /// Create a probe trusting the Mozilla root program
    pub fn new(settings: ProbeSettings) -> Self {
        let roots = RootCertStore::from_iter(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        Self {
            settings,
            roots: Arc::new(roots),
        }
    }

    /// Replace the trust anchors
    pub fn with_root_store(mut self, roots: RootCertStore) -> Self {
        self.roots = Arc::new(roots);
        self
    }

    /// Trust additional certificates alongside the current anchors
    pub fn with_extra_roots(mut self, certs: Vec<CertificateDer<'static>>) -> Self {
        let mut roots = (*self.roots).clone();
        let (added, ignored) = roots.add_parsable_certificates(certs);
        tracing::debug!("Added {} extra trust anchors ({} ignored)", added, ignored);
        self.roots = Arc::new(roots);
        self
    }

    /// Probe `url` once under `policy`.
    ///
    /// A URL that is not a well-formed HTTPS URL fails before any network
    /// activity and before the policy is applied.
    pub async fn run(&self, url: &str, policy: &TlsPolicy) -> ProbeResult {
        let target = match ProbeTarget::parse(url) {
            Ok(target) => target,
            Err(e) => {
                tracing::debug!("Rejected target {:?}: {}", url, e);
                return ProbeError::from(e).into();
            }
        };

        let span = tracing::debug_span!("probe", target = %target, policy = policy.name());
        match self.attempt(&target, policy).instrument(span).await {
            Ok(result) => result,
            Err(e) => {
                tracing::debug!("Probe of {} under {} failed: {}", target, policy, e);
                e.into()
            }
        }
    }

    /// Probe `url` once and wrap the outcome with its context
    pub async fn report(&self, url: &str, policy: &TlsPolicy) -> ProbeReport {
        let probed_at = chrono::Utc::now();
        let result = self.run(url, policy).await;
        ProbeReport {
            target: url.to_string(),
            policy: policy.name().to_string(),
            disabled_algorithms: policy.tokens().to_vec(),
            probed_at,
            result,
        }
    }

    /// Probe `url` under each policy in turn
    pub async fn compare(&self, url: &str, policies: &[TlsPolicy]) -> Vec<ProbeReport> {
        let mut reports = Vec::with_capacity(policies.len());
        for policy in policies {
            reports.push(self.report(url, policy).await);
        }
        reports
    }

    /// Build the client configuration for one connection under `policy`
    pub fn client_config(&self, policy: &TlsPolicy) -> Result<ClientConfig, PolicyError> {
        let restricted = policy.restrict(rustls::crypto::ring::default_provider())?;
        for token in &restricted.inert {
            tracing::debug!("Disabled algorithm '{}' has no counterpart in rustls", token);
        }
        let provider = Arc::new(restricted.provider);

        let inner: Arc<dyn ServerCertVerifier> =
            WebPkiServerVerifier::builder_with_provider(Arc::clone(&self.roots), Arc::clone(&provider))
                .build()
                .map_err(|e| PolicyError::Verifier {
                    message: e.to_string(),
                })?;
        let verifier = PolicyVerifier::new(inner, policy);

        let mut config = ClientConfig::builder_with_provider(provider)
            .with_protocol_versions(&restricted.versions)
            .map_err(|source| PolicyError::Rejected {
                policy: policy.name().to_string(),
                source,
            })?
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(verifier))
            .with_no_client_auth();
        config.alpn_protocols = vec![b"http/1.1".to_vec()];

        Ok(config)
    }

    async fn attempt(
        &self,
        target: &ProbeTarget,
        policy: &TlsPolicy,
    ) -> Result<ProbeResult, ProbeError> {
        let config = self.client_config(policy)?;
        let server_name = target.server_name()?;
        let host = target.host();

        // Connect TCP
        let connector = TcpConnector::new(self.settings.connect_timeout());
        let (stream, connect_time) = connector.connect(host, target.port()).await?;
        tracing::debug!("TCP connected to {} in {:?}", target.host_header(), connect_time);

        // Perform TLS handshake
        let started = Instant::now();
        let tls = tokio_rustls::TlsConnector::from(Arc::new(config));
        let mut tls_stream = tokio::time::timeout(
            self.settings.handshake_timeout(),
            tls.connect(server_name, stream),
        )
        .await
        .map_err(|_| ProbeError::HandshakeTimeout {
            host: host.to_string(),
            timeout: self.settings.handshake_timeout(),
        })?
        .map_err(|e| ProbeError::from_tls_io(host, HANDSHAKE_STAGE, e))?;
        let handshake_ms = started.elapsed().as_secs_f64() * 1000.0;

        let session = {
            let (_, connection) = tls_stream.get_ref();
            SessionInfo {
                protocol: connection.protocol_version().and_then(TlsProtocol::from_rustls),
                cipher_suite: connection
                    .negotiated_cipher_suite()
                    .map(|cs| CipherSuiteInfo::from_name(&format!("{:?}", cs.suite()))),
                key_exchange_group: connection
                    .negotiated_key_exchange_group()
                    .map(|group| format!("{:?}", group.name())),
                alpn: connection
                    .alpn_protocol()
                    .map(|p| String::from_utf8_lossy(p).into_owned()),
                handshake_ms,
            }
        };
        tracing::debug!(
            "Handshake with {} complete: {:?} {:?}",
            host,
            session.protocol,
            session.cipher_suite.as_ref().map(|cs| cs.name.as_str())
        );

        let request = format!(
            "GET {} HTTP/1.1\r\nHost: {}\r\nUser-Agent: {}\r\nAccept: */*\r\nConnection: close\r\n\r\n",
            target.path(),
            target.host_header(),
            self.settings.user_agent,
        );
        tls_stream
            .write_all(request.as_bytes())
            .await
            .map_err(|e| ProbeError::from_tls_io(host, "sending the request", e))?;
        tls_stream
            .flush()
            .await
            .map_err(|e| ProbeError::from_tls_io(host, "sending the request", e))?;

        let mut reader = BufReader::new(tls_stream).take(MAX_STATUS_LINE);
        let mut status_line = String::new();
        let read = tokio::time::timeout(
            self.settings.read_timeout(),
            reader.read_line(&mut status_line),
        )
        .await
        .map_err(|_| ProbeError::ReadTimeout {
            host: host.to_string(),
            timeout: self.settings.read_timeout(),
        })?
        .map_err(|e| ProbeError::from_tls_io(host, "reading the status line", e))?;

        if read == 0 {
            return Err(ProbeError::Http {
                host: host.to_string(),
                message: "connection closed before a status line was received".to_string(),
            });
        }
        let response_code = parse_status_line(&status_line).ok_or_else(|| ProbeError::Http {
            host: host.to_string(),
            message: format!("unexpected status line {:?}", status_line.trim_end()),
        })?;
        tracing::debug!("{} answered {}", host, response_code);

        Ok(ProbeResult::Success {
            response_code,
            session,
        })
    }
}

/// Extract the status code from an HTTP/1.x status line
pub fn parse_status_line(line: &str) -> Option<u16> {
    let mut parts = line.trim_end().splitn(3, ' ');
    let version = parts.next()?;
    if !version.starts_with("HTTP/") {
        return None;
    }
    let code = parts.next()?;
    if code.len() != 3 {
        return None;
    }
    code.parse().ok().filter(|c| (100..=999).contains(c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ErrorKind;

    #[test]
    fn test_parse_status_line() {
        assert_eq!(parse_status_line("HTTP/1.1 200 OK\r\n"), Some(200));
        assert_eq!(parse_status_line("HTTP/1.0 404 Not Found\r\n"), Some(404));
        assert_eq!(parse_status_line("HTTP/1.1 503\r\n"), Some(503));
        assert_eq!(parse_status_line("SSH-2.0-OpenSSH\r\n"), None);
        assert_eq!(parse_status_line("HTTP/1.1 20 OK\r\n"), None);
        assert_eq!(parse_status_line(""), None);
    }

    #[test]
    fn test_client_config_carries_policy() {
        let probe = HandshakeProbe::new(ProbeSettings::default());
        let config = probe.client_config(&TlsPolicy::parse("TLSv1.3")).unwrap();
        assert!(config
            .crypto_provider()
            .cipher_suites
            .iter()
            .all(|s| s.version().version == rustls::ProtocolVersion::TLSv1_2));
        assert_eq!(config.alpn_protocols, vec![b"http/1.1".to_vec()]);
    }

    #[tokio::test]
    async fn test_invalid_url_fails_before_network() {
        let probe = HandshakeProbe::new(ProbeSettings::default());
        let result = probe.run("http://example.com/", &TlsPolicy::strict()).await;
        assert_eq!(result.error_kind(), Some(ErrorKind::Other));
    }

    #[tokio::test]
    async fn test_unsatisfiable_policy_is_handshake_failure() {
        let probe = HandshakeProbe::new(ProbeSettings::default());
        let result = probe
            .run("https://127.0.0.1:1/", &TlsPolicy::parse("TLSv1.2, TLSv1.3"))
            .await;
        assert_eq!(result.error_kind(), Some(ErrorKind::HandshakeFailure));
    }
}
