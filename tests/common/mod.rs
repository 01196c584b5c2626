use rcgen::CertifiedKey;
use rustls::crypto::CryptoProvider;
use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use rustls::{RootCertStore, ServerConfig, SupportedProtocolVersion};
use std::sync::Arc;
use tls_probe::checks::HandshakeProbe;
use tls_probe::config::ProbeSettings;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;

pub const OK_RESPONSE: &str = "HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";
pub const NOT_FOUND_RESPONSE: &str =
    "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";

/// A local HTTPS server with a self-signed certificate for "localhost"
pub struct TestServer {
    pub url: String,
    pub cert: CertificateDer<'static>,
}

impl TestServer {
    /// Root store trusting only this server's certificate
    pub fn roots(&self) -> RootCertStore {
        let mut roots = RootCertStore::empty();
        roots.add(self.cert.clone()).unwrap();
        roots
    }

    /// A probe with short timeouts that trusts this server
    pub fn trusting_probe(&self) -> HandshakeProbe {
        HandshakeProbe::new(short_timeouts()).with_root_store(self.roots())
    }
}

pub fn short_timeouts() -> ProbeSettings {
    ProbeSettings {
        connect_timeout_secs: 2,
        handshake_timeout_secs: 2,
        read_timeout_secs: 2,
        ..ProbeSettings::default()
    }
}

pub fn self_signed() -> CertifiedKey {
    rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap()
}

/// Serve `response` to every connection until the test ends
pub async fn spawn_tls_server(
    provider: CryptoProvider,
    versions: &[&'static SupportedProtocolVersion],
    response: &'static str,
) -> TestServer {
    let CertifiedKey { cert, key_pair } = self_signed();
    let cert_der = cert.der().clone();
    let key_der = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(key_pair.serialize_der()));

    let config = ServerConfig::builder_with_provider(Arc::new(provider))
        .with_protocol_versions(versions)
        .unwrap()
        .with_no_client_auth()
        .with_single_cert(vec![cert_der.clone()], key_der)
        .unwrap();
    let acceptor = TlsAcceptor::from(Arc::new(config));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let acceptor = acceptor.clone();
            tokio::spawn(async move {
                if let Ok(mut tls) = acceptor.accept(stream).await {
                    let mut buf = [0u8; 1024];
                    let _ = tls.read(&mut buf).await;
                    let _ = tls.write_all(response.as_bytes()).await;
                    let _ = tls.shutdown().await;
                }
            });
        }
    });

    TestServer {
        url: format!("https://localhost:{}/artifact.pom", port),
        cert: cert_der,
    }
}

/// Server with the provider defaults
pub async fn spawn_default_server(response: &'static str) -> TestServer {
    spawn_tls_server(
        rustls::crypto::ring::default_provider(),
        rustls::ALL_VERSIONS,
        response,
    )
    .await
}

/// Server that only speaks TLS 1.2 with ECDHE-ECDSA-AES256-GCM
pub async fn spawn_aes256_only_server(response: &'static str) -> TestServer {
    let provider = CryptoProvider {
        cipher_suites: vec![
            rustls::crypto::ring::cipher_suite::TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384,
        ],
        ..rustls::crypto::ring::default_provider()
    };
    spawn_tls_server(provider, &[&rustls::version::TLS12], response).await
}

/// Port with nothing listening on it
pub fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}
