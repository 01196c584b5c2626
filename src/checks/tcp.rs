//! TCP connector
//!
//! Resolves a host and opens the TCP connection a probe runs over.

use crate::utils::TcpError;
use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, Instant};
use tokio::net::TcpStream;

/// Opens TCP connections under a connect timeout
pub struct TcpConnector {
    timeout: Duration,
}

impl TcpConnector {
    /// Create a new connector with the given timeout
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Resolve `host` and connect to the first address that accepts.
    ///
    /// Addresses are tried in resolver order; when all fail, the last error
    /// is returned. The timeout bounds resolution and connection together.
    pub async fn connect(&self, host: &str, port: u16) -> Result<(TcpStream, Duration), TcpError> {
        let start = Instant::now();
        let target = format!("{}:{}", host, port);

        match tokio::time::timeout(self.timeout, self.connect_any(host, port)).await {
            Ok(Ok(stream)) => Ok((stream, start.elapsed())),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(TcpError::Timeout {
                target,
                timeout: self.timeout,
            }),
        }
    }

    async fn connect_any(&self, host: &str, port: u16) -> Result<TcpStream, TcpError> {
        let addrs = self.resolve(host, port).await?;

        let mut last_error = None;
        for addr in addrs {
            tracing::debug!("Connecting to {}", addr);
            match TcpStream::connect(addr).await {
                Ok(stream) => return Ok(stream),
                Err(e) => {
                    tracing::debug!("Connection to {} failed: {}", addr, e);
                    last_error = Some(TcpError::from_connect(addr, &e));
                }
            }
        }

        Err(last_error.unwrap_or_else(|| TcpError::NoAddresses {
            host: host.to_string(),
        }))
    }

    async fn resolve(&self, host: &str, port: u16) -> Result<Vec<SocketAddr>, TcpError> {
        if let Ok(ip) = host.parse::<IpAddr>() {
            return Ok(vec![SocketAddr::new(ip, port)]);
        }

        let addrs: Vec<SocketAddr> = tokio::net::lookup_host((host, port))
            .await
            .map_err(|e| TcpError::ResolutionFailed {
                host: host.to_string(),
                message: e.to_string(),
            })?
            .collect();
        tracing::debug!("Resolved {} to {:?}", host, addrs);

        if addrs.is_empty() {
            return Err(TcpError::NoAddresses {
                host: host.to_string(),
            });
        }
        Ok(addrs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ErrorKind;

    #[tokio::test]
    async fn test_connect_local_listener() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let connector = TcpConnector::new(Duration::from_secs(2));
        let result = connector.connect("127.0.0.1", port).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_connect_refused() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let connector = TcpConnector::new(Duration::from_secs(2));
        let err = connector.connect("127.0.0.1", port).await.unwrap_err();
        assert!(matches!(err, TcpError::ConnectionRefused { .. }));
        assert_eq!(err.kind(), ErrorKind::NetworkUnreachable);
    }

    #[tokio::test]
    async fn test_unresolvable_host() {
        let connector = TcpConnector::new(Duration::from_secs(5));
        let err = connector
            .connect("does-not-exist.invalid", 443)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TcpError::ResolutionFailed { .. } | TcpError::NoAddresses { .. } | TcpError::Timeout { .. }
        ));
    }
}
