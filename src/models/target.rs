//! HTTPS probe targets

use crate::utils::TargetError;
use rustls::pki_types::ServerName;
use serde::Serialize;
use std::fmt;

const HTTPS_PORT: u16 = 443;

/// A validated HTTPS URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeTarget {
    host: String,
    port: u16,
    path: String,
}

impl ProbeTarget {
    /// Parse and validate an HTTPS URL.
    ///
    /// Userinfo and fragments are accepted but never sent.
    pub fn parse(input: &str) -> Result<Self, TargetError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(TargetError::Empty);
        }

        let (scheme, rest) = input
            .split_once("://")
            .ok_or_else(|| TargetError::MissingScheme {
                url: input.to_string(),
            })?;
        if !scheme.eq_ignore_ascii_case("https") {
            return Err(TargetError::UnsupportedScheme {
                scheme: scheme.to_string(),
            });
        }

        let rest = rest.split('#').next().unwrap_or_default();
        let authority_end = rest.find(['/', '?']).unwrap_or(rest.len());
        let (authority, path) = rest.split_at(authority_end);
        let path = match path.chars().next() {
            None => "/".to_string(),
            Some('?') => format!("/{}", path),
            Some(_) => path.to_string(),
        };

        let authority = authority
            .rsplit_once('@')
            .map(|(_, host)| host)
            .unwrap_or(authority);
        let (host, port) = split_host_port(authority)?;

        if host.is_empty() {
            return Err(TargetError::MissingHost {
                url: input.to_string(),
            });
        }
        let host = host.to_ascii_lowercase();
        if ServerName::try_from(host.as_str()).is_err() {
            return Err(TargetError::InvalidHost { host });
        }

        Ok(Self { host, port, path })
    }

    /// Host name or IP literal (IPv6 without brackets)
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Path and query sent in the request line
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Name presented for SNI and certificate verification
    pub fn server_name(&self) -> Result<ServerName<'static>, TargetError> {
        ServerName::try_from(self.host.clone()).map_err(|_| TargetError::InvalidHost {
            host: self.host.clone(),
        })
    }

    /// Value of the `Host` request header
    pub fn host_header(&self) -> String {
        let host = if self.host.contains(':') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        };
        if self.port == HTTPS_PORT {
            host
        } else {
            format!("{}:{}", host, self.port)
        }
    }
}

impl fmt::Display for ProbeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "https://{}{}", self.host_header(), self.path)
    }
}

fn split_host_port(authority: &str) -> Result<(&str, u16), TargetError> {
    if let Some(bracketed) = authority.strip_prefix('[') {
        let (host, after) = bracketed
            .split_once(']')
            .ok_or_else(|| TargetError::InvalidHost {
                host: authority.to_string(),
            })?;
        return match after {
            "" => Ok((host, HTTPS_PORT)),
            _ => match after.strip_prefix(':') {
                Some(port) => Ok((host, parse_port(port)?)),
                None => Err(TargetError::InvalidHost {
                    host: authority.to_string(),
                }),
            },
        };
    }

    match authority.split_once(':') {
        None => Ok((authority, HTTPS_PORT)),
        Some((_, port)) if port.contains(':') => Err(TargetError::InvalidHost {
            host: authority.to_string(),
        }),
        Some((host, port)) => Ok((host, parse_port(port)?)),
    }
}

fn parse_port(port: &str) -> Result<u16, TargetError> {
    if port.is_empty() {
        return Ok(HTTPS_PORT);
    }
    match port.parse::<u16>() {
        Ok(0) | Err(_) => Err(TargetError::InvalidPort {
            port: port.to_string(),
        }),
        Ok(port) => Ok(port),
    }
}
