//! Configuration module for tls-probe
//!
//! Handles settings loaded from TOML files, disabled-algorithm policies,
//! and extra trust anchors.

pub mod policy;
pub mod settings;

pub use policy::{DisabledAlgorithm, RestrictedProvider, TlsPolicy, RELAXED_DISABLED_ALGORITHMS};
pub use settings::{ProbeSettings, Settings, DEFAULT_TARGET};

use crate::utils::ConfigError;
use rustls::pki_types::pem::PemObject;
use rustls::pki_types::CertificateDer;
use std::path::Path;

/// Load settings from `path`, or from the default location when `None`
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    match path {
        Some(path) => Settings::load_from_file(path),
        None => Settings::load_default(),
    }
}

/// Read every certificate from a PEM bundle
pub fn load_ca_file<P: AsRef<Path>>(path: P) -> Result<Vec<CertificateDer<'static>>, ConfigError> {
    let path = path.as_ref();
    let ca_error = |message: String| ConfigError::CaFile {
        path: path.display().to_string(),
        message,
    };

    let certs = CertificateDer::pem_file_iter(path)
        .map_err(|e| ca_error(e.to_string()))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ca_error(e.to_string()))?;

    if certs.is_empty() {
        return Err(ca_error("no certificates found".to_string()));
    }
    Ok(certs)
}
