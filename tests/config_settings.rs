#[allow(dead_code)]
mod common;

use std::io::Write;
use tls_probe::config::{self, Settings};
use tls_probe::utils::ConfigError;

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[probe]
connect_timeout_secs = 2
handshake_timeout_secs = 3
read_timeout_secs = 4
default_target = "https://example.com/"
"#
    )
    .unwrap();

    let settings = Settings::load_from_file(file.path()).unwrap();
    assert_eq!(settings.probe.connect_timeout_secs, 2);
    assert_eq!(settings.probe.handshake_timeout_secs, 3);
    assert_eq!(settings.probe.read_timeout_secs, 4);
    assert_eq!(settings.probe.default_target, "https://example.com/");
}

#[test]
fn test_missing_file() {
    let result = config::load_settings(Some(std::path::Path::new("/nonexistent/tls-probe.toml")));
    assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
}

#[test]
fn test_malformed_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[probe\nconnect_timeout_secs = ").unwrap();
    assert!(matches!(
        Settings::load_from_file(file.path()),
        Err(ConfigError::ParseError { .. })
    ));
}

#[test]
fn test_zero_timeout_in_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "[probe]\nconnect_timeout_secs = 0\nhandshake_timeout_secs = 3"
    )
    .unwrap();
    assert!(matches!(
        Settings::load_from_file(file.path()),
        Err(ConfigError::InvalidValue { .. })
    ));
}

#[test]
fn test_load_ca_file() {
    let key = common::self_signed();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(key.cert.pem().as_bytes()).unwrap();

    let certs = config::load_ca_file(file.path()).unwrap();
    assert_eq!(certs.len(), 1);
    assert_eq!(&certs[0], key.cert.der());
}

#[test]
fn test_empty_ca_file() {
    let file = tempfile::NamedTempFile::new().unwrap();
    assert!(matches!(
        config::load_ca_file(file.path()),
        Err(ConfigError::CaFile { .. })
    ));
}
