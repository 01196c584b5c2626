//! tls-probe library
//!
//! A TLS handshake diagnostic probe:
//! - One HTTPS GET per probe, under a disabled-algorithm policy
//! - Policies scoped to a single connection's client configuration
//! - Structured, comparable results with classified failures
//!
//! # Usage
//!
//! ```rust,ignore
//! use tls_probe::checks::HandshakeProbe;
//! use tls_probe::config::{ProbeSettings, TlsPolicy};
//!
//! #[tokio::main]
//! async fn main() {
//!     let probe = HandshakeProbe::new(ProbeSettings::default());
//!     let result = probe.run("https://example.com/", &TlsPolicy::relaxed()).await;
//!     println!("{:?}", result.response_code());
//! }
//! ```

pub mod checks;
pub mod cli;
pub mod config;
pub mod models;
pub mod output;
pub mod utils;

// Re-export commonly used types
pub use checks::HandshakeProbe;
pub use cli::Cli;
pub use config::{ProbeSettings, Settings, TlsPolicy};
pub use models::{ErrorKind, ProbeReport, ProbeResult, ProbeTarget};
pub use utils::ProbeError;
