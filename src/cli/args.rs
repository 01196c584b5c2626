//! CLI argument definitions using clap

use crate::config::{ProbeSettings, TlsPolicy};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tls-probe")]
#[command(version)]
#[command(about = "Probe a TLS handshake under a disabled-algorithm policy", long_about = None)]
pub struct Cli {
    /// HTTPS URL to probe (defaults to the configured target)
    #[arg(value_name = "URL")]
    pub url: Option<String>,

    /// Policy preset
    #[arg(short, long, value_enum, conflicts_with = "disable")]
    pub policy: Option<PolicyPreset>,

    /// Comma-separated disabled algorithms, e.g. "TLSv1.2, AES_256_GCM"
    #[arg(short, long, value_name = "TOKENS")]
    pub disable: Option<String>,

    /// Probe under both presets, strict then relaxed
    #[arg(long, conflicts_with_all = ["policy", "disable"])]
    pub compare: bool,

    /// Trace the handshake on stderr
    #[arg(short, long)]
    pub trace_handshake: bool,

    /// Connection timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub connect_timeout: Option<u64>,

    /// Handshake timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub handshake_timeout: Option<u64>,

    /// Response timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub read_timeout: Option<u64>,

    /// Additional trusted CA certificates (PEM)
    #[arg(long, value_name = "FILE")]
    pub ca_file: Option<PathBuf>,

    /// Settings file (TOML)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output JSON
    #[arg(long)]
    pub json: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl Cli {
    /// Policies to probe under, in order
    pub fn policies(&self) -> Vec<TlsPolicy> {
        if self.compare {
            return vec![TlsPolicy::strict(), TlsPolicy::relaxed()];
        }
        match (&self.disable, self.policy) {
            (Some(tokens), _) => vec![TlsPolicy::parse(tokens)],
            (None, Some(preset)) => vec![preset.policy()],
            (None, None) => vec![TlsPolicy::strict()],
        }
    }

    /// URL to probe, falling back to the configured default
    pub fn target_url(&self, settings: &ProbeSettings) -> String {
        self.url
            .clone()
            .unwrap_or_else(|| settings.default_target.clone())
    }

    /// Apply timeout flags over file settings
    pub fn apply_overrides(&self, settings: &mut ProbeSettings) {
        if let Some(secs) = self.connect_timeout {
            settings.connect_timeout_secs = secs;
        }
        if let Some(secs) = self.handshake_timeout {
            settings.handshake_timeout_secs = secs;
        }
        if let Some(secs) = self.read_timeout {
            settings.read_timeout_secs = secs;
        }
    }

    /// Default log filter when `RUST_LOG` is unset
    pub fn log_filter(&self) -> &'static str {
        if self.trace_handshake {
            "warn,tls_probe=trace,rustls=trace"
        } else {
            "warn"
        }
    }

    /// Whether a spinner may be drawn
    pub fn show_progress(&self) -> bool {
        !self.json && !self.trace_handshake
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum PolicyPreset {
    /// Provider defaults
    Strict,
    /// Disable only the weakest primitives
    Relaxed,
}

impl PolicyPreset {
    pub fn policy(self) -> TlsPolicy {
        match self {
            PolicyPreset::Strict => TlsPolicy::strict(),
            PolicyPreset::Relaxed => TlsPolicy::relaxed(),
        }
    }
}

impl std::fmt::Display for PolicyPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PolicyPreset::Strict => write!(f, "strict"),
            PolicyPreset::Relaxed => write!(f, "relaxed"),
        }
    }
}
