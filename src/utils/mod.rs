//! Utility modules for tls-probe
//!
//! This module contains error types and progress indicators.

pub mod error;
pub mod progress;

pub use error::{ConfigError, PolicyError, ProbeError, TargetError, TcpError};
