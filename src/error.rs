// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Error types for accelprobe
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Main error type for accelprobe operations
#[derive(Error, Debug)]
pub enum AccelError {
    /// Hardware probe errors
    #[error("Probe error: {0}")]
    Probe(#[from] ProbeError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures raised by a platform while probing for an accelerator.
///
/// The capability detector never hands these to its callers; every variant
/// collapses into the unsupported outcome.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// The platform has no accelerated-compute entry point
    #[error("accelerated compute entry point is not available")]
    EntryPointMissing,

    /// The adapter request threw or rejected
    #[error("Adapter request failed: {0}")]
    AdapterRequest(String),

    /// The logical device request threw or rejected
    #[error("Device request failed: {0}")]
    DeviceRequest(String),
}

/// Result type alias for accelprobe operations
pub type Result<T> = std::result::Result<T, AccelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_error_display() {
        let err = ProbeError::AdapterRequest("denied".to_string());
        assert_eq!(err.to_string(), "Adapter request failed: denied");

        let err = ProbeError::DeviceRequest("lost".to_string());
        assert_eq!(err.to_string(), "Device request failed: lost");
    }

    #[test]
    fn test_probe_error_converts_into_accel_error() {
        let err: AccelError = ProbeError::EntryPointMissing.into();
        assert!(matches!(err, AccelError::Probe(ProbeError::EntryPointMissing)));
        assert!(err.to_string().starts_with("Probe error:"));
    }

    #[test]
    fn test_config_error_display() {
        let err = AccelError::Config("bad tier".to_string());
        assert_eq!(err.to_string(), "Configuration error: bad tier");
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: AccelError = json_err.into();
        assert!(matches!(err, AccelError::Json(_)));
    }
}
