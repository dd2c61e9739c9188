// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Host accelerated-compute entry point
//!
//! The detector never talks to a GPU API directly. A platform hands out
//! adapters, an adapter reports its limits and optional features and hands
//! out a logical device. Browsers, native wgpu and test doubles all sit
//! behind these traits.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::error::ProbeError;

/// Optional feature name for 16-bit float support in shaders.
pub const SHADER_F16: &str = "shader-f16";

/// Adapter selection hint passed to the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PowerPreference {
    HighPerformance,
    LowPower,
}

/// Hardware ceilings reported by an adapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Limits {
    /// Largest single buffer allocation in bytes
    pub max_buffer_size: u64,
    /// Largest storage buffer binding in bytes
    #[serde(default = "default_storage_binding_size")]
    pub max_storage_buffer_binding_size: u64,
    /// Maximum compute workgroup size along X
    #[serde(default = "default_workgroup_size_x")]
    pub max_compute_workgroup_size_x: u32,
    /// Maximum workgroups per dispatch dimension
    #[serde(default = "default_workgroups_per_dimension")]
    pub max_compute_workgroups_per_dimension: u32,
}

fn default_storage_binding_size() -> u64 {
    128 * 1024 * 1024
}

fn default_workgroup_size_x() -> u32 {
    256
}

fn default_workgroups_per_dimension() -> u32 {
    65535
}

impl Limits {
    /// Limits with the given buffer ceiling and baseline values elsewhere.
    pub fn with_max_buffer_size(max_buffer_size: u64) -> Self {
        Self {
            max_buffer_size,
            ..Self::default()
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_buffer_size: 256 * 1024 * 1024, // 256MB
            max_storage_buffer_binding_size: default_storage_binding_size(),
            max_compute_workgroup_size_x: default_workgroup_size_x(),
            max_compute_workgroups_per_dimension: default_workgroups_per_dimension(),
        }
    }
}

/// Descriptive adapter metadata, for display only
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterInfo {
    pub name: String,
    pub vendor: String,
    pub backend: String,
}

/// The accelerated-compute entry point of the host
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GpuPlatform: Send + Sync {
    /// Whether the host exposes the entry point at all
    fn is_available(&self) -> bool;

    /// Request a physical adapter. `Ok(None)` means the platform declined.
    async fn request_adapter(
        &self,
        preference: PowerPreference,
    ) -> Result<Option<Arc<dyn GpuAdapter>>, ProbeError>;
}

/// A physical accelerator offered by the platform
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GpuAdapter: Send + Sync {
    /// Reported hardware ceilings. Some hosts omit the report entirely.
    fn limits(&self) -> Option<Limits>;

    /// Supported optional feature names, if the host reports them
    fn features(&self) -> Option<BTreeSet<String>>;

    fn info(&self) -> AdapterInfo;

    /// Request a logical device from this adapter
    async fn request_device(&self) -> Result<Arc<dyn GpuDevice>, ProbeError>;
}

/// A logical device handle. Compute work is issued elsewhere.
pub trait GpuDevice: Send + Sync {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits_default() {
        let limits = Limits::default();
        assert_eq!(limits.max_buffer_size, 256 * 1024 * 1024);
        assert_eq!(limits.max_compute_workgroup_size_x, 256);
    }

    #[test]
    fn test_limits_with_max_buffer_size() {
        let limits = Limits::with_max_buffer_size(4 << 30);
        assert_eq!(limits.max_buffer_size, 4 << 30);
        assert_eq!(
            limits.max_compute_workgroups_per_dimension,
            Limits::default().max_compute_workgroups_per_dimension
        );
    }

    #[test]
    fn test_limits_deserialize_partial() {
        let limits: Limits = serde_json::from_str(r#"{"maxBufferSize": 1024}"#).unwrap();
        assert_eq!(limits.max_buffer_size, 1024);
        assert_eq!(limits.max_storage_buffer_binding_size, 128 * 1024 * 1024);
    }

    #[test]
    fn test_power_preference_serialization() {
        let json = serde_json::to_string(&PowerPreference::HighPerformance).unwrap();
        assert_eq!(json, "\"high-performance\"");
    }
}
