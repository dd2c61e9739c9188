// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Probe results and the backend they recommend

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use super::platform::{AdapterInfo, GpuAdapter, GpuDevice, Limits, SHADER_F16};

/// Execution backend selected for inference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Hardware-accelerated compute path
    WebGpu,
    /// Portable CPU fallback
    Wasm,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::WebGpu => write!(f, "webgpu"),
            Backend::Wasm => write!(f, "wasm"),
        }
    }
}

/// Shared reference to the adapter granted by the platform.
///
/// The detector never looks inside; it only keeps the adapter alive for
/// model-loading code that wants to reuse it.
#[derive(Clone)]
pub struct AdapterHandle(Arc<dyn GpuAdapter>);

impl AdapterHandle {
    pub fn new(adapter: Arc<dyn GpuAdapter>) -> Self {
        Self(adapter)
    }

    pub fn get(&self) -> &Arc<dyn GpuAdapter> {
        &self.0
    }
}

impl fmt::Debug for AdapterHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AdapterHandle(..)")
    }
}

/// Shared reference to the logical device created from the adapter.
#[derive(Clone)]
pub struct DeviceHandle(Arc<dyn GpuDevice>);

impl DeviceHandle {
    pub fn new(device: Arc<dyn GpuDevice>) -> Self {
        Self(device)
    }

    pub fn get(&self) -> &Arc<dyn GpuDevice> {
        &self.0
    }
}

impl fmt::Debug for DeviceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DeviceHandle(..)")
    }
}

/// Result of probing the host for an accelerator.
///
/// Built only through [`Capabilities::unsupported`] and
/// [`Capabilities::supported`], so the handles, limits and backend always
/// agree with `supported`.
#[derive(Debug, Clone)]
pub struct Capabilities {
    supported: bool,
    adapter: Option<AdapterHandle>,
    device: Option<DeviceHandle>,
    limits: Option<Limits>,
    features: Option<BTreeSet<String>>,
    adapter_info: Option<AdapterInfo>,
    recommended_backend: Backend,
}

impl Capabilities {
    /// No usable accelerator: fallback backend, nothing else populated.
    pub fn unsupported() -> Self {
        Self {
            supported: false,
            adapter: None,
            device: None,
            limits: None,
            features: None,
            adapter_info: None,
            recommended_backend: Backend::Wasm,
        }
    }

    /// An adapter and device were granted.
    pub fn supported(
        adapter: AdapterHandle,
        device: DeviceHandle,
        limits: Option<Limits>,
        features: Option<BTreeSet<String>>,
    ) -> Self {
        Self {
            supported: true,
            adapter: Some(adapter),
            device: Some(device),
            limits,
            features,
            adapter_info: None,
            recommended_backend: Backend::WebGpu,
        }
    }

    /// Attach display metadata for the granted adapter.
    pub fn with_adapter_info(mut self, info: AdapterInfo) -> Self {
        if self.supported {
            self.adapter_info = Some(info);
        }
        self
    }

    pub fn is_supported(&self) -> bool {
        self.supported
    }

    pub fn adapter(&self) -> Option<&AdapterHandle> {
        self.adapter.as_ref()
    }

    pub fn device(&self) -> Option<&DeviceHandle> {
        self.device.as_ref()
    }

    pub fn limits(&self) -> Option<&Limits> {
        self.limits.as_ref()
    }

    pub fn features(&self) -> Option<&BTreeSet<String>> {
        self.features.as_ref()
    }

    pub fn adapter_info(&self) -> Option<&AdapterInfo> {
        self.adapter_info.as_ref()
    }

    pub fn recommended_backend(&self) -> Backend {
        self.recommended_backend
    }

    /// Whether the named optional feature was reported. Absent features count as none.
    pub fn has_feature(&self, name: &str) -> bool {
        self.features
            .as_ref()
            .map(|features| features.contains(name))
            .unwrap_or(false)
    }

    /// Whether 16-bit float shaders are available
    pub fn has_shader_f16(&self) -> bool {
        self.has_feature(SHADER_F16)
    }

    /// Comparison over everything except the opaque handles
    pub fn same_report(&self, other: &Capabilities) -> bool {
        self.supported == other.supported
            && self.limits == other.limits
            && self.features == other.features
            && self.recommended_backend == other.recommended_backend
            && self.adapter.is_some() == other.adapter.is_some()
            && self.device.is_some() == other.device.is_some()
    }
}
