// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Simulated accelerator for hosts without a GPU API
//!
//! Describes a device in configuration and answers probes deterministically,
//! including the failure paths a real host can produce.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::platform::{
    AdapterInfo, GpuAdapter, GpuDevice, GpuPlatform, Limits, PowerPreference,
};
use super::tier::BYTES_PER_MB;
use crate::error::ProbeError;

/// Failure injected at a probe step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SimulatedFailure {
    /// The platform declines to grant an adapter
    NoAdapter,
    /// The adapter request rejects
    AdapterError,
    /// The device request rejects
    DeviceError,
}

/// Description of a simulated accelerator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulatedDevice {
    /// Display name reported by the adapter
    #[serde(default = "default_device_name")]
    pub name: String,

    /// Largest buffer in MB (None = host omits limits)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_buffer_mb: Option<u64>,

    /// Optional feature names (None = host omits the feature set)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,

    /// Failure to inject
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<SimulatedFailure>,

    /// Artificial delay before the adapter is granted
    #[serde(default)]
    pub latency_ms: u64,
}

fn default_device_name() -> String {
    "Simulated Accelerator".to_string()
}

impl Default for SimulatedDevice {
    fn default() -> Self {
        Self {
            name: default_device_name(),
            max_buffer_mb: Some(256),
            features: Some(Vec::new()),
            failure: None,
            latency_ms: 0,
        }
    }
}

impl SimulatedDevice {
    /// A device with the given buffer ceiling and feature names
    pub fn with_buffer_mb(max_buffer_mb: u64, features: &[&str]) -> Self {
        Self {
            max_buffer_mb: Some(max_buffer_mb),
            features: Some(features.iter().map(|f| f.to_string()).collect()),
            ..Self::default()
        }
    }

    /// Same device, failing at the given step
    pub fn failing(mut self, failure: SimulatedFailure) -> Self {
        self.failure = Some(failure);
        self
    }

    fn limits(&self) -> Option<Limits> {
        self.max_buffer_mb
            .map(|mb| Limits::with_max_buffer_size(mb.saturating_mul(BYTES_PER_MB)))
    }

    fn feature_set(&self) -> Option<BTreeSet<String>> {
        self.features
            .as_ref()
            .map(|names| names.iter().cloned().collect())
    }
}

/// Platform that grants a [`SimulatedDevice`]
#[derive(Debug)]
pub struct SimulatedPlatform {
    device: SimulatedDevice,
    adapter_requests: AtomicUsize,
}

impl SimulatedPlatform {
    pub fn new(device: SimulatedDevice) -> Self {
        Self {
            device,
            adapter_requests: AtomicUsize::new(0),
        }
    }

    /// Number of adapter requests served so far
    pub fn adapter_requests(&self) -> usize {
        self.adapter_requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GpuPlatform for SimulatedPlatform {
    fn is_available(&self) -> bool {
        true
    }

    async fn request_adapter(
        &self,
        preference: PowerPreference,
    ) -> Result<Option<Arc<dyn GpuAdapter>>, ProbeError> {
        self.adapter_requests.fetch_add(1, Ordering::SeqCst);
        tracing::trace!(?preference, device = %self.device.name, "simulated adapter request");

        if self.device.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.device.latency_ms)).await;
        }

        match self.device.failure {
            Some(SimulatedFailure::NoAdapter) => Ok(None),
            Some(SimulatedFailure::AdapterError) => Err(ProbeError::AdapterRequest(
                "simulated adapter rejection".to_string(),
            )),
            _ => Ok(Some(Arc::new(SimulatedAdapter::new(&self.device)))),
        }
    }
}

/// Adapter handed out by [`SimulatedPlatform`]
#[derive(Debug, Clone)]
pub struct SimulatedAdapter {
    limits: Option<Limits>,
    features: Option<BTreeSet<String>>,
    name: String,
    fail_device: bool,
}

impl SimulatedAdapter {
    pub fn new(device: &SimulatedDevice) -> Self {
        Self {
            limits: device.limits(),
            features: device.feature_set(),
            name: device.name.clone(),
            fail_device: device.failure == Some(SimulatedFailure::DeviceError),
        }
    }
}

#[async_trait]
impl GpuAdapter for SimulatedAdapter {
    fn limits(&self) -> Option<Limits> {
        self.limits.clone()
    }

    fn features(&self) -> Option<BTreeSet<String>> {
        self.features.clone()
    }

    fn info(&self) -> AdapterInfo {
        AdapterInfo {
            name: self.name.clone(),
            vendor: "simulated".to_string(),
            backend: "simulated".to_string(),
        }
    }

    async fn request_device(&self) -> Result<Arc<dyn GpuDevice>, ProbeError> {
        if self.fail_device {
            return Err(ProbeError::DeviceRequest(
                "simulated device rejection".to_string(),
            ));
        }
        Ok(Arc::new(SimulatedLogicalDevice))
    }
}

/// Logical device handed out by [`SimulatedAdapter`]
#[derive(Debug)]
pub struct SimulatedLogicalDevice;

impl GpuDevice for SimulatedLogicalDevice {}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_grants_adapter_with_limits() {
        let platform = SimulatedPlatform::new(SimulatedDevice::with_buffer_mb(2048, &["shader-f16"]));
        let adapter = platform
            .request_adapter(PowerPreference::HighPerformance)
            .await
            .unwrap()
            .expect("adapter granted");

        assert_eq!(adapter.limits().unwrap().max_buffer_size, 2048 * BYTES_PER_MB);
        assert!(adapter.features().unwrap().contains("shader-f16"));
        assert!(adapter.request_device().await.is_ok());
        assert_eq!(platform.adapter_requests(), 1);
    }

    #[tokio::test]
    async fn test_omitted_limits_and_features() {
        let device = SimulatedDevice {
            max_buffer_mb: None,
            features: None,
            ..Default::default()
        };
        let adapter = SimulatedAdapter::new(&device);
        assert!(adapter.limits().is_none());
        assert!(adapter.features().is_none());
    }

    #[tokio::test]
    async fn test_failure_modes() {
        let platform =
            SimulatedPlatform::new(SimulatedDevice::default().failing(SimulatedFailure::NoAdapter));
        assert!(platform
            .request_adapter(PowerPreference::HighPerformance)
            .await
            .unwrap()
            .is_none());

        let platform = SimulatedPlatform::new(
            SimulatedDevice::default().failing(SimulatedFailure::AdapterError),
        );
        assert!(matches!(
            platform.request_adapter(PowerPreference::HighPerformance).await,
            Err(ProbeError::AdapterRequest(_))
        ));

        let platform =
            SimulatedPlatform::new(SimulatedDevice::default().failing(SimulatedFailure::DeviceError));
        let adapter = platform
            .request_adapter(PowerPreference::HighPerformance)
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(
            adapter.request_device().await,
            Err(ProbeError::DeviceRequest(_))
        ));
    }

    #[test]
    fn test_device_deserialize_defaults() {
        let device: SimulatedDevice =
            serde_json::from_str(r#"{"maxBufferMb": 4096, "failure": "device-error"}"#).unwrap();
        assert_eq!(device.max_buffer_mb, Some(4096));
        assert_eq!(device.failure, Some(SimulatedFailure::DeviceError));
        assert_eq!(device.name, "Simulated Accelerator");
        assert!(device.features.is_none());
        assert_eq!(device.latency_ms, 0);
    }
}
