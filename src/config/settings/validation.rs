// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::sync::Arc;

use crate::error::{AccelError, Result};
use crate::hardware::{
    Capabilities, GpuPlatform, HeadlessPlatform, PerformanceTier, SimulatedPlatform,
};

use super::Settings;

/// Longest simulated probe delay accepted from a settings file
const MAX_SIMULATED_LATENCY_MS: u64 = 60_000;

impl Settings {
    /// Check values serde cannot check on its own.
    pub fn validate(&self) -> Result<()> {
        if let Some(ref device) = self.simulation {
            if device.name.trim().is_empty() {
                return Err(AccelError::Config(
                    "simulation.name must not be empty".to_string(),
                ));
            }
            if device.latency_ms > MAX_SIMULATED_LATENCY_MS {
                return Err(AccelError::Config(format!(
                    "simulation.latencyMs must be at most {}, got {}",
                    MAX_SIMULATED_LATENCY_MS, device.latency_ms
                )));
            }
        }
        Ok(())
    }

    /// Get the effective tier (considering overrides).
    pub fn effective_tier(&self, detected: PerformanceTier) -> PerformanceTier {
        self.hardware.tier_override.unwrap_or(detected)
    }

    /// Platform the detector should probe.
    ///
    /// Priority: forced fallback > simulated device > native GPU API.
    pub fn platform(&self) -> Arc<dyn GpuPlatform> {
        if self.hardware.force_fallback {
            return Arc::new(HeadlessPlatform);
        }
        if let Some(ref device) = self.simulation {
            return Arc::new(SimulatedPlatform::new(device.clone()));
        }
        native_platform()
    }

    /// Remember the outcome of a detection.
    pub fn record_detection(&mut self, caps: &Capabilities) {
        self.hardware.last_detection = Some(chrono::Utc::now().to_rfc3339());
        self.hardware.last_backend = Some(caps.recommended_backend());
        self.hardware.last_tier = Some(PerformanceTier::classify(caps));
    }

    /// Get hardware-specific warnings or recommendations.
    pub fn hardware_warnings(&self, caps: &Capabilities) -> Vec<String> {
        let mut warnings = Vec::new();
        let detected = PerformanceTier::classify(caps);

        if self.hardware.force_fallback {
            warnings.push("Accelerator probing disabled by forceFallback".to_string());
        }
        if let Some(tier) = self.hardware.tier_override {
            if tier != detected {
                warnings.push(format!(
                    "Tier overridden to {} (detected {})",
                    tier, detected
                ));
            }
        }
        if self.simulation.is_some() && !self.hardware.force_fallback {
            warnings.push("Using a simulated accelerator".to_string());
        }
        if caps.is_supported() && caps.limits().is_none() {
            warnings.push("Platform did not report limits; assuming a capable device".to_string());
        }

        warnings
    }
}

#[cfg(feature = "wgpu")]
fn native_platform() -> Arc<dyn GpuPlatform> {
    Arc::new(crate::hardware::WgpuPlatform::new())
}

#[cfg(not(feature = "wgpu"))]
fn native_platform() -> Arc<dyn GpuPlatform> {
    tracing::debug!("built without the wgpu feature, no native GPU API available");
    Arc::new(HeadlessPlatform)
}
