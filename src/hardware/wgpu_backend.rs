// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Native accelerator probing through wgpu

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;

use super::platform::{
    AdapterInfo, GpuAdapter, GpuDevice, GpuPlatform, Limits, PowerPreference, SHADER_F16,
};
use crate::error::ProbeError;

/// wgpu features and their WebGPU spelling
const FEATURE_NAMES: &[(wgpu::Features, &str)] = &[
    (wgpu::Features::SHADER_F16, SHADER_F16),
    (wgpu::Features::TIMESTAMP_QUERY, "timestamp-query"),
    (wgpu::Features::DEPTH_CLIP_CONTROL, "depth-clip-control"),
    (wgpu::Features::DEPTH32FLOAT_STENCIL8, "depth32float-stencil8"),
    (wgpu::Features::TEXTURE_COMPRESSION_BC, "texture-compression-bc"),
    (wgpu::Features::INDIRECT_FIRST_INSTANCE, "indirect-first-instance"),
];

/// Platform backed by a wgpu instance with every backend enabled
pub struct WgpuPlatform {
    instance: wgpu::Instance,
}

impl WgpuPlatform {
    pub fn new() -> Self {
        Self {
            instance: wgpu::Instance::new(wgpu::InstanceDescriptor::default()),
        }
    }
}

impl Default for WgpuPlatform {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GpuPlatform for WgpuPlatform {
    fn is_available(&self) -> bool {
        true
    }

    async fn request_adapter(
        &self,
        preference: PowerPreference,
    ) -> Result<Option<Arc<dyn GpuAdapter>>, ProbeError> {
        let power_preference = match preference {
            PowerPreference::HighPerformance => wgpu::PowerPreference::HighPerformance,
            PowerPreference::LowPower => wgpu::PowerPreference::LowPower,
        };

        let adapter = self
            .instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await;

        Ok(adapter.map(|adapter| Arc::new(WgpuAdapter { adapter }) as Arc<dyn GpuAdapter>))
    }
}

/// Adapter granted by wgpu
pub struct WgpuAdapter {
    adapter: wgpu::Adapter,
}

impl WgpuAdapter {
    pub fn raw(&self) -> &wgpu::Adapter {
        &self.adapter
    }
}

#[async_trait]
impl GpuAdapter for WgpuAdapter {
    fn limits(&self) -> Option<Limits> {
        let limits = self.adapter.limits();
        Some(Limits {
            max_buffer_size: limits.max_buffer_size,
            max_storage_buffer_binding_size: u64::from(limits.max_storage_buffer_binding_size),
            max_compute_workgroup_size_x: limits.max_compute_workgroup_size_x,
            max_compute_workgroups_per_dimension: limits.max_compute_workgroups_per_dimension,
        })
    }

    fn features(&self) -> Option<BTreeSet<String>> {
        Some(feature_names(self.adapter.features()))
    }

    fn info(&self) -> AdapterInfo {
        let info = self.adapter.get_info();
        AdapterInfo {
            name: info.name,
            vendor: format!("{:#06x}", info.vendor),
            backend: format!("{:?}", info.backend),
        }
    }

    async fn request_device(&self) -> Result<Arc<dyn GpuDevice>, ProbeError> {
        let (device, queue) = self
            .adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("accelprobe"),
                    required_features: wgpu::Features::empty(),
                    required_limits: self.adapter.limits(),
                },
                None,
            )
            .await
            .map_err(|e| ProbeError::DeviceRequest(e.to_string()))?;

        Ok(Arc::new(WgpuDevice { device, queue }))
    }
}

/// Logical device and its queue
pub struct WgpuDevice {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

impl GpuDevice for WgpuDevice {}

fn feature_names(features: wgpu::Features) -> BTreeSet<String> {
    FEATURE_NAMES
        .iter()
        .filter(|(flag, _)| features.contains(*flag))
        .map(|(_, name)| name.to_string())
        .collect()
}
