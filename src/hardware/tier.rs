// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Performance tier classification and per-tier runtime configuration

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::capabilities::Capabilities;

pub const BYTES_PER_MB: u64 = 1_048_576;
pub const BYTES_PER_GB: u64 = 1_073_741_824;

/// Largest model accepted when no buffer limits are known
pub const FALLBACK_MODEL_CEILING_MB: f64 = 2000.0;

/// Working buffers need this multiple of the raw weight size
pub const BUFFER_HEADROOM_FACTOR: f64 = 2.0;

const HIGH_TIER_MIN_BUFFER_GB: f64 = 4.0;
const MEDIUM_TIER_MIN_BUFFER_GB: f64 = 2.0;

/// Coarse classification of accelerator capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceTier {
    /// Large buffers and 16-bit float shaders
    High,
    /// Usable accelerator with moderate buffers
    Medium,
    /// No accelerator, or one too small to be worth it
    Low,
}

/// Numeric precision chosen for model weights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quantization {
    #[serde(rename = "4bit")]
    Q4Bit,
    #[serde(rename = "8bit")]
    Q8Bit,
    #[serde(rename = "16bit")]
    Q16Bit,
}

impl Quantization {
    pub fn bits(&self) -> u32 {
        match self {
            Quantization::Q4Bit => 4,
            Quantization::Q8Bit => 8,
            Quantization::Q16Bit => 16,
        }
    }
}

impl std::fmt::Display for Quantization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}bit", self.bits())
    }
}

/// Runtime configuration derived from a tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationHints {
    pub use_acceleration: bool,
    pub quantization: Quantization,
    #[serde(rename = "maxModelSizeMB")]
    pub max_model_size_mb: u32,
    pub enable_cache: bool,
}

impl PerformanceTier {
    /// Classify probed capabilities.
    ///
    /// Both buffer size and 16-bit float shaders are required for `High`; a
    /// large buffer alone only reaches `Medium`.
    pub fn classify(caps: &Capabilities) -> Self {
        if !caps.is_supported() {
            return PerformanceTier::Low;
        }

        let Some(limits) = caps.limits() else {
            // Device granted but no limits reported
            return PerformanceTier::Medium;
        };

        let max_buffer_gb = limits.max_buffer_size as f64 / BYTES_PER_GB as f64;

        if max_buffer_gb >= HIGH_TIER_MIN_BUFFER_GB && caps.has_shader_f16() {
            PerformanceTier::High
        } else if max_buffer_gb >= MEDIUM_TIER_MIN_BUFFER_GB {
            PerformanceTier::Medium
        } else {
            PerformanceTier::Low
        }
    }

    pub fn use_acceleration(&self) -> bool {
        !matches!(self, PerformanceTier::Low)
    }

    pub fn quantization(&self) -> Quantization {
        match self {
            PerformanceTier::High => Quantization::Q16Bit,
            PerformanceTier::Medium => Quantization::Q8Bit,
            PerformanceTier::Low => Quantization::Q4Bit,
        }
    }

    pub fn max_model_size_mb(&self) -> u32 {
        match self {
            PerformanceTier::High => 4000,
            PerformanceTier::Medium => 2000,
            PerformanceTier::Low => 1000,
        }
    }

    pub fn enable_cache(&self) -> bool {
        !matches!(self, PerformanceTier::Low)
    }

    /// Full runtime configuration for this tier
    pub fn optimization_hints(&self) -> OptimizationHints {
        OptimizationHints {
            use_acceleration: self.use_acceleration(),
            quantization: self.quantization(),
            max_model_size_mb: self.max_model_size_mb(),
            enable_cache: self.enable_cache(),
        }
    }

    /// Get a human-readable description of this tier
    pub fn description(&self) -> &'static str {
        match self {
            PerformanceTier::High => "High-end accelerator with FP16 shaders",
            PerformanceTier::Medium => "Capable accelerator",
            PerformanceTier::Low => "CPU fallback or constrained accelerator",
        }
    }
}

impl std::fmt::Display for PerformanceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PerformanceTier::High => write!(f, "high"),
            PerformanceTier::Medium => write!(f, "medium"),
            PerformanceTier::Low => write!(f, "low"),
        }
    }
}

impl FromStr for PerformanceTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(PerformanceTier::High),
            "medium" => Ok(PerformanceTier::Medium),
            "low" => Ok(PerformanceTier::Low),
            other => Err(format!("unknown tier '{}'", other)),
        }
    }
}

/// Whether a model of `estimated_size_mb` fits the probed accelerator.
///
/// Without buffer limits a fixed ceiling applies. With limits the largest
/// buffer must cover twice the model size.
pub fn can_handle_model(caps: &Capabilities, estimated_size_mb: f64) -> bool {
    match caps.limits() {
        Some(limits) if caps.is_supported() => {
            let max_buffer_mb = limits.max_buffer_size as f64 / BYTES_PER_MB as f64;
            max_buffer_mb >= estimated_size_mb * BUFFER_HEADROOM_FACTOR
        }
        _ => estimated_size_mb <= FALLBACK_MODEL_CEILING_MB,
    }
}
