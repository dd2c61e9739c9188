// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Settings management for accelprobe
//!
//! Handles loading and saving settings from ~/.accelprobe/settings.json

use serde::{Deserialize, Serialize};

use crate::hardware::{Backend, PerformanceTier, SimulatedDevice};

mod io;
mod validation;

/// Main settings structure, stored in ~/.accelprobe/settings.json
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Settings {
    /// Hardware detection preferences and the last detection result
    #[serde(default)]
    pub hardware: HardwareConfig,

    /// Simulated accelerator used instead of the host GPU API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simulation: Option<SimulatedDevice>,
}

/// Hardware-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HardwareConfig {
    /// Override detected tier (user preference)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier_override: Option<PerformanceTier>,

    /// Never probe the accelerator; always use the fallback backend
    #[serde(default)]
    pub force_fallback: bool,

    /// Last hardware detection timestamp (RFC 3339)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_detection: Option<String>,

    /// Backend recommended by the last detection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_backend: Option<Backend>,

    /// Tier classified by the last detection (before any override)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_tier: Option<PerformanceTier>,
}
