// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Serializable snapshot of a detection, for display and JSON output

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::capabilities::{Backend, Capabilities};
use super::platform::{AdapterInfo, Limits};
use super::tier::{OptimizationHints, PerformanceTier};

/// Everything a detection produced except the platform handles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityReport {
    pub supported: bool,
    pub recommended_backend: Backend,
    pub tier: PerformanceTier,
    pub tier_description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adapter: Option<AdapterInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limits: Option<Limits>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<BTreeSet<String>>,
    pub hints: OptimizationHints,
}

impl CapabilityReport {
    /// Build a report, with `tier` taking any configured override into account.
    pub fn new(caps: &Capabilities, tier: PerformanceTier) -> Self {
        Self {
            supported: caps.is_supported(),
            recommended_backend: caps.recommended_backend(),
            tier,
            tier_description: tier.description().to_string(),
            adapter: caps.adapter_info().cloned(),
            limits: caps.limits().cloned(),
            features: caps.features().cloned(),
            hints: tier.optimization_hints(),
        }
    }

    /// Report using the tier classified from the capabilities
    pub fn from_capabilities(caps: &Capabilities) -> Self {
        Self::new(caps, PerformanceTier::classify(caps))
    }
}
