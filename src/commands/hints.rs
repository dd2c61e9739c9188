// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Optimization hints command

use serde::Serialize;

use crate::cli::args::OutputFormat;
use crate::config::Settings;
use crate::error::Result;
use crate::hardware::{CapabilityDetector, OptimizationHints, PerformanceTier};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HintsOutput {
    tier: PerformanceTier,
    overridden: bool,
    hints: OptimizationHints,
}

/// Execute the hints command
pub async fn execute(
    detector: &CapabilityDetector,
    settings: &Settings,
    format: &OutputFormat,
) -> Result<()> {
    let detected = detector.performance_tier().await;
    let tier = settings.effective_tier(detected);
    let output = HintsOutput {
        tier,
        overridden: tier != detected,
        hints: tier.optimization_hints(),
    };

    if matches!(format, OutputFormat::Json) {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!(
        "Tier: {}{}",
        output.tier,
        if output.overridden { " (override)" } else { "" }
    );
    println!("Use Acceleration: {}", output.hints.use_acceleration);
    println!("Quantization: {}", output.hints.quantization);
    println!("Max Model Size: {} MB", output.hints.max_model_size_mb);
    println!("Enable Cache: {}", output.hints.enable_cache);
    Ok(())
}
