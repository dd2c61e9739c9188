// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Capability report command

use std::fmt;
use std::path::Path;

use crate::cli::args::{DetectArgs, OutputFormat};
use crate::config::Settings;
use crate::error::Result;
use crate::hardware::{CapabilityDetector, CapabilityReport, BYTES_PER_MB};

/// Execute the detect command
pub async fn execute(
    detector: &CapabilityDetector,
    settings: &mut Settings,
    settings_path: &Path,
    args: &DetectArgs,
    format: &OutputFormat,
) -> Result<()> {
    let caps = detector.detect().await;
    let detected = detector.performance_tier().await;
    let report = CapabilityReport::new(&caps, settings.effective_tier(detected));

    if args.save {
        settings.record_detection(&caps);
        settings.save_to(settings_path)?;
        tracing::debug!("detection recorded in settings");
    }

    if matches!(format, OutputFormat::Json) {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let warnings = settings.hardware_warnings(&caps);
    print!(
        "{}",
        TextReport {
            report: &report,
            warnings: &warnings,
            detailed: args.detailed,
        }
    );
    Ok(())
}

/// Plain-text rendering of a capability report
pub struct TextReport<'a> {
    pub report: &'a CapabilityReport,
    pub warnings: &'a [String],
    pub detailed: bool,
}

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.report;

        writeln!(f, "\n=== Accelerator Capability Report ===\n")?;
        writeln!(f, "Backend: {}", report.recommended_backend)?;
        writeln!(f, "Tier: {} ({})", report.tier, report.tier_description)?;

        if let Some(ref adapter) = report.adapter {
            writeln!(
                f,
                "Adapter: {} ({}, {})",
                adapter.name, adapter.vendor, adapter.backend
            )?;
        } else if !report.supported {
            writeln!(f, "Adapter: none (using portable fallback)")?;
        }

        match report.limits {
            Some(ref limits) => {
                writeln!(f, "Max Buffer: {} MB", limits.max_buffer_size / BYTES_PER_MB)?;
            }
            None if report.supported => writeln!(f, "Max Buffer: not reported")?,
            None => {}
        }

        if self.detailed {
            if let Some(ref limits) = report.limits {
                writeln!(f, "\n=== Limits ===")?;
                writeln!(
                    f,
                    "Storage Binding: {} MB",
                    limits.max_storage_buffer_binding_size / BYTES_PER_MB
                )?;
                writeln!(f, "Workgroup Size X: {}", limits.max_compute_workgroup_size_x)?;
                writeln!(
                    f,
                    "Workgroups Per Dimension: {}",
                    limits.max_compute_workgroups_per_dimension
                )?;
            }

            if let Some(ref features) = report.features {
                writeln!(f, "\n=== Features ===")?;
                if features.is_empty() {
                    writeln!(f, "  (none)")?;
                }
                for feature in features {
                    writeln!(f, "  • {}", feature)?;
                }
            }
        }

        let hints = &report.hints;
        writeln!(f, "\n=== Optimization Hints ===")?;
        writeln!(f, "Acceleration: {}", enabled(hints.use_acceleration))?;
        writeln!(f, "Quantization: {}", hints.quantization)?;
        writeln!(f, "Max Model Size: {} MB", hints.max_model_size_mb)?;
        writeln!(f, "Cache: {}", enabled(hints.enable_cache))?;

        if !self.warnings.is_empty() {
            writeln!(f)?;
            for warning in self.warnings {
                writeln!(f, "⚠️  {}", warning)?;
            }
        }

        writeln!(f)
    }
}

fn enabled(flag: bool) -> &'static str {
    if flag {
        "Enabled"
    } else {
        "Disabled"
    }
}
