// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Model memory-fit command

use serde::Serialize;

use crate::cli::args::{FitsArgs, OutputFormat};
use crate::error::Result;
use crate::hardware::{Backend, CapabilityDetector};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FitsOutput {
    #[serde(rename = "estimatedSizeMB")]
    estimated_size_mb: f64,
    fits: bool,
    backend: Backend,
}

/// Execute the fits command. Returns whether the model fits.
pub async fn execute(
    detector: &CapabilityDetector,
    args: &FitsArgs,
    format: &OutputFormat,
) -> Result<bool> {
    let fits = detector.can_handle_model(args.size_mb).await;
    let output = FitsOutput {
        estimated_size_mb: args.size_mb,
        fits,
        backend: detector.recommended_backend().await,
    };

    if matches!(format, OutputFormat::Json) {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if fits {
        println!(
            "✓ A {} MB model fits ({} backend)",
            output.estimated_size_mb, output.backend
        );
    } else {
        println!(
            "✗ A {} MB model does not fit ({} backend)",
            output.estimated_size_mb, output.backend
        );
    }

    Ok(fits)
}
