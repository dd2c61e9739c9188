// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! accelprobe - accelerator detection for your terminal
//!
//! Entry point for the accelprobe CLI application.

use std::sync::Arc;

use clap::Parser;

use accelprobe::cli::{Cli, Commands, DetectArgs};
use accelprobe::commands;
use accelprobe::config::Settings;
use accelprobe::error::Result;
use accelprobe::hardware::CapabilityDetector;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize tracing
    let mut env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::WARN.into());

    // `-v` turns on detector diagnostics; `RUST_LOG` still takes precedence.
    for directive in verbose_directives(cli.verbose) {
        if let Ok(parsed) = directive.parse() {
            env_filter = env_filter.add_directive(parsed);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    // Load settings
    let settings_path = cli.config.clone().unwrap_or_else(Settings::default_path);
    let mut settings = Settings::load_from(&settings_path)?;

    let detector = Arc::new(CapabilityDetector::new(settings.platform()));

    match cli.command {
        None => {
            commands::detect::execute(
                &detector,
                &mut settings,
                &settings_path,
                &DetectArgs::default(),
                &cli.format,
            )
            .await?;
        }
        Some(Commands::Detect(args)) => {
            commands::detect::execute(&detector, &mut settings, &settings_path, &args, &cli.format)
                .await?;
        }
        Some(Commands::Hints) => {
            commands::hints::execute(&detector, &settings, &cli.format).await?;
        }
        Some(Commands::Fits(args)) => {
            let fits = commands::fits::execute(&detector, &args, &cli.format).await?;
            if !fits {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

/// Filter directives enabled by `-v` (debug) and `-vv` (trace)
fn verbose_directives(verbose: u8) -> Vec<String> {
    let level = match verbose {
        0 => return Vec::new(),
        1 => "debug",
        _ => "trace",
    };
    ["accelprobe::hardware", "accelprobe::config", "accelprobe::commands"]
        .iter()
        .map(|module| format!("{}={}", module, level))
        .collect()
}
