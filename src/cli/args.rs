// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! CLI argument definitions using Clap
//!
//! Defines all command-line arguments and subcommands for accelprobe.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// accelprobe - accelerator detection and backend tiering
#[derive(Parser, Debug)]
#[command(name = "accelprobe")]
#[command(version, about = "Detect the inference backend this machine can run")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Probe the accelerator and show capabilities (default when no command given)
    #[command(alias = "hw")]
    Detect(DetectArgs),

    /// Show optimization hints for the effective tier
    Hints,

    /// Check whether a model of the given size fits
    Fits(FitsArgs),
}

/// Arguments for the detect subcommand
#[derive(clap::Args, Debug, Default)]
pub struct DetectArgs {
    /// Show limits and feature names
    #[arg(short, long)]
    pub detailed: bool,

    /// Record the detection result in the settings file
    #[arg(long)]
    pub save: bool,
}

/// Arguments for the fits subcommand
#[derive(clap::Args, Debug)]
pub struct FitsArgs {
    /// Estimated model size in MB
    #[arg(value_parser = parse_model_size)]
    pub size_mb: f64,
}

fn parse_model_size(raw: &str) -> std::result::Result<f64, String> {
    let size: f64 = raw
        .parse()
        .map_err(|_| format!("'{}' is not a number", raw))?;
    if !size.is_finite() || size <= 0.0 {
        return Err(format!("model size must be a positive number, got {}", raw));
    }
    Ok(size)
}

/// Output format options
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Text,

    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_no_args() {
        let cli = Cli::parse_from(["accelprobe"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.verbose, 0);
        assert!(matches!(cli.format, OutputFormat::Text));
    }

    #[test]
    fn test_cli_verbose_multiple() {
        let cli = Cli::parse_from(["accelprobe", "-vvv"]);
        assert_eq!(cli.verbose, 3);
    }

    #[test]
    fn test_detect_command() {
        let cli = Cli::parse_from(["accelprobe", "detect", "-d", "--save"]);
        if let Some(Commands::Detect(args)) = cli.command {
            assert!(args.detailed);
            assert!(args.save);
        } else {
            panic!("Expected Detect command");
        }
    }

    #[test]
    fn test_detect_alias() {
        let cli = Cli::parse_from(["accelprobe", "hw"]);
        assert!(matches!(cli.command, Some(Commands::Detect(_))));
    }

    #[test]
    fn test_fits_command() {
        let cli = Cli::parse_from(["accelprobe", "fits", "2048"]);
        if let Some(Commands::Fits(args)) = cli.command {
            assert_eq!(args.size_mb, 2048.0);
        } else {
            panic!("Expected Fits command");
        }
    }

    #[test]
    fn test_fits_rejects_non_positive() {
        assert!(Cli::try_parse_from(["accelprobe", "fits", "0"]).is_err());
        assert!(Cli::try_parse_from(["accelprobe", "fits", "abc"]).is_err());
    }

    #[test]
    fn test_json_format_global() {
        let cli = Cli::parse_from(["accelprobe", "hints", "--format", "json"]);
        assert!(matches!(cli.format, OutputFormat::Json));
        assert!(matches!(cli.command, Some(Commands::Hints)));
    }

    #[test]
    fn test_parse_model_size() {
        assert_eq!(parse_model_size("1.5"), Ok(1.5));
        assert!(parse_model_size("-3").is_err());
        assert!(parse_model_size("inf").is_err());
    }
}
