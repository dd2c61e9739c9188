// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! accelprobe - accelerator capability detection and backend tiering.
//!
//! Decides, once per session, whether a hardware-accelerated inference
//! backend is usable, and turns the answer into runtime configuration.
//!
//! Architecture highlights:
//! - `hardware`: platform seam, memoized detector, tier classification
//! - `config`: settings file with tier overrides and simulated devices
//! - `cli`, `commands`: the `accelprobe` binary
//!
//! ```no_run
//! use std::sync::Arc;
//! use accelprobe::hardware::{CapabilityDetector, SimulatedDevice, SimulatedPlatform};
//!
//! # async fn run() {
//! let platform = SimulatedPlatform::new(SimulatedDevice::with_buffer_mb(4096, &["shader-f16"]));
//! let detector = Arc::new(CapabilityDetector::new(Arc::new(platform)));
//!
//! let hints = detector.optimization_hints().await;
//! assert!(hints.use_acceleration);
//! # }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod hardware;

pub use error::{AccelError, ProbeError, Result};
