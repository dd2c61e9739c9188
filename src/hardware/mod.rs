// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Accelerator detection and performance tiering
//!
//! A [`CapabilityDetector`] probes a [`GpuPlatform`] once, caches the
//! resulting [`Capabilities`], and turns them into a backend choice, a
//! [`PerformanceTier`] and the [`OptimizationHints`] model loading runs with.

pub mod capabilities;
pub mod detector;
pub mod headless;
pub mod platform;
pub mod report;
pub mod simulated;
pub mod tier;
#[cfg(feature = "wgpu")]
pub mod wgpu_backend;

pub use capabilities::*;
pub use detector::*;
pub use headless::*;
pub use platform::*;
pub use report::*;
pub use simulated::*;
pub use tier::*;
#[cfg(feature = "wgpu")]
pub use wgpu_backend::*;
