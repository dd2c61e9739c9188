// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Platform without an accelerated-compute entry point

use async_trait::async_trait;
use std::sync::Arc;

use super::platform::{GpuAdapter, GpuPlatform, PowerPreference};
use crate::error::ProbeError;

/// A host that exposes no GPU API. Every probe resolves to unsupported.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessPlatform;

#[async_trait]
impl GpuPlatform for HeadlessPlatform {
    fn is_available(&self) -> bool {
        false
    }

    async fn request_adapter(
        &self,
        _preference: PowerPreference,
    ) -> Result<Option<Arc<dyn GpuAdapter>>, ProbeError> {
        Err(ProbeError::EntryPointMissing)
    }
}
