// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Memoized accelerator detection
//!
//! The detector probes the platform at most once per generation. Callers that
//! arrive while a probe is in flight await the same shared future instead of
//! starting their own, and every later caller is served from the cache until
//! [`CapabilityDetector::reset`] starts a new generation.

use futures::future::{BoxFuture, FutureExt, Shared};
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use super::capabilities::{AdapterHandle, Backend, Capabilities, DeviceHandle};
use super::headless::HeadlessPlatform;
use super::platform::{GpuPlatform, PowerPreference};
use super::tier::{self, OptimizationHints, PerformanceTier};
use crate::error::ProbeError;

type ProbeFuture = Shared<BoxFuture<'static, Arc<Capabilities>>>;

/// Observable detection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionState {
    Unprobed,
    Probing,
    Resolved,
}

enum ProbeState {
    Unprobed,
    Probing { generation: u64, probe: ProbeFuture },
    Resolved(Arc<Capabilities>),
}

struct Inner {
    state: ProbeState,
    /// Bumped by every reset; only a probe of the current generation may publish.
    generation: u64,
}

/// Capability detector shared by everything that needs backend decisions.
///
/// Construct one per application and pass it around behind an `Arc`.
pub struct CapabilityDetector {
    platform: Arc<dyn GpuPlatform>,
    inner: Mutex<Inner>,
    probes_started: AtomicUsize,
}

impl CapabilityDetector {
    pub fn new(platform: Arc<dyn GpuPlatform>) -> Self {
        Self {
            platform,
            inner: Mutex::new(Inner {
                state: ProbeState::Unprobed,
                generation: 0,
            }),
            probes_started: AtomicUsize::new(0),
        }
    }

    /// Detector for a host with no accelerated-compute entry point
    pub fn headless() -> Self {
        Self::new(Arc::new(HeadlessPlatform))
    }

    /// Probe the platform, or return the cached or in-flight result.
    ///
    /// Never fails: every probe failure resolves to unsupported capabilities.
    pub async fn detect(&self) -> Arc<Capabilities> {
        let (generation, probe) = {
            let mut inner = self.lock();

            let in_flight = match &inner.state {
                ProbeState::Resolved(caps) => {
                    tracing::trace!("serving cached capabilities");
                    return Arc::clone(caps);
                }
                ProbeState::Probing { generation, probe } => Some((*generation, probe.clone())),
                ProbeState::Unprobed => None,
            };

            match in_flight {
                Some(joined) => {
                    tracing::debug!(generation = joined.0, "joining in-flight probe");
                    joined
                }
                None => {
                    let generation = inner.generation;
                    let probe = self.start_probe(generation);
                    inner.state = ProbeState::Probing {
                        generation,
                        probe: probe.clone(),
                    };
                    (generation, probe)
                }
            }
        };

        let caps = probe.await;
        self.publish(generation, &caps);
        caps
    }

    /// Backend the probed capabilities recommend
    pub async fn recommended_backend(&self) -> Backend {
        self.detect().await.recommended_backend()
    }

    /// Whether a model of `estimated_size_mb` fits. Non-finite sizes never fit.
    pub async fn can_handle_model(&self, estimated_size_mb: f64) -> bool {
        let caps = self.detect().await;
        tier::can_handle_model(&caps, estimated_size_mb)
    }

    /// Performance tier, recomputed from the current capabilities on each call
    pub async fn performance_tier(&self) -> PerformanceTier {
        let caps = self.detect().await;
        PerformanceTier::classify(&caps)
    }

    /// Runtime configuration for the current tier
    pub async fn optimization_hints(&self) -> OptimizationHints {
        self.performance_tier().await.optimization_hints()
    }

    /// Drop the cached result and detach any in-flight probe.
    ///
    /// A probe already running is not cancelled; its callers still receive
    /// its result, but it is not cached and the next `detect` probes again.
    pub fn reset(&self) {
        let mut inner = self.lock();
        inner.generation += 1;
        inner.state = ProbeState::Unprobed;
        tracing::debug!(generation = inner.generation, "capability cache reset");
    }

    /// Cached capabilities, without probing
    pub fn cached(&self) -> Option<Arc<Capabilities>> {
        match &self.lock().state {
            ProbeState::Resolved(caps) => Some(Arc::clone(caps)),
            _ => None,
        }
    }

    pub fn state(&self) -> DetectionState {
        match self.lock().state {
            ProbeState::Unprobed => DetectionState::Unprobed,
            ProbeState::Probing { .. } => DetectionState::Probing,
            ProbeState::Resolved(_) => DetectionState::Resolved,
        }
    }

    /// Number of platform probes started over the detector's lifetime
    pub fn probe_count(&self) -> usize {
        self.probes_started.load(Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // The state is replaced wholesale, so a poisoned guard is still consistent.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn start_probe(&self, generation: u64) -> ProbeFuture {
        self.probes_started.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(generation, "starting platform probe");

        let platform = Arc::clone(&self.platform);
        async move {
            let caps = match AssertUnwindSafe(probe_platform(platform.as_ref()))
                .catch_unwind()
                .await
            {
                Ok(caps) => caps,
                Err(_) => {
                    tracing::warn!("platform panicked during probe, using fallback backend");
                    Capabilities::unsupported()
                }
            };
            Arc::new(caps)
        }
        .boxed()
        .shared()
    }

    fn publish(&self, generation: u64, caps: &Arc<Capabilities>) {
        let mut inner = self.lock();
        let current = matches!(
            &inner.state,
            ProbeState::Probing { generation: g, .. } if *g == generation
        );
        if current {
            inner.state = ProbeState::Resolved(Arc::clone(caps));
        } else {
            tracing::debug!(generation, "discarding result of a probe detached by reset");
        }
    }
}

impl std::fmt::Debug for CapabilityDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityDetector")
            .field("state", &self.state())
            .field("probes_started", &self.probe_count())
            .finish()
    }
}

async fn probe_platform(platform: &dyn GpuPlatform) -> Capabilities {
    match try_probe(platform).await {
        Ok(caps) => {
            tracing::info!(
                supported = caps.is_supported(),
                backend = %caps.recommended_backend(),
                max_buffer_size = caps.limits().map(|l| l.max_buffer_size),
                "capability probe complete"
            );
            caps
        }
        Err(ProbeError::EntryPointMissing) => {
            tracing::info!("no accelerated compute entry point, using fallback backend");
            Capabilities::unsupported()
        }
        Err(error) => {
            tracing::warn!(error = %error, "capability probe failed, using fallback backend");
            Capabilities::unsupported()
        }
    }
}

async fn try_probe(platform: &dyn GpuPlatform) -> Result<Capabilities, ProbeError> {
    if !platform.is_available() {
        return Err(ProbeError::EntryPointMissing);
    }

    let Some(adapter) = platform
        .request_adapter(PowerPreference::HighPerformance)
        .await?
    else {
        tracing::info!("platform granted no adapter");
        return Ok(Capabilities::unsupported());
    };

    let device = adapter.request_device().await?;

    Ok(Capabilities::supported(
        AdapterHandle::new(Arc::clone(&adapter)),
        DeviceHandle::new(device),
        adapter.limits(),
        adapter.features(),
    )
    .with_adapter_info(adapter.info()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::platform::{
        AdapterInfo, GpuAdapter, GpuDevice, Limits, MockGpuAdapter, MockGpuPlatform,
    };
    use crate::hardware::simulated::{SimulatedDevice, SimulatedFailure, SimulatedPlatform};
    use crate::hardware::tier::{Quantization, BYTES_PER_GB};

    struct TestDevice;

    impl GpuDevice for TestDevice {}

    fn detector_for(device: SimulatedDevice) -> (Arc<SimulatedPlatform>, CapabilityDetector) {
        let platform = Arc::new(SimulatedPlatform::new(device));
        let detector = CapabilityDetector::new(platform.clone());
        (platform, detector)
    }

    fn adapter_failing_device() -> Arc<dyn GpuAdapter> {
        let mut adapter = MockGpuAdapter::new();
        adapter
            .expect_request_device()
            .returning(|| Err(ProbeError::DeviceRequest("lost".to_string())));
        adapter
            .expect_limits()
            .returning(|| Some(Limits::with_max_buffer_size(8 * BYTES_PER_GB)));
        adapter.expect_features().returning(|| None);
        adapter.expect_info().returning(AdapterInfo::default);
        Arc::new(adapter)
    }

    #[tokio::test]
    async fn test_detect_supported() {
        let (platform, detector) =
            detector_for(SimulatedDevice::with_buffer_mb(4096, &["shader-f16"]));

        let caps = detector.detect().await;
        assert!(caps.is_supported());
        assert_eq!(caps.recommended_backend(), Backend::WebGpu);
        assert_eq!(caps.limits().unwrap().max_buffer_size, 4 * BYTES_PER_GB);
        assert!(caps.adapter_info().is_some());
        assert_eq!(platform.adapter_requests(), 1);
        assert_eq!(detector.state(), DetectionState::Resolved);
    }

    #[tokio::test]
    async fn test_detect_is_memoized() {
        let (platform, detector) = detector_for(SimulatedDevice::with_buffer_mb(1024, &[]));

        let first = detector.detect().await;
        let second = detector.detect().await;
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(detector.probe_count(), 1);
        assert_eq!(platform.adapter_requests(), 1);
    }

    #[tokio::test]
    async fn test_reset_forces_new_probe() {
        let (platform, detector) = detector_for(SimulatedDevice::with_buffer_mb(1024, &[]));

        let first = detector.detect().await;
        detector.reset();
        assert_eq!(detector.state(), DetectionState::Unprobed);
        assert!(detector.cached().is_none());

        let second = detector.detect().await;
        assert!(!Arc::ptr_eq(&first, &second));
        assert!(first.same_report(&second));
        assert_eq!(detector.probe_count(), 2);
        assert_eq!(platform.adapter_requests(), 2);
    }

    #[tokio::test]
    async fn test_headless_detector_is_unsupported() {
        let detector = CapabilityDetector::headless();
        let caps = detector.detect().await;
        assert!(!caps.is_supported());
        assert_eq!(detector.recommended_backend().await, Backend::Wasm);
        assert_eq!(detector.performance_tier().await, PerformanceTier::Low);
    }

    #[tokio::test]
    async fn test_unavailable_entry_point_skips_adapter_request() {
        let mut platform = MockGpuPlatform::new();
        platform.expect_is_available().returning(|| false);
        platform.expect_request_adapter().never();

        let detector = CapabilityDetector::new(Arc::new(platform));
        assert!(detector.detect().await.same_report(&Capabilities::unsupported()));
    }

    #[tokio::test]
    async fn test_adapter_rejection_is_absorbed() {
        let mut platform = MockGpuPlatform::new();
        platform.expect_is_available().returning(|| true);
        platform
            .expect_request_adapter()
            .times(1)
            .returning(|_| Err(ProbeError::AdapterRequest("denied".to_string())));

        let detector = CapabilityDetector::new(Arc::new(platform));
        let caps = detector.detect().await;
        assert!(caps.same_report(&Capabilities::unsupported()));
        // Failures are cached like any other outcome
        detector.detect().await;
        assert_eq!(detector.probe_count(), 1);
    }

    #[tokio::test]
    async fn test_null_adapter_is_unsupported() {
        let mut platform = MockGpuPlatform::new();
        platform.expect_is_available().returning(|| true);
        platform
            .expect_request_adapter()
            .withf(|preference| *preference == PowerPreference::HighPerformance)
            .returning(|_| Ok(None));

        let detector = CapabilityDetector::new(Arc::new(platform));
        assert!(detector.detect().await.same_report(&Capabilities::unsupported()));
    }

    #[tokio::test]
    async fn test_device_rejection_is_absorbed() {
        let adapter = adapter_failing_device();
        let mut platform = MockGpuPlatform::new();
        platform.expect_is_available().returning(|| true);
        platform
            .expect_request_adapter()
            .returning(move |_| Ok(Some(Arc::clone(&adapter))));

        let detector = CapabilityDetector::new(Arc::new(platform));
        let caps = detector.detect().await;
        assert!(!caps.is_supported());
        assert!(caps.limits().is_none());
        assert_eq!(caps.recommended_backend(), Backend::Wasm);
    }

    #[tokio::test]
    async fn test_supported_without_limits_is_medium() {
        let mut adapter = MockGpuAdapter::new();
        adapter
            .expect_request_device()
            .returning(|| Ok(Arc::new(TestDevice) as Arc<dyn GpuDevice>));
        adapter.expect_limits().returning(|| None);
        adapter.expect_features().returning(|| None);
        adapter.expect_info().returning(AdapterInfo::default);
        let adapter: Arc<dyn GpuAdapter> = Arc::new(adapter);

        let mut platform = MockGpuPlatform::new();
        platform.expect_is_available().returning(|| true);
        platform
            .expect_request_adapter()
            .returning(move |_| Ok(Some(Arc::clone(&adapter))));

        let detector = CapabilityDetector::new(Arc::new(platform));
        assert_eq!(detector.performance_tier().await, PerformanceTier::Medium);
        assert!(detector.can_handle_model(2000.0).await);
        assert!(!detector.can_handle_model(2001.0).await);
    }

    #[tokio::test]
    async fn test_simulated_failures_match_null_adapter() {
        for failure in [
            SimulatedFailure::NoAdapter,
            SimulatedFailure::AdapterError,
            SimulatedFailure::DeviceError,
        ] {
            let (_, detector) =
                detector_for(SimulatedDevice::with_buffer_mb(8192, &["shader-f16"]).failing(failure));
            let caps = detector.detect().await;
            assert!(
                caps.same_report(&Capabilities::unsupported()),
                "failure {:?} should resolve to unsupported",
                failure
            );
        }
    }

    #[tokio::test]
    async fn test_optimization_hints_follow_tier() {
        let (_, detector) = detector_for(SimulatedDevice::with_buffer_mb(4096, &["shader-f16"]));
        let hints = detector.optimization_hints().await;
        assert!(hints.use_acceleration);
        assert_eq!(hints.quantization, Quantization::Q16Bit);
        assert_eq!(hints.max_model_size_mb, 4000);
        assert!(hints.enable_cache);
    }

    #[tokio::test]
    async fn test_can_handle_model_boundaries() {
        let (_, detector) = detector_for(SimulatedDevice::with_buffer_mb(4096, &[]));
        assert!(detector.can_handle_model(2048.0).await);
        assert!(!detector.can_handle_model(2049.0).await);
        assert!(!detector.can_handle_model(f64::NAN).await);
    }

    #[test]
    fn test_debug_reports_state() {
        let detector = CapabilityDetector::headless();
        let rendered = format!("{:?}", detector);
        assert!(rendered.contains("Unprobed"));
    }

    #[test]
    fn test_detect_from_blocking_context() {
        let detector = CapabilityDetector::headless();
        let caps = tokio_test::block_on(detector.detect());
        assert!(!caps.is_supported());
    }
}
