//! Platform capability resolution.
//!
//! Capabilities are ranked `HardwareFilterGraph > GpuRuntimeShader > SoftwareBlurScript > None`.
//! A capability is only listed when the platform facts guarantee it works; one that fails at
//! runtime is latched off for the rest of the process.

use smallvec::SmallVec;
use std::sync::atomic::{AtomicU8, Ordering};

/// First Android SDK level with native render-effect blur.
pub const ANDROID_HARDWARE_BLUR_SDK: u32 = 31;
/// First Android SDK level with runtime shaders.
pub const ANDROID_RUNTIME_SHADER_SDK: u32 = 33;
/// First Android SDK level where the legacy software blur script is usable.
pub const ANDROID_SOFTWARE_BLUR_SDK: u32 = 23;

/// Host platform family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Platform {
    /// Android at the given SDK level.
    Android {
        /// API level.
        sdk: u32,
    },
    /// Desktop (Skia-backed).
    Desktop,
    /// iOS (Skia-backed).
    Ios,
    /// Browser (Skia on WebAssembly).
    Web,
    /// No GPU; offscreen CPU rendering only.
    Headless,
}

/// Facts about the platform and destination surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PlatformInfo {
    /// Platform family.
    pub platform: Platform,
    /// The destination canvas is GPU accelerated.
    pub hardware_accelerated: bool,
    /// The host can read back offscreen pixels for CPU processing.
    pub pixel_readback: bool,
}

impl PlatformInfo {
    /// Accelerated platform with pixel readback.
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            hardware_accelerated: !matches!(platform, Platform::Headless),
            pixel_readback: true,
        }
    }
}

/// One way of realizing a blur.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BlurCapability {
    /// Native render-effect filter graphs.
    HardwareFilterGraph,
    /// Native filter graphs plus runtime shaders (progressive blur, liquid glass).
    GpuRuntimeShader,
    /// CPU blur of read-back pixels.
    SoftwareBlurScript,
    /// Nothing but flat fills.
    None,
}

impl BlurCapability {
    fn bit(self) -> u8 {
        match self {
            Self::HardwareFilterGraph => 1 << 0,
            Self::GpuRuntimeShader => 1 << 1,
            Self::SoftwareBlurScript => 1 << 2,
            Self::None => 0,
        }
    }
}

/// Ordered capability list, best first. Always ends with [`BlurCapability::None`].
pub type Capabilities = SmallVec<[BlurCapability; 4]>;

/// Process-lifetime record of capabilities observed to fail.
///
/// Once marked, a capability stays unavailable; resolution never offers it again.
#[derive(Debug, Default)]
pub struct AvailabilityLatch {
    failed: AtomicU8,
}

impl AvailabilityLatch {
    /// Latch with nothing marked.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `cap` permanently unavailable. Returns `true` the first time.
    pub fn mark_unavailable(&self, cap: BlurCapability) -> bool {
        let bit = cap.bit();
        if bit == 0 {
            return false;
        }
        let prev = self.failed.fetch_or(bit, Ordering::AcqRel);
        let first = prev & bit == 0;
        if first {
            tracing::warn!(capability = ?cap, "capability failed at runtime, latched unavailable");
        }
        first
    }

    /// Return `true` unless `cap` was marked unavailable.
    pub fn is_available(&self, cap: BlurCapability) -> bool {
        self.failed.load(Ordering::Acquire) & cap.bit() == 0
    }
}

/// Resolve the ranked capability list for `info`.
///
/// Deterministic for a given `info` and latch state.
pub fn resolve(info: &PlatformInfo, latch: &AvailabilityLatch) -> Capabilities {
    let mut caps = Capabilities::new();
    let (hardware, shader, software) = match info.platform {
        Platform::Android { sdk } => (
            info.hardware_accelerated && sdk >= ANDROID_HARDWARE_BLUR_SDK,
            info.hardware_accelerated && sdk >= ANDROID_RUNTIME_SHADER_SDK,
            info.pixel_readback && sdk >= ANDROID_SOFTWARE_BLUR_SDK,
        ),
        Platform::Desktop | Platform::Ios | Platform::Web => (
            info.hardware_accelerated,
            info.hardware_accelerated,
            info.pixel_readback,
        ),
        Platform::Headless => (false, false, info.pixel_readback),
    };

    for (present, cap) in [
        (hardware, BlurCapability::HardwareFilterGraph),
        (shader, BlurCapability::GpuRuntimeShader),
        (software, BlurCapability::SoftwareBlurScript),
    ] {
        if present && latch.is_available(cap) {
            caps.push(cap);
        }
    }
    caps.push(BlurCapability::None);
    caps
}

#[cfg(test)]
#[path = "../../tests/unit/render/capability.rs"]
mod tests;
