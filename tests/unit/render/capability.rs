use super::*;

fn android(sdk: u32) -> PlatformInfo {
    PlatformInfo::new(Platform::Android { sdk })
}

#[test]
fn capabilities_are_ranked_best_first() {
    let caps = resolve(&android(34), &AvailabilityLatch::new());
    assert_eq!(
        caps.as_slice(),
        &[
            BlurCapability::HardwareFilterGraph,
            BlurCapability::GpuRuntimeShader,
            BlurCapability::SoftwareBlurScript,
            BlurCapability::None,
        ]
    );
    assert!(caps.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn android_sdk_levels_gate_capabilities() {
    let latch = AvailabilityLatch::new();
    let s31 = resolve(&android(31), &latch);
    assert!(s31.contains(&BlurCapability::HardwareFilterGraph));
    assert!(!s31.contains(&BlurCapability::GpuRuntimeShader));

    let s28 = resolve(&android(28), &latch);
    assert_eq!(
        s28.as_slice(),
        &[BlurCapability::SoftwareBlurScript, BlurCapability::None]
    );

    let s21 = resolve(&android(21), &latch);
    assert_eq!(s21.as_slice(), &[BlurCapability::None]);
}

#[test]
fn unaccelerated_surfaces_never_claim_hardware() {
    let info = PlatformInfo {
        hardware_accelerated: false,
        ..PlatformInfo::new(Platform::Desktop)
    };
    let caps = resolve(&info, &AvailabilityLatch::new());
    assert!(!caps.contains(&BlurCapability::HardwareFilterGraph));
    assert!(!caps.contains(&BlurCapability::GpuRuntimeShader));
}

#[test]
fn latched_capability_stays_unavailable() {
    let latch = AvailabilityLatch::new();
    assert!(latch.mark_unavailable(BlurCapability::SoftwareBlurScript));
    assert!(!latch.mark_unavailable(BlurCapability::SoftwareBlurScript));
    let caps = resolve(&android(28), &latch);
    assert_eq!(caps.as_slice(), &[BlurCapability::None]);
}

#[test]
fn scrim_capability_cannot_be_latched() {
    let latch = AvailabilityLatch::new();
    assert!(!latch.mark_unavailable(BlurCapability::None));
    assert!(latch.is_available(BlurCapability::None));
}
