use super::*;
use crate::render::recording::RecordingBackend;

fn desc(w: u32, h: u32) -> SurfaceDesc {
    SurfaceDesc {
        width: w,
        height: h,
    }
}

#[test]
fn released_surfaces_are_reused() {
    let mut canvas = RecordingBackend::new();
    let mut p = LayerPool::new(SurfacePoolOpts::default());
    let d = desc(8, 8);

    let a = p.acquire(&mut canvas, d).unwrap();
    p.release(&mut canvas, d, a);
    let b = p.acquire(&mut canvas, d).unwrap();
    assert_eq!(a, b);
    assert_eq!(canvas.offscreens_created(), 1);
    assert_eq!(p.stats().reuses, 1);
}

#[test]
fn pool_honors_bucket_cap() {
    let mut canvas = RecordingBackend::new();
    let mut p = LayerPool::new(SurfacePoolOpts {
        max_surfaces: 1,
        max_pool_pixels: 1 << 30,
    });
    let d = desc(8, 8);

    let a = p.acquire(&mut canvas, d).unwrap();
    let b = p.acquire(&mut canvas, d).unwrap();
    p.release(&mut canvas, d, a);
    p.release(&mut canvas, d, b);

    assert_eq!(p.stats().retained_surfaces, 1);
    assert_eq!(canvas.live_surfaces(), 1);
}

#[test]
fn pool_honors_global_pixel_cap() {
    let mut canvas = RecordingBackend::new();
    let mut p = LayerPool::new(SurfacePoolOpts {
        max_surfaces: 8,
        max_pool_pixels: 64,
    });
    let d = desc(8, 8);

    let a = p.acquire(&mut canvas, d).unwrap();
    let b = p.acquire(&mut canvas, d).unwrap();
    p.release(&mut canvas, d, a);
    p.release(&mut canvas, d, b);

    let st = p.stats();
    assert_eq!(st.retained_pixels, 64);
    assert_eq!(st.retained_surfaces, 1);
    assert!(st.dropped_on_release >= 1);
}

#[test]
fn allocation_failure_propagates_and_clear_frees_everything() {
    let mut canvas = RecordingBackend::new();
    let mut p = LayerPool::new(SurfacePoolOpts::default());
    assert!(p.acquire(&mut canvas, desc(0, 4)).is_err());

    let d = desc(4, 4);
    let a = p.acquire(&mut canvas, d).unwrap();
    p.release(&mut canvas, d, a);
    p.clear(&mut canvas);
    assert_eq!(canvas.live_surfaces(), 0);
    assert_eq!(p.stats().retained_surfaces, 0);
}
