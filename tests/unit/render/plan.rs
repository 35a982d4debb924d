use super::*;
use crate::foundation::core::Color;
use crate::render::recording::{CanvasCall, RecordingBackend};
use crate::render::surface_pool::SurfacePoolOpts;

fn draw(w: f64, h: f64) -> SurfaceDraw {
    SurfaceDraw {
        dest: Rect::new(0.0, 0.0, w, h),
        clip: None,
        alpha: 1.0,
        mask: None,
    }
}

fn blur_plan() -> FramePlan {
    let mut plan = FramePlan::default();
    let slot = plan.add_slot(SurfaceDesc {
        width: 8,
        height: 4,
    });
    plan.push(Pass::Record {
        slot,
        clear: [0, 0, 0, 255],
        sources: vec![RecordSource::Area {
            layer: ContentLayer(1),
            transform: Affine::IDENTITY,
        }],
    });
    plan.push(Pass::Composite {
        slot,
        effect: Some(EffectHandle(7)),
        draw: draw(8.0, 4.0),
    });
    plan
}

#[test]
fn passes_run_in_order_and_surfaces_return_to_pool() {
    let mut canvas = RecordingBackend::new();
    let mut pool = LayerPool::new(SurfacePoolOpts::default());
    let out = execute_plan(&blur_plan(), &mut canvas, &mut pool, None).unwrap();
    assert_eq!(out.passes_run, 2);

    let kinds: Vec<&str> = canvas
        .canvas_calls()
        .iter()
        .map(|c| match c {
            CanvasCall::CreateOffscreen { .. } => "create",
            CanvasCall::Clear { .. } => "clear",
            CanvasCall::RecordArea { .. } => "record",
            CanvasCall::DrawSurface { .. } => "composite",
            _ => "other",
        })
        .collect();
    assert_eq!(kinds, ["create", "clear", "record", "composite"]);
    assert_eq!(pool.stats().retained_surfaces, 1);
}

#[test]
fn surface_failure_draws_nothing() {
    let mut canvas = RecordingBackend::new();
    canvas.set_fail_offscreen(true);
    let mut pool = LayerPool::new(SurfacePoolOpts::default());
    let err = execute_plan(&blur_plan(), &mut canvas, &mut pool, None).unwrap_err();
    assert!(err.is_transient());
    assert!(
        !canvas
            .canvas_calls()
            .iter()
            .any(|c| matches!(c, CanvasCall::DrawSurface { .. } | CanvasCall::Clear { .. }))
    );
    assert_eq!(canvas.live_surfaces(), 0);
}

#[test]
fn capture_returns_read_back_pixels() {
    let mut canvas = RecordingBackend::new();
    canvas.set_readback_color([1, 2, 3, 255]);
    let mut pool = LayerPool::new(SurfacePoolOpts::default());
    let mut plan = FramePlan::default();
    let slot = plan.add_slot(SurfaceDesc {
        width: 3,
        height: 2,
    });
    plan.push(Pass::Record {
        slot,
        clear: [0; 4],
        sources: vec![RecordSource::Content {
            transform: Affine::scale(0.5),
        }],
    });
    plan.push(Pass::Capture { slot });
    let out = execute_plan(&plan, &mut canvas, &mut pool, None).unwrap();
    let px = out.captured.unwrap();
    assert_eq!(px.dimensions(), (3, 2));
    assert_eq!(px.get_pixel(2, 1).0, [1, 2, 3, 255]);
}

#[test]
fn pixels_pass_needs_a_result() {
    let mut canvas = RecordingBackend::new();
    let mut pool = LayerPool::new(SurfacePoolOpts::default());
    let mut plan = FramePlan::default();
    plan.push(Pass::Pixels {
        draw: draw(2.0, 2.0),
    });
    plan.push(Pass::Fill {
        rect: Rect::new(0.0, 0.0, 2.0, 2.0),
        brush: Brush::Solid(Color::WHITE),
        mode: BlendMode::SrcOver,
        draw: draw(2.0, 2.0),
    });
    execute_plan(&plan, &mut canvas, &mut pool, None).unwrap();
    assert!(
        !canvas
            .canvas_calls()
            .iter()
            .any(|c| matches!(c, CanvasCall::DrawPixels { .. }))
    );

    let px = PixelBuffer::new(2, 2);
    execute_plan(&plan, &mut canvas, &mut pool, Some(&px)).unwrap();
    assert!(
        canvas
            .canvas_calls()
            .iter()
            .any(|c| matches!(c, CanvasCall::DrawPixels { width: 2, height: 2, .. }))
    );
}
