//! Haze is a background-blur and glassmorphism effect engine.
//!
//! Given source content layers, an effect (blur or liquid glass) and its configuration, haze
//! decides how to render it on the current platform, builds the filter graph, caches the realized
//! native effect and composites the result, falling back gracefully when a capability is missing.
//!
//! # Pipeline overview
//!
//! 1. **Select**: platform facts resolve to ranked [`BlurCapability`] values; [`StrategySelector`]
//!    picks hardware filter graphs, GPU shaders, software blur or a flat scrim.
//! 2. **Resolve**: style precedence, progressive planning and input scaling turn the effect
//!    inputs into one [`GraphInputs`] per drawn layer.
//! 3. **Build**: [`build_graph`] composes blur, noise, tints and mask into a [`FilterGraphNode`]
//!    tree; [`RenderEffectCache`] realizes it once per distinct input.
//! 4. **Composite**: a [`FramePlan`] records the source into an offscreen and draws it through
//!    the realized effect onto the [`HostCanvas`].
//!
//! Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic**: equal inputs build equal graphs and hit the same cache entry.
//! - **Never blank**: missing capabilities degrade to the next strategy, ending at a scrim.
//! - **Premultiplied RGBA8** for every CPU pixel buffer.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod compile;
mod config;
mod effects;
mod foundation;
mod render;
mod scene;
mod session;

pub use compile::builder::{GraphInputs, build_graph};
pub use compile::fingerprint::GraphKey;
pub use compile::graph::{FilterGraphNode, GradientMask, GraphStats, LiquidGlassUniforms, Shader};
pub use compile::progressive::{ProgressiveLayer, ProgressivePlan, plan_progressive};
pub use config::HazeConfig;
pub use effects::blend::{BlendMode, TileMode};
pub use effects::brush::{Brush, ColorFilter, GradientStop};
pub use effects::dirty::{DirtyFields, DirtyTracker};
pub use effects::kind::VisualEffect;
pub use effects::liquid_glass::{GlassShape, LiquidGlassParameters};
pub use effects::params::{EdgeTreatment, EffectParameters, NOISE_THRESHOLD};
pub use effects::progressive::{Easing, ProgressiveSpec};
pub use effects::style::{HazeStyle, ResolvedStyle};
pub use effects::tint::Tint;
pub use foundation::core::{
    Affine, Color, Dp, Point, Rect, RoundedRect, RoundedRectRadii, Size, Vec2, WindowId,
};
pub use foundation::error::{HazeError, HazeResult};
pub use render::backend::{
    EffectFactory, EffectHandle, HostCanvas, NativeEffect, PixelBuffer, RedrawRequester,
    SurfaceDesc, SurfaceDraw, SurfaceId, realize,
};
pub use render::blur_cpu::{blur_image, blur_rgba8_premul, radius_to_sigma};
pub use render::cache::{CacheStats, RenderEffectCache};
pub use render::capability::{
    ANDROID_HARDWARE_BLUR_SDK, ANDROID_RUNTIME_SHADER_SDK, ANDROID_SOFTWARE_BLUR_SDK,
    AvailabilityLatch, BlurCapability, Capabilities, Platform, PlatformInfo,
    resolve as resolve_capabilities,
};
pub use render::composite::{PremulRgba8, blend, filter_pixel, over, sample_brush};
pub use render::cpu::{CpuContext, evaluate};
pub use render::plan::{FrameOutcome, FramePlan, Pass, RecordSource, execute_plan};
pub use render::recording::{CanvasCall, EffectCall, RecordingBackend, RedrawCounter};
pub use render::registry::{NOISE_TEXTURE_SIZE, NoiseTexture, ResourceRegistry};
pub use render::software::{
    Job, JobSpawner, JobTicket, QueueSpawner, RayonSpawner, SoftwareBlur, SoftwareRequest,
    SoftwareStats,
};
pub use render::strategy::{
    ActiveStrategy, StrategyEnv, StrategyInputs, StrategyKind, StrategySelector, Transition,
    select as select_strategy,
};
pub use render::surface_pool::{LayerPool, SurfacePoolOpts, SurfacePoolStats};
pub use scene::area::{AreaId, ContentLayer, HazeArea, HazeState};
pub use scene::geometry::{GeometrySnapshot, InputScale, ResolvedGeometry};
pub use session::effect::{DrawOutcome, HazeEffect};
pub use session::resolve::EffectMode;
pub use session::stats::EffectStats;
