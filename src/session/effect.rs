//! The per-effect orchestrator.
//!
//! A [`HazeEffect`] owns the author-set inputs, the dirty tracker, the strategy state machine and
//! the attached strategy's resources. [`HazeEffect::draw`] runs once per frame on the render
//! thread:
//!
//! 1. apply finished software blur results,
//! 2. re-run strategy selection, detaching the old strategy before attaching the new one,
//! 3. re-resolve style and graph inputs when a dirty flag says they may have changed,
//! 4. look up (or build) the filter graphs and emit a frame plan,
//! 5. execute the plan against the host canvas.
//!
//! Surface failures skip the frame and ask for another. Capability failures latch the capability
//! off and retry the frame with the next strategy, ending at the scrim, which cannot fail.

use std::sync::Arc;

use crate::compile::builder::build_graph;
use crate::config::HazeConfig;
use crate::effects::brush::Brush;
use crate::effects::dirty::{DirtyFields, DirtyTracker};
use crate::effects::liquid_glass::LiquidGlassParameters;
use crate::effects::params::EdgeTreatment;
use crate::effects::progressive::ProgressiveSpec;
use crate::effects::style::HazeStyle;
use crate::effects::tint::Tint;
use crate::foundation::core::{Color, Dp, WindowId};
use crate::foundation::error::{HazeError, HazeResult};
use crate::render::backend::{EffectFactory, HostCanvas, RedrawRequester, SurfaceDraw};
use crate::render::capability::{self, BlurCapability, PlatformInfo};
use crate::render::plan::{FramePlan, Pass, execute_plan};
use crate::render::registry::ResourceRegistry;
use crate::render::software::{JobSpawner, JobTicket, SoftwareRequest};
use crate::render::strategy::{
    ActiveStrategy, StrategyEnv, StrategyInputs, StrategyKind, StrategySelector,
};
use crate::render::surface_pool::LayerPool;
use crate::scene::area::HazeState;
use crate::scene::geometry::GeometrySnapshot;
use crate::session::resolve::{
    EffectInputs, EffectMode, Resolution, clip_for, push_passthrough, push_record, push_scrim,
    resolve,
};
use crate::session::stats::EffectStats;

/// Strategies tried within one frame before giving up on it.
const MAX_STRATEGY_ATTEMPTS: usize = 5;

/// Flags whose change can alter a [`Resolution`].
const RESOLUTION_AFFECTING: DirtyFields = DirtyFields::RENDER_EFFECT_AFFECTING
    .union(DirtyFields::STRATEGY_AFFECTING)
    .union(DirtyFields::BACKGROUND_COLOR)
    .union(DirtyFields::FALLBACK_TINT);

/// Result of one [`HazeEffect::draw`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawOutcome {
    /// The frame drew with this strategy.
    Drawn(StrategyKind),
    /// Geometry is not laid out yet; nothing was drawn.
    NotReady,
    /// An offscreen surface was unavailable; nothing was drawn and a redraw was requested.
    Skipped,
}

/// One blur or liquid-glass effect instance.
pub struct HazeEffect {
    registry: Arc<ResourceRegistry>,
    platform: PlatformInfo,
    blur_enabled: Option<bool>,
    force_scrim: bool,
    env: StrategyEnv,
    pool: LayerPool,
    inputs: EffectInputs,
    geometry: Option<GeometrySnapshot>,
    areas_generation: Option<u64>,
    dirty: DirtyTracker,
    selector: StrategySelector,
    active: Option<ActiveStrategy>,
    resolution: Option<Resolution>,
    stats: EffectStats,
}

impl HazeEffect {
    /// Effect using `registry`'s config and resources on `platform`.
    ///
    /// Software blur jobs run on `spawner` and ask `redraw` for a frame when they finish.
    pub fn new(
        registry: Arc<ResourceRegistry>,
        platform: PlatformInfo,
        spawner: Arc<dyn JobSpawner>,
        redraw: Arc<dyn RedrawRequester>,
    ) -> Self {
        let config = registry.config();
        let env = StrategyEnv {
            cache_capacity: config.cache_capacity,
            spawner,
            redraw,
            software_max_radius_px: config.software_blur_max_radius,
        };
        let pool = LayerPool::new(config.surface_pool);
        Self {
            registry,
            platform,
            blur_enabled: None,
            force_scrim: false,
            env,
            pool,
            inputs: EffectInputs::default(),
            geometry: None,
            areas_generation: None,
            dirty: DirtyTracker::all_dirty(),
            selector: StrategySelector::new(),
            active: None,
            resolution: None,
            stats: EffectStats::default(),
        }
    }

    /// Engine config.
    pub fn config(&self) -> &HazeConfig {
        self.registry.config()
    }

    /// Counters, including those of detached strategies.
    pub fn stats(&self) -> EffectStats {
        let mut stats = self.stats;
        match &self.active {
            Some(ActiveStrategy::Graph { cache, .. }) => stats.add_cache(cache.stats()),
            Some(ActiveStrategy::Software(sb)) => stats.add_software(sb.stats()),
            Some(ActiveStrategy::Scrim) | None => {}
        }
        stats
    }

    /// Current strategy state.
    pub fn strategy(&self) -> StrategyKind {
        self.selector.state()
    }

    /// Accumulated dirty flags.
    pub fn dirty_fields(&self) -> DirtyFields {
        self.dirty.fields()
    }

    /// Return `true` when the host should draw another frame.
    pub fn needs_redraw(&self) -> bool {
        self.dirty.needs_redraw()
    }

    /// Ticket of the running software blur job, if any.
    pub fn pending_job(&self) -> Option<JobTicket> {
        match &self.active {
            Some(ActiveStrategy::Software(sb)) => sb.ticket(),
            _ => None,
        }
    }

    /// Set the blur radius. Negative or non-finite radii are rejected.
    pub fn set_blur_radius(&mut self, radius: Dp) -> HazeResult<()> {
        let radius = radius.require_non_negative("blur radius")?;
        if self.inputs.explicit.blur_radius != Some(radius) {
            self.inputs.explicit.blur_radius = Some(radius);
            self.dirty.mark(DirtyFields::BLUR_RADIUS);
        }
        Ok(())
    }

    /// Set the noise factor. Clamped into `[0, 1]` when the graph is built.
    pub fn set_noise_factor(&mut self, noise_factor: f32) {
        if self.inputs.explicit.noise_factor != Some(noise_factor) {
            self.inputs.explicit.noise_factor = Some(noise_factor);
            self.dirty.mark(DirtyFields::NOISE_FACTOR);
        }
    }

    /// Replace the tint list.
    pub fn set_tints(&mut self, tints: Vec<Tint>) {
        if self.inputs.explicit.tints != tints {
            self.inputs.explicit.tints = tints;
            self.dirty.mark(DirtyFields::TINTS);
        }
    }

    /// Set the tint alpha multiplier. Clamped into `[0, 1]` when the graph is built.
    pub fn set_tint_alpha_modulate(&mut self, modulate: f32) {
        if self.inputs.tint_alpha_modulate != modulate {
            self.inputs.tint_alpha_modulate = modulate;
            self.dirty.mark(DirtyFields::TINTS);
        }
    }

    /// Set the background colour.
    ///
    /// Draw-only, unless the tints are derived from the background colour.
    pub fn set_background_color(&mut self, color: Option<Color>) {
        if self.inputs.explicit.background_color != color {
            self.inputs.explicit.background_color = color;
            self.dirty.mark(DirtyFields::BACKGROUND_COLOR);
            if self.inputs.tints_follow_background() {
                self.dirty.mark(DirtyFields::STYLE);
            }
        }
    }

    /// Set the tint drawn by the scrim strategy.
    pub fn set_fallback_tint(&mut self, tint: Tint) {
        if self.inputs.explicit.fallback_tint != tint {
            self.inputs.explicit.fallback_tint = tint;
            self.dirty.mark(DirtyFields::FALLBACK_TINT);
        }
    }

    /// Set the per-effect style.
    pub fn set_style(&mut self, style: HazeStyle) -> HazeResult<()> {
        validate_style(&style)?;
        if self.inputs.style != style {
            self.inputs.style = style;
            self.dirty.mark(DirtyFields::STYLE);
        }
        Ok(())
    }

    /// Set the inherited style.
    pub fn set_ambient_style(&mut self, style: HazeStyle) -> HazeResult<()> {
        validate_style(&style)?;
        if self.inputs.ambient != style {
            self.inputs.ambient = style;
            self.dirty.mark(DirtyFields::STYLE);
        }
        Ok(())
    }

    /// Set the static alpha mask.
    pub fn set_mask(&mut self, mask: Option<Brush>) {
        if self.inputs.mask != mask {
            self.inputs.mask = mask;
            self.dirty.mark(DirtyFields::MASK);
        }
    }

    /// Set the progressive descriptor. Intensities outside `[0, 1]` are rejected.
    pub fn set_progressive(&mut self, progressive: Option<ProgressiveSpec>) -> HazeResult<()> {
        if let Some(p) = &progressive {
            p.validate()?;
        }
        if self.inputs.progressive != progressive {
            self.inputs.progressive = progressive;
            self.dirty.mark(DirtyFields::PROGRESSIVE);
        }
        Ok(())
    }

    /// Switch to liquid glass, or back to blur with `None`.
    pub fn set_liquid_glass(&mut self, params: Option<LiquidGlassParameters>) -> HazeResult<()> {
        let params = params.map(LiquidGlassParameters::normalized).transpose()?;
        if self.inputs.liquid_glass != params {
            self.inputs.liquid_glass = params;
            self.dirty.mark(DirtyFields::EFFECT_KIND);
        }
        Ok(())
    }

    /// Set the global alpha. Draw-only.
    pub fn set_alpha(&mut self, alpha: f32) {
        let alpha = if alpha.is_nan() { 0.0 } else { alpha.clamp(0.0, 1.0) };
        if self.inputs.alpha != alpha {
            self.inputs.alpha = alpha;
            self.dirty.mark(DirtyFields::ALPHA);
        }
    }

    /// Set the edge treatment.
    pub fn set_edge_treatment(&mut self, edge: EdgeTreatment) {
        if self.inputs.edge != edge {
            self.inputs.edge = edge;
            self.dirty.mark(DirtyFields::EDGE_TREATMENT);
        }
    }

    /// Choose between background and content blur.
    pub fn set_mode(&mut self, mode: EffectMode) {
        if self.inputs.mode != mode {
            self.inputs.mode = mode;
            self.dirty.mark(DirtyFields::MODE);
        }
    }

    /// In content mode, draw the unblurred content under the blurred overlay.
    pub fn set_draw_content_behind(&mut self, behind: bool) {
        if self.inputs.draw_content_behind != behind {
            self.inputs.draw_content_behind = behind;
            self.dirty.mark(DirtyFields::MODE);
        }
    }

    /// Override blurring. `None` follows the platform.
    pub fn set_blur_enabled(&mut self, enabled: Option<bool>) {
        if self.blur_enabled != enabled {
            self.blur_enabled = enabled;
            self.dirty.mark(DirtyFields::BLUR_ENABLED);
        }
    }

    /// Force the scrim, e.g. for a non-accelerated destination or an inspection mode.
    pub fn set_force_scrim(&mut self, force: bool) {
        if self.force_scrim != force {
            self.force_scrim = force;
            self.dirty.mark(DirtyFields::PLATFORM);
        }
    }

    /// Replace the platform facts.
    pub fn set_platform(&mut self, platform: PlatformInfo) {
        if self.platform != platform {
            self.platform = platform;
            self.dirty.mark(DirtyFields::PLATFORM);
        }
    }

    /// Set the stacking order and window the effect reads areas from.
    pub fn set_placement(&mut self, z_index: f32, window: Option<WindowId>) {
        if self.inputs.z_index != z_index || self.inputs.window != window {
            self.inputs.z_index = z_index;
            self.inputs.window = window;
            self.dirty.mark(DirtyFields::AREAS);
        }
    }

    /// Publish this frame's layout.
    pub fn set_geometry(&mut self, geometry: GeometrySnapshot) -> HazeResult<()> {
        geometry.input_scale.validated()?;
        let Some(prev) = self.geometry.replace(geometry) else {
            self.dirty.mark(
                DirtyFields::SIZE
                    | DirtyFields::SCREEN_POSITION
                    | DirtyFields::CONTENT_OFFSET
                    | DirtyFields::DENSITY
                    | DirtyFields::INPUT_SCALE,
            );
            return Ok(());
        };
        let mut changed = DirtyFields::NONE;
        if prev.content_size != geometry.content_size || prev.layer_size != geometry.layer_size {
            changed |= DirtyFields::SIZE;
        }
        if prev.position_on_screen != geometry.position_on_screen {
            changed |= DirtyFields::SCREEN_POSITION;
        }
        if prev.layer_offset != geometry.layer_offset {
            changed |= DirtyFields::CONTENT_OFFSET;
        }
        if prev.density != geometry.density {
            changed |= DirtyFields::DENSITY;
        }
        if prev.input_scale != geometry.input_scale {
            changed |= DirtyFields::INPUT_SCALE;
        }
        self.dirty.mark(changed);
        Ok(())
    }

    /// Mark the recorded content changed (content mode).
    pub fn invalidate_content(&mut self) {
        self.dirty.mark(DirtyFields::AREAS);
    }

    /// Draw one frame.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn draw<B: HostCanvas + EffectFactory + ?Sized>(
        &mut self,
        backend: &mut B,
        areas: &HazeState,
    ) -> HazeResult<DrawOutcome> {
        let Some(geometry) = self.geometry.filter(GeometrySnapshot::is_ready) else {
            self.stats.frames_skipped += 1;
            tracing::trace!("effect not laid out, frame skipped");
            return Ok(DrawOutcome::NotReady);
        };
        if self.areas_generation != Some(areas.generation()) {
            self.areas_generation = Some(areas.generation());
            self.dirty.mark(DirtyFields::AREAS);
        }
        if let Some(ActiveStrategy::Software(sb)) = &mut self.active
            && sb.poll()
        {
            self.dirty.mark(DirtyFields::SOFTWARE_RESULT);
        }

        for _ in 0..MAX_STRATEGY_ATTEMPTS {
            match self.draw_frame(backend, areas, geometry) {
                Ok(strategy) => {
                    self.dirty.clear();
                    self.stats.frames_drawn += 1;
                    return Ok(DrawOutcome::Drawn(strategy));
                }
                Err(e) if e.is_transient() => {
                    self.stats.frames_skipped += 1;
                    tracing::warn!(error = %e, "offscreen surface unavailable, frame skipped");
                    backend.request_redraw();
                    return Ok(DrawOutcome::Skipped);
                }
                Err(HazeError::Capability(msg)) => {
                    let cap = self.failed_capability();
                    tracing::warn!(
                        error = %msg,
                        capability = ?cap,
                        "strategy failed, falling back"
                    );
                    self.registry.latch().mark_unavailable(cap);
                    self.dirty.mark(DirtyFields::PLATFORM);
                    self.resolution = None;
                }
                Err(e) => return Err(e),
            }
        }
        self.stats.frames_skipped += 1;
        tracing::warn!("no strategy could draw the effect, frame skipped");
        backend.request_redraw();
        Ok(DrawOutcome::Skipped)
    }

    /// Release every native resource and cancel background work.
    pub fn detach<B: HostCanvas + EffectFactory + ?Sized>(mut self, backend: &mut B) {
        if let Some(active) = self.active.take() {
            active.detach(backend);
        }
        self.pool.clear(backend);
        self.selector.reset();
        tracing::debug!("effect detached");
    }

    fn draw_frame<B: HostCanvas + EffectFactory + ?Sized>(
        &mut self,
        backend: &mut B,
        areas: &HazeState,
        geometry: GeometrySnapshot,
    ) -> HazeResult<StrategyKind> {
        let capabilities = capability::resolve(&self.platform, self.registry.latch());
        let inputs = StrategyInputs {
            capabilities,
            blur_enabled: self.blur_enabled,
            force_scrim: self.force_scrim,
        };
        if let Some(t) = self.selector.update(&inputs) {
            self.switch_strategy(backend, t.to);
        }
        if self.active.is_none() {
            self.switch_strategy(backend, self.selector.state());
        }
        let kind = self.selector.state();

        let res = match self.resolution.take() {
            Some(mut r)
                if r.strategy == kind
                    && r.capabilities == inputs.capabilities
                    && !self.dirty.fields().intersects(RESOLUTION_AFFECTING) =>
            {
                // Screen position is draw-only.
                r.geometry.position_on_screen = geometry.position_on_screen;
                r
            }
            _ => {
                let r = resolve(
                    &self.inputs,
                    self.registry.config(),
                    kind,
                    &inputs.capabilities,
                    geometry,
                )?;
                if r.software_graph.is_some() {
                    self.stats.graph_builds += 1;
                }
                r
            }
        };
        let result = self.render(backend, areas, &res);
        self.resolution = Some(res);
        result.map(|()| kind)
    }

    fn render<B: HostCanvas + EffectFactory + ?Sized>(
        &mut self,
        backend: &mut B,
        state: &HazeState,
        res: &Resolution,
    ) -> HazeResult<()> {
        let inputs = &self.inputs;
        let areas = match inputs.mode {
            EffectMode::Background => {
                let g = &res.geometry;
                let bounds = res.dest() + g.position_on_screen.to_vec2();
                state.areas_for_effect(bounds, inputs.z_index, inputs.window)
            }
            EffectMode::Content => Vec::new(),
        };
        let draw = SurfaceDraw {
            dest: res.dest(),
            clip: clip_for(&inputs.edge, res),
            alpha: inputs.alpha,
            mask: None,
        };
        let content_behind = inputs.mode == EffectMode::Content && inputs.draw_content_behind;

        let mut plan = FramePlan::default();
        if res.is_identity() {
            push_passthrough(&mut plan, inputs, &areas, res);
            execute_plan(&plan, backend, &mut self.pool, None)?;
            return Ok(());
        }

        match &mut self.active {
            Some(ActiveStrategy::Graph { cache, .. }) => {
                cache.begin_frame();
                let mut builds = 0;
                let mut handles = Vec::with_capacity(res.layers.len());
                for gi in &res.layers {
                    let handle = cache.get_or_create(gi, backend, |gi| {
                        builds += 1;
                        build_graph(gi)
                    });
                    self.stats.graph_builds += builds;
                    builds = 0;
                    handles.push(handle?);
                }
                cache.end_frame(backend);
                if content_behind {
                    plan.push(Pass::Content);
                }
                let slot = push_record(&mut plan, inputs, &areas, res);
                for effect in handles {
                    plan.push(Pass::Composite {
                        slot,
                        effect,
                        draw: draw.clone(),
                    });
                }
                execute_plan(&plan, backend, &mut self.pool, None)?;
            }
            Some(ActiveStrategy::Software(sb)) => {
                let changed =
                    self.dirty.fields() - DirtyFields::SOFTWARE_RESULT - DirtyFields::ALPHA;
                let capture = !changed.is_empty() || (sb.latest().is_none() && !sb.is_busy());
                if content_behind {
                    plan.push(Pass::Content);
                }
                if capture {
                    let slot = push_record(&mut plan, inputs, &areas, res);
                    plan.push(Pass::Capture { slot });
                }
                if sb.latest().is_some() {
                    plan.push(Pass::Pixels { draw });
                } else {
                    // Nothing computed yet.
                    push_scrim(&mut plan, res, &draw);
                }
                let outcome = execute_plan(&plan, backend, &mut self.pool, sb.latest())?;
                if let Some(source) = outcome.captured
                    && let Some(graph) = &res.software_graph
                {
                    sb.submit(SoftwareRequest {
                        source,
                        graph: graph.clone(),
                        noise: self.registry.noise_texture(),
                    });
                }
            }
            Some(ActiveStrategy::Scrim) | None => {
                if inputs.mode == EffectMode::Content {
                    plan.push(Pass::Content);
                }
                push_scrim(&mut plan, res, &draw);
                execute_plan(&plan, backend, &mut self.pool, None)?;
            }
        }
        Ok(())
    }

    fn switch_strategy<F: EffectFactory + ?Sized>(&mut self, factory: &mut F, to: StrategyKind) {
        if let Some(old) = self.active.take() {
            match &old {
                ActiveStrategy::Graph { cache, .. } => self.stats.add_cache(cache.stats()),
                ActiveStrategy::Software(sb) => self.stats.add_software(sb.stats()),
                ActiveStrategy::Scrim => {}
            }
            old.detach(factory);
        }
        self.active = Some(ActiveStrategy::attach(to, &self.env));
        self.stats.strategy_transitions += 1;
        tracing::debug!(strategy = ?to, "strategy attached");
    }

    /// Capability to latch off after the current strategy reported a capability failure.
    fn failed_capability(&self) -> BlurCapability {
        let runtime_shader = self.resolution.as_ref().is_some_and(|r| r.runtime_shader);
        match self.selector.state() {
            StrategyKind::GpuShader => BlurCapability::GpuRuntimeShader,
            StrategyKind::Hardware if runtime_shader => BlurCapability::GpuRuntimeShader,
            StrategyKind::Hardware => BlurCapability::HardwareFilterGraph,
            StrategyKind::Software => BlurCapability::SoftwareBlurScript,
            StrategyKind::Scrim | StrategyKind::Unresolved => BlurCapability::None,
        }
    }
}

impl std::fmt::Debug for HazeEffect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HazeEffect")
            .field("platform", &self.platform)
            .field("strategy", &self.selector.state())
            .field("dirty", &self.dirty.fields())
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

fn validate_style(style: &HazeStyle) -> HazeResult<()> {
    if let Some(r) = style.blur_radius {
        r.require_non_negative("style blur radius")?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/session/effect.rs"]
mod tests;
