//! Strategy selection and the resources each strategy owns.

use std::sync::Arc;

use crate::render::backend::{EffectFactory, RedrawRequester};
use crate::render::cache::RenderEffectCache;
use crate::render::capability::{BlurCapability, Capabilities};
use crate::render::software::{JobSpawner, SoftwareBlur};

/// Rendering strategy state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    /// Nothing selected yet.
    #[default]
    Unresolved,
    /// Native filter graphs.
    Hardware,
    /// Native filter graphs with runtime shaders only.
    GpuShader,
    /// CPU blur of read-back pixels.
    Software,
    /// Flat tint, no blur.
    Scrim,
}

impl StrategyKind {
    /// Return `true` for strategies that draw through native filter graphs.
    pub fn uses_filter_graph(self) -> bool {
        matches!(self, Self::Hardware | Self::GpuShader)
    }
}

/// Everything a strategy decision depends on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StrategyInputs {
    /// Ranked capabilities, best first.
    pub capabilities: Capabilities,
    /// User override. `None` uses the platform default.
    pub blur_enabled: Option<bool>,
    /// Destination cannot blur (not accelerated, preview or inspection mode).
    pub force_scrim: bool,
}

/// Pure strategy rule.
///
/// Forced scrim wins over everything, then an explicit `blur_enabled = false`, then the best
/// capability on offer.
pub fn select(inputs: &StrategyInputs) -> StrategyKind {
    if inputs.force_scrim || inputs.blur_enabled == Some(false) {
        return StrategyKind::Scrim;
    }
    inputs
        .capabilities
        .iter()
        .find_map(|cap| match cap {
            BlurCapability::HardwareFilterGraph => Some(StrategyKind::Hardware),
            BlurCapability::GpuRuntimeShader => Some(StrategyKind::GpuShader),
            BlurCapability::SoftwareBlurScript => Some(StrategyKind::Software),
            BlurCapability::None => None,
        })
        .unwrap_or(StrategyKind::Scrim)
}

/// A strategy change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    /// Previous state.
    pub from: StrategyKind,
    /// New state.
    pub to: StrategyKind,
}

/// Strategy state machine.
#[derive(Clone, Debug, Default)]
pub struct StrategySelector {
    state: StrategyKind,
    last: Option<StrategyInputs>,
}

impl StrategySelector {
    /// Unresolved selector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> StrategyKind {
        self.state
    }

    /// Re-evaluate with `inputs`. Returns the transition when the state changed.
    ///
    /// Unchanged inputs are a no-op, so calling this every frame is cheap.
    pub fn update(&mut self, inputs: &StrategyInputs) -> Option<Transition> {
        if self.state != StrategyKind::Unresolved && self.last.as_ref() == Some(inputs) {
            return None;
        }
        self.last = Some(inputs.clone());
        let to = select(inputs);
        if to == self.state {
            return None;
        }
        let t = Transition {
            from: self.state,
            to,
        };
        tracing::debug!(from = ?t.from, to = ?t.to, "strategy transition");
        self.state = to;
        Some(t)
    }

    /// Forget the current state. The next update transitions from `Unresolved`.
    pub fn reset(&mut self) {
        self.state = StrategyKind::Unresolved;
        self.last = None;
    }
}

/// Shared services a strategy needs when attached.
#[derive(Clone)]
pub struct StrategyEnv {
    /// Filter graphs cached per graph strategy.
    pub cache_capacity: usize,
    /// Runs software blur jobs.
    pub spawner: Arc<dyn JobSpawner>,
    /// Redraw trigger for work finishing off the render thread.
    pub redraw: Arc<dyn RedrawRequester>,
    /// Software blur radius limit in pixels.
    pub software_max_radius_px: f32,
}

impl std::fmt::Debug for StrategyEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyEnv")
            .field("cache_capacity", &self.cache_capacity)
            .field("software_max_radius_px", &self.software_max_radius_px)
            .finish_non_exhaustive()
    }
}

/// The attached strategy and the resources it owns.
///
/// Resources are released by [`ActiveStrategy::detach`], which consumes the strategy, so a
/// strategy is detached at most once and never used afterwards.
#[derive(Debug)]
pub enum ActiveStrategy {
    /// Hardware or GPU-shader strategy with its graph cache.
    Graph {
        /// Which graph strategy.
        kind: StrategyKind,
        /// Realized graphs.
        cache: RenderEffectCache,
    },
    /// Software blur runner.
    Software(SoftwareBlur),
    /// Scrim owns nothing.
    Scrim,
}

impl ActiveStrategy {
    /// Acquire the resources for `kind`. `Unresolved` attaches as a scrim.
    pub fn attach(kind: StrategyKind, env: &StrategyEnv) -> Self {
        match kind {
            StrategyKind::Hardware | StrategyKind::GpuShader => Self::Graph {
                kind,
                cache: RenderEffectCache::new(env.cache_capacity),
            },
            StrategyKind::Software => Self::Software(SoftwareBlur::new(
                Arc::clone(&env.spawner),
                Arc::clone(&env.redraw),
                env.software_max_radius_px,
            )),
            StrategyKind::Scrim | StrategyKind::Unresolved => Self::Scrim,
        }
    }

    /// Strategy kind.
    pub fn kind(&self) -> StrategyKind {
        match self {
            Self::Graph { kind, .. } => *kind,
            Self::Software(_) => StrategyKind::Software,
            Self::Scrim => StrategyKind::Scrim,
        }
    }

    /// Cancel outstanding work, then release native resources.
    pub fn detach<F: EffectFactory + ?Sized>(self, factory: &mut F) {
        let kind = self.kind();
        match self {
            Self::Graph { mut cache, .. } => cache.clear(factory),
            Self::Software(sb) => sb.detach(),
            Self::Scrim => {}
        }
        tracing::debug!(strategy = ?kind, "strategy detached");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/strategy.rs"]
mod tests;
