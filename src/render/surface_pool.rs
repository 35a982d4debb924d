use crate::foundation::error::HazeResult;
use crate::render::backend::{HostCanvas, SurfaceDesc, SurfaceId};
use std::collections::HashMap;

/// Pool configuration for retained offscreen layers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SurfacePoolOpts {
    /// Maximum number of retained surfaces per size bucket.
    pub max_surfaces: usize,
    /// Maximum pixels retained across all buckets.
    pub max_pool_pixels: u64,
}

impl Default for SurfacePoolOpts {
    fn default() -> Self {
        Self {
            max_surfaces: 4,
            max_pool_pixels: 4 * 1024 * 1024,
        }
    }
}

/// Counters for pool behaviour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SurfacePoolStats {
    /// Surfaces currently retained.
    pub retained_surfaces: usize,
    /// Pixels currently retained.
    pub retained_pixels: u64,
    /// Surfaces allocated from the host.
    pub allocations: u64,
    /// Surfaces handed out from the pool.
    pub reuses: u64,
    /// Surfaces released to the host instead of being retained.
    pub dropped_on_release: u64,
}

/// Bounded reuse of host offscreen surfaces, keyed by size.
///
/// Borrow and release happen once per pass, never per pixel.
#[derive(Debug)]
pub struct LayerPool {
    opts: SurfacePoolOpts,
    stats: SurfacePoolStats,
    buckets: HashMap<SurfaceDesc, Vec<SurfaceId>>,
}

impl LayerPool {
    /// Empty pool.
    pub fn new(opts: SurfacePoolOpts) -> Self {
        Self {
            opts,
            stats: SurfacePoolStats::default(),
            buckets: HashMap::new(),
        }
    }

    /// Current counters.
    pub fn stats(&self) -> SurfacePoolStats {
        self.stats
    }

    /// Take a retained surface of `desc`'s size, or allocate one from `canvas`.
    pub fn acquire<C: HostCanvas + ?Sized>(
        &mut self,
        canvas: &mut C,
        desc: SurfaceDesc,
    ) -> HazeResult<SurfaceId> {
        if let Some(id) = self.buckets.get_mut(&desc).and_then(Vec::pop) {
            self.stats.retained_surfaces = self.stats.retained_surfaces.saturating_sub(1);
            self.stats.retained_pixels = self.stats.retained_pixels.saturating_sub(desc.pixels());
            self.stats.reuses = self.stats.reuses.saturating_add(1);
            return Ok(id);
        }
        let id = canvas.create_offscreen(desc)?;
        self.stats.allocations = self.stats.allocations.saturating_add(1);
        Ok(id)
    }

    /// Return a surface. It is retained when within limits, otherwise freed on `canvas`.
    pub fn release<C: HostCanvas + ?Sized>(
        &mut self,
        canvas: &mut C,
        desc: SurfaceDesc,
        id: SurfaceId,
    ) {
        let over_budget = self.opts.max_surfaces == 0
            || self.stats.retained_pixels.saturating_add(desc.pixels()) > self.opts.max_pool_pixels;
        let bucket = self.buckets.entry(desc).or_default();
        if over_budget || bucket.len() >= self.opts.max_surfaces {
            self.stats.dropped_on_release = self.stats.dropped_on_release.saturating_add(1);
            canvas.release_offscreen(id);
            return;
        }
        bucket.push(id);
        self.stats.retained_surfaces = self.stats.retained_surfaces.saturating_add(1);
        self.stats.retained_pixels = self.stats.retained_pixels.saturating_add(desc.pixels());
    }

    /// Free every retained surface.
    pub fn clear<C: HostCanvas + ?Sized>(&mut self, canvas: &mut C) {
        for (_, ids) in self.buckets.drain() {
            for id in ids {
                canvas.release_offscreen(id);
            }
        }
        self.stats.retained_surfaces = 0;
        self.stats.retained_pixels = 0;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface_pool.rs"]
mod tests;
