//! Bounded cache of realized filter graphs.
//!
//! Keys are [`GraphInputs`]; lookups go through a 128-bit fingerprint and then compare the full
//! inputs, so a fingerprint collision costs a rebuild, never a wrong effect. Eviction is SIEVE:
//! a hand sweeps from the oldest entry, sparing (and un-marking) entries visited since its last
//! pass. Entries used in the current frame are pinned; when a frame needs more entries than the
//! capacity the cache overflows, and [`RenderEffectCache::end_frame`] only trims entries the frame
//! did not use.

use crate::compile::builder::GraphInputs;
use crate::compile::fingerprint::{GraphKey, fingerprint_inputs};
use crate::compile::graph::FilterGraphNode;
use crate::foundation::error::HazeResult;
use crate::render::backend::{EffectFactory, EffectHandle, NativeEffect, realize};

/// Cache counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that built a graph.
    pub misses: u64,
    /// Entries evicted (each released its native handles).
    pub evictions: u64,
}

#[derive(Debug)]
struct Entry {
    key: GraphKey,
    inputs: GraphInputs,
    effect: NativeEffect,
    visited: bool,
    pinned_frame: u64,
}

/// Per-effect cache of realized filter graphs.
///
/// Mutated only from the render thread; `&mut self` on every lookup means one build per key
/// can be in flight at a time.
#[derive(Debug)]
pub struct RenderEffectCache {
    capacity: usize,
    // Oldest first. Capacity is small, so lookups scan.
    entries: Vec<Entry>,
    hand: usize,
    frame: u64,
    stats: CacheStats,
}

impl RenderEffectCache {
    /// Empty cache holding at most `capacity` entries outside of frame overflow.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Vec::new(),
            hand: 0,
            frame: 0,
            stats: CacheStats::default(),
        }
    }

    /// Counters.
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return `true` when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Start a new frame, unpinning last frame's entries.
    pub fn begin_frame(&mut self) {
        self.frame += 1;
    }

    /// Finish the frame's lookups and trim overflow down to capacity.
    ///
    /// Entries pinned by this frame are kept, so a frame needing more graphs than the capacity
    /// finds all of them again on the next frame.
    pub fn end_frame<F: EffectFactory + ?Sized>(&mut self, factory: &mut F) {
        while self.entries.len() > self.capacity {
            if !self.evict_one(factory) {
                break;
            }
        }
    }

    /// Return the cached root handle for `inputs`, building and realizing on a miss.
    ///
    /// `build` runs at most once per distinct key while the entry stays cached. The returned
    /// handle is valid until the entry is evicted or the cache is cleared, and is never evicted
    /// during the frame it was returned in.
    pub fn get_or_create<F, B>(
        &mut self,
        inputs: &GraphInputs,
        factory: &mut F,
        build: B,
    ) -> HazeResult<Option<EffectHandle>>
    where
        F: EffectFactory + ?Sized,
        B: FnOnce(&GraphInputs) -> FilterGraphNode,
    {
        let key = fingerprint_inputs(inputs);
        let frame = self.frame;
        if let Some(e) = self
            .entries
            .iter_mut()
            .find(|e| e.key == key && e.inputs == *inputs)
        {
            e.visited = true;
            e.pinned_frame = frame;
            self.stats.hits += 1;
            return Ok(e.effect.root());
        }

        self.stats.misses += 1;
        let graph = build(inputs);
        let effect = realize(&graph, factory)?;
        tracing::debug!(
            graph = %graph.summary(),
            handles = effect.handle_count(),
            "filter graph built"
        );

        if self.entries.len() >= self.capacity {
            self.evict_one(factory);
        }
        let root = effect.root();
        self.entries.push(Entry {
            key,
            inputs: inputs.clone(),
            effect,
            visited: false,
            pinned_frame: frame,
        });
        Ok(root)
    }

    /// Release every entry.
    pub fn clear<F: EffectFactory + ?Sized>(&mut self, factory: &mut F) {
        for e in self.entries.drain(..) {
            e.effect.release(factory);
        }
        self.hand = 0;
    }

    /// SIEVE eviction. Returns `false` when every entry is pinned to the current frame.
    fn evict_one<F: EffectFactory + ?Sized>(&mut self, factory: &mut F) -> bool {
        let len = self.entries.len();
        if len == 0 {
            return false;
        }
        // Two sweeps: the first may only clear visited bits.
        for _ in 0..2 * len {
            if self.hand >= self.entries.len() {
                self.hand = 0;
            }
            let e = &mut self.entries[self.hand];
            if e.pinned_frame == self.frame {
                self.hand += 1;
                continue;
            }
            if e.visited {
                e.visited = false;
                self.hand += 1;
                continue;
            }
            let evicted = self.entries.remove(self.hand);
            evicted.effect.release(factory);
            self.stats.evictions += 1;
            tracing::debug!(cached = self.entries.len(), "render effect evicted");
            return true;
        }
        false
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/cache.rs"]
mod tests;
