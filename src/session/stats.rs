use crate::render::cache::CacheStats;
use crate::render::software::SoftwareStats;

/// Per-effect counters, accumulated across strategy switches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EffectStats {
    /// Filter graphs built (cache misses plus software graph builds).
    pub graph_builds: u64,
    /// Render-effect cache hits.
    pub cache_hits: u64,
    /// Render-effect cache misses.
    pub cache_misses: u64,
    /// Render-effect cache evictions.
    pub cache_evictions: u64,
    /// Frames that drew.
    pub frames_drawn: u64,
    /// Frames skipped because the effect was not ready or a surface was unavailable.
    pub frames_skipped: u64,
    /// Software blur jobs started.
    pub software_started: u64,
    /// Software blur requests coalesced behind a running job.
    pub software_coalesced: u64,
    /// Software blur results discarded as stale.
    pub software_discarded: u64,
    /// Strategy switches, including the first attach.
    pub strategy_transitions: u64,
}

impl EffectStats {
    pub(crate) fn add_cache(&mut self, c: CacheStats) {
        self.cache_hits += c.hits;
        self.cache_misses += c.misses;
        self.cache_evictions += c.evictions;
    }

    pub(crate) fn add_software(&mut self, s: SoftwareStats) {
        self.software_started += s.started;
        self.software_coalesced += s.coalesced;
        self.software_discarded += s.discarded;
    }
}
