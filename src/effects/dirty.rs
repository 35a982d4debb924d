//! Two-tier dirty tracking.
//!
//! Each effect input has one flag. Flags in [`DirtyFields::RENDER_EFFECT_AFFECTING`] invalidate
//! the cached filter graph; every flag in [`DirtyFields::INVALIDATE_DRAW`] requests a redraw. A
//! change to a draw-only field (alpha, background colour, fallback tint) redraws with the cached
//! graph.

use std::ops::{BitOr, BitOrAssign, Sub, SubAssign};

/// Set of changed effect inputs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DirtyFields(u32);

impl DirtyFields {
    /// No changes.
    pub const NONE: DirtyFields = DirtyFields(0);
    /// Blur enabled override.
    pub const BLUR_ENABLED: DirtyFields = DirtyFields(1 << 0);
    /// Blur radius.
    pub const BLUR_RADIUS: DirtyFields = DirtyFields(1 << 1);
    /// Noise factor.
    pub const NOISE_FACTOR: DirtyFields = DirtyFields(1 << 2);
    /// Static mask.
    pub const MASK: DirtyFields = DirtyFields(1 << 3);
    /// Tint list.
    pub const TINTS: DirtyFields = DirtyFields(1 << 4);
    /// Fallback tint.
    pub const FALLBACK_TINT: DirtyFields = DirtyFields(1 << 5);
    /// Global alpha.
    pub const ALPHA: DirtyFields = DirtyFields(1 << 6);
    /// Progressive descriptor.
    pub const PROGRESSIVE: DirtyFields = DirtyFields(1 << 7);
    /// Input scale policy.
    pub const INPUT_SCALE: DirtyFields = DirtyFields(1 << 8);
    /// Edge treatment.
    pub const EDGE_TREATMENT: DirtyFields = DirtyFields(1 << 9);
    /// Background colour.
    pub const BACKGROUND_COLOR: DirtyFields = DirtyFields(1 << 10);
    /// Layer size.
    pub const SIZE: DirtyFields = DirtyFields(1 << 11);
    /// Position on screen.
    pub const SCREEN_POSITION: DirtyFields = DirtyFields(1 << 12);
    /// Offset between the layer and the recorded content.
    pub const CONTENT_OFFSET: DirtyFields = DirtyFields(1 << 13);
    /// Source areas (added, removed, moved or re-recorded).
    pub const AREAS: DirtyFields = DirtyFields(1 << 14);
    /// Liquid-glass parameters or effect kind.
    pub const EFFECT_KIND: DirtyFields = DirtyFields(1 << 15);
    /// Platform capabilities or force-scrim condition.
    pub const PLATFORM: DirtyFields = DirtyFields(1 << 16);
    /// Host density.
    pub const DENSITY: DirtyFields = DirtyFields(1 << 17);
    /// Style objects (explicit, per-effect or ambient).
    pub const STYLE: DirtyFields = DirtyFields(1 << 18);
    /// Content/background mode or content-behind flag.
    pub const MODE: DirtyFields = DirtyFields(1 << 19);
    /// Software blur job delivered a new bitmap.
    pub const SOFTWARE_RESULT: DirtyFields = DirtyFields(1 << 20);

    /// Fields that change the cached filter graph.
    pub const RENDER_EFFECT_AFFECTING: DirtyFields = DirtyFields(
        Self::BLUR_RADIUS.0
            | Self::NOISE_FACTOR.0
            | Self::MASK.0
            | Self::TINTS.0
            | Self::PROGRESSIVE.0
            | Self::INPUT_SCALE.0
            | Self::EDGE_TREATMENT.0
            | Self::SIZE.0
            | Self::CONTENT_OFFSET.0
            | Self::EFFECT_KIND.0
            | Self::DENSITY.0
            | Self::STYLE.0,
    );

    /// Fields that require re-running strategy selection.
    pub const STRATEGY_AFFECTING: DirtyFields =
        DirtyFields(Self::BLUR_ENABLED.0 | Self::PLATFORM.0);

    /// Fields that require a redraw.
    pub const INVALIDATE_DRAW: DirtyFields = DirtyFields(
        Self::RENDER_EFFECT_AFFECTING.0
            | Self::STRATEGY_AFFECTING.0
            | Self::FALLBACK_TINT.0
            | Self::ALPHA.0
            | Self::BACKGROUND_COLOR.0
            | Self::SCREEN_POSITION.0
            | Self::AREAS.0
            | Self::MODE.0
            | Self::SOFTWARE_RESULT.0,
    );

    /// Union of two sets, usable in constants.
    pub const fn union(self, other: DirtyFields) -> DirtyFields {
        DirtyFields(self.0 | other.0)
    }

    /// Raw bits.
    pub fn bits(self) -> u32 {
        self.0
    }

    /// Return `true` when no flag is set.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Return `true` when every flag of `other` is set.
    pub fn contains(self, other: DirtyFields) -> bool {
        self.0 & other.0 == other.0
    }

    /// Return `true` when any flag of `other` is set.
    pub fn intersects(self, other: DirtyFields) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for DirtyFields {
    type Output = DirtyFields;

    fn bitor(self, rhs: DirtyFields) -> DirtyFields {
        DirtyFields(self.0 | rhs.0)
    }
}

impl BitOrAssign for DirtyFields {
    fn bitor_assign(&mut self, rhs: DirtyFields) {
        self.0 |= rhs.0;
    }
}

impl Sub for DirtyFields {
    type Output = DirtyFields;

    fn sub(self, rhs: DirtyFields) -> DirtyFields {
        DirtyFields(self.0 & !rhs.0)
    }
}

impl SubAssign for DirtyFields {
    fn sub_assign(&mut self, rhs: DirtyFields) {
        self.0 &= !rhs.0;
    }
}

/// Per-frame accumulator of [`DirtyFields`].
///
/// Flags only accumulate until [`DirtyTracker::clear`] runs after a resolved frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct DirtyTracker {
    fields: DirtyFields,
}

impl DirtyTracker {
    /// Tracker with every field dirty, used before the first frame.
    pub(crate) fn all_dirty() -> Self {
        Self {
            fields: DirtyFields::INVALIDATE_DRAW,
        }
    }

    /// Record a change.
    pub fn mark(&mut self, fields: DirtyFields) {
        self.fields |= fields;
    }

    /// Current accumulated flags.
    pub fn fields(&self) -> DirtyFields {
        self.fields
    }

    /// Return `true` when the cached filter graph must be re-resolved.
    pub fn needs_graph_rebuild(&self) -> bool {
        self.fields.intersects(DirtyFields::RENDER_EFFECT_AFFECTING)
    }

    /// Return `true` when strategy selection must re-run.
    pub fn needs_strategy_update(&self) -> bool {
        self.fields.intersects(DirtyFields::STRATEGY_AFFECTING)
    }

    /// Return `true` when the host should redraw.
    pub fn needs_redraw(&self) -> bool {
        self.fields.intersects(DirtyFields::INVALIDATE_DRAW)
    }

    /// Reset after the frame's effect resolution and draw completed.
    pub fn clear(&mut self) {
        self.fields = DirtyFields::NONE;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/dirty.rs"]
mod tests;
