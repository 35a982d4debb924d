use crate::foundation::core::{Point, Rect, RoundedRect, Size, WindowId};

/// Identifier of a source area within a [`HazeState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AreaId(pub u64);

/// Handle to a recorded, re-drawable content layer owned by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ContentLayer(pub u64);

/// One source content region effects can blur.
#[derive(Clone, Debug, PartialEq)]
pub struct HazeArea {
    /// Area identity.
    pub id: AreaId,
    /// Top-left in screen pixels.
    pub position_on_screen: Point,
    /// Size in pixels.
    pub size: Size,
    /// Stacking order; effects only read areas below them.
    pub z_index: f32,
    /// Optional clip shape in area-local pixels.
    pub shape: Option<RoundedRect>,
    /// Window the area lives in.
    pub window_id: Option<WindowId>,
    /// Recorded content, `None` until the source has drawn once.
    pub content: Option<ContentLayer>,
}

impl HazeArea {
    /// Screen-space bounds.
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.position_on_screen, self.size)
    }

    /// Return `true` when the area has recorded content and a drawable size.
    pub fn is_ready(&self) -> bool {
        self.content.is_some() && self.size.width > 0.0 && self.size.height > 0.0
    }
}

/// Registry of source areas shared between sources (single writer per area) and effects
/// (readers).
///
/// Every mutation bumps a generation counter so effects can detect changes cheaply.
#[derive(Debug, Default)]
pub struct HazeState {
    areas: Vec<HazeArea>,
    next_id: u64,
    generation: u64,
}

impl HazeState {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new source area.
    pub fn attach(&mut self, z_index: f32, window_id: Option<WindowId>) -> AreaId {
        let id = AreaId(self.next_id);
        self.next_id += 1;
        self.areas.push(HazeArea {
            id,
            position_on_screen: Point::ZERO,
            size: Size::ZERO,
            z_index,
            shape: None,
            window_id,
            content: None,
        });
        self.generation += 1;
        id
    }

    /// Update an area's placement after layout. Returns `false` for unknown ids.
    pub fn update_placement(&mut self, id: AreaId, position_on_screen: Point, size: Size) -> bool {
        let Some(area) = self.areas.iter_mut().find(|a| a.id == id) else {
            return false;
        };
        if area.position_on_screen != position_on_screen || area.size != size {
            area.position_on_screen = position_on_screen;
            area.size = size;
            self.generation += 1;
        }
        true
    }

    /// Set an area's clip shape. Returns `false` for unknown ids.
    pub fn update_shape(&mut self, id: AreaId, shape: Option<RoundedRect>) -> bool {
        let Some(area) = self.areas.iter_mut().find(|a| a.id == id) else {
            return false;
        };
        if area.shape != shape {
            area.shape = shape;
            self.generation += 1;
        }
        true
    }

    /// Publish newly recorded content for an area. Only the area's source calls this.
    pub fn record_content(&mut self, id: AreaId, layer: ContentLayer) -> bool {
        let Some(area) = self.areas.iter_mut().find(|a| a.id == id) else {
            return false;
        };
        area.content = Some(layer);
        self.generation += 1;
        true
    }

    /// Remove an area. Returns the removed area, if any.
    pub fn detach(&mut self, id: AreaId) -> Option<HazeArea> {
        let idx = self.areas.iter().position(|a| a.id == id)?;
        self.generation += 1;
        Some(self.areas.remove(idx))
    }

    /// All registered areas in attach order.
    pub fn areas(&self) -> &[HazeArea] {
        &self.areas
    }

    /// Mutation counter.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Areas an effect at `effect_bounds` / `effect_z` in `window` draws, bottom-most first.
    ///
    /// An area qualifies when it lives in the same window, sits strictly below the effect, has
    /// recorded content and overlaps the effect's bounds.
    pub fn areas_for_effect(
        &self,
        effect_bounds: Rect,
        effect_z: f32,
        window: Option<WindowId>,
    ) -> Vec<HazeArea> {
        let mut out: Vec<HazeArea> = self
            .areas
            .iter()
            .filter(|a| window.is_none() || a.window_id.is_none() || a.window_id == window)
            .filter(|a| a.z_index < effect_z)
            .filter(|a| a.is_ready())
            .filter(|a| overlaps(a.bounds(), effect_bounds))
            .cloned()
            .collect();
        out.sort_by(|a, b| a.z_index.total_cmp(&b.z_index));
        out
    }
}

fn overlaps(a: Rect, b: Rect) -> bool {
    a.x0 < b.x1 && b.x0 < a.x1 && a.y0 < b.y1 && b.y0 < a.y1
}

#[cfg(test)]
#[path = "../../tests/unit/scene/area.rs"]
mod tests;
