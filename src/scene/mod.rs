//! Per-frame geometry and the source areas effects read from.

pub(crate) mod area;
pub(crate) mod geometry;
