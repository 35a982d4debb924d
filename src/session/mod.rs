//! Effect instances: input tracking, per-frame resolution and the draw loop.

pub(crate) mod effect;
pub(crate) mod resolve;
pub(crate) mod stats;
