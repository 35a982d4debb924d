//! Effect parameter model: blend modes, brushes, tints, progressive specs, styles and dirty flags.

pub(crate) mod blend;
pub(crate) mod brush;
pub(crate) mod dirty;
pub(crate) mod kind;
pub(crate) mod liquid_glass;
pub(crate) mod params;
pub(crate) mod progressive;
pub(crate) mod style;
pub(crate) mod tint;
