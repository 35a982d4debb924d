/// Porter-Duff and separable blend modes understood by every platform backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[allow(missing_docs)]
pub enum BlendMode {
    Clear,
    Src,
    Dst,
    #[default]
    SrcOver,
    DstOver,
    SrcIn,
    DstIn,
    SrcOut,
    DstOut,
    SrcAtop,
    DstAtop,
    Xor,
    Plus,
    Modulate,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
    Multiply,
    Hue,
    Saturation,
    Color,
    Luminosity,
}

impl BlendMode {
    /// Stable numeric tag used when fingerprinting graphs.
    pub(crate) fn tag(self) -> u8 {
        self as u8
    }
}

/// Sampling behaviour outside the blurred input's bounds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum TileMode {
    /// Repeat edge pixels. Used for bounded (clipped) edge treatments.
    #[default]
    Clamp,
    /// Transparent outside the input. Used for unbounded edge treatments.
    Decal,
    /// Tile the input.
    Repeat,
}

impl TileMode {
    pub(crate) fn tag(self) -> u8 {
        self as u8
    }
}
