use crate::effects::liquid_glass::LiquidGlassParameters;
use crate::effects::params::EffectParameters;
use crate::foundation::error::HazeResult;

/// The closed set of effect kinds the engine can draw.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum VisualEffect {
    /// Background or content blur with noise, tints, mask and progressive support.
    Blur(EffectParameters),
    /// Liquid-glass refraction.
    LiquidGlass(LiquidGlassParameters),
}

impl VisualEffect {
    /// Normalize the inner parameters, failing on precondition violations.
    pub fn normalized(self) -> HazeResult<Self> {
        Ok(match self {
            Self::Blur(p) => Self::Blur(p.normalized()?),
            Self::LiquidGlass(p) => Self::LiquidGlass(p.normalized()?),
        })
    }

    /// Return `true` when drawing this effect is a plain passthrough of the content.
    pub fn is_identity(&self) -> bool {
        match self {
            Self::Blur(p) => p.is_identity(),
            Self::LiquidGlass(_) => false,
        }
    }

    /// Input scale of the effect.
    pub fn scale(&self) -> f32 {
        match self {
            Self::Blur(p) => p.scale,
            Self::LiquidGlass(p) => p.scale,
        }
    }
}
