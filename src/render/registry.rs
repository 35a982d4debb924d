//! Process-wide resources shared by every effect: the noise texture and the capability latch.
//!
//! Nothing here is created implicitly. Hosts call [`ResourceRegistry::init`] once and
//! [`ResourceRegistry::teardown`] when the last effect is gone.

use crate::config::HazeConfig;
use crate::render::capability::AvailabilityLatch;
use std::sync::{Arc, PoisonError, RwLock};
use xxhash_rust::xxh3::xxh3_64_with_seed;

/// Side length of the generated noise tile in pixels.
pub const NOISE_TEXTURE_SIZE: u32 = 128;

const NOISE_SEED: u64 = 0x6e01_5e7a_c0ff_ee11;

/// Tileable greyscale noise, identical on every run.
#[derive(Clone, Debug, PartialEq)]
pub struct NoiseTexture {
    image: image::GrayImage,
}

impl NoiseTexture {
    /// Generate a `size x size` tile from `seed`.
    pub fn generate(size: u32, seed: u64) -> Self {
        let size = size.max(1);
        let image = image::GrayImage::from_fn(size, size, |x, y| {
            let idx = u64::from(y) * u64::from(size) + u64::from(x);
            image::Luma([xxh3_64_with_seed(&idx.to_le_bytes(), seed) as u8])
        });
        Self { image }
    }

    /// Tile side length.
    pub fn size(&self) -> u32 {
        self.image.width()
    }

    /// Texel at `(x, y)`, wrapping in both directions.
    pub fn sample(&self, x: i64, y: i64) -> u8 {
        let size = i64::from(self.size());
        let x = x.rem_euclid(size) as u32;
        let y = y.rem_euclid(size) as u32;
        self.image.get_pixel(x, y).0[0]
    }
}

/// Explicitly initialized shared resources.
#[derive(Debug)]
pub struct ResourceRegistry {
    config: HazeConfig,
    noise: RwLock<Option<Arc<NoiseTexture>>>,
    latch: AvailabilityLatch,
}

impl ResourceRegistry {
    /// Create the registry and its noise texture.
    #[tracing::instrument(level = "debug", skip(config))]
    pub fn init(config: &HazeConfig) -> Arc<Self> {
        let noise = NoiseTexture::generate(NOISE_TEXTURE_SIZE, NOISE_SEED);
        tracing::debug!(size = noise.size(), "noise texture generated");
        Arc::new(Self {
            config: config.clone(),
            noise: RwLock::new(Some(Arc::new(noise))),
            latch: AvailabilityLatch::new(),
        })
    }

    /// Engine config the registry was created with.
    pub fn config(&self) -> &HazeConfig {
        &self.config
    }

    /// Shared noise tile, or `None` after teardown.
    pub fn noise_texture(&self) -> Option<Arc<NoiseTexture>> {
        self.noise
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Capability availability latch.
    pub fn latch(&self) -> &AvailabilityLatch {
        &self.latch
    }

    /// Drop the shared noise texture. Effects still holding it keep their copy alive.
    pub fn teardown(&self) {
        let prev = self
            .noise
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if prev.is_some() {
            tracing::debug!("resource registry torn down");
        }
    }

    /// Return `true` until [`ResourceRegistry::teardown`] runs.
    pub fn is_live(&self) -> bool {
        self.noise
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/registry.rs"]
mod tests;
