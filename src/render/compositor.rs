use std::collections::HashMap;

use crate::assets::decode::{PreparedImage, decode_image_stretched};
use crate::catalog::model::VariantSource;
use crate::foundation::core::ResizeFilter;
use crate::foundation::error::{ForgeError, ForgeResult};
use crate::render::composite::{over_in_place, unpremultiply_rgba8_in_place};

/// Square straight-alpha RGBA8 raster produced for one combination.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major straight-alpha RGBA8.
    pub rgba8: Vec<u8>,
}

impl Raster {
    /// Pixel at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.rgba8.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// One layer of a stack to composite.
#[derive(Clone, Copy, Debug)]
pub struct StackEntry<'a> {
    /// Index of the layer in the catalog.
    pub layer: usize,
    /// Index of the chosen variant within that layer.
    pub variant: usize,
    /// The chosen variant.
    pub source: &'a VariantSource,
}

/// Decoder/compositor collaborator: turns an ordered stack of variants into one square raster.
pub trait Compositor {
    /// Called once before the first combination of a run.
    fn begin_run(&mut self, _size: u32) -> ForgeResult<()> {
        Ok(())
    }

    /// Draw `stack` bottom to top, each entry stretched to fill `size x size`.
    fn compose(&mut self, stack: &[StackEntry<'_>], size: u32) -> ForgeResult<Raster>;
}

/// Default byte budget for decoded variants kept between combinations.
pub const DEFAULT_CACHE_BUDGET_BYTES: usize = 512 * 1024 * 1024;

/// CPU compositor using `image` for decoding and premultiplied source-over for stacking.
///
/// Each variant is decoded and resized once per run and reused by every later combination that
/// picks it, as long as the prepared pixels fit the cache budget. Variants that do not fit are
/// decoded again whenever they are drawn.
#[derive(Debug)]
pub struct RasterCompositor {
    filter: ResizeFilter,
    size: u32,
    budget: usize,
    cached_bytes: usize,
    cache: HashMap<(usize, usize), PreparedImage>,
}

impl Default for RasterCompositor {
    fn default() -> Self {
        Self::new(ResizeFilter::default())
    }
}

impl RasterCompositor {
    /// Compositor stretching variants with `filter`.
    pub fn new(filter: ResizeFilter) -> Self {
        Self {
            filter,
            size: 0,
            budget: DEFAULT_CACHE_BUDGET_BYTES,
            cached_bytes: 0,
            cache: HashMap::new(),
        }
    }

    /// Cap the bytes of prepared variants kept between combinations. `0` disables caching.
    pub fn with_cache_budget(mut self, bytes: usize) -> Self {
        self.budget = bytes;
        self
    }

    /// Number of variants decoded and kept so far in this run.
    pub fn cached_variants(&self) -> usize {
        self.cache.len()
    }

    /// Bytes of prepared pixels currently cached.
    pub fn cached_bytes(&self) -> usize {
        self.cached_bytes
    }

    fn reset(&mut self, size: u32) {
        self.cache.clear();
        self.cached_bytes = 0;
        self.size = size;
    }

    fn prepare(&self, entry: &StackEntry<'_>, size: u32) -> ForgeResult<PreparedImage> {
        let bytes = entry.source.data.load()?;
        decode_image_stretched(&bytes, size, self.filter)
            .map_err(|e| ForgeError::decode(format!("variant '{}': {e}", entry.source.name)))
    }

    fn remember(&mut self, key: (usize, usize), prepared: PreparedImage) {
        let bytes = prepared.rgba8_premul.len();
        if self.cached_bytes.saturating_add(bytes) > self.budget {
            tracing::debug!(
                layer = key.0,
                variant = key.1,
                bytes,
                "variant cache budget reached; not caching"
            );
            return;
        }
        self.cached_bytes += bytes;
        self.cache.insert(key, prepared);
    }
}

impl Compositor for RasterCompositor {
    fn begin_run(&mut self, size: u32) -> ForgeResult<()> {
        self.reset(size);
        Ok(())
    }

    fn compose(&mut self, stack: &[StackEntry<'_>], size: u32) -> ForgeResult<Raster> {
        if self.size != size {
            self.reset(size);
        }
        let len = (size as usize)
            .checked_mul(size as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| ForgeError::validation("image size overflows the raster buffer"))?;
        let mut canvas = vec![0u8; len];

        for entry in stack {
            let key = (entry.layer, entry.variant);
            if let Some(layer) = self.cache.get(&key) {
                over_in_place(&mut canvas, layer.rgba8_premul.as_slice())?;
                continue;
            }
            let prepared = self.prepare(entry, size)?;
            over_in_place(&mut canvas, prepared.rgba8_premul.as_slice())?;
            self.remember(key, prepared);
        }

        unpremultiply_rgba8_in_place(&mut canvas);
        Ok(Raster {
            width: size,
            height: size,
            rgba8: canvas,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
