use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;

use crate::foundation::error::{ForgeError, ForgeResult};

/// Default number of random draws allowed per output slot before the sampler falls back.
pub const DEFAULT_MAX_ATTEMPTS_PER_SLOT: u64 = 10_000;

/// Default prefix for generated item names (`"<prefix> #<index>"`).
pub const DEFAULT_ITEM_NAME_PREFIX: &str = "NFT";

/// Largest accepted output side length in pixels.
pub const MAX_IMAGE_SIZE: u32 = 16_384;

/// Resampling filter used to stretch each variant onto the square output canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResizeFilter {
    /// Nearest-neighbour; keeps pixel art crisp.
    Nearest,
    /// Bilinear.
    #[default]
    Triangle,
    /// Bicubic (Catmull-Rom).
    CatmullRom,
    /// Lanczos with a window of 3.
    Lanczos3,
}

impl ResizeFilter {
    pub(crate) fn to_image_filter(self) -> image::imageops::FilterType {
        match self {
            Self::Nearest => image::imageops::FilterType::Nearest,
            Self::Triangle => image::imageops::FilterType::Triangle,
            Self::CatmullRom => image::imageops::FilterType::CatmullRom,
            Self::Lanczos3 => image::imageops::FilterType::Lanczos3,
        }
    }
}

impl FromStr for ResizeFilter {
    type Err = ForgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nearest" => Ok(Self::Nearest),
            "triangle" | "bilinear" => Ok(Self::Triangle),
            "catmull-rom" | "bicubic" => Ok(Self::CatmullRom),
            "lanczos3" => Ok(Self::Lanczos3),
            other => Err(ForgeError::validation(format!(
                "unknown resize filter '{other}' (expected nearest, triangle, catmull-rom or lanczos3)"
            ))),
        }
    }
}

/// Validated parameters for one generation run.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct GenerateParams {
    /// Number of unique items to produce.
    pub total_count: u32,
    /// Items produced per pacing batch. Affects progress granularity only.
    pub batch_size: u32,
    /// Output raster side length in pixels.
    pub image_size: u32,
    /// RNG seed; `None` draws from OS entropy.
    pub seed: Option<u64>,
    /// Random draws allowed per slot before falling back to enumeration.
    pub max_attempts_per_slot: u64,
    /// Prefix used for [`crate::GeneratedItem::name`].
    pub item_name_prefix: String,
    /// Also store `metadata.json` in the output bundle.
    pub write_metadata: bool,
    /// Filter used when stretching variants to `image_size`.
    pub resize_filter: ResizeFilter,
}

impl GenerateParams {
    /// Build validated parameters with defaults for everything but the three core numbers.
    pub fn new(total_count: u32, batch_size: u32, image_size: u32) -> ForgeResult<Self> {
        let params = Self {
            total_count,
            batch_size,
            image_size,
            seed: None,
            max_attempts_per_slot: DEFAULT_MAX_ATTEMPTS_PER_SLOT,
            item_name_prefix: DEFAULT_ITEM_NAME_PREFIX.to_string(),
            write_metadata: false,
            resize_filter: ResizeFilter::default(),
        };
        params.validate()?;
        Ok(params)
    }

    /// Parse the three core numbers from raw text fields, as typed into a form.
    pub fn parse(total_count: &str, batch_size: &str, image_size: &str) -> ForgeResult<Self> {
        Self::new(
            parse_positive("total count", total_count)?,
            parse_positive("batch size", batch_size)?,
            parse_positive("image size", image_size)?,
        )
    }

    /// Return the same parameters with a fixed RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check every field. Called again by the generator since fields are public.
    pub fn validate(&self) -> ForgeResult<()> {
        if self.total_count == 0 {
            return Err(ForgeError::validation("total count must be > 0"));
        }
        if self.batch_size == 0 {
            return Err(ForgeError::validation("batch size must be > 0"));
        }
        if self.image_size == 0 {
            return Err(ForgeError::validation("image size must be > 0"));
        }
        if self.image_size > MAX_IMAGE_SIZE {
            return Err(ForgeError::validation(format!(
                "image size must be <= {MAX_IMAGE_SIZE} pixels"
            )));
        }
        if self.max_attempts_per_slot == 0 {
            return Err(ForgeError::validation("max attempts per slot must be > 0"));
        }
        Ok(())
    }
}

fn parse_positive(field: &str, raw: &str) -> ForgeResult<u32> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ForgeError::validation(format!("{field} is required")));
    }
    match raw.parse::<u32>() {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(ForgeError::validation(format!(
            "{field} must be a positive integer (got '{raw}')"
        ))),
    }
}

/// File- or flag-supplied generation settings. Every field is optional until
/// [`GenerateConfig::into_params`] checks them.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerateConfig {
    /// See [`GenerateParams::total_count`].
    pub total_count: Option<u32>,
    /// See [`GenerateParams::batch_size`].
    pub batch_size: Option<u32>,
    /// See [`GenerateParams::image_size`].
    pub image_size: Option<u32>,
    /// See [`GenerateParams::seed`].
    pub seed: Option<u64>,
    /// See [`GenerateParams::max_attempts_per_slot`].
    pub max_attempts_per_slot: Option<u64>,
    /// See [`GenerateParams::item_name_prefix`].
    pub item_name_prefix: Option<String>,
    /// See [`GenerateParams::write_metadata`].
    pub write_metadata: Option<bool>,
    /// See [`GenerateParams::resize_filter`].
    pub resize_filter: Option<ResizeFilter>,
}

impl GenerateConfig {
    /// Parse a config from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> ForgeResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| ForgeError::validation(format!("parse generation config JSON: {e}")))
    }

    /// Parse a config from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> ForgeResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ForgeError::validation(format!("open generation config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Overlay `overrides` on top of `self`; set fields in `overrides` win.
    pub fn merge(self, overrides: GenerateConfig) -> Self {
        Self {
            total_count: overrides.total_count.or(self.total_count),
            batch_size: overrides.batch_size.or(self.batch_size),
            image_size: overrides.image_size.or(self.image_size),
            seed: overrides.seed.or(self.seed),
            max_attempts_per_slot: overrides
                .max_attempts_per_slot
                .or(self.max_attempts_per_slot),
            item_name_prefix: overrides.item_name_prefix.or(self.item_name_prefix),
            write_metadata: overrides.write_metadata.or(self.write_metadata),
            resize_filter: overrides.resize_filter.or(self.resize_filter),
        }
    }

    /// Check presence and ranges, producing run parameters.
    pub fn into_params(self) -> ForgeResult<GenerateParams> {
        let total_count = self
            .total_count
            .ok_or_else(|| ForgeError::validation("total count is required"))?;
        let batch_size = self
            .batch_size
            .ok_or_else(|| ForgeError::validation("batch size is required"))?;
        let image_size = self
            .image_size
            .ok_or_else(|| ForgeError::validation("image size is required"))?;

        let params = GenerateParams {
            total_count,
            batch_size,
            image_size,
            seed: self.seed,
            max_attempts_per_slot: self
                .max_attempts_per_slot
                .unwrap_or(DEFAULT_MAX_ATTEMPTS_PER_SLOT),
            item_name_prefix: self
                .item_name_prefix
                .unwrap_or_else(|| DEFAULT_ITEM_NAME_PREFIX.to_string()),
            write_metadata: self.write_metadata.unwrap_or(false),
            resize_filter: self.resize_filter.unwrap_or_default(),
        };
        params.validate()?;
        Ok(params)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
