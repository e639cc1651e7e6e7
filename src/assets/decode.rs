use std::sync::Arc;

use crate::foundation::core::ResizeFilter;
use crate::foundation::error::{ForgeError, ForgeResult};
use crate::render::composite::premultiply_rgba8_in_place;

/// Decoded variant ready for compositing: premultiplied RGBA8 at the output size.
#[derive(Clone, Debug)]
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

/// Decode encoded image bytes and convert to premultiplied RGBA8 at native size.
pub fn decode_image(bytes: &[u8]) -> ForgeResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| ForgeError::decode(format!("decode image from memory: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

/// Decode `bytes` and stretch the result to fill a `size x size` square.
///
/// Resampling runs on premultiplied data so transparent edges do not bleed colour.
pub fn decode_image_stretched(
    bytes: &[u8],
    size: u32,
    filter: ResizeFilter,
) -> ForgeResult<PreparedImage> {
    let native = decode_image(bytes)?;
    if native.width == size && native.height == size {
        return Ok(native);
    }

    let buf = image::RgbaImage::from_raw(
        native.width,
        native.height,
        native.rgba8_premul.as_ref().clone(),
    )
    .ok_or_else(|| ForgeError::decode("decoded buffer does not match its dimensions"))?;
    let resized = image::imageops::resize(&buf, size, size, filter.to_image_filter());

    Ok(PreparedImage {
        width: size,
        height: size,
        rgba8_premul: Arc::new(resized.into_raw()),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
