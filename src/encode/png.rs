use std::io::Cursor;

use crate::foundation::error::{ForgeError, ForgeResult};
use crate::render::compositor::Raster;

/// File extension used for generated images.
pub const IMAGE_EXT: &str = "png";

/// Losslessly encode `raster` as PNG.
pub fn encode_png(raster: &Raster) -> ForgeResult<Vec<u8>> {
    let img = image::RgbaImage::from_raw(raster.width, raster.height, raster.rgba8.clone())
        .ok_or_else(|| ForgeError::encode("raster buffer does not match its dimensions"))?;
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| ForgeError::encode(format!("write png: {e}")))?;
    Ok(buf)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/png.rs"]
mod tests;
