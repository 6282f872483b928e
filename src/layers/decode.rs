use std::io::Cursor;

use anyhow::Context;
use image::RgbaImage;

use crate::foundation::error::{AvatarError, AvatarResult};

/// Decode encoded image bytes into straight-alpha RGBA8, whatever the source format.
pub fn decode_layer(bytes: &[u8]) -> AvatarResult<RgbaImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode layer image from memory")?;
    Ok(dyn_img.to_rgba8())
}

/// Encode an RGBA8 image as PNG bytes.
pub fn encode_png(img: &RgbaImage) -> AvatarResult<Vec<u8>> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| AvatarError::image(format!("encode png: {e}")))?;
    Ok(buf)
}

#[cfg(test)]
#[path = "../../tests/unit/layers/decode.rs"]
mod tests;
