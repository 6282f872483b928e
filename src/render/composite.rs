use image::{RgbaImage, imageops::FilterType};

use crate::foundation::error::{AvatarError, AvatarResult};
use crate::foundation::math::mul_div255_u8;

/// Straight (non-premultiplied) RGBA8 pixel.
pub type Rgba8 = [u8; 4];

/// Resampling filter used to normalise layer sizes. Fixed so output is reproducible.
pub const LAYER_FILTER: FilterType = FilterType::Triangle;

/// Porter-Duff "over" on straight-alpha pixels.
///
/// `out_a = src_a + dst_a * (1 - src_a)`; colour channels are weighted by each side's
/// contribution to `out_a`.
pub fn over(dst: Rgba8, src: Rgba8) -> Rgba8 {
    let sa = u32::from(src[3]);
    if sa == 0 {
        return dst;
    }
    if sa == 255 {
        return src;
    }

    // Destination weight, scaled by 255.
    let dw = u32::from(dst[3]) * (255 - sa);
    let total = sa * 255 + dw;
    if total == 0 {
        return [0, 0, 0, 0];
    }

    let mut out = [0u8; 4];
    for i in 0..3 {
        let num = u32::from(src[i]) * sa * 255 + u32::from(dst[i]) * dw;
        out[i] = ((num + total / 2) / total) as u8;
    }
    out[3] = src[3].saturating_add(mul_div255_u8(u16::from(dst[3]), (255 - sa) as u16));
    out
}

/// Composite `src` over `dst` pixel by pixel. Buffers must be equal-length RGBA8.
pub fn over_in_place(dst: &mut [u8], src: &[u8]) -> AvatarResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(AvatarError::image(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Resize `img` to `width`x`height`, borrowing it unchanged when it already fits.
pub fn fit_to_canvas(img: &RgbaImage, width: u32, height: u32) -> std::borrow::Cow<'_, RgbaImage> {
    if img.dimensions() == (width, height) {
        std::borrow::Cow::Borrowed(img)
    } else {
        std::borrow::Cow::Owned(image::imageops::resize(img, width, height, LAYER_FILTER))
    }
}

/// Stack layers bottom-up into one image.
///
/// The first entry is the base layer and fixes the canvas size; it must be present. `None`
/// entries are skipped. Every other layer is resized to the canvas before blending, so later
/// layers occlude earlier ones where they are opaque.
pub fn composite_layers(layers: &[Option<RgbaImage>]) -> AvatarResult<RgbaImage> {
    let Some((base, rest)) = layers.split_first() else {
        return Err(AvatarError::image("no layers to composite"));
    };
    let Some(base) = base else {
        return Err(AvatarError::image("base layer is missing"));
    };
    let (width, height) = base.dimensions();
    if width == 0 || height == 0 {
        return Err(AvatarError::image("base layer has zero size"));
    }

    let mut canvas = base.clone();
    for layer in rest.iter().flatten() {
        let fitted = fit_to_canvas(layer, width, height);
        over_in_place(&mut canvas, fitted.as_raw())?;
    }
    Ok(canvas)
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
