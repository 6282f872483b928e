use image::{RgbaImage, imageops};

use crate::foundation::error::{AvatarError, AvatarResult};
use crate::foundation::math::pixel_center_dist_sq;
use crate::render::composite::{LAYER_FILTER, Rgba8, over_in_place};

/// Edge length of the published profile thumbnail.
pub const THUMBNAIL_SIZE: u32 = 120;

/// Opaque fill placed behind the character before cropping.
pub const THUMBNAIL_BACKGROUND: Rgba8 = [187, 196, 225, 255];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Crop geometry and output size of the profile thumbnail.
pub struct ThumbnailSpec {
    /// Output edge length in pixels.
    pub size: u32,
    /// Fill colour used to flatten transparency.
    pub background: Rgba8,
    /// Trimmed from both the left and right edge.
    pub side_margin: u32,
    /// Trimmed from the top edge.
    pub top_margin: u32,
    /// Subtracted from the three-fifths height line to get the bottom edge.
    pub bottom_inset: u32,
}

impl Default for ThumbnailSpec {
    fn default() -> Self {
        Self {
            size: THUMBNAIL_SIZE,
            background: THUMBNAIL_BACKGROUND,
            side_margin: 80,
            top_margin: 90,
            bottom_inset: 10,
        }
    }
}

impl ThumbnailSpec {
    /// Default geometry with a different output size.
    pub fn with_size(size: u32) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Half-open pixel rectangle `[left, right) x [top, bottom)`.
pub struct CropBox {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl CropBox {
    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }
}

/// Face-framing crop for a `width`x`height` canvas.
///
/// `(side, top, W - side, 3H/5 - inset)` with integer division. Canvases too small to yield a
/// non-empty box are rejected rather than clamped.
pub fn crop_box(width: u32, height: u32, spec: &ThumbnailSpec) -> AvatarResult<CropBox> {
    let left = i64::from(spec.side_margin);
    let top = i64::from(spec.top_margin);
    let right = i64::from(width) - i64::from(spec.side_margin);
    let bottom = (3 * i64::from(height)) / 5 - i64::from(spec.bottom_inset);

    if right <= left || bottom <= top {
        return Err(AvatarError::image(format!(
            "canvas {width}x{height} is too small for the thumbnail crop \
             ({left},{top})-({right},{bottom})"
        )));
    }

    // All four values are within 0..=width / 0..=height here.
    Ok(CropBox {
        left: left as u32,
        top: top as u32,
        right: right as u32,
        bottom: bottom as u32,
    })
}

/// Composite `img` over an opaque `background` of the same size.
pub fn flatten(img: &RgbaImage, background: Rgba8) -> AvatarResult<RgbaImage> {
    let mut canvas = RgbaImage::from_pixel(img.width(), img.height(), image::Rgba(background));
    over_in_place(&mut canvas, img.as_raw())?;
    Ok(canvas)
}

/// Clear every pixel whose centre lies outside the inscribed circle.
///
/// Pixels inside keep their colour and alpha; pixels outside become `[0, 0, 0, 0]`.
pub fn apply_circle_mask(img: &mut RgbaImage) {
    let (w, h) = img.dimensions();
    let cx = f64::from(w) / 2.0;
    let cy = f64::from(h) / 2.0;
    let r = f64::from(w.min(h)) / 2.0;
    let r_sq = r * r;

    for (x, y, px) in img.enumerate_pixels_mut() {
        if pixel_center_dist_sq(x, y, cx, cy) > r_sq {
            px.0 = [0, 0, 0, 0];
        }
    }
}

/// Derive the circular profile thumbnail from a full composite.
///
/// Flatten over the background colour, crop the face region, resize to `spec.size` square,
/// then mask to a circle.
#[tracing::instrument(skip(full), fields(width = full.width(), height = full.height()))]
pub fn derive_thumbnail(full: &RgbaImage, spec: &ThumbnailSpec) -> AvatarResult<RgbaImage> {
    if spec.size == 0 {
        return Err(AvatarError::image("thumbnail size must be > 0"));
    }

    let flat = flatten(full, spec.background)?;
    let cb = crop_box(flat.width(), flat.height(), spec)?;
    let cropped = imageops::crop_imm(&flat, cb.left, cb.top, cb.width(), cb.height()).to_image();

    let mut thumb = imageops::resize(&cropped, spec.size, spec.size, LAYER_FILTER);
    apply_circle_mask(&mut thumb);
    Ok(thumb)
}

#[cfg(test)]
#[path = "../../tests/unit/render/thumbnail.rs"]
mod tests;
