pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

/// Squared distance from a pixel's centre to `(cx, cy)`.
pub(crate) fn pixel_center_dist_sq(x: u32, y: u32, cx: f64, cy: f64) -> f64 {
    let dx = f64::from(x) + 0.5 - cx;
    let dy = f64::from(y) + 0.5 - cy;
    dx * dx + dy * dy
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
