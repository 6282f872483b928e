use super::*;

#[test]
fn mul_div255_variants_align() {
    for x in [0u16, 1, 127, 255] {
        for y in [0u16, 1, 127, 255] {
            assert_eq!(u16::from(mul_div255_u8(x, y)), mul_div255_u16(x, y));
        }
    }
}

#[test]
fn mul_div255_identity_and_zero() {
    assert_eq!(mul_div255_u8(200, 255), 200);
    assert_eq!(mul_div255_u8(200, 0), 0);
}

#[test]
fn pixel_center_distance_uses_half_offsets() {
    assert_eq!(pixel_center_dist_sq(0, 0, 0.5, 0.5), 0.0);
    assert_eq!(pixel_center_dist_sq(1, 0, 0.5, 0.5), 1.0);
}
