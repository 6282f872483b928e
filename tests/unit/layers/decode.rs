use std::io::Cursor;

use super::*;

#[test]
fn decode_png_keeps_dimensions_and_straight_alpha() {
    let src = image::RgbaImage::from_raw(1, 1, vec![100u8, 50u8, 200u8, 128u8]).unwrap();

    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(src)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();

    let img = decode_layer(&buf).unwrap();
    assert_eq!(img.dimensions(), (1, 1));
    assert_eq!(img.as_raw().as_slice(), &[100u8, 50u8, 200u8, 128u8]);
}

#[test]
fn decode_rgb_source_gains_opaque_alpha() {
    let src = image::RgbImage::from_raw(2, 1, vec![1, 2, 3, 4, 5, 6]).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgb8(src)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();

    let img = decode_layer(&buf).unwrap();
    assert_eq!(img.as_raw().as_slice(), &[1, 2, 3, 255, 4, 5, 6, 255]);
}

#[test]
fn decode_garbage_fails() {
    assert!(decode_layer(b"definitely not a png").is_err());
}

#[test]
fn encode_png_round_trips_pixels() {
    let img = image::RgbaImage::from_pixel(3, 2, image::Rgba([9, 8, 7, 6]));
    let bytes = encode_png(&img).unwrap();
    assert_eq!(decode_layer(&bytes).unwrap(), img);
}
