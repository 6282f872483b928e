use super::*;

fn gradient(w: u32, h: u32) -> RgbaImage {
    RgbaImage::from_fn(w, h, |x, y| {
        image::Rgba([(x % 256) as u8, (y % 256) as u8, 90, ((x + y) % 256) as u8])
    })
}

#[test]
fn crop_box_matches_face_framing() {
    let spec = ThumbnailSpec::default();
    let cb = crop_box(400, 600, &spec).unwrap();
    assert_eq!(
        cb,
        CropBox {
            left: 80,
            top: 90,
            right: 320,
            bottom: 350,
        }
    );
    assert_eq!((cb.width(), cb.height()), (240, 260));
}

#[test]
fn crop_box_uses_integer_division() {
    // 3 * 201 / 5 = 120 (120.6 truncated), minus 10.
    let cb = crop_box(200, 201, &ThumbnailSpec::default()).unwrap();
    assert_eq!(cb.bottom, 110);
}

#[test]
fn degenerate_crop_box_is_rejected() {
    let spec = ThumbnailSpec::default();
    assert!(crop_box(64, 64, &spec).is_err());
    assert!(crop_box(160, 600, &spec).is_err());
    assert!(crop_box(400, 166, &spec).is_err());
    assert!(crop_box(161, 169, &spec).is_ok());
}

#[test]
fn flatten_removes_all_transparency() {
    let img = gradient(10, 10);
    let flat = flatten(&img, THUMBNAIL_BACKGROUND).unwrap();
    assert!(flat.pixels().all(|p| p.0[3] == 255));
    // Fully transparent source pixel shows the background.
    assert_eq!(flat.get_pixel(0, 0).0, THUMBNAIL_BACKGROUND);
}

#[test]
fn thumbnail_is_always_square_of_configured_size() {
    for (w, h) in [(161, 169), (400, 400), (512, 768), (1000, 300)] {
        let thumb = derive_thumbnail(&gradient(w, h), &ThumbnailSpec::default()).unwrap();
        assert_eq!(thumb.dimensions(), (THUMBNAIL_SIZE, THUMBNAIL_SIZE));
    }
    let small = derive_thumbnail(&gradient(400, 400), &ThumbnailSpec::with_size(70)).unwrap();
    assert_eq!(small.dimensions(), (70, 70));
}

#[test]
fn thumbnail_mask_is_circular() {
    let spec = ThumbnailSpec::default();
    let thumb = derive_thumbnail(&gradient(400, 600), &spec).unwrap();
    let s = f64::from(spec.size);
    let r = s / 2.0;

    for (x, y, px) in thumb.enumerate_pixels() {
        let d = pixel_center_dist_sq(x, y, r, r).sqrt();
        if d > r {
            assert_eq!(px.0, [0, 0, 0, 0], "pixel ({x},{y}) at {d} must be cleared");
        } else if d <= r - 1.0 {
            assert_eq!(px.0[3], 255, "pixel ({x},{y}) at {d} must keep alpha");
        }
    }
    assert_eq!(thumb.get_pixel(0, 0).0[3], 0);
    assert_eq!(thumb.get_pixel(spec.size / 2, spec.size / 2).0[3], 255);
}

#[test]
fn circle_mask_keeps_inside_alpha() {
    let mut img = RgbaImage::from_pixel(10, 10, image::Rgba([1, 2, 3, 77]));
    apply_circle_mask(&mut img);
    assert_eq!(img.get_pixel(5, 5).0, [1, 2, 3, 77]);
    assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0, 0]);
    assert_eq!(img.get_pixel(9, 9).0, [0, 0, 0, 0]);
}

#[test]
fn opaque_base_gives_transparent_border_and_opaque_disc() {
    let base = RgbaImage::from_pixel(400, 400, image::Rgba([200, 150, 100, 255]));
    let thumb = derive_thumbnail(&base, &ThumbnailSpec::default()).unwrap();
    let last = THUMBNAIL_SIZE - 1;
    for (x, y) in [(0, 0), (last, 0), (0, last), (last, last)] {
        assert_eq!(thumb.get_pixel(x, y).0[3], 0);
    }
    let c = THUMBNAIL_SIZE / 2;
    assert_eq!(thumb.get_pixel(c, c).0[3], 255);
}

#[test]
fn thumbnail_is_deterministic() {
    let img = gradient(300, 500);
    let a = derive_thumbnail(&img, &ThumbnailSpec::default()).unwrap();
    let b = derive_thumbnail(&img, &ThumbnailSpec::default()).unwrap();
    assert_eq!(a.as_raw(), b.as_raw());
}

#[test]
fn zero_size_is_rejected() {
    assert!(derive_thumbnail(&gradient(400, 400), &ThumbnailSpec::with_size(0)).is_err());
}
