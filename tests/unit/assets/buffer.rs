use super::*;

fn checker(w: u32, h: u32) -> ImageBuffer {
    let mut px = Vec::with_capacity((w * h * 4) as usize);
    for y in 0..h {
        for x in 0..w {
            px.extend_from_slice(&[(x * 10) as u8, (y * 10) as u8, 0, 255]);
        }
    }
    ImageBuffer::from_parts(w, h, px, None)
}

#[test]
fn raw_image_rejects_size_mismatch_and_empty() {
    assert!(RawImage::from_premul_rgba8(2, 2, vec![0; 15]).is_err());
    assert!(RawImage::from_premul_rgba8(0, 2, vec![]).is_err());
    assert!(RawImage::from_premul_rgba8(5000, 1, vec![0; 5000 * 4]).is_err());
    assert!(RawImage::from_premul_rgba8(2, 2, vec![0; 16]).is_ok());
}

#[test]
fn raw_image_mask_len_checked() {
    let img = RawImage::solid(2, 2, Color::WHITE).unwrap();
    assert!(img.clone().with_mask(vec![true; 3]).is_err());
    let masked = img.with_mask(vec![true, false, true, false]).unwrap();
    let buf = masked.to_buffer();
    assert!(buf.is_opaque_at(0, 0));
    assert!(!buf.is_opaque_at(1, 0));
}

#[test]
fn from_rgba_image_premultiplies() {
    let img = image::RgbaImage::from_raw(1, 1, vec![100u8, 50, 200, 128]).unwrap();
    let raw = RawImage::from_rgba_image(&img).unwrap();
    assert_eq!(
        raw.pixels(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn cost_is_four_bytes_per_pixel() {
    assert_eq!(ImageBuffer::filled(10, 3, Color::BLACK).cost(), 120);
    assert_eq!(ImageBuffer::empty(0, 7).cost(), 0);
    assert!(ImageBuffer::empty(0, 7).is_empty());
}

#[test]
fn blit_clips_to_destination() {
    let src = checker(4, 4);
    let mut dst = ImageBuffer::transparent(3, 3, false);
    dst.blit(&src, (1, 1), (4, 4), (1, 1));
    assert_eq!(dst.pixel(0, 0), [0, 0, 0, 0]);
    assert_eq!(dst.pixel(1, 1), src.pixel(1, 1));
    assert_eq!(dst.pixel(2, 2), src.pixel(2, 2));
}

#[test]
fn blit_unmasked_source_marks_mask_opaque() {
    let src = ImageBuffer::filled(2, 2, Color::WHITE);
    let mut dst = ImageBuffer::transparent(4, 4, true);
    dst.blit(&src, (0, 0), (2, 2), (1, 1));
    assert!(!dst.is_opaque_at(0, 0));
    assert!(dst.is_opaque_at(1, 1));
    assert!(dst.is_opaque_at(2, 2));
    assert!(!dst.is_opaque_at(3, 3));
}

#[test]
fn tile_rect_repeats_with_phase() {
    let src = checker(2, 2);
    let mut dst = ImageBuffer::transparent(5, 3, false);
    dst.tile_rect(&src, (1, 0), (0, 0), (5, 3));
    for y in 0..3 {
        for x in 0..5 {
            assert_eq!(dst.pixel(x, y), src.pixel((x + 1) % 2, y % 2));
        }
    }
}

#[test]
fn average_color_of_flat_buffer_is_that_color() {
    let buf = ImageBuffer::filled(7, 5, Color::rgb(40, 80, 120));
    assert_eq!(buf.average_color(), Color::rgb(40, 80, 120));
    assert_eq!(ImageBuffer::empty(0, 0).average_color(), Color::TRANSPARENT);
}

#[test]
fn equality_ignores_timestamps() {
    let a = ImageBuffer::filled(2, 2, Color::WHITE);
    let b = a.clone();
    b.touch(Instant::now() + std::time::Duration::from_secs(5));
    assert_eq!(a, b);
}
