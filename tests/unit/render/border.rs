use crate::assets::buffer::RawImage;

use super::*;

fn numbered(w: u32, h: u32) -> RawImage {
    let mut px = Vec::with_capacity((w * h * 4) as usize);
    for y in 0..h {
        for x in 0..w {
            px.extend_from_slice(&[(x * 20) as u8, (y * 20) as u8, (x + y) as u8, 255]);
        }
    }
    RawImage::from_premul_rgba8(w, h, px).unwrap()
}

fn source(t: u32) -> BorderSource {
    BorderSource {
        image: numbered(12, 12),
        thickness: t,
    }
}

#[test]
fn slice_produces_corners_and_edges() {
    let tiles = slice(&source(4)).unwrap();
    assert_eq!(tiles.thickness(), 4);
    for part in BorderPart::ALL {
        let tile = tiles.part(part);
        assert_eq!((tile.width(), tile.height()), (4, 4), "{part:?}");
    }
    let src = source(4).image.to_buffer();
    assert_eq!(tiles.part(BorderPart::BottomRight).pixel(0, 0), src.pixel(8, 8));
    assert_eq!(tiles.part(BorderPart::Top).pixel(3, 0), src.pixel(7, 0));
    assert!(!tiles.has_mask());
    assert_eq!(BorderPart::ALL.iter().filter(|p| p.is_corner()).count(), 4);
}

#[test]
fn slice_rejects_thickness_without_edges() {
    assert!(slice(&source(6)).is_err());
    assert!(slice(&source(0)).is_err());
}

#[test]
fn assemble_at_native_size_round_trips() {
    let src = source(4).image.to_buffer();
    let tiles = slice(&source(4)).unwrap();

    let mut center = ImageBuffer::transparent(4, 4, false);
    center.blit(&src, (4, 4), (4, 4), (0, 0));

    let out = assemble(&tiles, 12, 12, &Interior::Image(&center));
    assert_eq!(out, src);

    let flat = assemble(&tiles, 12, 12, &Interior::Flat(Color::WHITE));
    for y in 0..12 {
        for x in 0..12 {
            let inside = (4..8).contains(&x) && (4..8).contains(&y);
            if inside {
                assert_eq!(flat.pixel(x, y), [255, 255, 255, 255]);
            } else {
                assert_eq!(flat.pixel(x, y), src.pixel(x, y), "at ({x},{y})");
            }
        }
    }
}

#[test]
fn larger_targets_keep_corners_and_repeat_edges() {
    let src = source(4).image.to_buffer();
    let tiles = slice(&source(4)).unwrap();
    let (w, h) = (23, 17);
    let out = assemble(&tiles, w, h, &Interior::Flat(Color::BLACK));

    for y in 0..4 {
        for x in 0..4 {
            assert_eq!(out.pixel(x, y), src.pixel(x, y));
            assert_eq!(out.pixel(w - 4 + x, y), src.pixel(8 + x, y));
            assert_eq!(out.pixel(x, h - 4 + y), src.pixel(x, 8 + y));
            assert_eq!(out.pixel(w - 4 + x, h - 4 + y), src.pixel(8 + x, 8 + y));
        }
    }
    for x in 4..w - 4 {
        let sx = 4 + (x - 4) % 4;
        assert_eq!(out.pixel(x, 0), src.pixel(sx, 0));
        assert_eq!(out.pixel(x, h - 1), src.pixel(sx, 11));
    }
    for y in 4..h - 4 {
        let sy = 4 + (y - 4) % 4;
        assert_eq!(out.pixel(0, y), src.pixel(0, sy));
        assert_eq!(out.pixel(w - 1, y), src.pixel(11, sy));
    }
    assert_eq!(out.pixel(10, 8), [0, 0, 0, 255]);
}

#[test]
fn degenerate_sizes_split_corners_and_show_outer_pixels() {
    let src = source(4).image.to_buffer();
    let tiles = slice(&source(4)).unwrap();
    let out = assemble(&tiles, 5, 3, &Interior::Flat(Color::WHITE));

    // Left corners take ceil(5/2) = 3 columns, right corners floor(5/2) = 2.
    assert_eq!(out.pixel(0, 0), src.pixel(0, 0));
    assert_eq!(out.pixel(2, 0), src.pixel(2, 0));
    assert_eq!(out.pixel(3, 0), src.pixel(10, 0));
    assert_eq!(out.pixel(4, 0), src.pixel(11, 0));
    // Top rows take ceil(3/2) = 2, bottom rows floor(3/2) = 1 showing the outermost row.
    assert_eq!(out.pixel(0, 1), src.pixel(0, 1));
    assert_eq!(out.pixel(0, 2), src.pixel(0, 11));
    assert_eq!(out.pixel(4, 2), src.pixel(11, 11));
    // No interior is visible.
    assert!(out.pixels().chunks_exact(4).all(|p| p != [255, 255, 255, 255]));
}

#[test]
fn masks_are_assembled_tile_by_tile() {
    let mask: Vec<bool> = (0..144).map(|i| i % 12 != 0).collect();
    let masked = BorderSource {
        image: numbered(12, 12).with_mask(mask).unwrap(),
        thickness: 3,
    };
    let tiles = slice(&masked).unwrap();
    assert!(tiles.has_mask());

    let out = assemble(&tiles, 20, 10, &Interior::Flat(Color::WHITE));
    let m = out.mask().unwrap();
    for y in 0..10 {
        assert!(!out.is_opaque_at(0, y), "left column stays transparent");
        assert!(out.is_opaque_at(19, y));
    }
    assert!(out.is_opaque_at(10, 5), "interior is opaque");
    assert_eq!(m.len(), 200);
}

#[test]
fn zero_area_is_empty() {
    let tiles = slice(&source(4)).unwrap();
    assert!(assemble(&tiles, 0, 10, &Interior::Flat(Color::WHITE)).is_empty());
}
