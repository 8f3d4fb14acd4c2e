use super::*;

#[test]
fn zero_factor_is_identity() {
    let img = ImageBuffer::filled(3, 2, Color::rgb(10, 20, 30));
    let out = blend(img.clone(), 0.0, Color::WHITE);
    assert_eq!(out, img);
}

#[test]
fn full_factor_yields_the_blend_color() {
    let img = ImageBuffer::filled(3, 2, Color::rgb(10, 20, 30));
    let c = Color::rgb(200, 100, 50);
    let out = blend(img, 1.0, c);
    assert!(out.pixels().chunks_exact(4).all(|p| p == c.to_premul()));
}

#[test]
fn half_factor_lands_between() {
    let img = ImageBuffer::filled(1, 1, Color::BLACK);
    let out = blend(img, 0.5, Color::WHITE);
    let v = out.pixel(0, 0)[0];
    assert!((127..=128).contains(&v), "{v}");
    assert_eq!(out.pixel(0, 0)[3], 255);
}

#[test]
fn mask_survives_blending() {
    let mut img = ImageBuffer::transparent(2, 1, true);
    img.fill_rect((0, 0), (1, 1), Color::WHITE);
    let out = blend(img, 0.4, Color::BLACK);
    assert_eq!(out.mask(), Some(&[true, false][..]));
}

#[test]
fn empty_buffers_pass_through() {
    let out = blend(ImageBuffer::empty(0, 3), 1.0, Color::WHITE);
    assert!(out.is_empty());
}
