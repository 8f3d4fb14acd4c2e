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
fn lerp_endpoints_are_exact() {
    assert_eq!(lerp_u8(10, 200, 0.0), 10);
    assert_eq!(lerp_u8(10, 200, 1.0), 200);
    assert_eq!(lerp_u8(0, 255, 0.5), 128);
    assert_eq!(lerp_u8_w(10, 200, 0), 10);
    assert_eq!(lerp_u8_w(10, 200, 255), 200);
}

#[test]
fn premultiply_zero_alpha_clears_color() {
    let mut px = [200u8, 100, 50, 0, 200, 100, 50, 255];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(&px[..4], &[0, 0, 0, 0]);
    assert_eq!(&px[4..], &[200, 100, 50, 255]);
}

#[test]
fn unpremultiply_inverts_opaque_and_half_alpha() {
    assert_eq!(unpremultiply([10, 20, 30, 255]), [10, 20, 30, 255]);
    let mut px = [200u8, 100, 0, 128];
    premultiply_rgba8_in_place(&mut px);
    let back = unpremultiply([px[0], px[1], px[2], px[3]]);
    assert!((i32::from(back[0]) - 200).abs() <= 1);
    assert!((i32::from(back[1]) - 100).abs() <= 1);
}
