use rayon::prelude::*;

use crate::assets::buffer::ImageBuffer;
use crate::assets::color::Color;
use crate::foundation::math::lerp_u8_w;

/// Interpolate every pixel of `image` toward `color` by `factor` (`0` keeps the image, `1`
/// yields a flat `color`). Works on premultiplied channels; the mask is kept.
pub fn blend(mut image: ImageBuffer, factor: f32, color: Color) -> ImageBuffer {
    let factor = if factor.is_finite() { factor.clamp(0.0, 1.0) } else { 0.0 };
    let weight = (factor * 255.0).round() as u16;
    if weight == 0 || image.is_empty() {
        return image;
    }

    let target = color.to_premul();
    let row_len = (image.width() as usize) * 4;
    image
        .pixels_mut()
        .par_chunks_exact_mut(row_len)
        .for_each(|row| {
            for px in row.chunks_exact_mut(4) {
                for (ch, t) in px.iter_mut().zip(target) {
                    *ch = lerp_u8_w(*ch, t, weight);
                }
            }
        });
    image
}

#[cfg(test)]
#[path = "../../tests/unit/render/blend.rs"]
mod tests;
