use anyhow::Context;
use image::imageops::{self, FilterType};

use crate::assets::buffer::{ImageBuffer, RawImage};
use crate::foundation::error::PixcacheResult;
use crate::role::spec::RoleSpec;

/// Resampling axis for [`scale_axis`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Stretch to the requested width.
    Horizontal,
    /// Stretch to the requested height.
    Vertical,
}

/// Resample the role's source image to exactly `w x h`.
///
/// Colors use a triangle (bilinear) filter, the mask uses nearest neighbour. Roles without a
/// source image get a flat `fill_color` image.
pub fn scale_full(spec: &RoleSpec, w: u32, h: u32) -> PixcacheResult<ImageBuffer> {
    if w == 0 || h == 0 {
        return Ok(ImageBuffer::empty(w, h));
    }
    match &spec.source_image {
        Some(src) => resample(src, w, h),
        None => Ok(ImageBuffer::filled(w, h, spec.fill_color)),
    }
}

/// Resample the role's source image along one axis, keeping its native size on the other.
pub fn scale_axis(spec: &RoleSpec, w: u32, h: u32, axis: Axis) -> PixcacheResult<ImageBuffer> {
    if w == 0 || h == 0 {
        return Ok(ImageBuffer::empty(w, h));
    }
    let Some(src) = &spec.source_image else {
        return Ok(ImageBuffer::filled(w, h, spec.fill_color));
    };
    match axis {
        Axis::Horizontal => resample(src, w, src.height()),
        Axis::Vertical => resample(src, src.width(), h),
    }
}

/// Repeat the role's source image (or a single `fill_color` pixel) over `w x h`.
pub fn tile(spec: &RoleSpec, w: u32, h: u32) -> PixcacheResult<ImageBuffer> {
    if w == 0 || h == 0 {
        return Ok(ImageBuffer::empty(w, h));
    }
    let pattern = match &spec.source_image {
        Some(src) => src.to_buffer(),
        None => ImageBuffer::filled(1, 1, spec.fill_color),
    };
    if (pattern.width(), pattern.height()) == (w, h) {
        return Ok(pattern);
    }
    let mut out = ImageBuffer::transparent(w, h, pattern.mask().is_some());
    out.tile_rect(&pattern, (0, 0), (0, 0), (w, h));
    Ok(out)
}

fn resample(src: &RawImage, w: u32, h: u32) -> PixcacheResult<ImageBuffer> {
    let (sw, sh) = (src.width(), src.height());
    if (sw, sh) == (w, h) {
        return Ok(src.to_buffer());
    }

    let img = image::RgbaImage::from_raw(sw, sh, src.pixels().to_vec())
        .with_context(|| format!("source pixels do not describe a {sw}x{sh} rgba image"))?;
    let mut px = imageops::resize(&img, w, h, FilterType::Triangle).into_raw();
    clamp_premultiplied(&mut px);

    let mask = src.mask().map(|m| {
        let mut out = Vec::with_capacity((w as usize) * (h as usize));
        for y in 0..h {
            let sy = nearest(y, h, sh);
            for x in 0..w {
                out.push(m[(sy as usize) * (sw as usize) + nearest(x, w, sw) as usize]);
            }
        }
        out
    });

    tracing::trace!(sw, sh, w, h, "resampled source image");
    Ok(ImageBuffer::from_parts(w, h, px, mask))
}

fn nearest(i: u32, dst_len: u32, src_len: u32) -> u32 {
    let s = (2 * u64::from(i) + 1) * u64::from(src_len) / (2 * u64::from(dst_len));
    (s as u32).min(src_len - 1)
}

// Filtering can leave color channels a step above alpha.
fn clamp_premultiplied(px: &mut [u8]) {
    for p in px.chunks_exact_mut(4) {
        let a = p[3];
        p[0] = p[0].min(a);
        p[1] = p[1].min(a);
        p[2] = p[2].min(a);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/scale.rs"]
mod tests;
