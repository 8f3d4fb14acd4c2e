use rayon::prelude::*;

use crate::assets::buffer::ImageBuffer;
use crate::assets::color::Color;
use crate::foundation::error::{PixcacheError, PixcacheResult};
use crate::role::spec::{GradientKind, RoleSpec};

/// Fill `w x h` with the role's gradient, `gradient_low` at `t = 0` and `gradient_high` at
/// `t = 1`.
///
/// `ReverseBevel` roles are forwarded to [`reverse_bevel`].
pub fn gradient(spec: &RoleSpec, w: u32, h: u32) -> PixcacheResult<ImageBuffer> {
    if w == 0 || h == 0 {
        return Ok(ImageBuffer::empty(w, h));
    }
    match spec.gradient {
        GradientKind::None => Err(PixcacheError::generation(format!(
            "role {} has no gradient",
            spec.role_id
        ))),
        GradientKind::ReverseBevel => reverse_bevel(spec, w, h),
        kind => {
            let (low, high) = endpoints(spec)?;
            Ok(shade(w, h, low, high, kind))
        }
    }
}

/// Diagonal frame gradient with the inverse gradient inset by the decoration width.
///
/// The frame runs from `low` darkened by `bevel_contrast` to `high` lightened by it; the inset
/// `(w - 2d) x (h - 2d)` region runs `high -> low`, where `d` is the larger of `border_width` and
/// `highlight_width`. Insets that leave no area are skipped.
pub fn reverse_bevel(spec: &RoleSpec, w: u32, h: u32) -> PixcacheResult<ImageBuffer> {
    if w == 0 || h == 0 {
        return Ok(ImageBuffer::empty(w, h));
    }
    let (low, high) = endpoints(spec)?;
    let contrast = spec.bevel_contrast;
    let mut out = shade(
        w,
        h,
        low.offset(-contrast),
        high.offset(contrast),
        GradientKind::Diagonal,
    );

    let d = spec.deco_width();
    let iw = w.saturating_sub(d.saturating_mul(2));
    let ih = h.saturating_sub(d.saturating_mul(2));
    if iw > 0 && ih > 0 {
        let inset = shade(iw, ih, high, low, GradientKind::Diagonal);
        out.blit(&inset, (0, 0), (iw, ih), (d, d));
    }
    Ok(out)
}

fn endpoints(spec: &RoleSpec) -> PixcacheResult<(Color, Color)> {
    match (spec.gradient_low, spec.gradient_high) {
        (Some(low), Some(high)) => Ok((low, high)),
        _ => Err(PixcacheError::generation(format!(
            "role {} gradient is missing its colors",
            spec.role_id
        ))),
    }
}

fn shade(w: u32, h: u32, low: Color, high: Color, kind: GradientKind) -> ImageBuffer {
    let mut out = ImageBuffer::filled(w, h, low);
    let row_len = (w as usize) * 4;
    out.pixels_mut()
        .par_chunks_exact_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| {
            let (fy, dy) = (unit(y as u32, h), spread(y as u32, h));
            for (x, px) in row.chunks_exact_mut(4).enumerate() {
                let (fx, dx) = (unit(x as u32, w), spread(x as u32, w));
                let t = position(kind, fx, fy, dx, dy);
                px.copy_from_slice(&low.lerp(high, t).to_premul());
            }
        });
    out
}

fn unit(i: u32, len: u32) -> f32 {
    if len <= 1 {
        0.0
    } else {
        i as f32 / (len - 1) as f32
    }
}

/// Distance of pixel `i`'s centre from the middle of the axis, in `[0, 1)`.
fn spread(i: u32, len: u32) -> f32 {
    let twice = 2 * i64::from(i) + 1 - i64::from(len);
    twice.unsigned_abs() as f32 / len as f32
}

/// Gradient parameter from edge-exact coordinates `fx, fy` and centre distances `dx, dy`.
fn position(kind: GradientKind, fx: f32, fy: f32, dx: f32, dy: f32) -> f32 {
    let t = match kind {
        GradientKind::Horizontal => fx,
        GradientKind::Vertical => fy,
        GradientKind::Pyramid => (dx + dy) / 2.0,
        GradientKind::Rectangle => dx.max(dy),
        GradientKind::Elliptic => (dx.hypot(dy) / std::f32::consts::SQRT_2).min(1.0),
        GradientKind::Diagonal | GradientKind::ReverseBevel | GradientKind::None => (fx + fy) / 2.0,
    };
    t.clamp(0.0, 1.0)
}

#[cfg(test)]
#[path = "../../tests/unit/render/gradient.rs"]
mod tests;
