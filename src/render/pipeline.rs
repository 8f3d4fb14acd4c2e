use crate::assets::buffer::ImageBuffer;
use crate::foundation::error::PixcacheResult;
use crate::render::blend::blend;
use crate::render::gradient::gradient;
use crate::render::scale::{Axis, scale_axis, scale_full, tile};
use crate::role::spec::{BaseSource, RoleSpec, ScaleHint};

/// Run the generator chain for one role at `w x h`.
///
/// The base image is the gradient when one is configured, otherwise the source image fitted by
/// its scale hint (or the fill color). Blending is applied on top. Unblended `Tile` roles are
/// generated at the tile's native size, since their image does not depend on the request.
pub fn generate(spec: &RoleSpec, w: u32, h: u32) -> PixcacheResult<ImageBuffer> {
    if w == 0 || h == 0 {
        return Ok(ImageBuffer::empty(w, h));
    }

    let base = match spec.base_source() {
        BaseSource::Gradient => gradient(spec, w, h)?,
        BaseSource::Blend | BaseSource::Image | BaseSource::Flat => fit_source(spec, w, h)?,
    };

    let out = if spec.has_blend() {
        blend(base, spec.blend_factor, spec.blend_color)
    } else {
        base
    };
    tracing::debug!(
        role = spec.role_id,
        w = out.width(),
        h = out.height(),
        "generated theme image"
    );
    Ok(out)
}

fn fit_source(spec: &RoleSpec, w: u32, h: u32) -> PixcacheResult<ImageBuffer> {
    match spec.scale_hint {
        ScaleHint::Full => scale_full(spec, w, h),
        ScaleHint::Horizontal => scale_axis(spec, w, h, Axis::Horizontal),
        ScaleHint::Vertical => scale_axis(spec, w, h, Axis::Vertical),
        ScaleHint::Tile if spec.has_blend() => tile(spec, w, h),
        ScaleHint::Tile => {
            let (tw, th) = spec
                .source_image
                .as_ref()
                .map_or((1, 1), |src| (src.width(), src.height()));
            tile(spec, tw, th)
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
