use serde::{Deserialize, Serialize};

use crate::assets::buffer::RawImage;
use crate::assets::color::Color;
use crate::cache::key::{MAX_ROLES, ScaleFamily};
use crate::foundation::error::{PixcacheError, PixcacheResult};

/// How a role's source image is fitted to a requested size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleHint {
    /// Resample on both axes.
    #[default]
    Full,
    /// Resample horizontally; keep the source height.
    Horizontal,
    /// Resample vertically; keep the source width.
    Vertical,
    /// Repeat without scaling.
    Tile,
}

/// Procedural gradient shape.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradientKind {
    /// No gradient.
    #[default]
    None,
    /// Left to right.
    Horizontal,
    /// Top to bottom.
    Vertical,
    /// Top-left to bottom-right.
    Diagonal,
    /// Diamond falloff from the center.
    Pyramid,
    /// Rectangular falloff from the center.
    Rectangle,
    /// Elliptic falloff from the center.
    Elliptic,
    /// Diagonal frame with an inverted inset gradient.
    ReverseBevel,
}

/// 9-slice border source: an image and the width of its fixed border band.
#[derive(Clone, Debug, PartialEq)]
pub struct BorderSource {
    /// Source bitmap, possibly masked.
    pub image: RawImage,
    /// Side length of the corner tiles and thickness of the edge strips.
    pub thickness: u32,
}

/// Which input selects the base image of a role.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum BaseSource {
    Gradient,
    Blend,
    Image,
    Flat,
}

/// Resolved generation recipe for one role.
///
/// Precedence for the base image: gradient, then blend, then source image, then flat fill.
/// Blending is applied on top of whichever base was chosen.
#[derive(Clone, Debug, PartialEq)]
pub struct RoleSpec {
    /// Role identifier, `0..MAX_ROLES`.
    pub role_id: u32,
    /// Fit strategy for `source_image`.
    pub scale_hint: ScaleHint,
    /// Gradient shape; `None` disables procedural gradients.
    pub gradient: GradientKind,
    /// Gradient start color; required with a gradient.
    pub gradient_low: Option<Color>,
    /// Gradient end color; required with a gradient.
    pub gradient_high: Option<Color>,
    /// Blend factor in `[0, 1]`; `0` disables blending.
    pub blend_factor: f32,
    /// Color pixels are blended toward.
    pub blend_color: Color,
    /// Channel offset applied to the outer reverse-bevel gradient.
    pub bevel_contrast: i32,
    /// Frame width.
    pub border_width: u32,
    /// Highlight width.
    pub highlight_width: u32,
    /// Flat fill for roles without other inputs and for bordered interiors.
    pub fill_color: Color,
    /// Designer bitmap.
    pub source_image: Option<RawImage>,
    /// Optional 9-slice border.
    pub border_image: Option<BorderSource>,
    /// Declared request to share another role's image.
    pub alias_of: Option<u32>,
}

impl RoleSpec {
    /// Flat-filled role with every other input disabled.
    pub fn new(role_id: u32) -> Self {
        Self {
            role_id,
            scale_hint: ScaleHint::Full,
            gradient: GradientKind::None,
            gradient_low: None,
            gradient_high: None,
            blend_factor: 0.0,
            blend_color: Color::BLACK,
            bevel_contrast: 0,
            border_width: 0,
            highlight_width: 0,
            fill_color: Color::rgb(192, 192, 192),
            source_image: None,
            border_image: None,
            alias_of: None,
        }
    }

    /// Return spec with a fit strategy.
    pub fn with_scale(mut self, hint: ScaleHint) -> Self {
        self.scale_hint = hint;
        self
    }

    /// Return spec with a gradient from `low` to `high`.
    pub fn with_gradient(mut self, kind: GradientKind, low: Color, high: Color) -> Self {
        self.gradient = kind;
        self.gradient_low = Some(low);
        self.gradient_high = Some(high);
        self
    }

    /// Return spec blending toward `color` by `factor`.
    pub fn with_blend(mut self, factor: f32, color: Color) -> Self {
        self.blend_factor = factor;
        self.blend_color = color;
        self
    }

    /// Return spec with bevel geometry.
    pub fn with_bevel(mut self, border_width: u32, highlight_width: u32, contrast: i32) -> Self {
        self.border_width = border_width;
        self.highlight_width = highlight_width;
        self.bevel_contrast = contrast;
        self
    }

    /// Return spec with a flat fill color.
    pub fn with_fill(mut self, color: Color) -> Self {
        self.fill_color = color;
        self
    }

    /// Return spec with a source bitmap.
    pub fn with_source(mut self, image: RawImage) -> Self {
        self.source_image = Some(image);
        self
    }

    /// Return spec with a 9-slice border source.
    pub fn with_border(mut self, image: RawImage, thickness: u32) -> Self {
        self.border_image = Some(BorderSource { image, thickness });
        self
    }

    /// Return spec declaring it reuses `owner`'s image.
    pub fn with_alias_of(mut self, owner: u32) -> Self {
        self.alias_of = Some(owner);
        self
    }

    /// Check ranges and required inputs.
    pub fn validate(&self) -> PixcacheResult<()> {
        let id = self.role_id;
        if id >= MAX_ROLES {
            return Err(PixcacheError::configuration(format!(
                "role id {id} exceeds key range 0..{MAX_ROLES}"
            )));
        }
        if !self.blend_factor.is_finite() || !(0.0..=1.0).contains(&self.blend_factor) {
            return Err(PixcacheError::configuration(format!(
                "role {id}: blend factor must be finite and within [0, 1]"
            )));
        }
        if self.gradient != GradientKind::None
            && (self.gradient_low.is_none() || self.gradient_high.is_none())
        {
            return Err(PixcacheError::configuration(format!(
                "role {id}: gradient requires both low and high colors"
            )));
        }
        if let Some(border) = &self.border_image {
            let t = border.thickness;
            let (w, h) = (border.image.width(), border.image.height());
            if t == 0 {
                return Err(PixcacheError::configuration(format!(
                    "role {id}: border thickness must be > 0"
                )));
            }
            if u64::from(t) * 2 >= u64::from(w.min(h)) {
                return Err(PixcacheError::configuration(format!(
                    "role {id}: border thickness {t} leaves no edge in a {w}x{h} source"
                )));
            }
        }
        if self.alias_of == Some(id) {
            return Err(PixcacheError::AliasCycle { roles: vec![id] });
        }
        Ok(())
    }

    pub(crate) fn has_blend(&self) -> bool {
        self.blend_factor != 0.0
    }

    pub(crate) fn base_source(&self) -> BaseSource {
        if self.gradient != GradientKind::None {
            BaseSource::Gradient
        } else if self.has_blend() {
            BaseSource::Blend
        } else if self.source_image.is_some() {
            BaseSource::Image
        } else {
            BaseSource::Flat
        }
    }

    /// Which request dimensions identify this role's image.
    pub fn scale_family(&self) -> ScaleFamily {
        match self.gradient {
            GradientKind::Horizontal => ScaleFamily::Width,
            GradientKind::Vertical => ScaleFamily::Height,
            GradientKind::None => match self.scale_hint {
                ScaleHint::Full => ScaleFamily::Both,
                ScaleHint::Horizontal if self.source_image.is_some() => ScaleFamily::Width,
                ScaleHint::Vertical if self.source_image.is_some() => ScaleFamily::Height,
                // Flat fills are generated at the full requested size.
                ScaleHint::Horizontal | ScaleHint::Vertical => ScaleFamily::Both,
                ScaleHint::Tile if self.has_blend() => ScaleFamily::Both,
                ScaleHint::Tile => ScaleFamily::Neither,
            },
            _ => ScaleFamily::Both,
        }
    }

    /// Whether this role's image can be shared with other roles: unblended tiles do not depend on
    /// the requested size.
    pub fn is_shareable(&self) -> bool {
        self.scale_hint == ScaleHint::Tile && !self.has_blend()
    }

    /// Equal in every field except identity and alias declaration.
    pub fn same_recipe(&self, other: &RoleSpec) -> bool {
        self.scale_hint == other.scale_hint
            && self.gradient == other.gradient
            && self.gradient_low == other.gradient_low
            && self.gradient_high == other.gradient_high
            && self.blend_factor.to_bits() == other.blend_factor.to_bits()
            && self.blend_color == other.blend_color
            && self.bevel_contrast == other.bevel_contrast
            && self.border_width == other.border_width
            && self.highlight_width == other.highlight_width
            && self.fill_color == other.fill_color
            && self.source_image == other.source_image
            && self.border_image == other.border_image
    }

    /// Reverse-bevel inset: the wider of frame and highlight.
    pub(crate) fn deco_width(&self) -> u32 {
        self.border_width.max(self.highlight_width)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/role/spec.rs"]
mod tests;
