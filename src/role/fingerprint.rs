use xxhash_rust::xxh3::Xxh3;

use crate::assets::buffer::RawImage;
use crate::assets::color::Color;
use crate::role::spec::{BorderSource, GradientKind, RoleSpec, ScaleHint};

const XXH3_SEED: u64 = 0x5f3c_91d2_7a44_e0b9;

/// Stable 128-bit digest of a spec's generation recipe.
///
/// `role_id` and `alias_of` are not hashed, so roles with the same recipe collide on purpose.
/// Equal fingerprints are a grouping hint only; callers confirm with [`RoleSpec::same_recipe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct SpecFingerprint {
    pub(crate) hi: u64,
    pub(crate) lo: u64,
}

pub(crate) fn fingerprint_spec(spec: &RoleSpec) -> SpecFingerprint {
    let mut h = StableHasher::new();
    write_spec(&mut h, spec);
    h.finish()
}

/// Digest of a border source alone; roles with equal border sources can share one slicing.
pub(crate) fn fingerprint_border(border: &BorderSource) -> SpecFingerprint {
    let mut h = StableHasher::new();
    write_border(&mut h, border);
    h.finish()
}

struct StableHasher {
    inner: Xxh3,
}

impl StableHasher {
    fn new() -> Self {
        Self {
            inner: Xxh3::with_seed(XXH3_SEED),
        }
    }

    fn write_bytes(&mut self, b: &[u8]) {
        self.inner.update(b);
    }

    fn write_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    fn write_u32(&mut self, v: u32) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_i32(&mut self, v: i32) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_f32(&mut self, v: f32) {
        self.write_u32(v.to_bits());
    }

    fn finish(self) -> SpecFingerprint {
        let v = self.inner.digest128();
        SpecFingerprint {
            hi: (v >> 64) as u64,
            lo: v as u64,
        }
    }
}

fn write_spec(h: &mut StableHasher, spec: &RoleSpec) {
    h.write_u8(match spec.scale_hint {
        ScaleHint::Full => 0,
        ScaleHint::Horizontal => 1,
        ScaleHint::Vertical => 2,
        ScaleHint::Tile => 3,
    });
    h.write_u8(match spec.gradient {
        GradientKind::None => 0,
        GradientKind::Horizontal => 1,
        GradientKind::Vertical => 2,
        GradientKind::Diagonal => 3,
        GradientKind::Pyramid => 4,
        GradientKind::Rectangle => 5,
        GradientKind::Elliptic => 6,
        GradientKind::ReverseBevel => 7,
    });
    write_opt_color(h, spec.gradient_low);
    write_opt_color(h, spec.gradient_high);
    h.write_f32(spec.blend_factor);
    write_color(h, spec.blend_color);
    h.write_i32(spec.bevel_contrast);
    h.write_u32(spec.border_width);
    h.write_u32(spec.highlight_width);
    write_color(h, spec.fill_color);
    write_opt_image(h, spec.source_image.as_ref());
    match &spec.border_image {
        Some(border) => {
            h.write_u8(1);
            write_border(h, border);
        }
        None => h.write_u8(0),
    }
}

fn write_border(h: &mut StableHasher, border: &BorderSource) {
    h.write_u32(border.thickness);
    write_image(h, &border.image);
}

fn write_color(h: &mut StableHasher, c: Color) {
    h.write_bytes(&[c.r, c.g, c.b, c.a]);
}

fn write_opt_color(h: &mut StableHasher, c: Option<Color>) {
    h.write_bool(c.is_some());
    if let Some(c) = c {
        write_color(h, c);
    }
}

fn write_opt_image(h: &mut StableHasher, img: Option<&RawImage>) {
    h.write_bool(img.is_some());
    if let Some(img) = img {
        write_image(h, img);
    }
}

fn write_image(h: &mut StableHasher, img: &RawImage) {
    h.write_u32(img.width());
    h.write_u32(img.height());
    h.write_bytes(img.pixels());
    match img.mask() {
        Some(m) => {
            h.write_u8(1);
            for &bit in m {
                h.write_bool(bit);
            }
        }
        None => h.write_u8(0),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/role/fingerprint.rs"]
mod tests;
