use crate::assets::buffer::ImageBuffer;
use crate::assets::color::Color;
use crate::foundation::error::{PixcacheError, PixcacheResult};
use crate::role::spec::BorderSource;

/// Position of a tile in a decomposed border.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BorderPart {
    /// Top-left corner.
    TopLeft,
    /// Top edge.
    Top,
    /// Top-right corner.
    TopRight,
    /// Left edge.
    Left,
    /// Right edge.
    Right,
    /// Bottom-left corner.
    BottomLeft,
    /// Bottom edge.
    Bottom,
    /// Bottom-right corner.
    BottomRight,
}

impl BorderPart {
    /// Every part, in storage order.
    pub const ALL: [BorderPart; 8] = [
        BorderPart::TopLeft,
        BorderPart::Top,
        BorderPart::TopRight,
        BorderPart::Left,
        BorderPart::Right,
        BorderPart::BottomLeft,
        BorderPart::Bottom,
        BorderPart::BottomRight,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// `true` for the four fixed corners.
    pub fn is_corner(self) -> bool {
        matches!(
            self,
            BorderPart::TopLeft
                | BorderPart::TopRight
                | BorderPart::BottomLeft
                | BorderPart::BottomRight
        )
    }
}

/// The eight tiles of a 9-slice border source.
#[derive(Clone, Debug, PartialEq)]
pub struct BorderTileSet {
    thickness: u32,
    tiles: [ImageBuffer; 8],
}

impl BorderTileSet {
    /// Corner side length and edge thickness.
    pub fn thickness(&self) -> u32 {
        self.thickness
    }

    /// Tile at `part`.
    pub fn part(&self, part: BorderPart) -> &ImageBuffer {
        &self.tiles[part.index()]
    }

    /// Whether the tiles carry a transparency mask.
    pub fn has_mask(&self) -> bool {
        self.tiles[0].mask().is_some()
    }
}

/// Interior fill for [`assemble`].
#[derive(Clone, Copy, Debug)]
pub enum Interior<'a> {
    /// Flat color.
    Flat(Color),
    /// Image tiled from its top-left corner.
    Image(&'a ImageBuffer),
}

/// Split a border source into four `t x t` corners and four edges of thickness `t`.
///
/// Requires `0 < 2t < width` and `2t < height`.
pub fn slice(source: &BorderSource) -> PixcacheResult<BorderTileSet> {
    let t = source.thickness;
    let (w, h) = (source.image.width(), source.image.height());
    if t == 0 || u64::from(t) * 2 >= u64::from(w.min(h)) {
        return Err(PixcacheError::configuration(format!(
            "border thickness {t} does not fit a {w}x{h} source"
        )));
    }

    let src = source.image.to_buffer();
    let (ew, eh) = (w - 2 * t, h - 2 * t);
    let crop = |part: BorderPart| {
        let (origin, size) = match part {
            BorderPart::TopLeft => ((0, 0), (t, t)),
            BorderPart::Top => ((t, 0), (ew, t)),
            BorderPart::TopRight => ((w - t, 0), (t, t)),
            BorderPart::Left => ((0, t), (t, eh)),
            BorderPart::Right => ((w - t, t), (t, eh)),
            BorderPart::BottomLeft => ((0, h - t), (t, t)),
            BorderPart::Bottom => ((t, h - t), (ew, t)),
            BorderPart::BottomRight => ((w - t, h - t), (t, t)),
        };
        let mut tile = ImageBuffer::transparent(size.0, size.1, src.mask().is_some());
        tile.blit(&src, origin, size, (0, 0));
        tile
    };

    Ok(BorderTileSet {
        thickness: t,
        tiles: BorderPart::ALL.map(crop),
    })
}

/// Build a `w x h` bordered image from `tiles`.
///
/// Corners are placed verbatim, edges are tiled along the sides and the interior is filled from
/// `interior`. When `w` or `h` is below `2t`, the left/top corners take the larger half and the
/// right/bottom corners the smaller half, each keeping their outer pixels; edges and interior
/// clip to nothing.
pub fn assemble(tiles: &BorderTileSet, w: u32, h: u32, interior: &Interior<'_>) -> ImageBuffer {
    if w == 0 || h == 0 {
        return ImageBuffer::empty(w, h);
    }
    let t = tiles.thickness;
    let mut out = ImageBuffer::transparent(w, h, tiles.has_mask());

    let (cl, cr) = (t.min(w.div_ceil(2)), t.min(w / 2));
    let (ct, cb) = (t.min(h.div_ceil(2)), t.min(h / 2));
    let iw = w - cl - cr;
    let ih = h - ct - cb;

    out.blit(tiles.part(BorderPart::TopLeft), (0, 0), (cl, ct), (0, 0));
    out.blit(tiles.part(BorderPart::TopRight), (t - cr, 0), (cr, ct), (w - cr, 0));
    out.blit(tiles.part(BorderPart::BottomLeft), (0, t - cb), (cl, cb), (0, h - cb));
    out.blit(
        tiles.part(BorderPart::BottomRight),
        (t - cr, t - cb),
        (cr, cb),
        (w - cr, h - cb),
    );

    if iw > 0 {
        out.tile_rect(tiles.part(BorderPart::Top), (0, 0), (cl, 0), (iw, ct));
        out.tile_rect(tiles.part(BorderPart::Bottom), (0, t - cb), (cl, h - cb), (iw, cb));
    }
    if ih > 0 {
        out.tile_rect(tiles.part(BorderPart::Left), (0, 0), (0, ct), (cl, ih));
        out.tile_rect(tiles.part(BorderPart::Right), (t - cr, 0), (w - cr, ct), (cr, ih));
    }

    if iw > 0 && ih > 0 {
        match interior {
            Interior::Flat(color) => out.fill_rect((cl, ct), (iw, ih), *color),
            Interior::Image(img) => out.tile_rect(img, (0, 0), (cl, ct), (iw, ih)),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/border.rs"]
mod tests;
