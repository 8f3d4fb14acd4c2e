use std::cell::{Cell, OnceCell};
use std::sync::Arc;
use std::time::Instant;

use crate::assets::color::Color;
use crate::cache::key::MAX_DIMENSION;
use crate::foundation::error::{PixcacheError, PixcacheResult};
use crate::foundation::math::{premultiply_rgba8_in_place, unpremultiply};

/// Bytes per premultiplied RGBA8 pixel; also the per-pixel cache cost.
pub(crate) const BYTES_PER_PIXEL: u64 = 4;

fn byte_len(width: u32, height: u32) -> PixcacheResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| PixcacheError::configuration("image buffer size overflow"))
}

#[derive(Clone, Debug, PartialEq)]
/// Decoded source bitmap supplied by the theme loader, in premultiplied RGBA8 form.
///
/// Raw images are immutable and cheap to clone; role specs hold them for the lifetime of a
/// configuration.
pub struct RawImage {
    width: u32,
    height: u32,
    rgba8_premul: Arc<Vec<u8>>,
    mask: Option<Arc<Vec<bool>>>,
}

impl RawImage {
    /// Wrap premultiplied RGBA8 bytes (row-major, tightly packed).
    pub fn from_premul_rgba8(width: u32, height: u32, rgba8_premul: Vec<u8>) -> PixcacheResult<Self> {
        if width == 0 || height == 0 {
            return Err(PixcacheError::configuration("source image must not be empty"));
        }
        if width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(PixcacheError::configuration(format!(
                "source image {width}x{height} exceeds {MAX_DIMENSION}x{MAX_DIMENSION}"
            )));
        }
        if rgba8_premul.len() != byte_len(width, height)? {
            return Err(PixcacheError::configuration(
                "source image expects bytes matching width*height*4",
            ));
        }
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
            mask: None,
        })
    }

    /// Premultiply straight-alpha RGBA8 bytes and wrap them.
    pub fn from_straight_rgba8(width: u32, height: u32, mut rgba8: Vec<u8>) -> PixcacheResult<Self> {
        premultiply_rgba8_in_place(&mut rgba8);
        Self::from_premul_rgba8(width, height, rgba8)
    }

    /// Convert an already decoded `image` buffer.
    pub fn from_rgba_image(img: &image::RgbaImage) -> PixcacheResult<Self> {
        let (width, height) = img.dimensions();
        Self::from_straight_rgba8(width, height, img.as_raw().clone())
    }

    /// Single-color image.
    pub fn solid(width: u32, height: u32, color: Color) -> PixcacheResult<Self> {
        let px = color.to_premul();
        let n = byte_len(width, height)? / 4;
        Self::from_premul_rgba8(width, height, px.repeat(n))
    }

    /// Attach a binary transparency mask (`true` = opaque), one entry per pixel.
    pub fn with_mask(mut self, mask: Vec<bool>) -> PixcacheResult<Self> {
        if mask.len() != (self.width as usize) * (self.height as usize) {
            return Err(PixcacheError::configuration(
                "mask expects one entry per source pixel",
            ));
        }
        self.mask = Some(Arc::new(mask));
        Ok(self)
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel bytes in row-major premultiplied RGBA8.
    pub fn pixels(&self) -> &[u8] {
        &self.rgba8_premul
    }

    /// Optional binary mask.
    pub fn mask(&self) -> Option<&[bool]> {
        self.mask.as_deref().map(Vec::as_slice)
    }

    pub(crate) fn to_buffer(&self) -> ImageBuffer {
        ImageBuffer::from_parts(
            self.width,
            self.height,
            self.rgba8_premul.as_ref().clone(),
            self.mask.as_deref().cloned(),
        )
    }
}

/// Generated themed image: premultiplied RGBA8 pixels plus an optional binary mask.
///
/// Buffers are built by generators and become read-only once handed out behind an `Rc`. The
/// only state that changes afterwards is `last_touched`, which the cache uses for age-based
/// eviction.
#[derive(Clone, Debug)]
pub struct ImageBuffer {
    width: u32,
    height: u32,
    rgba8_premul: Vec<u8>,
    mask: Option<Vec<bool>>,
    last_touched: Cell<Instant>,
    average: OnceCell<Color>,
}

impl ImageBuffer {
    pub(crate) fn from_parts(
        width: u32,
        height: u32,
        rgba8_premul: Vec<u8>,
        mask: Option<Vec<bool>>,
    ) -> Self {
        debug_assert_eq!(rgba8_premul.len(), (width as usize) * (height as usize) * 4);
        Self {
            width,
            height,
            rgba8_premul,
            mask,
            last_touched: Cell::new(Instant::now()),
            average: OnceCell::new(),
        }
    }

    /// Zero-area buffer returned for degenerate requests.
    pub(crate) fn empty(width: u32, height: u32) -> Self {
        debug_assert!(width == 0 || height == 0);
        Self::from_parts(width, height, Vec::new(), None)
    }

    pub(crate) fn filled(width: u32, height: u32, color: Color) -> Self {
        let n = (width as usize) * (height as usize);
        Self::from_parts(width, height, color.to_premul().repeat(n), None)
    }

    pub(crate) fn transparent(width: u32, height: u32, with_mask: bool) -> Self {
        let n = (width as usize) * (height as usize);
        let mask = with_mask.then(|| vec![false; n]);
        Self::from_parts(width, height, vec![0u8; n * 4], mask)
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `true` for zero-area buffers.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Pixel bytes in row-major premultiplied RGBA8.
    pub fn pixels(&self) -> &[u8] {
        &self.rgba8_premul
    }

    /// Optional binary mask (`true` = opaque), one entry per pixel.
    pub fn mask(&self) -> Option<&[bool]> {
        self.mask.as_deref()
    }

    /// Premultiplied pixel at `(x, y)`. Panics when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = self.index(x, y) * 4;
        let p = &self.rgba8_premul[i..i + 4];
        [p[0], p[1], p[2], p[3]]
    }

    /// Whether the mask marks `(x, y)` opaque. Unmasked buffers are opaque everywhere.
    pub fn is_opaque_at(&self, x: u32, y: u32) -> bool {
        match &self.mask {
            Some(m) => m[self.index(x, y)],
            None => true,
        }
    }

    /// Cache cost in bytes.
    pub fn cost(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height) * BYTES_PER_PIXEL
    }

    /// Instant this buffer was last inserted into or served from a cache.
    pub fn last_touched(&self) -> Instant {
        self.last_touched.get()
    }

    pub(crate) fn touch(&self, now: Instant) {
        self.last_touched.set(now);
    }

    /// Heuristic average color sampled along the middle row and middle column.
    ///
    /// Good enough for flat-looking backgrounds; meaningless for sliders and other images with
    /// strong structure. Computed once per buffer.
    pub fn average_color(&self) -> Color {
        *self.average.get_or_init(|| {
            if self.is_empty() {
                return Color::TRANSPARENT;
            }
            let mut acc = [0u64; 4];
            let mut count = 0u64;
            let mid_y = self.height / 2;
            let mid_x = self.width / 2;
            let samples = (0..self.width)
                .map(|x| (x, mid_y))
                .chain((0..self.height).map(|y| (mid_x, y)));
            for (x, y) in samples {
                let px = unpremultiply(self.pixel(x, y));
                for c in 0..4 {
                    acc[c] += u64::from(px[c]);
                }
                count += 1;
            }
            let avg = |c: usize| ((acc[c] + count / 2) / count) as u8;
            Color::rgba(avg(0), avg(1), avg(2), avg(3))
        })
    }

    fn index(&self, x: u32, y: u32) -> usize {
        assert!(x < self.width && y < self.height, "pixel ({x},{y}) out of bounds");
        (y as usize) * (self.width as usize) + (x as usize)
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut [u8] {
        self.average.take();
        &mut self.rgba8_premul
    }

    /// Copy the `sw x sh` region at `(sx, sy)` of `src` to `(dx, dy)`, clipped to both buffers.
    pub(crate) fn blit(
        &mut self,
        src: &ImageBuffer,
        (sx, sy): (u32, u32),
        (sw, sh): (u32, u32),
        (dx, dy): (u32, u32),
    ) {
        let w = sw
            .min(src.width.saturating_sub(sx))
            .min(self.width.saturating_sub(dx));
        let h = sh
            .min(src.height.saturating_sub(sy))
            .min(self.height.saturating_sub(dy));
        if w == 0 || h == 0 {
            return;
        }
        for row in 0..h {
            let s = ((sy + row) as usize * src.width as usize + sx as usize) * 4;
            let d = ((dy + row) as usize * self.width as usize + dx as usize) * 4;
            let n = w as usize * 4;
            self.rgba8_premul[d..d + n].copy_from_slice(&src.rgba8_premul[s..s + n]);

            if let Some(dst_mask) = self.mask.as_mut() {
                let d = d / 4;
                match &src.mask {
                    Some(src_mask) => {
                        let s = s / 4;
                        dst_mask[d..d + w as usize].copy_from_slice(&src_mask[s..s + w as usize]);
                    }
                    None => dst_mask[d..d + w as usize].fill(true),
                }
            }
        }
    }

    /// Repeat `src` over the `dw x dh` rectangle at `(dx, dy)`, starting the pattern at source
    /// offset `(ox, oy)`. Clipped to this buffer.
    pub(crate) fn tile_rect(
        &mut self,
        src: &ImageBuffer,
        (ox, oy): (u32, u32),
        (dx, dy): (u32, u32),
        (dw, dh): (u32, u32),
    ) {
        if src.is_empty() {
            return;
        }
        let dw = dw.min(self.width.saturating_sub(dx));
        let dh = dh.min(self.height.saturating_sub(dy));
        let mut y = 0;
        while y < dh {
            let sy = (oy + y) % src.height;
            let run_h = (src.height - sy).min(dh - y);
            let mut x = 0;
            while x < dw {
                let sx = (ox + x) % src.width;
                let run_w = (src.width - sx).min(dw - x);
                self.blit(src, (sx, sy), (run_w, run_h), (dx + x, dy + y));
                x += run_w;
            }
            y += run_h;
        }
    }

    /// Fill a rectangle with a flat color, marking it opaque in the mask.
    pub(crate) fn fill_rect(&mut self, (dx, dy): (u32, u32), (dw, dh): (u32, u32), color: Color) {
        let dw = dw.min(self.width.saturating_sub(dx));
        let dh = dh.min(self.height.saturating_sub(dy));
        let px = color.to_premul();
        for row in dy..dy + dh {
            for col in dx..dx + dw {
                let i = (row as usize) * (self.width as usize) + col as usize;
                self.rgba8_premul[i * 4..i * 4 + 4].copy_from_slice(&px);
                if let Some(m) = self.mask.as_mut() {
                    m[i] = true;
                }
            }
        }
    }
}

impl PartialEq for ImageBuffer {
    /// Pixel equality; timestamps are bookkeeping, not content.
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.rgba8_premul == other.rgba8_premul
            && self.mask == other.mask
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/buffer.rs"]
mod tests;
