//! pixcache generates and caches the decorative pixmaps of themed UI widgets.
//!
//! Every widget-appearance slot (a *role*: "sunken push button", "horizontal scrollbar
//! groove", ...) is described by a resolved [`RoleSpec`]. The [`RoleRegistry`] turns a
//! `(role, width, height)` request into a premultiplied RGBA8 [`ImageBuffer`], reusing the
//! role's live image, a retained copy from the bounded [`ThemeCache`], or running a generator.
//!
//! # Pipeline overview
//!
//! 1. **Key**: `(role, w, h)` is normalized by the role's [`ScaleFamily`] and packed into a
//!    [`CacheKey`].
//! 2. **Reuse**: live slot first, then [`ThemeCache::lookup`].
//! 3. **Generate**: gradient, blend, scale/tile or flat fill by precedence, or the 9-slice
//!    [`assemble`] path for bordered images.
//! 4. **Recycle**: the replaced live image is offered to the cache; capacity and age eviction keep
//!    the cache bounded.
//!
//! The registry is a single-owner structure: it uses `Rc` and `Cell` internally and is therefore
//! neither `Send` nor `Sync`. Hosts that paint from several threads must wrap it themselves.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod cache;
mod foundation;
mod render;
mod role;

pub use assets::buffer::{ImageBuffer, RawImage};
pub use assets::color::Color;
pub use cache::key::{CacheKey, MAX_DIMENSION, MAX_ROLES, ScaleFamily};
pub use cache::store::{CacheOpts, CacheStats, ThemeCache};
pub use foundation::error::{PixcacheError, PixcacheResult};
pub use render::blend::blend;
pub use render::border::{BorderPart, BorderTileSet, Interior, assemble, slice};
pub use render::gradient::{gradient, reverse_bevel};
pub use render::pipeline::generate;
pub use render::scale::{Axis, scale_axis, scale_full, tile};
pub use role::registry::{RegistryStats, RoleRegistry, RoleState};
pub use role::spec::{BorderSource, GradientKind, RoleSpec, ScaleHint};
