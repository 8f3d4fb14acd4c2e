use std::collections::{BTreeMap, BTreeSet};
use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};

use smallvec::SmallVec;

use crate::assets::buffer::ImageBuffer;
use crate::cache::key::{CacheKey, MAX_DIMENSION};
use crate::cache::store::{CacheOpts, ThemeCache};
use crate::foundation::error::{PixcacheError, PixcacheResult};
use crate::render::border::{BorderTileSet, Interior, assemble, slice};
use crate::render::pipeline::generate;
use crate::role::alias::{AliasPlan, plan_aliases};
use crate::role::fingerprint::{SpecFingerprint, fingerprint_border};
use crate::role::spec::{BaseSource, BorderSource, RoleSpec};

/// Lifecycle of a configured role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RoleState {
    /// Configured, nothing generated yet.
    Unloaded,
    /// At least one image was served since the last load or invalidation.
    Ready,
    /// Live images and border tiles were dropped by an invalidation.
    Invalidated,
}

/// Counters describing how requests were served.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegistryStats {
    /// Images produced by running generators.
    pub generated: u64,
    /// Requests answered by a role's live image.
    pub live_hits: u64,
    /// Requests answered from the cache.
    pub cache_hits: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Variant {
    Plain,
    Border,
}

#[derive(Debug)]
struct LiveSlot {
    key: CacheKey,
    image: Rc<ImageBuffer>,
}

#[derive(Debug)]
struct RoleEntry {
    spec: RoleSpec,
    state: RoleState,
    live_image: Option<LiveSlot>,
    live_border: Option<LiveSlot>,
    border_tiles: Option<Rc<BorderTileSet>>,
    alias_of: Option<u32>,
    dependents: SmallVec<[u32; 4]>,
}

impl RoleEntry {
    fn new(spec: RoleSpec, alias_of: Option<u32>, dependents: SmallVec<[u32; 4]>) -> Self {
        Self {
            spec,
            state: RoleState::Unloaded,
            live_image: None,
            live_border: None,
            border_tiles: None,
            alias_of,
            dependents,
        }
    }

    fn slot(&self, variant: Variant) -> Option<&LiveSlot> {
        match variant {
            Variant::Plain => self.live_image.as_ref(),
            Variant::Border => self.live_border.as_ref(),
        }
    }

    fn slot_mut(&mut self, variant: Variant) -> &mut Option<LiveSlot> {
        match variant {
            Variant::Plain => &mut self.live_image,
            Variant::Border => &mut self.live_border,
        }
    }

    fn drop_images(&mut self, state: RoleState) {
        self.live_image = None;
        self.live_border = None;
        self.border_tiles = None;
        self.state = state;
    }

    fn key(&self, role: u32, w: u32, h: u32, variant: Variant) -> PixcacheResult<CacheKey> {
        match variant {
            Variant::Plain => {
                CacheKey::normalized(role, w, h, self.spec.scale_family(), false, false)
            }
            Variant::Border => {
                let border = self.spec.border_image.as_ref().ok_or_else(|| {
                    PixcacheError::configuration(format!("role {role} has no border image"))
                })?;
                CacheKey::new(role, w, h, true, border.image.mask().is_some())
            }
        }
    }

    fn generate(
        &mut self,
        w: u32,
        h: u32,
        variant: Variant,
        pool: &mut BorderTilePool,
    ) -> PixcacheResult<ImageBuffer> {
        match variant {
            Variant::Plain => generate(&self.spec, w, h),
            Variant::Border => {
                if let Some(tiles) = &self.border_tiles {
                    return bordered(&self.spec, tiles, w, h);
                }
                let border = self.spec.border_image.as_ref().ok_or_else(|| {
                    PixcacheError::configuration(format!(
                        "role {} has no border image",
                        self.spec.role_id
                    ))
                })?;
                let tiles = pool.acquire(border)?;
                let out = bordered(&self.spec, &tiles, w, h);
                self.border_tiles = Some(tiles);
                out
            }
        }
    }
}

#[derive(Debug)]
struct SharedTiles {
    source: BorderSource,
    tiles: Weak<BorderTileSet>,
}

/// Sliced borders shared by every role whose border source is equal.
///
/// Roles hold the strong handles; the pool only finds them again.
#[derive(Debug, Default)]
struct BorderTilePool {
    sets: BTreeMap<SpecFingerprint, SmallVec<[SharedTiles; 1]>>,
}

impl BorderTilePool {
    fn acquire(&mut self, border: &BorderSource) -> PixcacheResult<Rc<BorderTileSet>> {
        let bucket = self.sets.entry(fingerprint_border(border)).or_default();
        bucket.retain(|shared| shared.tiles.strong_count() > 0);
        if let Some(tiles) = bucket
            .iter()
            .find(|shared| shared.source == *border)
            .and_then(|shared| shared.tiles.upgrade())
        {
            tracing::trace!(thickness = border.thickness, "reusing sliced border");
            return Ok(tiles);
        }

        let tiles = Rc::new(slice(border)?);
        bucket.push(SharedTiles {
            source: border.clone(),
            tiles: Rc::downgrade(&tiles),
        });
        Ok(tiles)
    }

    fn prune(&mut self) {
        self.sets.retain(|_fp, bucket| {
            bucket.retain(|shared| shared.tiles.strong_count() > 0);
            !bucket.is_empty()
        });
    }

    fn len(&self) -> usize {
        self.sets.values().map(|bucket| bucket.len()).sum()
    }
}

fn bordered(spec: &RoleSpec, tiles: &BorderTileSet, w: u32, h: u32) -> PixcacheResult<ImageBuffer> {
    let t2 = tiles.thickness().saturating_mul(2);
    let (iw, ih) = (w.saturating_sub(t2), h.saturating_sub(t2));
    if spec.base_source() != BaseSource::Flat && iw > 0 && ih > 0 {
        let fill = generate(spec, iw, ih)?;
        Ok(assemble(tiles, w, h, &Interior::Image(&fill)))
    } else {
        Ok(assemble(tiles, w, h, &Interior::Flat(spec.fill_color)))
    }
}

fn check_dimensions(w: u32, h: u32) -> PixcacheResult<()> {
    if w > MAX_DIMENSION || h > MAX_DIMENSION {
        return Err(PixcacheError::configuration(format!(
            "requested size {w}x{h} exceeds {MAX_DIMENSION}x{MAX_DIMENSION}"
        )));
    }
    Ok(())
}

/// Owner of every role's configuration, live images and the shared [`ThemeCache`].
///
/// Requests are served from the role's live image when the normalized key matches, then from the
/// cache, then by generating. The image a request replaces is offered back to the cache. Aliased
/// roles forward to their owner and hold a shared handle to the owner's image.
///
/// Single-owner: not `Send`, not `Sync`.
#[derive(Debug)]
pub struct RoleRegistry {
    cache: ThemeCache,
    entries: BTreeMap<u32, RoleEntry>,
    border_tiles: BorderTilePool,
    stats: RegistryStats,
}

impl RoleRegistry {
    /// Empty registry with a cache built from `opts`.
    pub fn new(opts: CacheOpts) -> Self {
        Self {
            cache: ThemeCache::new(opts),
            entries: BTreeMap::new(),
            border_tiles: BorderTilePool::default(),
            stats: RegistryStats::default(),
        }
    }

    /// Replace the configuration.
    ///
    /// Every spec is validated and the alias plan computed before anything changes; on error the
    /// previous configuration stays active. Roles missing from `specs` are dropped with their
    /// cached images, roles whose spec or alias owner changed restart as
    /// [`RoleState::Unloaded`], and unchanged roles keep their live images.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn load_specs(
        &mut self,
        specs: impl IntoIterator<Item = (u32, RoleSpec)>,
    ) -> PixcacheResult<()> {
        let mut next = BTreeMap::new();
        for (id, spec) in specs {
            if spec.role_id != id {
                return Err(PixcacheError::configuration(format!(
                    "role {id} is configured with a RoleSpec for role {}",
                    spec.role_id
                )));
            }
            spec.validate()?;
            if next.insert(id, spec).is_some() {
                return Err(PixcacheError::configuration(format!(
                    "role {id} is configured twice"
                )));
            }
        }
        let plan = plan_aliases(&next)?;
        self.apply(next, &plan);
        Ok(())
    }

    fn apply(&mut self, next: BTreeMap<u32, RoleSpec>, plan: &AliasPlan) {
        let mut old = std::mem::take(&mut self.entries);
        let mut reset = BTreeSet::new();

        for id in old.keys() {
            if !next.contains_key(id) {
                let evicted = self.cache.evict_role(*id);
                tracing::debug!(role = id, evicted, "dropped role");
            }
        }

        for (id, spec) in next {
            let alias_of = plan.owner_of(id);
            let dependents = plan.dependents_of(id);
            let entry = match old.remove(&id) {
                Some(prev) if prev.spec == spec && prev.alias_of == alias_of => RoleEntry {
                    dependents,
                    ..prev
                },
                prev => {
                    if prev.is_some() {
                        self.cache.evict_role(id);
                        reset.insert(id);
                    }
                    RoleEntry::new(spec, alias_of, dependents)
                }
            };
            self.entries.insert(id, entry);
        }

        // Aliases must not keep handles to a reset owner's images.
        for entry in self.entries.values_mut() {
            if entry.alias_of.is_some_and(|owner| reset.contains(&owner)) {
                entry.drop_images(RoleState::Unloaded);
            }
        }
        drop(old);
        self.border_tiles.prune();
        tracing::debug!(
            roles = self.entries.len(),
            aliases = plan.len(),
            reset = reset.len(),
            border_sets = self.border_tiles.len(),
            "loaded role specs"
        );
    }

    /// Reload the configuration with `spec` replacing (or adding) its role.
    pub fn replace_spec(&mut self, spec: RoleSpec) -> PixcacheResult<()> {
        let role = spec.role_id;
        let mut next: Vec<(u32, RoleSpec)> = self
            .entries
            .iter()
            .filter(|(id, _entry)| **id != role)
            .map(|(id, entry)| (*id, entry.spec.clone()))
            .collect();
        next.push((role, spec));
        self.load_specs(next)
    }

    /// Image for `role` at `w x h`.
    ///
    /// Zero-area requests return an empty buffer that is neither cached nor kept live.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn get_image(&mut self, role: u32, w: u32, h: u32) -> PixcacheResult<Rc<ImageBuffer>> {
        self.request(role, w, h, Variant::Plain)
    }

    /// Bordered image for `role` at `w x h`, assembled from the role's 9-slice border source.
    ///
    /// Fails with a configuration error when the role has no border image.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn get_border_image(
        &mut self,
        role: u32,
        w: u32,
        h: u32,
    ) -> PixcacheResult<Rc<ImageBuffer>> {
        self.request(role, w, h, Variant::Border)
    }

    fn request(
        &mut self,
        role: u32,
        w: u32,
        h: u32,
        variant: Variant,
    ) -> PixcacheResult<Rc<ImageBuffer>> {
        check_dimensions(w, h)?;
        let entry = self.entry(role)?;
        let key = entry.key(role, w, h, variant)?;
        if w == 0 || h == 0 {
            return Ok(Rc::new(ImageBuffer::empty(w, h)));
        }

        if let Some(owner) = entry.alias_of {
            let image = self.request(owner, w, h, variant)?;
            let keep = !self.cache.is_pass_through();
            let entry = self.entry_mut(role)?;
            if keep {
                *entry.slot_mut(variant) = Some(LiveSlot {
                    key,
                    image: Rc::clone(&image),
                });
            }
            entry.state = RoleState::Ready;
            return Ok(image);
        }

        let Self {
            cache,
            entries,
            border_tiles,
            stats,
        } = self;
        let entry = entries
            .get_mut(&role)
            .ok_or_else(|| unknown_role(role))?;

        if let Some(slot) = entry.slot(variant)
            && slot.key == key
        {
            stats.live_hits += 1;
            slot.image.touch(Instant::now());
            return Ok(Rc::clone(&slot.image));
        }

        let image = match cache.lookup(key) {
            Some(image) => {
                stats.cache_hits += 1;
                image
            }
            None => {
                let image = Rc::new(entry.generate(w, h, variant, border_tiles)?);
                stats.generated += 1;
                image
            }
        };

        let replaced = entry.slot_mut(variant).take();
        if !cache.is_pass_through() {
            *entry.slot_mut(variant) = Some(LiveSlot {
                key,
                image: Rc::clone(&image),
            });
        }
        entry.state = RoleState::Ready;

        if let Some(old) = replaced {
            // Aliases drop their handle to the replaced image before it moves into the cache.
            let dependents = entry.dependents.clone();
            for alias in &dependents {
                if let Some(e) = entries.get_mut(alias) {
                    *e.slot_mut(variant) = None;
                }
            }
            cache.insert(old.key, old.image);
        }
        Ok(image)
    }

    /// Drop the live images of `role`.
    ///
    /// An owner also loses its cached images and border tiles, and every alias of it is
    /// invalidated too. An alias only drops its own handles; its owner is untouched.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn invalidate_role(&mut self, role: u32) -> PixcacheResult<()> {
        let entry = self.entry_mut(role)?;
        if entry.alias_of.is_some() {
            entry.live_image = None;
            entry.live_border = None;
            entry.state = RoleState::Invalidated;
            return Ok(());
        }

        entry.drop_images(RoleState::Invalidated);
        let dependents = entry.dependents.clone();
        let evicted = self.cache.evict_role(role);
        for alias in &dependents {
            if let Some(e) = self.entries.get_mut(alias) {
                e.drop_images(RoleState::Invalidated);
            }
        }
        self.border_tiles.prune();
        tracing::debug!(role, evicted, aliases = dependents.len(), "invalidated role");
        Ok(())
    }

    /// Invalidate every role and empty the cache.
    pub fn invalidate_all(&mut self) {
        for entry in self.entries.values_mut() {
            entry.drop_images(RoleState::Invalidated);
        }
        self.border_tiles.prune();
        self.cache.clear();
    }

    /// Drop cached images untouched for at least `max_age`. Live images are unaffected.
    pub fn flush_stale(&mut self, now: Instant, max_age: Duration) -> usize {
        self.cache.flush_stale(now, max_age)
    }

    /// Periodic flush hook; see [`ThemeCache::tick`].
    pub fn tick(&mut self, now: Instant) -> usize {
        self.cache.tick(now)
    }

    /// Lifecycle state of `role`, or `None` when it is not configured.
    pub fn role_state(&self, role: u32) -> Option<RoleState> {
        self.entries.get(&role).map(|e| e.state)
    }

    /// Owner whose image `role` reuses, if `role` is an alias.
    pub fn alias_owner(&self, role: u32) -> Option<u32> {
        self.entries.get(&role).and_then(|e| e.alias_of)
    }

    /// Configured spec of `role`.
    pub fn spec(&self, role: u32) -> Option<&RoleSpec> {
        self.entries.get(&role).map(|e| &e.spec)
    }

    /// Configured role ids, ascending.
    pub fn roles(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries.keys().copied()
    }

    /// Request counters.
    pub fn stats(&self) -> RegistryStats {
        self.stats
    }

    /// Shared cache.
    pub fn cache(&self) -> &ThemeCache {
        &self.cache
    }

    fn entry(&self, role: u32) -> PixcacheResult<&RoleEntry> {
        self.entries.get(&role).ok_or_else(|| unknown_role(role))
    }

    fn entry_mut(&mut self, role: u32) -> PixcacheResult<&mut RoleEntry> {
        self.entries.get_mut(&role).ok_or_else(|| unknown_role(role))
    }
}

impl Default for RoleRegistry {
    fn default() -> Self {
        Self::new(CacheOpts::default())
    }
}

fn unknown_role(role: u32) -> PixcacheError {
    PixcacheError::configuration(format!("role {role} is not configured"))
}

#[cfg(test)]
#[path = "../../tests/unit/role/registry.rs"]
mod tests;
