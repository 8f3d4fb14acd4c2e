use crate::foundation::error::{PixcacheError, PixcacheResult};

const ROLE_BITS: u32 = 6;
const DIM_BITS: u32 = 12;

const WIDTH_SHIFT: u32 = ROLE_BITS;
const HEIGHT_SHIFT: u32 = WIDTH_SHIFT + DIM_BITS;
const BORDER_SHIFT: u32 = HEIGHT_SHIFT + DIM_BITS;
const MASK_SHIFT: u32 = BORDER_SHIFT + 1;
const USED_BITS: u32 = MASK_SHIFT + 1;

/// Number of distinct role ids a key can address (`0..MAX_ROLES`).
pub const MAX_ROLES: u32 = 1 << ROLE_BITS;
/// Largest encodable width or height.
pub const MAX_DIMENSION: u32 = (1 << DIM_BITS) - 1;

/// Which request dimensions identify a role's image.
///
/// Dimensions outside the family are normalized to 0 before packing, so requests that differ
/// only along an irrelevant axis share one cache entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScaleFamily {
    /// Width and height both matter.
    Both,
    /// Only the width matters (horizontal scale or gradient).
    Width,
    /// Only the height matters (vertical scale or gradient).
    Height,
    /// Neither matters (unblended tiles are handed out at their native size).
    Neither,
}

impl ScaleFamily {
    /// Zero the axes this family ignores.
    pub fn normalize(self, width: u32, height: u32) -> (u32, u32) {
        match self {
            Self::Both => (width, height),
            Self::Width => (width, 0),
            Self::Height => (0, height),
            Self::Neither => (0, 0),
        }
    }
}

/// Cache identity of a generated image: role, normalized size and variant flags.
///
/// Packed layout (low to high bits): role id (6), width (12), height (12), border (1),
/// mask (1). Bits above the 32nd are always zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    role_id: u32,
    width: u32,
    height: u32,
    is_border: bool,
    is_mask: bool,
}

impl CacheKey {
    /// Build a key, rejecting fields that do not fit the packed layout.
    pub fn new(
        role_id: u32,
        width: u32,
        height: u32,
        is_border: bool,
        is_mask: bool,
    ) -> PixcacheResult<Self> {
        if role_id >= MAX_ROLES {
            return Err(PixcacheError::configuration(format!(
                "role id {role_id} exceeds key range 0..{MAX_ROLES}"
            )));
        }
        if width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(PixcacheError::configuration(format!(
                "size {width}x{height} exceeds key range {MAX_DIMENSION}x{MAX_DIMENSION}"
            )));
        }
        Ok(Self {
            role_id,
            width,
            height,
            is_border,
            is_mask,
        })
    }

    /// Build a key after zeroing the axes `family` ignores.
    pub fn normalized(
        role_id: u32,
        width: u32,
        height: u32,
        family: ScaleFamily,
        is_border: bool,
        is_mask: bool,
    ) -> PixcacheResult<Self> {
        let (width, height) = family.normalize(width, height);
        Self::new(role_id, width, height, is_border, is_mask)
    }

    /// Pack into an integer. Injective over all valid keys.
    pub fn encode(self) -> u64 {
        u64::from(self.role_id)
            | u64::from(self.width) << WIDTH_SHIFT
            | u64::from(self.height) << HEIGHT_SHIFT
            | u64::from(self.is_border) << BORDER_SHIFT
            | u64::from(self.is_mask) << MASK_SHIFT
    }

    /// Unpack an integer produced by [`CacheKey::encode`].
    pub fn decode(packed: u64) -> PixcacheResult<Self> {
        if packed >> USED_BITS != 0 {
            return Err(PixcacheError::configuration(format!(
                "packed key {packed:#x} has bits outside the {USED_BITS}-bit layout"
            )));
        }
        let field = |shift: u32, bits: u32| ((packed >> shift) & ((1u64 << bits) - 1)) as u32;
        Ok(Self {
            role_id: field(0, ROLE_BITS),
            width: field(WIDTH_SHIFT, DIM_BITS),
            height: field(HEIGHT_SHIFT, DIM_BITS),
            is_border: field(BORDER_SHIFT, 1) == 1,
            is_mask: field(MASK_SHIFT, 1) == 1,
        })
    }

    /// Role id field.
    pub fn role_id(self) -> u32 {
        self.role_id
    }

    /// Normalized width field.
    pub fn width(self) -> u32 {
        self.width
    }

    /// Normalized height field.
    pub fn height(self) -> u32 {
        self.height
    }

    /// Whether the key names an assembled border image.
    pub fn is_border(self) -> bool {
        self.is_border
    }

    /// Whether the key names a masked variant.
    pub fn is_mask(self) -> bool {
        self.is_mask
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cache/key.rs"]
mod tests;
