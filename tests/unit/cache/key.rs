use std::collections::HashSet;

use super::*;

#[test]
fn encode_decode_preserves_fields() {
    let k = CacheKey::new(63, 4095, 17, true, false).unwrap();
    let back = CacheKey::decode(k.encode()).unwrap();
    assert_eq!(back, k);
    assert_eq!(back.role_id(), 63);
    assert_eq!(back.width(), 4095);
    assert_eq!(back.height(), 17);
    assert!(back.is_border());
    assert!(!back.is_mask());
}

#[test]
fn packed_keys_fit_in_32_bits() {
    let k = CacheKey::new(MAX_ROLES - 1, MAX_DIMENSION, MAX_DIMENSION, true, true).unwrap();
    assert_eq!(k.encode(), u64::from(u32::MAX));
}

#[test]
fn out_of_range_fields_are_configuration_errors() {
    assert!(matches!(
        CacheKey::new(64, 1, 1, false, false),
        Err(PixcacheError::Configuration(_))
    ));
    assert!(CacheKey::new(0, 4096, 1, false, false).is_err());
    assert!(CacheKey::new(0, 1, 4096, false, false).is_err());
    assert!(CacheKey::decode(1u64 << 32).is_err());
}

#[test]
fn neighbouring_fields_never_collide() {
    let mut seen = HashSet::new();
    for role in [0u32, 1, 62, 63] {
        for w in [0u32, 1, 2, 4094, 4095] {
            for h in [0u32, 1, 2, 4094, 4095] {
                for border in [false, true] {
                    for mask in [false, true] {
                        let k = CacheKey::new(role, w, h, border, mask).unwrap();
                        assert!(seen.insert(k.encode()), "collision for {k:?}");
                    }
                }
            }
        }
    }
}

#[test]
fn normalization_drops_irrelevant_axes() {
    let a = CacheKey::normalized(5, 100, 16, ScaleFamily::Width, false, false).unwrap();
    let b = CacheKey::normalized(5, 100, 9, ScaleFamily::Width, false, false).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.height(), 0);

    let a = CacheKey::normalized(5, 30, 40, ScaleFamily::Height, false, false).unwrap();
    let b = CacheKey::normalized(5, 31, 40, ScaleFamily::Height, false, false).unwrap();
    assert_eq!(a.encode(), b.encode());

    let a = CacheKey::normalized(5, 30, 40, ScaleFamily::Both, false, false).unwrap();
    let b = CacheKey::normalized(5, 31, 40, ScaleFamily::Both, false, false).unwrap();
    assert_ne!(a, b);
}

#[test]
fn normalization_happens_before_range_check() {
    let k = CacheKey::normalized(1, 9000, 12, ScaleFamily::Height, false, false).unwrap();
    assert_eq!((k.width(), k.height()), (0, 12));
    assert!(CacheKey::normalized(1, 9000, 12, ScaleFamily::Both, false, false).is_err());
}
