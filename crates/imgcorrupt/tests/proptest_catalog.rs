//! Property-based tests for the corruption catalog using proptest.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p imgcorrupt --test proptest_catalog
//! ```

use proptest::prelude::*;

use imgcorrupt::{with_ambient_rng, with_temporary_seed, Corruption, Image, RandomState};

fn corruption() -> impl Strategy<Value = Corruption> {
    (0..Corruption::ALL.len()).prop_map(|i| Corruption::ALL[i])
}

/// Small random u8 images, 2-D or with 1, 3 or 4 channels.
fn small_image() -> impl Strategy<Value = Image> {
    (8usize..20, 8usize..20, prop_oneof![Just(None), Just(Some(1)), Just(Some(3)), Just(Some(4))])
        .prop_flat_map(|(h, w, c)| {
            let len = h * w * c.unwrap_or(1);
            prop::collection::vec(any::<u8>(), len)
                .prop_map(move |data| Image::from_u8(h, w, c, data).unwrap())
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Equal (image, severity, seed) triples replay exactly.
    #[test]
    fn corruption_is_deterministic(
        c in corruption(),
        img in small_image(),
        severity in 1u8..=5,
        seed in any::<u32>(),
    ) {
        let a = c.apply(&img, severity, seed).unwrap();
        let b = c.apply(&img, severity, seed).unwrap();
        prop_assert_eq!(a, b);
    }

    /// Output layout always equals input layout, and the input is untouched.
    #[test]
    fn corruption_preserves_layout(
        c in corruption(),
        img in small_image(),
        severity in 1u8..=5,
        seed in any::<u32>(),
    ) {
        let before = img.clone();
        let out = c.apply(&img, severity, seed).unwrap();
        prop_assert!(out.same_layout(&img));
        prop_assert_eq!(img, before);
    }

    /// Severity-only corruptions never observe the seed.
    #[test]
    fn severity_only_ignores_seed(
        c in corruption(),
        img in small_image(),
        severity in 1u8..=5,
        k1 in any::<u32>(),
        k2 in any::<u32>(),
    ) {
        prop_assume!(!c.is_seed_dependent());
        let a = c.apply(&img, severity, k1).unwrap();
        let b = c.apply(&img, severity, k2).unwrap();
        prop_assert_eq!(a, b);
    }

    /// Out-of-range severities are always rejected.
    #[test]
    fn invalid_severity_rejected(c in corruption(), severity in 6u8..) {
        let img = Image::test_card(8, 8);
        prop_assert!(c.apply(&img, severity, 0).is_err());
        prop_assert!(c.apply(&img, 0, 0).is_err());
    }

    /// Derived seeds stay in the non-negative 31-bit range and replay per root.
    #[test]
    fn derived_seeds_replay(root in any::<u32>()) {
        let a = RandomState::new(root).derive_seeds(8);
        let b = RandomState::new(root).derive_seeds(8);
        prop_assert!(a.iter().all(|&s| s <= i32::MAX as u32));
        prop_assert_eq!(a, b);
    }

    /// Temporary seed scopes restore the surrounding ambient stream.
    #[test]
    fn temporary_seed_restores_outer_scope(outer in any::<u32>(), inner in any::<u32>()) {
        let plain = with_temporary_seed(outer, || {
            (with_ambient_rng(|r| r.gen_u32()), with_ambient_rng(|r| r.gen_u32()))
        }).unwrap();
        let interrupted = with_temporary_seed(outer, || {
            let first = with_ambient_rng(|r| r.gen_u32());
            with_temporary_seed(inner, || with_ambient_rng(|r| r.gen_u32())).unwrap();
            (first, with_ambient_rng(|r| r.gen_u32()))
        }).unwrap();
        prop_assert_eq!(plain, interrupted);
    }

    /// Negative seeds are refused before the scope is entered.
    #[test]
    fn negative_seed_rejected(seed in i64::MIN..0) {
        prop_assert!(with_temporary_seed(seed, || ()).is_err());
    }
}
