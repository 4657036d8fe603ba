//! Property-based tests sampling random byte strings and checking the
//! no-false-negative and size-accounting invariants across mixed
//! operations, for both `Filter` and `ScalableFilter`.

use cuckoo_filter::{Filter, ScalableFilter};
use proptest::prelude::*;
use std::collections::HashSet;

proptest! {
    #[test]
    fn prop_no_false_negatives_filter(
        keys in prop::collection::vec(prop::collection::vec(any::<u8>(), 1..32), 1..200)
    ) {
        let unique: HashSet<Vec<u8>> = keys.into_iter().collect();
        let mut filter = Filter::new((unique.len() * 2).max(8), 1e-4).unwrap();

        let mut present = Vec::new();
        for key in &unique {
            if filter.insert(key).is_ok() {
                present.push(key.clone());
            }
        }

        for key in &present {
            prop_assert!(filter.contains(key), "false negative for {:?}", key);
        }
    }

    #[test]
    fn prop_no_false_negatives_scalable(
        keys in prop::collection::vec(prop::collection::vec(any::<u8>(), 1..32), 1..400)
    ) {
        let unique: HashSet<Vec<u8>> = keys.into_iter().collect();
        let mut filter = ScalableFilter::new(16, 1e-4).unwrap();

        for key in &unique {
            filter.insert(key).unwrap();
        }

        for key in &unique {
            prop_assert!(filter.contains(key), "false negative for {:?}", key);
        }
    }

    #[test]
    fn prop_size_accounting_mixed_ops(
        ops in prop::collection::vec(
            (any::<bool>(), prop::collection::vec(any::<u8>(), 1..16)),
            1..300
        )
    ) {
        let mut filter = Filter::new(256, 1e-4).unwrap();
        let mut model: HashSet<Vec<u8>> = HashSet::new();

        for (insert, key) in ops {
            if insert {
                if filter.insert(&key).is_ok() {
                    model.insert(key);
                }
            } else if filter.delete(&key) {
                model.remove(&key);
            }
        }

        prop_assert_eq!(filter.size(), model.len());
        for key in &model {
            prop_assert!(filter.contains(key));
        }
    }

    #[test]
    fn prop_delete_then_contains_false(
        keys in prop::collection::vec(prop::collection::vec(any::<u8>(), 1..32), 1..150)
    ) {
        let unique: Vec<Vec<u8>> = keys.into_iter().collect::<HashSet<_>>().into_iter().collect();
        let mut filter = Filter::new((unique.len() * 2).max(8), 1e-4).unwrap();

        let mut present = Vec::new();
        for key in &unique {
            if filter.insert(key).is_ok() {
                present.push(key.clone());
            }
        }

        for key in &present {
            prop_assert!(filter.delete(key));
            prop_assert!(!filter.contains(key));
        }
        prop_assert_eq!(filter.size(), 0);
    }

    #[test]
    fn prop_rollback_preserves_state_on_exhaustion(
        seed_items in prop::collection::vec(prop::collection::vec(any::<u8>(), 1..16), 1..20)
    ) {
        let mut filter = Filter::with_params(4, 0.5, 1, 0).unwrap();
        for item in &seed_items {
            let _ = filter.insert(item);
        }

        let before = filter.to_bytes();
        let size_before = filter.size();

        if filter.insert(b"one-more-item-to-force-exhaustion").is_err() {
            prop_assert_eq!(filter.to_bytes(), before);
            prop_assert_eq!(filter.size(), size_before);
        }
    }
}
