// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for the Cross-Reference Cache
//!
//! Any sequence of inserts keeps the cache within capacity, and the most
//! recently written link is always retrievable.

use cim_asset_collector::CrossRefCache;
use proptest::prelude::*;
use std::time::Duration;

const TTL: Duration = Duration::from_secs(3600);

proptest! {
    #[test]
    fn prop_len_never_exceeds_capacity(
        capacity in 1usize..16,
        links in prop::collection::vec("[a-z]{1,3}", 0..64),
    ) {
        let cache: CrossRefCache<usize> = CrossRefCache::new(capacity);
        for (i, link) in links.iter().enumerate() {
            cache.put(link.as_str(), i, TTL);
            prop_assert!(cache.len() <= capacity);
            prop_assert_eq!(cache.get(link), Some(i));
        }
    }

    #[test]
    fn prop_within_capacity_nothing_is_evicted(
        links in prop::collection::btree_set("[a-z]{1,4}", 1..16),
    ) {
        let cache: CrossRefCache<String> = CrossRefCache::new(links.len());
        for link in &links {
            cache.put(link.as_str(), link.clone(), TTL);
        }
        for link in &links {
            prop_assert_eq!(cache.get(link), Some(link.clone()));
        }
    }
}
