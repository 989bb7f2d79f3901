// Copyright (c) 2025 - Cowboy AI, Inc.
//! Link-to-id resolution

use crate::asset::{AssetKind, Ean};
use crate::cache::{CacheSummary, CrossRefCache};

/// Resolve a foreign `link` to the EAN of the resource it points at.
///
/// Returns `None` for an empty link and on a cache miss. A miss is not an
/// error: the caller publishes its record without that edge.
pub fn resolve_link<V: CacheSummary>(
    cache: &CrossRefCache<V>,
    link: &str,
    kind: AssetKind,
) -> Option<Ean> {
    if link.is_empty() {
        return None;
    }
    match cache.resolve_id(link) {
        Some(id) if !id.is_empty() => Some(Ean::new(kind, id)),
        _ => {
            tracing::debug!(link, kind = %kind, "cross-reference cache miss");
            None
        }
    }
}

/// Resolve every link, dropping misses and keeping input order
pub fn resolve_links<'a, V, I>(cache: &CrossRefCache<V>, links: I, kind: AssetKind) -> Vec<Ean>
where
    V: CacheSummary,
    I: IntoIterator<Item = &'a str>,
{
    links
        .into_iter()
        .filter_map(|link| resolve_link(cache, link, kind))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[derive(Debug, Clone)]
    struct Net(String);

    impl CacheSummary for Net {
        fn id(&self) -> &str {
            &self.0
        }
    }

    #[tokio::test]
    async fn test_hit_and_miss() {
        let cache = CrossRefCache::new(8);
        cache.put("https://net/a", Net("1".into()), Duration::from_secs(60));

        assert_eq!(
            resolve_link(&cache, "https://net/a", AssetKind::Network),
            Some(Ean::network("1"))
        );
        assert_eq!(resolve_link(&cache, "https://net/b", AssetKind::Network), None);
        assert_eq!(resolve_link(&cache, "", AssetKind::Network), None);
    }

    #[tokio::test]
    async fn test_resolve_links_skips_misses() {
        let cache = CrossRefCache::new(8);
        cache.put("s1", Net("10".into()), Duration::from_secs(60));
        cache.put("s3", Net("30".into()), Duration::from_secs(60));

        let eans = resolve_links(&cache, ["s1", "s2", "s3"], AssetKind::Network);
        assert_eq!(eans, vec![Ean::network("10"), Ean::network("30")]);
    }
}
