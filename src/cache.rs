use std::time::Duration;

use moka::future::Cache;

use crate::{config::CacheConfig, db::UserId};

/// A rendered page is cached per request URI and per viewer, since the
/// page header differs for signed-in users.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PageKey {
    pub uri: String,
    pub viewer: Option<UserId>,
}

/// Whole-page HTML cache. Entries are not invalidated when the rows behind
/// them change; they expire after the TTL or on [`PageCache::clear`].
#[derive(Clone)]
pub struct PageCache {
    pages: Cache<PageKey, String>,
}

impl PageCache {
    pub fn new(config: &CacheConfig) -> Self {
        let pages = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(Duration::from_secs(config.index_ttl_secs))
            .build();

        Self { pages }
    }

    pub async fn get(&self, key: &PageKey) -> Option<String> {
        self.pages.get(key).await
    }

    pub async fn insert(&self, key: PageKey, body: String) {
        self.pages.insert(key, body).await;
    }

    pub fn clear(&self) {
        self.pages.invalidate_all();
    }
}
