pub mod api;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod routes;
pub mod templates;
pub mod utils;

use std::sync::Arc;

use axum::extract::FromRef;
use jsonwebtoken::{DecodingKey, EncodingKey};
use sqlx::SqlitePool;

use crate::{cache::PageCache, config::Config, error::AppResult};

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub encoding_key: EncodingKey,
    pub decoding_key: DecodingKey,
    pub page_cache: PageCache,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: Config) -> Self {
        let secret = config.auth.secret.as_bytes();

        Self {
            pool,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            page_cache: PageCache::new(&config.cache),
            config: Arc::new(config),
        }
    }
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(app_state: &AppState) -> SqlitePool {
        app_state.pool.clone()
    }
}

impl FromRef<AppState> for EncodingKey {
    fn from_ref(app_state: &AppState) -> EncodingKey {
        app_state.encoding_key.clone()
    }
}

impl FromRef<AppState> for DecodingKey {
    fn from_ref(app_state: &AppState) -> DecodingKey {
        app_state.decoding_key.clone()
    }
}

impl FromRef<AppState> for PageCache {
    fn from_ref(app_state: &AppState) -> PageCache {
        app_state.page_cache.clone()
    }
}

impl FromRef<AppState> for Arc<Config> {
    fn from_ref(app_state: &AppState) -> Arc<Config> {
        app_state.config.clone()
    }
}

/// Connects, migrates and assembles the shared state.
pub async fn build_state(config: Config) -> AppResult<AppState> {
    let pool = db::connect(&config.database).await?;
    db::prepare_db(&pool).await?;
    Ok(AppState::new(pool, config))
}
