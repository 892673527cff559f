use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub media: MediaConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub secret: String,
    #[serde(default = "default_token_ttl_days")]
    pub token_ttl_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaConfig {
    /// Uploaded post images land under `<root>/posts/`.
    pub root: PathBuf,
    pub static_root: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_index_ttl_secs")]
    pub index_ttl_secs: u64,
    #[serde(default = "default_cache_capacity")]
    pub max_capacity: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_max_connections() -> u32 {
    5
}

fn default_token_ttl_days() -> i64 {
    30
}

fn default_index_ttl_secs() -> u64 {
    20
}

fn default_cache_capacity() -> u64 {
    1000
}

impl Config {
    /// Defaults, overridden by `.env` and then by `SERVER__PORT`-style
    /// environment variables.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port() as i64)?
            .set_default("database.url", "sqlite://yatube.db")?
            .set_default("database.max_connections", default_max_connections() as i64)?
            .set_default("auth.secret", "development-secret-change-in-production")?
            .set_default("auth.token_ttl_days", default_token_ttl_days())?
            .set_default("media.root", "media")?
            .set_default("media.static_root", "static")?
            .set_default("cache.index_ttl_secs", default_index_ttl_secs() as i64)?
            .set_default("cache.max_capacity", default_cache_capacity() as i64)?
            .add_source(config::Environment::default().separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// In-memory database and a throwaway media directory.
    pub fn for_tests(media_root: PathBuf) -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            database: DatabaseConfig {
                url: "sqlite::memory:".to_string(),
                max_connections: 1,
            },
            auth: AuthConfig {
                secret: "test-secret".to_string(),
                token_ttl_days: 1,
            },
            media: MediaConfig {
                root: media_root,
                static_root: PathBuf::from("static"),
            },
            cache: CacheConfig {
                index_ttl_secs: default_index_ttl_secs(),
                max_capacity: 100,
            },
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
