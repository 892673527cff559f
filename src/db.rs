mod user;
pub use user::*;
mod group;
pub use group::*;
mod post;
pub use post::*;
mod comment;
pub use comment::*;
mod follow;
pub use follow::*;

use std::str::FromStr;

use sqlx::{
    migrate::Migrator,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};

use crate::{config::DatabaseConfig, error::AppResult};

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

pub async fn connect(config: &DatabaseConfig) -> AppResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .foreign_keys(true);

    // An in-memory database lives only as long as its connection.
    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    tracing::info!(url = %config.url, "database pool established");
    Ok(pool)
}

pub async fn prepare_db(pool: &SqlitePool) -> AppResult<()> {
    tracing::info!("running database migrations");
    MIGRATOR.run(pool).await?;
    Ok(())
}
