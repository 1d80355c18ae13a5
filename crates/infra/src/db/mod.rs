//! Database wiring: connection pool and schema bootstrap.

pub mod schema;

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

pub use schema::bootstrap;

/// Open a Postgres pool for `url`.
pub async fn connect(url: &str) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(url)
        .await?;
    info!("connected to postgres");
    Ok(pool)
}
