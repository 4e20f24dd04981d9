use std::path::Path;

use sqlx::migrate::Migrator;
use sqlx::postgres::{PgPool, PgPoolOptions};

pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
}

/// Applies every pending migration found in `dir`.
pub async fn run_migrations(pool: &PgPool, dir: &str) -> anyhow::Result<()> {
    let migrator = Migrator::new(Path::new(dir)).await?;
    migrator.run(pool).await?;
    tracing::info!(dir, "Database migrations completed");
    Ok(())
}
