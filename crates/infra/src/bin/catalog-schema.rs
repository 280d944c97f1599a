//! Bootstrap the catalog database schema.
//!
//! Reads `DATABASE_URL` (plus optional pool settings) and creates the
//! `categories` table when it is missing.

use anyhow::Context;

use catalog_infra::{DatabaseConfig, PostgresCategoryRepository};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    catalog_observability::init();

    let config = DatabaseConfig::from_env().context("invalid database configuration")?;
    let pool = config
        .connect()
        .await
        .context("failed to connect to the database")?;

    PostgresCategoryRepository::new(pool)
        .ensure_schema()
        .await
        .context("failed to create the categories schema")?;

    tracing::info!("catalog schema ready");
    Ok(())
}
