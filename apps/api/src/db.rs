use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .context("Failed to connect to PostgreSQL")?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Creates the `documents` table and its indexes if they are missing.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            id            UUID PRIMARY KEY,
            user_id       TEXT NOT NULL,
            doc_type      TEXT NOT NULL CHECK (doc_type IN ('cv', 'resume')),
            data          JSONB NOT NULL,
            is_downloaded BOOLEAN NOT NULL DEFAULT FALSE,
            downloaded_at TIMESTAMPTZ,
            created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at    TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            UNIQUE (user_id, doc_type)
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create documents table")?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS documents_downloaded_at_idx \
         ON documents (downloaded_at) WHERE is_downloaded",
    )
    .execute(pool)
    .await
    .context("Failed to create documents expiry index")?;

    info!("Database schema ready");
    Ok(())
}
