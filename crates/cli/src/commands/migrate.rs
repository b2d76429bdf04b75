//! Database migrations.
//!
//! The migrations live in `crates/store/migrations/` and are embedded in
//! `afrah_store::MIGRATOR`, so the binary carries its own schema.

use sqlx::PgPool;

/// # Errors
///
/// Returns an error if a migration fails or the history has diverged.
pub async fn run(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    tracing::info!("Running migrations...");
    afrah_store::MIGRATOR.run(pool).await?;
    tracing::info!("Migrations complete!");
    Ok(())
}
