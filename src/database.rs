use sqlx::{migrate::Migrator, postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use tracing::info;

use crate::config::DatabaseConfig;

// Схема кинотеатра: users, movies, cinema_halls, movie_sessions, orders, tickets
static MIGRATOR: Migrator = sqlx::migrate!("./src/migrations");

#[derive(Clone)]
pub struct Database {
    pub pool: PgPool,
}

impl Database {
    pub async fn connect(url: &str, config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.pool_size)
            .acquire_timeout(Duration::from_secs(5))
            .connect(url)
            .await?;
        info!(pool_size = config.pool_size, "cinema database connected");
        Ok(Database { pool })
    }

    /// Применяет встроенные миграции схемы. Уже примененные пропускаются.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        let latest = MIGRATOR.iter().map(|m| m.version).max().unwrap_or_default();
        info!(known = MIGRATOR.iter().count(), latest, "applying cinema schema migrations");
        MIGRATOR.run(&self.pool).await?;
        info!(latest, "cinema schema is up to date");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cinema_schema_migration_is_embedded() {
        let migration = MIGRATOR.iter().find(|m| m.description == "cinema").unwrap();
        assert_eq!(migration.version, 20240601000000);
        assert!(migration.sql.contains("UNIQUE (movie_session_id, row, seat)"));
    }
}
