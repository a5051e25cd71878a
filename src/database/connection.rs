//! Conexión y schema de SQLite
//!
//! Este módulo abre el pool y crea las tablas del ledger de forma
//! idempotente al arrancar.

use anyhow::Result;
use sqlx::SqlitePool;
use tracing::info;

use crate::config::database::DatabaseConfig;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS drivers (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        tenant_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL,
        UNIQUE(tenant_id, name)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS passengers (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        tenant_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        created_at TEXT NOT NULL,
        UNIQUE(tenant_id, name)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS legs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        tenant_id INTEGER NOT NULL,
        driver_id INTEGER NOT NULL REFERENCES drivers(id),
        direction TEXT NOT NULL CHECK (direction IN ('departure', 'return')),
        day TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        UNIQUE(tenant_id, driver_id, direction, day)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS leg_passengers (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        leg_id INTEGER NOT NULL REFERENCES legs(id) ON DELETE CASCADE,
        tenant_id INTEGER NOT NULL,
        passenger_name TEXT NOT NULL,
        fare INTEGER NOT NULL,
        position INTEGER NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_legs_tenant_day ON legs(tenant_id, day)",
    "CREATE INDEX IF NOT EXISTS idx_leg_passengers_name ON leg_passengers(tenant_id, passenger_name)",
];

/// Crear el pool y asegurar el schema
pub async fn create_pool(config: &DatabaseConfig) -> Result<SqlitePool> {
    info!("🗄️ Conectando a SQLite: {}", config.url);

    let pool = config.create_pool().await?;
    run_migrations(&pool).await?;

    info!("✅ Base de datos lista");
    Ok(pool)
}

/// Pool en memoria con el schema aplicado (tests)
pub async fn create_memory_pool() -> Result<SqlitePool> {
    let pool = DatabaseConfig::create_test_pool().await?;
    run_migrations(&pool).await?;
    Ok(pool)
}

/// Ejecutar las sentencias de creación del schema
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let pool = create_memory_pool().await.unwrap();
        run_migrations(&pool).await.unwrap();

        let tables: Vec<String> =
            sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name")
                .fetch_all(&pool)
                .await
                .unwrap();
        assert_eq!(tables, vec!["drivers", "leg_passengers", "legs", "passengers"]);
    }
}
