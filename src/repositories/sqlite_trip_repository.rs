use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use super::{StoreResult, TripStore};
use crate::models::{Direction, Driver, LegPassenger, Passenger};
use crate::utils::errors::StoreError;
use crate::utils::format::ISO_DATE_FORMAT;

/// TripStore respaldado por SQLite
#[derive(Clone)]
pub struct SqliteTripRepository {
    pool: SqlitePool,
}

impl SqliteTripRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn day_key(day: NaiveDate) -> String {
    day.format(ISO_DATE_FORMAT).to_string()
}

/// Traduce violaciones de UNIQUE a `Conflict`
fn conflict_or(e: sqlx::Error, what: &str) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Conflict(format!("{} already exists", what))
        }
        _ => StoreError::Database(e),
    }
}

#[async_trait]
impl TripStore for SqliteTripRepository {
    async fn save_driver(&self, tenant_id: i64, name: &str) -> StoreResult<Driver> {
        let driver = sqlx::query_as::<_, Driver>(
            r#"
            INSERT INTO drivers (tenant_id, name, active, created_at)
            VALUES (?, ?, 1, ?)
            RETURNING id, tenant_id, name, active, created_at
            "#,
        )
        .bind(tenant_id)
        .bind(name)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_or(e, &format!("driver '{}'", name)))?;

        Ok(driver)
    }

    async fn list_drivers(&self, tenant_id: i64) -> StoreResult<Vec<Driver>> {
        let drivers = sqlx::query_as::<_, Driver>(
            "SELECT id, tenant_id, name, active, created_at FROM drivers WHERE tenant_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(drivers)
    }

    async fn find_driver(&self, tenant_id: i64, name: &str) -> StoreResult<Option<Driver>> {
        let driver = sqlx::query_as::<_, Driver>(
            "SELECT id, tenant_id, name, active, created_at FROM drivers WHERE tenant_id = ? AND name = ?",
        )
        .bind(tenant_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(driver)
    }

    async fn set_driver_active(&self, tenant_id: i64, name: &str, active: bool) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE drivers SET active = ? WHERE tenant_id = ? AND name = ?")
            .bind(active)
            .bind(tenant_id)
            .bind(name)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn save_passenger(&self, tenant_id: i64, name: &str) -> StoreResult<Passenger> {
        let passenger = sqlx::query_as::<_, Passenger>(
            r#"
            INSERT INTO passengers (tenant_id, name, created_at)
            VALUES (?, ?, ?)
            RETURNING id, tenant_id, name, created_at
            "#,
        )
        .bind(tenant_id)
        .bind(name)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_or(e, &format!("passenger '{}'", name)))?;

        Ok(passenger)
    }

    async fn list_passengers(&self, tenant_id: i64) -> StoreResult<Vec<Passenger>> {
        let passengers = sqlx::query_as::<_, Passenger>(
            "SELECT id, tenant_id, name, created_at FROM passengers WHERE tenant_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(passengers)
    }

    async fn save_leg(
        &self,
        tenant_id: i64,
        driver_id: i64,
        direction: Direction,
        day: NaiveDate,
        passengers: &[LegPassenger],
    ) -> StoreResult<()> {
        let day = day_key(day);
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let existing: Option<i64> = sqlx::query_scalar(
            "SELECT id FROM legs WHERE tenant_id = ? AND driver_id = ? AND direction = ? AND day = ?",
        )
        .bind(tenant_id)
        .bind(driver_id)
        .bind(direction.as_str())
        .bind(&day)
        .fetch_optional(&mut *tx)
        .await?;

        let leg_id = match existing {
            Some(leg_id) => {
                debug!("♻️ Reemplazando pasajeros del leg {} ({} {})", leg_id, direction.as_str(), day);
                sqlx::query("DELETE FROM leg_passengers WHERE leg_id = ?")
                    .bind(leg_id)
                    .execute(&mut *tx)
                    .await?;
                sqlx::query("UPDATE legs SET updated_at = ? WHERE id = ?")
                    .bind(now)
                    .bind(leg_id)
                    .execute(&mut *tx)
                    .await?;
                leg_id
            }
            None => {
                sqlx::query_scalar::<_, i64>(
                    r#"
                    INSERT INTO legs (tenant_id, driver_id, direction, day, updated_at)
                    VALUES (?, ?, ?, ?, ?)
                    RETURNING id
                    "#,
                )
                .bind(tenant_id)
                .bind(driver_id)
                .bind(direction.as_str())
                .bind(&day)
                .bind(now)
                .fetch_one(&mut *tx)
                .await?
            }
        };

        for (position, passenger) in passengers.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO leg_passengers (leg_id, tenant_id, passenger_name, fare, position)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(leg_id)
            .bind(tenant_id)
            .bind(&passenger.passenger_name)
            .bind(passenger.fare)
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn list_leg_passengers(
        &self,
        tenant_id: i64,
        driver_id: i64,
        direction: Direction,
        day: NaiveDate,
    ) -> StoreResult<Vec<LegPassenger>> {
        let passengers = sqlx::query_as::<_, LegPassenger>(
            r#"
            SELECT lp.passenger_name, lp.fare
            FROM leg_passengers lp
            JOIN legs l ON lp.leg_id = l.id
            WHERE l.tenant_id = ? AND l.driver_id = ? AND l.direction = ? AND l.day = ?
            ORDER BY lp.position
            "#,
        )
        .bind(tenant_id)
        .bind(driver_id)
        .bind(direction.as_str())
        .bind(day_key(day))
        .fetch_all(&self.pool)
        .await?;

        Ok(passengers)
    }

    async fn list_drivers_with_legs_on_day(&self, tenant_id: i64, day: NaiveDate) -> StoreResult<Vec<Driver>> {
        let drivers = sqlx::query_as::<_, Driver>(
            r#"
            SELECT DISTINCT d.id, d.tenant_id, d.name, d.active, d.created_at
            FROM drivers d
            JOIN legs l ON l.driver_id = d.id
            WHERE l.tenant_id = ? AND l.day = ?
            ORDER BY d.name
            "#,
        )
        .bind(tenant_id)
        .bind(day_key(day))
        .fetch_all(&self.pool)
        .await?;

        Ok(drivers)
    }

    async fn opposite_leg_fare(
        &self,
        tenant_id: i64,
        passenger_name: &str,
        direction: Direction,
        day: NaiveDate,
    ) -> StoreResult<Option<i64>> {
        let fare: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT SUM(lp.fare)
            FROM leg_passengers lp
            JOIN legs l ON lp.leg_id = l.id
            WHERE l.tenant_id = ? AND l.direction = ? AND l.day = ? AND lp.passenger_name = ?
            "#,
        )
        .bind(tenant_id)
        .bind(direction.opposite().as_str())
        .bind(day_key(day))
        .bind(passenger_name)
        .fetch_one(&self.pool)
        .await?;

        Ok(fare)
    }

    async fn delete_legs(&self, tenant_id: i64, direction: Direction, day: NaiveDate) -> StoreResult<u64> {
        let day = day_key(day);
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            DELETE FROM leg_passengers
            WHERE leg_id IN (SELECT id FROM legs WHERE tenant_id = ? AND direction = ? AND day = ?)
            "#,
        )
        .bind(tenant_id)
        .bind(direction.as_str())
        .bind(&day)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM legs WHERE tenant_id = ? AND direction = ? AND day = ?")
            .bind(tenant_id)
            .bind(direction.as_str())
            .bind(&day)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected())
    }
}
