//! Repositorios
//!
//! Contrato de persistencia del ledger (`TripStore`) y sus dos
//! implementaciones intercambiables: SQLite (sqlx) y archivo JSON.
//! El motor de tarifas y reportes depende solo del trait.

pub mod file_trip_repository;
pub mod sqlite_trip_repository;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::models::{Direction, Driver, LegPassenger, Passenger};
use crate::utils::errors::StoreError;

pub use file_trip_repository::FileTripRepository;
pub use sqlite_trip_repository::SqliteTripRepository;

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait TripStore: Send + Sync {
    /// Registra un driver activo. `StoreError::Conflict` si ya existe.
    async fn save_driver(&self, tenant_id: i64, name: &str) -> StoreResult<Driver>;

    /// Drivers del tenant, del más reciente al más antiguo
    async fn list_drivers(&self, tenant_id: i64) -> StoreResult<Vec<Driver>>;

    async fn find_driver(&self, tenant_id: i64, name: &str) -> StoreResult<Option<Driver>>;

    async fn driver_exists(&self, tenant_id: i64, name: &str) -> StoreResult<bool> {
        Ok(self.find_driver(tenant_id, name).await?.is_some())
    }

    /// Devuelve `false` si el driver no existe
    async fn set_driver_active(&self, tenant_id: i64, name: &str, active: bool) -> StoreResult<bool>;

    async fn save_passenger(&self, tenant_id: i64, name: &str) -> StoreResult<Passenger>;

    async fn list_passengers(&self, tenant_id: i64) -> StoreResult<Vec<Passenger>>;

    /// Reemplaza de forma atómica los pasajeros del leg
    /// (tenant, driver, dirección, día), creándolo si no existe.
    async fn save_leg(
        &self,
        tenant_id: i64,
        driver_id: i64,
        direction: Direction,
        day: NaiveDate,
        passengers: &[LegPassenger],
    ) -> StoreResult<()>;

    async fn list_leg_passengers(
        &self,
        tenant_id: i64,
        driver_id: i64,
        direction: Direction,
        day: NaiveDate,
    ) -> StoreResult<Vec<LegPassenger>>;

    /// Drivers con al menos un leg ese día, ordenados por nombre
    async fn list_drivers_with_legs_on_day(&self, tenant_id: i64, day: NaiveDate) -> StoreResult<Vec<Driver>>;

    /// Suma de las tarifas ya registradas para el pasajero en legs de la
    /// dirección opuesta ese día; `None` si no tiene ninguno.
    async fn opposite_leg_fare(
        &self,
        tenant_id: i64,
        passenger_name: &str,
        direction: Direction,
        day: NaiveDate,
    ) -> StoreResult<Option<i64>>;

    async fn has_opposite_leg_today(
        &self,
        tenant_id: i64,
        passenger_name: &str,
        direction: Direction,
        day: NaiveDate,
    ) -> StoreResult<bool> {
        Ok(self
            .opposite_leg_fare(tenant_id, passenger_name, direction, day)
            .await?
            .is_some())
    }

    /// Elimina todos los legs de esa dirección y día; devuelve cuántos
    async fn delete_legs(&self, tenant_id: i64, direction: Direction, day: NaiveDate) -> StoreResult<u64>;
}
