//! Directorio de drivers y pasajeros
//!
//! Altas, listados y activación de drivers, más el directorio de pasajeros
//! que es independiente de los legs registrados.

use std::sync::Arc;
use tracing::info;

use crate::models::{Driver, Passenger};
use crate::repositories::TripStore;
use crate::utils::errors::{LedgerError, LedgerResult, StoreError};

fn clean_name(name: &str, what: &str) -> LedgerResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LedgerError::InvalidFormat(format!("{} name is empty", what)));
    }
    Ok(name.to_string())
}

#[derive(Clone)]
pub struct DirectoryService {
    store: Arc<dyn TripStore>,
}

impl DirectoryService {
    pub fn new(store: Arc<dyn TripStore>) -> Self {
        Self { store }
    }

    pub async fn register_driver(&self, tenant_id: i64, name: &str) -> LedgerResult<Driver> {
        let name = clean_name(name, "driver")?;
        match self.store.save_driver(tenant_id, &name).await {
            Ok(driver) => {
                info!("👤 Driver registrado: {} (tenant {})", driver.name, tenant_id);
                Ok(driver)
            }
            Err(StoreError::Conflict(_)) => Err(LedgerError::DriverAlreadyExists(name)),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn list_drivers(&self, tenant_id: i64) -> LedgerResult<Vec<Driver>> {
        Ok(self.store.list_drivers(tenant_id).await?)
    }

    pub async fn set_driver_active(&self, tenant_id: i64, name: &str, active: bool) -> LedgerResult<()> {
        let name = clean_name(name, "driver")?;
        if !self.store.set_driver_active(tenant_id, &name, active).await? {
            return Err(LedgerError::DriverNotFound(name));
        }
        info!(
            "🔁 Driver {} {} (tenant {})",
            name,
            if active { "activado" } else { "desactivado" },
            tenant_id
        );
        Ok(())
    }

    /// Alta de pasajero; si ya existía se devuelve `None`
    pub async fn register_passenger(&self, tenant_id: i64, name: &str) -> LedgerResult<Option<Passenger>> {
        let name = clean_name(name, "passenger")?;
        match self.store.save_passenger(tenant_id, &name).await {
            Ok(passenger) => {
                info!("🧒 Pasajero registrado: {} (tenant {})", passenger.name, tenant_id);
                Ok(Some(passenger))
            }
            Err(StoreError::Conflict(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn list_passengers(&self, tenant_id: i64) -> LedgerResult<Vec<Passenger>> {
        Ok(self.store.list_passengers(tenant_id).await?)
    }
}

/// Listado de drivers para el chat
pub fn render_drivers(drivers: &[Driver]) -> String {
    if drivers.is_empty() {
        return "No drivers registered yet. Use /driver to add one.".to_string();
    }
    let mut text = String::from("🚗 Registered drivers:\n");
    for driver in drivers {
        text.push_str(&driver.directory_line());
        text.push('\n');
    }
    text.trim_end().to_string()
}

pub fn render_passengers(passengers: &[Passenger]) -> String {
    if passengers.is_empty() {
        return "No passengers registered yet. Use /passenger to add one.".to_string();
    }
    let mut text = String::from("🧒 Registered passengers:\n");
    for passenger in passengers {
        text.push_str(&passenger.directory_line());
        text.push('\n');
    }
    text.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::create_memory_pool;
    use crate::repositories::SqliteTripRepository;

    async fn service() -> DirectoryService {
        let pool = create_memory_pool().await.unwrap();
        DirectoryService::new(Arc::new(SqliteTripRepository::new(pool)))
    }

    #[tokio::test]
    async fn test_register_driver_trims_and_rejects_duplicates() {
        let directory = service().await;

        let driver = directory.register_driver(1, "  Ahmad ").await.unwrap();
        assert_eq!(driver.name, "Ahmad");
        assert!(driver.active);

        let err = directory.register_driver(1, "Ahmad").await.unwrap_err();
        assert!(matches!(err, LedgerError::DriverAlreadyExists(ref n) if n == "Ahmad"));

        // otro tenant puede usar el mismo nombre
        directory.register_driver(2, "Ahmad").await.unwrap();

        let err = directory.register_driver(1, "   ").await.unwrap_err();
        assert!(matches!(err, LedgerError::InvalidFormat(_)));
    }

    #[tokio::test]
    async fn test_activation_toggle() {
        let directory = service().await;
        directory.register_driver(1, "Ahmad").await.unwrap();

        directory.set_driver_active(1, "Ahmad", false).await.unwrap();
        let drivers = directory.list_drivers(1).await.unwrap();
        assert!(!drivers[0].active);
        assert!(render_drivers(&drivers).contains("Ahmad (inactive)"));

        let err = directory.set_driver_active(1, "Budi", true).await.unwrap_err();
        assert!(matches!(err, LedgerError::DriverNotFound(_)));
    }

    #[tokio::test]
    async fn test_passenger_directory() {
        let directory = service().await;

        assert!(directory.register_passenger(1, "Ali").await.unwrap().is_some());
        assert!(directory.register_passenger(1, "Ali").await.unwrap().is_none());
        directory.register_passenger(1, "Umar").await.unwrap();

        let passengers = directory.list_passengers(1).await.unwrap();
        assert_eq!(passengers.len(), 2);
        assert!(render_passengers(&passengers).starts_with("🧒 Registered passengers:"));
        assert!(render_passengers(&[]).contains("No passengers"));
    }
}
