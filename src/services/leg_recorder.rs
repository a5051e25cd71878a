//! Registro de legs
//!
//! Convierte un `TripRecord` ya interpretado en un leg persistido. Las
//! mutaciones de un mismo (tenant, día) se serializan con un mutex por clave
//! para que la consulta del leg opuesto y el reemplazo vean el mismo estado.

use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::fare_service::FareService;
use crate::models::{Direction, LegPassenger, LegReceipt, TripRecord};
use crate::repositories::TripStore;
use crate::utils::errors::{LedgerError, LedgerResult};
use crate::utils::format::{format_day, format_rupiah};

type DayKey = (i64, NaiveDate);

/// Registro de mutex por (tenant, día)
#[derive(Default)]
struct DayLocks {
    locks: Mutex<HashMap<DayKey, Arc<Mutex<()>>>>,
}

impl DayLocks {
    async fn for_day(&self, key: DayKey) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        // libera las entradas que ya nadie está usando
        locks.retain(|k, lock| *k == key || Arc::strong_count(lock) > 1);
        locks.entry(key).or_default().clone()
    }
}

#[derive(Clone)]
pub struct LegRecorder {
    store: Arc<dyn TripStore>,
    fares: FareService,
    locks: Arc<DayLocks>,
}

impl LegRecorder {
    pub fn new(store: Arc<dyn TripStore>) -> Self {
        Self {
            fares: FareService::new(store.clone()),
            store,
            locks: Arc::new(DayLocks::default()),
        }
    }

    /// Registra (o reemplaza) el leg descrito por `trip`.
    ///
    /// Si falla cualquier paso no se escribe nada.
    pub async fn record(&self, tenant_id: i64, trip: &TripRecord) -> LedgerResult<LegReceipt> {
        let driver = self
            .store
            .find_driver(tenant_id, &trip.driver_name)
            .await?
            .filter(|d| d.active)
            .ok_or_else(|| {
                warn!("⚠️ Driver desconocido o inactivo: {}", trip.driver_name);
                LedgerError::DriverNotFound(trip.driver_name.clone())
            })?;

        let lock = self.locks.for_day((tenant_id, trip.day)).await;
        let _guard = lock.lock().await;

        let mut seen = HashSet::new();
        let mut quotes = Vec::with_capacity(trip.passengers.len());
        for name in trip.passengers.iter().filter(|n| seen.insert(*n)) {
            quotes.push(self.fares.resolve(tenant_id, name, trip.direction, trip.day).await?);
        }

        let members: Vec<LegPassenger> = quotes.iter().map(LegPassenger::from).collect();
        self.store
            .save_leg(tenant_id, driver.id, trip.direction, trip.day, &members)
            .await?;

        info!(
            "🚐 Leg {} de {} ({}) registrado con {} pasajeros",
            trip.direction.as_str(),
            driver.name,
            trip.day,
            quotes.len()
        );

        Ok(LegReceipt {
            driver_name: driver.name,
            direction: trip.direction,
            day: trip.day,
            passengers: quotes,
        })
    }

    /// Borra todos los legs de una dirección en ese día; devuelve cuántos
    pub async fn delete(&self, tenant_id: i64, direction: Direction, day: NaiveDate) -> LedgerResult<u64> {
        let lock = self.locks.for_day((tenant_id, day)).await;
        let _guard = lock.lock().await;

        let removed = self.store.delete_legs(tenant_id, direction, day).await?;
        info!("🗑️ {} legs {} del {} eliminados (tenant {})", removed, direction.as_str(), day, tenant_id);
        Ok(removed)
    }
}

/// Confirmación en texto para el chat
pub fn render_receipt(receipt: &LegReceipt) -> String {
    let mut text = format!(
        "✅ Trip {} recorded\n🚗 Driver: {}\n📅 Date: {}\n\nPassengers:\n",
        receipt.direction,
        receipt.driver_name,
        format_day(receipt.day)
    );
    for quote in &receipt.passengers {
        text.push_str(&format!(
            "- {} ({} - {})\n",
            quote.passenger_name,
            format_rupiah(quote.fare),
            quote.kind
        ));
    }
    text.push_str(&format!("\n💰 Total: {}", format_rupiah(receipt.total())));
    text
}
