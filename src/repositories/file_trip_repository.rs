//! TripStore respaldado por un archivo JSON
//!
//! Todo el ledger vive en memoria detrás de un mutex async y se persiste
//! completo después de cada mutación (archivo temporal + rename). Cada
//! mutación se aplica sobre una copia y solo reemplaza el estado en memoria
//! si el archivo se escribió bien.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{StoreResult, TripStore};
use crate::models::{Direction, Driver, Leg, LegPassenger, Passenger};
use crate::utils::errors::StoreError;

const LEDGER_FILE: &str = "ledger.json";

/// Contenido serializado del archivo
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct LedgerSnapshot {
    next_id: i64,
    drivers: Vec<Driver>,
    passengers: Vec<Passenger>,
    legs: Vec<Leg>,
}

impl LedgerSnapshot {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

pub struct FileTripRepository {
    path: PathBuf,
    snapshot: Mutex<LedgerSnapshot>,
}

impl FileTripRepository {
    /// Abre (o crea) `ledger.json` dentro de `data_dir`
    pub async fn open(data_dir: impl AsRef<Path>) -> StoreResult<Self> {
        let data_dir = data_dir.as_ref();
        tokio::fs::create_dir_all(data_dir).await?;
        let path = data_dir.join(LEDGER_FILE);

        let snapshot = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => LedgerSnapshot::default(),
            Err(e) => return Err(e.into()),
        };

        info!("📁 Ledger en archivo: {}", path.display());
        Ok(Self {
            path,
            snapshot: Mutex::new(snapshot),
        })
    }

    async fn persist(&self, snapshot: &LedgerSnapshot) -> StoreResult<()> {
        let bytes = serde_json::to_vec_pretty(snapshot)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!("💾 Ledger guardado en {}", self.path.display());
        Ok(())
    }

    /// Persiste `next` y solo entonces lo instala como estado actual
    async fn commit(&self, current: &mut LedgerSnapshot, next: LedgerSnapshot) -> StoreResult<()> {
        self.persist(&next).await?;
        *current = next;
        Ok(())
    }
}

#[async_trait]
impl TripStore for FileTripRepository {
    async fn save_driver(&self, tenant_id: i64, name: &str) -> StoreResult<Driver> {
        let mut snapshot = self.snapshot.lock().await;
        if snapshot.drivers.iter().any(|d| d.tenant_id == tenant_id && d.name == name) {
            return Err(StoreError::Conflict(format!("driver '{}' already exists", name)));
        }

        let mut next = snapshot.clone();
        let driver = Driver {
            id: next.allocate_id(),
            tenant_id,
            name: name.to_string(),
            active: true,
            created_at: Utc::now(),
        };
        next.drivers.push(driver.clone());
        self.commit(&mut snapshot, next).await?;
        Ok(driver)
    }

    async fn list_drivers(&self, tenant_id: i64) -> StoreResult<Vec<Driver>> {
        let snapshot = self.snapshot.lock().await;
        // los ids crecen con el tiempo: orden inverso = más reciente primero
        let mut drivers: Vec<Driver> = snapshot
            .drivers
            .iter()
            .filter(|d| d.tenant_id == tenant_id)
            .cloned()
            .collect();
        drivers.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(drivers)
    }

    async fn find_driver(&self, tenant_id: i64, name: &str) -> StoreResult<Option<Driver>> {
        let snapshot = self.snapshot.lock().await;
        Ok(snapshot
            .drivers
            .iter()
            .find(|d| d.tenant_id == tenant_id && d.name == name)
            .cloned())
    }

    async fn set_driver_active(&self, tenant_id: i64, name: &str, active: bool) -> StoreResult<bool> {
        let mut snapshot = self.snapshot.lock().await;
        let mut next = snapshot.clone();
        let Some(driver) = next
            .drivers
            .iter_mut()
            .find(|d| d.tenant_id == tenant_id && d.name == name)
        else {
            return Ok(false);
        };

        driver.active = active;
        self.commit(&mut snapshot, next).await?;
        Ok(true)
    }

    async fn save_passenger(&self, tenant_id: i64, name: &str) -> StoreResult<Passenger> {
        let mut snapshot = self.snapshot.lock().await;
        if snapshot.passengers.iter().any(|p| p.tenant_id == tenant_id && p.name == name) {
            return Err(StoreError::Conflict(format!("passenger '{}' already exists", name)));
        }

        let mut next = snapshot.clone();
        let passenger = Passenger {
            id: next.allocate_id(),
            tenant_id,
            name: name.to_string(),
            created_at: Utc::now(),
        };
        next.passengers.push(passenger.clone());
        self.commit(&mut snapshot, next).await?;
        Ok(passenger)
    }

    async fn list_passengers(&self, tenant_id: i64) -> StoreResult<Vec<Passenger>> {
        let snapshot = self.snapshot.lock().await;
        let mut passengers: Vec<Passenger> = snapshot
            .passengers
            .iter()
            .filter(|p| p.tenant_id == tenant_id)
            .cloned()
            .collect();
        passengers.sort_by(|a, b| b.id.cmp(&a.id));
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
        let mut snapshot = self.snapshot.lock().await;
        let mut next = snapshot.clone();
        let now = Utc::now();

        let existing = next.legs.iter().position(|l| {
            l.tenant_id == tenant_id && l.driver_id == driver_id && l.direction == direction && l.day == day
        });

        match existing {
            Some(index) => {
                let leg = &mut next.legs[index];
                debug!("♻️ Reemplazando pasajeros del leg {} ({} {})", leg.id, direction.as_str(), day);
                leg.passengers = passengers.to_vec();
                leg.updated_at = now;
            }
            None => {
                let leg = Leg {
                    id: next.allocate_id(),
                    tenant_id,
                    driver_id,
                    direction,
                    day,
                    updated_at: now,
                    passengers: passengers.to_vec(),
                };
                next.legs.push(leg);
            }
        }

        self.commit(&mut snapshot, next).await
    }

    async fn list_leg_passengers(
        &self,
        tenant_id: i64,
        driver_id: i64,
        direction: Direction,
        day: NaiveDate,
    ) -> StoreResult<Vec<LegPassenger>> {
        let snapshot = self.snapshot.lock().await;
        Ok(snapshot
            .legs
            .iter()
            .find(|l| {
                l.tenant_id == tenant_id && l.driver_id == driver_id && l.direction == direction && l.day == day
            })
            .map(|l| l.passengers.clone())
            .unwrap_or_default())
    }

    async fn list_drivers_with_legs_on_day(&self, tenant_id: i64, day: NaiveDate) -> StoreResult<Vec<Driver>> {
        let snapshot = self.snapshot.lock().await;
        let mut drivers: Vec<Driver> = snapshot
            .drivers
            .iter()
            .filter(|d| {
                snapshot
                    .legs
                    .iter()
                    .any(|l| l.tenant_id == tenant_id && l.day == day && l.driver_id == d.id)
            })
            .cloned()
            .collect();
        drivers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(drivers)
    }

    async fn opposite_leg_fare(
        &self,
        tenant_id: i64,
        passenger_name: &str,
        direction: Direction,
        day: NaiveDate,
    ) -> StoreResult<Option<i64>> {
        let snapshot = self.snapshot.lock().await;
        let opposite = direction.opposite();

        let fares: Vec<i64> = snapshot
            .legs
            .iter()
            .filter(|l| l.tenant_id == tenant_id && l.direction == opposite && l.day == day)
            .flat_map(|l| l.passengers.iter())
            .filter(|p| p.passenger_name == passenger_name)
            .map(|p| p.fare)
            .collect();

        if fares.is_empty() {
            Ok(None)
        } else {
            Ok(Some(fares.iter().sum()))
        }
    }

    async fn delete_legs(&self, tenant_id: i64, direction: Direction, day: NaiveDate) -> StoreResult<u64> {
        let mut snapshot = self.snapshot.lock().await;
        let mut next = snapshot.clone();
        next.legs
            .retain(|l| !(l.tenant_id == tenant_id && l.direction == direction && l.day == day));
        let removed = (snapshot.legs.len() - next.legs.len()) as u64;

        if removed > 0 {
            self.commit(&mut snapshot, next).await?;
        }
        Ok(removed)
    }
}
