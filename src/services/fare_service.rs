//! Servicio de tarifas
//!
//! Decide cuánto paga un pasajero en el leg que se está registrando mirando
//! lo que ya pagó ese día en la dirección opuesta.

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::debug;

use crate::models::{Direction, FareQuote, TripKind};
use crate::repositories::TripStore;
use crate::utils::errors::LedgerResult;

/// Tarifa de un solo trayecto (rupiah)
pub const ONE_WAY_FARE: i64 = 10_000;

/// Tarifa total de ida y vuelta el mismo día (rupiah)
pub const ROUND_TRIP_FARE: i64 = 15_000;

/// Lo mínimo que cuesta la segunda mitad de un ida y vuelta
pub const ROUND_TRIP_SECOND_LEG_FARE: i64 = ROUND_TRIP_FARE - ONE_WAY_FARE;

/// Tarifa de un leg dada la suma ya cobrada en la dirección opuesta
pub fn fare_for(opposite_fare: Option<i64>) -> (i64, TripKind) {
    match opposite_fare {
        None => (ONE_WAY_FARE, TripKind::OneWay),
        Some(paid) => (
            (ROUND_TRIP_FARE - paid).max(ROUND_TRIP_SECOND_LEG_FARE),
            TripKind::RoundTrip,
        ),
    }
}

#[derive(Clone)]
pub struct FareService {
    store: Arc<dyn TripStore>,
}

impl FareService {
    pub fn new(store: Arc<dyn TripStore>) -> Self {
        Self { store }
    }

    pub async fn resolve(
        &self,
        tenant_id: i64,
        passenger_name: &str,
        direction: Direction,
        day: NaiveDate,
    ) -> LedgerResult<FareQuote> {
        let opposite = self
            .store
            .opposite_leg_fare(tenant_id, passenger_name, direction, day)
            .await?;
        let (fare, kind) = fare_for(opposite);

        debug!(
            "💵 {} ({} {}): Rp {} {}",
            passenger_name,
            direction.as_str(),
            day,
            fare,
            kind
        );

        Ok(FareQuote {
            passenger_name: passenger_name.to_string(),
            fare,
            kind,
        })
    }
}
