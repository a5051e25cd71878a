//! Mensaje de viaje ya interpretado

use chrono::NaiveDate;
use serde::Serialize;

use super::leg::Direction;

/// Salida del parser de mensajes de viaje.
///
/// Los pasajeros conservan el orden y los duplicados del mensaje original;
/// la política de unicidad la decide quien registra el leg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TripRecord {
    pub direction: Direction,
    pub driver_name: String,
    pub day: NaiveDate,
    pub passengers: Vec<String>,
}
