//! Modelo del reporte diario
//!
//! Estructura serializable que produce el agregador y que se devuelve tal
//! cual por la API HTTP o se renderiza a texto para el chat.

use chrono::NaiveDate;
use serde::Serialize;

use super::leg::TripKind;

/// Línea de un pasajero dentro del bloque de un driver
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportLine {
    pub passenger_name: String,
    pub fare: i64,
    pub kind: TripKind,
    pub departure: bool,
    #[serde(rename = "return")]
    pub return_leg: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriverReport {
    pub driver_name: String,
    pub passengers: Vec<ReportLine>,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyReport {
    pub tenant_id: i64,
    pub day: NaiveDate,
    pub drivers: Vec<DriverReport>,
    pub total: i64,
}

impl DailyReport {
    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }

    /// Busca la línea de un pasajero en el bloque de un driver
    pub fn line(&self, driver_name: &str, passenger_name: &str) -> Option<&ReportLine> {
        self.drivers
            .iter()
            .find(|d| d.driver_name == driver_name)?
            .passengers
            .iter()
            .find(|p| p.passenger_name == passenger_name)
    }
}
