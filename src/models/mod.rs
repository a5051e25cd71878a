//! Modelos del sistema
//!
//! Este módulo contiene los modelos de datos del ledger: drivers, directorio
//! de pasajeros, legs con sus pasajeros y el reporte diario.

pub mod driver;
pub mod leg;
pub mod passenger;
pub mod report;
pub mod trip;

pub use driver::Driver;
pub use leg::{Direction, FareQuote, Leg, LegPassenger, LegReceipt, TripKind};
pub use passenger::Passenger;
pub use report::{DailyReport, DriverReport, ReportLine};
pub use trip::TripRecord;
