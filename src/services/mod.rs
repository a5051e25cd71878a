//! Services module
//!
//! Este módulo contiene la lógica de negocio del ledger: interpretación de
//! mensajes de viaje, cálculo de tarifas, registro de legs, reportes diarios
//! y el directorio de drivers y pasajeros. Los servicios dependen solo del
//! trait `TripStore`, nunca de una implementación concreta.

pub mod directory_service;
pub mod fare_service;
pub mod leg_recorder;
pub mod report_service;
pub mod trip_parser;

pub use directory_service::DirectoryService;
pub use fare_service::{FareService, ONE_WAY_FARE, ROUND_TRIP_FARE};
pub use leg_recorder::LegRecorder;
pub use report_service::ReportService;
pub use trip_parser::parse_trip_message;
