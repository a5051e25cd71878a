//! Utilidades del sistema
//!
//! Este módulo contiene el manejo de errores, el reloj del tenant y las
//! utilidades de formato de mensajes.

pub mod clock;
pub mod errors;
pub mod format;

pub use clock::{Clock, FixedClock, SystemClock};
pub use errors::{AppError, AppResult, LedgerError, LedgerResult, StoreError};
