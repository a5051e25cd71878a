//! Controllers
//!
//! Este módulo contiene el controlador que traduce mensajes del chat en
//! operaciones del ledger.

pub mod message_controller;

pub use message_controller::MessageController;
