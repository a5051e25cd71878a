//! DTOs
//!
//! Tipos de entrada y salida de la Bot API de Telegram y de la API HTTP.

pub mod telegram_dto;

pub use telegram_dto::*;
