//! Directorio de pasajeros
//!
//! Independiente de la participación en legs: un pasajero no necesita estar
//! registrado para que se le cobre un viaje.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Passenger {
    pub id: i64,
    pub tenant_id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Passenger {
    pub fn directory_line(&self) -> String {
        format!("{} - {}", self.created_at.format("%Y-%m-%d %H:%M:%S"), self.name)
    }
}
