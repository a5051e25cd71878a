//! Modelo de Driver
//!
//! Un driver se identifica por (nombre, tenant). Solo el flag `active`
//! cambia después del registro.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Driver - mapea a la tabla drivers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Driver {
    pub id: i64,
    pub tenant_id: i64,
    pub name: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Driver {
    /// "2024-12-05 07:30:00 - Pak Ahmad" (con marca si está inactivo)
    pub fn directory_line(&self) -> String {
        let line = format!("{} - {}", self.created_at.format("%Y-%m-%d %H:%M:%S"), self.name);
        if self.active {
            line
        } else {
            format!("{} (inactive)", line)
        }
    }
}
