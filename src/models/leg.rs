//! Modelo de Leg
//!
//! Un leg es un trayecto en una dirección, de un driver, en un día calendario
//! del tenant. Existe como mucho un leg por (tenant, driver, dirección, día);
//! reenviarlo reemplaza su lista de pasajeros.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Dirección del trayecto
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Antar - ida
    Departure,
    /// Jemput - vuelta
    Return,
}

impl Direction {
    /// Palabra clave del chat, sin distinguir mayúsculas
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.trim().to_lowercase().as_str() {
            "antar" | "departure" => Some(Direction::Departure),
            "jemput" | "return" => Some(Direction::Return),
            _ => None,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Departure => Direction::Return,
            Direction::Return => Direction::Departure,
        }
    }

    /// Valor persistido en la columna `direction`
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Departure => "departure",
            Direction::Return => "return",
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Direction::Departure => "antar",
            Direction::Return => "jemput",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.as_str(), self.keyword())
    }
}

/// Tipo de viaje que justifica la tarifa cobrada
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TripKind {
    OneWay,
    RoundTrip,
}

impl TripKind {
    pub fn label(self) -> &'static str {
        match self {
            TripKind::OneWay => "one-way",
            TripKind::RoundTrip => "round-trip",
        }
    }
}

impl fmt::Display for TripKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leg {
    pub id: i64,
    pub tenant_id: i64,
    pub driver_id: i64,
    pub direction: Direction,
    pub day: NaiveDate,
    pub updated_at: DateTime<Utc>,
    pub passengers: Vec<LegPassenger>,
}

/// Pertenencia de un pasajero a un leg con la tarifa calculada al registrarlo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct LegPassenger {
    pub passenger_name: String,
    pub fare: i64,
}

/// Tarifa resuelta para un pasajero dentro del leg que se está registrando
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FareQuote {
    pub passenger_name: String,
    pub fare: i64,
    pub kind: TripKind,
}

impl From<&FareQuote> for LegPassenger {
    fn from(quote: &FareQuote) -> Self {
        Self {
            passenger_name: quote.passenger_name.clone(),
            fare: quote.fare,
        }
    }
}

/// Resultado de registrar un leg
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegReceipt {
    pub driver_name: String,
    pub direction: Direction,
    pub day: NaiveDate,
    pub passengers: Vec<FareQuote>,
}

impl LegReceipt {
    pub fn total(&self) -> i64 {
        self.passengers.iter().map(|p| p.fare).sum()
    }
}
