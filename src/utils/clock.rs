//! Reloj del tenant
//!
//! Todas las operaciones por día usan la fecha calendario local del tenant,
//! no rangos de timestamps. El reloj es inyectable para poder fijar "hoy"
//! en los tests.

use chrono::{FixedOffset, NaiveDate, Offset, Utc};

pub trait Clock: Send + Sync {
    /// Fecha calendario local del tenant
    fn today(&self) -> NaiveDate;
}

/// Reloj del sistema con un desfase fijo respecto a UTC (WIB = UTC+7)
#[derive(Debug, Clone)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    /// Construye el reloj a partir de horas; valores fuera de rango caen a UTC
    pub fn from_hours(hours: i32) -> Self {
        let offset = hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix());
        Self { offset }
    }
}

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.offset).date_naive()
    }
}

/// Reloj fijo para tests
#[derive(Debug, Clone)]
pub struct FixedClock {
    today: NaiveDate,
}

impl FixedClock {
    pub fn on(today: NaiveDate) -> Self {
        Self { today }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.today
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_reports_given_day() {
        let day = NaiveDate::from_ymd_opt(2024, 12, 5).unwrap();
        let clock = FixedClock::on(day);
        assert_eq!(clock.today(), day);
    }

    #[test]
    fn test_system_clock_out_of_range_offset_falls_back_to_utc() {
        assert_eq!(SystemClock::from_hours(99).offset, Utc.fix());
        // horas * 3600 no cabe en i32
        assert_eq!(SystemClock::from_hours(1_000_000).offset, Utc.fix());
        assert_eq!(SystemClock::from_hours(i32::MIN).offset, Utc.fix());
        assert_eq!(SystemClock::from_hours(7).offset.local_minus_utc(), 7 * 3600);
    }
}
