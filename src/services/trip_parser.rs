//! Parser de mensajes de viaje
//!
//! Formato esperado:
//!
//! ```text
//! antar
//! Driver: Pak Ahmad
//! date: 25/03/2024        (opcional)
//! 1. Ali
//! 2. Umar
//! ```
//!
//! Las dos primeras líneas se validan de forma estricta porque deciden a
//! quién y cuánto se cobra; las líneas de pasajeros son tolerantes y las que
//! no encajan con `<n>. <nombre>` se ignoran.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

use crate::models::{Direction, TripRecord};
use crate::utils::errors::{LedgerError, LedgerResult};

const DRIVER_PREFIX: &str = "driver:";
const DATE_PREFIX: &str = "date:";

lazy_static! {
    static ref PASSENGER_LINE: Regex = Regex::new(r"^\d+\.\s*(.+)$").expect("valid passenger regex");
}

/// Quita un prefijo sin distinguir mayúsculas
fn strip_prefix_ci<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let head = line.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&line[prefix.len()..])
    } else {
        None
    }
}

/// Indica si el texto empieza con una palabra clave de dirección
pub fn is_trip_message(text: &str) -> bool {
    text.lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .and_then(Direction::from_keyword)
        .is_some()
}

/// Interpreta un mensaje de viaje; `today` es el día local del tenant
pub fn parse_trip_message(text: &str, today: NaiveDate) -> LedgerResult<TripRecord> {
    let mut lines = text.lines().map(str::trim).skip_while(|l| l.is_empty());

    let header = lines
        .next()
        .ok_or_else(|| LedgerError::InvalidFormat("empty message".to_string()))?;
    let direction = Direction::from_keyword(header).ok_or_else(|| {
        LedgerError::InvalidFormat(format!(
            "unknown trip type '{}', use 'antar' or 'jemput'",
            header
        ))
    })?;

    let driver_line = lines
        .next()
        .ok_or_else(|| LedgerError::InvalidFormat("missing 'Driver: <name>' line".to_string()))?;
    let driver_name = strip_prefix_ci(driver_line, DRIVER_PREFIX)
        .map(str::trim)
        .ok_or_else(|| LedgerError::InvalidFormat("second line must be 'Driver: <name>'".to_string()))?;
    if driver_name.is_empty() {
        return Err(LedgerError::InvalidFormat("driver name is empty".to_string()));
    }

    let mut rest: Vec<&str> = lines.filter(|l| !l.is_empty()).collect();
    let day = match rest.first().and_then(|l| strip_prefix_ci(l, DATE_PREFIX)) {
        Some(value) => {
            let value = value.trim();
            let day = NaiveDate::parse_from_str(value, "%d/%m/%Y")
                .map_err(|_| LedgerError::InvalidDate(value.to_string()))?;
            rest.remove(0);
            day
        }
        None => today,
    };
    // `date:` solo vale justo después de la línea Driver
    if rest.iter().any(|l| strip_prefix_ci(l, DATE_PREFIX).is_some()) {
        return Err(LedgerError::InvalidFormat(
            "the 'date:' line must come right after the Driver line".to_string(),
        ));
    }

    let passengers: Vec<String> = rest
        .iter()
        .filter_map(|line| PASSENGER_LINE.captures(line))
        .filter_map(|caps| caps.get(1))
        .map(|name| name.as_str().trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();

    if passengers.is_empty() {
        return Err(LedgerError::NoPassengers);
    }

    Ok(TripRecord {
        direction,
        driver_name: driver_name.to_string(),
        day,
        passengers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 12, 5).unwrap()
    }

    #[test]
    fn test_parse_departure_defaults_to_today() {
        let record = parse_trip_message("antar\nDriver: Pak Ahmad\n1. Ali\n2. Umar", today()).unwrap();

        assert_eq!(record.direction, Direction::Departure);
        assert_eq!(record.driver_name, "Pak Ahmad");
        assert_eq!(record.day, today());
        assert_eq!(record.passengers, vec!["Ali", "Umar"]);
    }

    #[test]
    fn test_parse_is_case_insensitive_and_reads_date() {
        let text = "JEMPUT\ndriver:   Budi  \nDate: 25/03/2024\n1. Ali\n";
        let record = parse_trip_message(text, today()).unwrap();

        assert_eq!(record.direction, Direction::Return);
        assert_eq!(record.driver_name, "Budi");
        assert_eq!(record.day, NaiveDate::from_ymd_opt(2024, 3, 25).unwrap());
        assert_eq!(record.passengers, vec!["Ali"]);
    }

    #[test]
    fn test_english_keywords() {
        let record = parse_trip_message("return\nDriver: Budi\n1. Ali", today()).unwrap();
        assert_eq!(record.direction, Direction::Return);

        let record = parse_trip_message("Departure\nDriver: Budi\n1. Ali", today()).unwrap();
        assert_eq!(record.direction, Direction::Departure);
    }

    #[test]
    fn test_blank_lines_and_noise_are_skipped() {
        let text = "antar\r\nDriver: Ahmad\r\n\r\n1. Ali\r\n\r\n   \r\nnote: late\r\n- Hasan\r\n2.Umar\r\n10.  Zaid  \r\n";
        let record = parse_trip_message(text, today()).unwrap();
        assert_eq!(record.passengers, vec!["Ali", "Umar", "Zaid"]);
    }

    #[test]
    fn test_duplicates_are_preserved_in_order() {
        let record = parse_trip_message("antar\nDriver: Ahmad\n1. Ali\n2. Umar\n3. Ali", today()).unwrap();
        assert_eq!(record.passengers, vec!["Ali", "Umar", "Ali"]);
    }

    #[test]
    fn test_invalid_direction() {
        let err = parse_trip_message("keberangkatan\nDriver: Ahmad\n1. Ali", today()).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidFormat(_)));
    }

    #[test]
    fn test_missing_or_empty_driver() {
        let err = parse_trip_message("antar", today()).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidFormat(_)));

        let err = parse_trip_message("antar\nSopir: Ahmad\n1. Ali", today()).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidFormat(_)));

        let err = parse_trip_message("antar\nDriver:   \n1. Ali", today()).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidFormat(_)));
    }

    #[test]
    fn test_invalid_date() {
        let err = parse_trip_message("antar\nDriver: Ahmad\ndate: 2024-03-25\n1. Ali", today()).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidDate(ref v) if v == "2024-03-25"));

        let err = parse_trip_message("antar\nDriver: Ahmad\ndate: 31/02/2024\n1. Ali", today()).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidDate(_)));
    }

    #[test]
    fn test_date_after_blank_line_is_read() {
        let record = parse_trip_message("antar\nDriver: Ahmad\n\ndate: 01/12/2024\n1. Ali", today()).unwrap();
        assert_eq!(record.day, NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
        assert_eq!(record.passengers, vec!["Ali"]);
    }

    #[test]
    fn test_misplaced_date_is_rejected() {
        let err = parse_trip_message("antar\nDriver: Ahmad\n1. Ali\ndate: 01/12/2024", today()).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidFormat(_)));
    }

    #[test]
    fn test_no_passengers() {
        let err = parse_trip_message("antar\nDriver: Ahmad", today()).unwrap_err();
        assert!(matches!(err, LedgerError::NoPassengers));

        let err = parse_trip_message("antar\nDriver: Ahmad\n- Ali\n- Umar", today()).unwrap_err();
        assert!(matches!(err, LedgerError::NoPassengers));
    }

    #[test]
    fn test_is_trip_message() {
        assert!(is_trip_message("antar\nDriver: Ahmad"));
        assert!(is_trip_message("\n  Jemput\n"));
        assert!(!is_trip_message("antarkan saya"));
        assert!(!is_trip_message("/laporan"));
    }
}
