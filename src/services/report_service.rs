//! Servicio de reportes diarios
//!
//! El reporte se calcula en cada lectura a partir de la pertenencia de los
//! pasajeros a los legs del día; las tarifas guardadas en cada leg son solo
//! informativas. Un pasajero con ida y vuelta el mismo día suma siempre
//! `ROUND_TRIP_FARE` en todo el tenant, aunque cada trayecto lo haya hecho un
//! driver distinto.

use chrono::NaiveDate;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

use super::fare_service::{ONE_WAY_FARE, ROUND_TRIP_FARE, ROUND_TRIP_SECOND_LEG_FARE};
use crate::models::{DailyReport, Direction, DriverReport, ReportLine, TripKind};
use crate::repositories::TripStore;
use crate::utils::errors::LedgerResult;
use crate::utils::format::{format_day, format_rupiah};

/// Pasajeros de un driver en cada dirección, en orden de registro
struct DriverLegs {
    driver_name: String,
    departures: Vec<String>,
    returns: Vec<String>,
}

#[derive(Clone)]
pub struct ReportService {
    store: Arc<dyn TripStore>,
}

impl ReportService {
    pub fn new(store: Arc<dyn TripStore>) -> Self {
        Self { store }
    }

    pub async fn build_report(&self, tenant_id: i64, day: NaiveDate) -> LedgerResult<DailyReport> {
        let drivers = self.store.list_drivers_with_legs_on_day(tenant_id, day).await?;

        let mut legs = Vec::with_capacity(drivers.len());
        for driver in drivers {
            let departures = self
                .store
                .list_leg_passengers(tenant_id, driver.id, Direction::Departure, day)
                .await?;
            let returns = self
                .store
                .list_leg_passengers(tenant_id, driver.id, Direction::Return, day)
                .await?;
            legs.push(DriverLegs {
                driver_name: driver.name,
                departures: departures.into_iter().map(|p| p.passenger_name).collect(),
                returns: returns.into_iter().map(|p| p.passenger_name).collect(),
            });
        }

        let report = aggregate(tenant_id, day, &legs);
        debug!(
            "📊 Reporte {} del tenant {}: {} drivers, total {}",
            day,
            tenant_id,
            report.drivers.len(),
            report.total
        );
        Ok(report)
    }
}

fn aggregate(tenant_id: i64, day: NaiveDate, legs: &[DriverLegs]) -> DailyReport {
    let mut drivers = Vec::with_capacity(legs.len());

    for (index, current) in legs.iter().enumerate() {
        let others = || legs.iter().enumerate().filter(move |(i, _)| *i != index).map(|(_, l)| l);
        let own_departures: HashSet<&str> = current.departures.iter().map(String::as_str).collect();
        let own_returns: HashSet<&str> = current.returns.iter().map(String::as_str).collect();

        let mut lines = Vec::new();

        for name in &current.departures {
            let (fare, kind) = if own_returns.contains(name.as_str()) {
                (ROUND_TRIP_FARE, TripKind::RoundTrip)
            } else if others().any(|l| l.returns.contains(name)) {
                (ONE_WAY_FARE, TripKind::RoundTrip)
            } else {
                (ONE_WAY_FARE, TripKind::OneWay)
            };
            lines.push(ReportLine {
                passenger_name: name.clone(),
                fare,
                kind,
                departure: true,
                return_leg: own_returns.contains(name.as_str()),
            });
        }

        for name in current.returns.iter().filter(|n| !own_departures.contains(n.as_str())) {
            let (fare, kind) = if others().any(|l| l.departures.contains(name)) {
                (ROUND_TRIP_SECOND_LEG_FARE, TripKind::RoundTrip)
            } else {
                (ONE_WAY_FARE, TripKind::OneWay)
            };
            lines.push(ReportLine {
                passenger_name: name.clone(),
                fare,
                kind,
                departure: false,
                return_leg: true,
            });
        }

        let total = lines.iter().map(|l| l.fare).sum();
        drivers.push(DriverReport {
            driver_name: current.driver_name.clone(),
            passengers: lines,
            total,
        });
    }

    let total = drivers.iter().map(|d| d.total).sum();
    DailyReport {
        tenant_id,
        day,
        drivers,
        total,
    }
}

/// Reporte en texto para el chat
pub fn render_report(report: &DailyReport) -> String {
    let mut text = format!("📊 Daily Report {}\n================\n\n", format_day(report.day));

    if report.is_empty() {
        text.push_str("No trips recorded for this day.\n\n");
    }

    for driver in &report.drivers {
        text.push_str(&format!("🚗 Driver: {}\nPassengers:\n", driver.driver_name));
        for line in &driver.passengers {
            text.push_str(&format!(
                "- {} ({} - {})\n",
                line.passenger_name,
                format_rupiah(line.fare),
                line.kind
            ));
        }
        text.push_str(&format!("💰 Driver total: {}\n\n", format_rupiah(driver.total)));
    }

    text.push_str(&format!("💰 Total income: {}", format_rupiah(report.total)));
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::create_memory_pool;
    use crate::models::LegPassenger;
    use crate::repositories::SqliteTripRepository;
    use crate::utils::format::{split_message, MESSAGE_CHUNK_LIMIT};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 12, 5).unwrap()
    }

    fn legs(driver: &str, departures: &[&str], returns: &[&str]) -> DriverLegs {
        DriverLegs {
            driver_name: driver.to_string(),
            departures: departures.iter().map(|s| s.to_string()).collect(),
            returns: returns.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_same_driver_round_trip() {
        let report = aggregate(1, day(), &[legs("Ahmad", &["Ali", "Umar"], &["Ali"])]);

        let ali = report.line("Ahmad", "Ali").unwrap();
        assert_eq!((ali.fare, ali.kind), (15_000, TripKind::RoundTrip));
        assert!(ali.departure && ali.return_leg);

        let umar = report.line("Ahmad", "Umar").unwrap();
        assert_eq!((umar.fare, umar.kind), (10_000, TripKind::OneWay));

        assert_eq!(report.drivers[0].total, 25_000);
        assert_eq!(report.total, 25_000);
    }

    #[test]
    fn test_cross_driver_round_trip_is_split() {
        let report = aggregate(
            1,
            day(),
            &[legs("Ahmad", &["Ali"], &[]), legs("Budi", &[], &["Ali", "Hasan"])],
        );

        let outbound = report.line("Ahmad", "Ali").unwrap();
        assert_eq!((outbound.fare, outbound.kind), (10_000, TripKind::RoundTrip));

        let inbound = report.line("Budi", "Ali").unwrap();
        assert_eq!((inbound.fare, inbound.kind), (5_000, TripKind::RoundTrip));

        let hasan = report.line("Budi", "Hasan").unwrap();
        assert_eq!((hasan.fare, hasan.kind), (10_000, TripKind::OneWay));

        assert_eq!(report.total, 25_000);
    }

    #[test]
    fn test_return_only_is_one_way() {
        let report = aggregate(1, day(), &[legs("Ahmad", &[], &["Ali"])]);
        let ali = report.line("Ahmad", "Ali").unwrap();
        assert_eq!((ali.fare, ali.kind), (10_000, TripKind::OneWay));
        assert!(!ali.departure);
    }

    #[tokio::test]
    async fn test_build_report_reads_store() {
        let pool = create_memory_pool().await.unwrap();
        let store: Arc<dyn TripStore> = Arc::new(SqliteTripRepository::new(pool));
        let ahmad = store.save_driver(1, "Ahmad").await.unwrap();
        let member = |name: &str| LegPassenger { passenger_name: name.into(), fare: 10_000 };

        store
            .save_leg(1, ahmad.id, Direction::Departure, day(), &[member("Ali"), member("Umar")])
            .await
            .unwrap();
        // la tarifa guardada no influye en el reporte
        store
            .save_leg(1, ahmad.id, Direction::Return, day(), &[member("Ali")])
            .await
            .unwrap();

        let service = ReportService::new(store);
        let report = service.build_report(1, day()).await.unwrap();
        assert_eq!(report.total, 25_000);

        let text = render_report(&report);
        assert!(text.contains("- Ali (Rp 15.000 - round-trip)"));
        assert!(text.contains("- Umar (Rp 10.000 - one-way)"));
        assert!(text.ends_with("Total income: Rp 25.000"));

        let empty = service.build_report(1, day().succ_opt().unwrap()).await.unwrap();
        assert!(empty.is_empty());
        assert!(render_report(&empty).contains("No trips recorded"));
    }

    #[test]
    fn test_long_report_splits_at_newlines() {
        let passengers: Vec<String> = (0..400).map(|i| format!("Passenger number {}", i)).collect();
        let names: Vec<&str> = passengers.iter().map(String::as_str).collect();
        let report = aggregate(1, day(), &[legs("Ahmad", &names, &[])]);
        let text = render_report(&report);
        assert!(text.chars().count() > MESSAGE_CHUNK_LIMIT);

        let chunks = split_message(&text, MESSAGE_CHUNK_LIMIT);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.chars().count() <= MESSAGE_CHUNK_LIMIT));
        assert_eq!(chunks.join("\n"), text);
    }
}
