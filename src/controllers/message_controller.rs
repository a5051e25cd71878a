//! Controlador de mensajes del chat
//!
//! Recibe el texto de un mensaje y devuelve las respuestas a enviar (vacío si
//! el mensaje se ignora). Todo fallo se degrada a texto: los errores del
//! usuario se explican y los de almacenamiento se registran y se responden
//! con un mensaje genérico.

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::cache::{PendingPrompt, SessionStore};
use crate::models::Direction;
use crate::repositories::TripStore;
use crate::services::directory_service::{render_drivers, render_passengers};
use crate::services::leg_recorder::render_receipt;
use crate::services::report_service::render_report;
use crate::services::trip_parser::{is_trip_message, parse_trip_message};
use crate::services::{DirectoryService, LegRecorder, ReportService, ONE_WAY_FARE, ROUND_TRIP_FARE};
use crate::utils::clock::Clock;
use crate::utils::errors::{LedgerError, LedgerResult};
use crate::utils::format::{format_day, format_rupiah, parse_display_day, split_message, MESSAGE_CHUNK_LIMIT};

const HELP_TEXT: &str = "🚐 Shuttle ledger bot

Trips:
/gas - trip message format
/laporan [DD/MM/YYYY] - daily report (alias /report)
/delete <antar|jemput> [DD/MM/YYYY] - delete a day's trips

Drivers:
/driver - register a driver
/add_driver <name> - register a driver directly
/drivers - list drivers
/activate_driver <name>, /deactivate_driver <name>

Passengers:
/santri - register a passenger (alias /passenger)
/daftarsantri - list passengers (alias /passengers)

/ping - check the bot is alive";

fn trip_format_text() -> String {
    format!(
        "📝 Trip message format:

antar
Driver: <driver name>
date: DD/MM/YYYY   (optional, defaults to today)
1. <passenger>
2. <passenger>

Use 'jemput' instead of 'antar' for the return trip.

💰 Fares: one-way {}, round-trip {}",
        format_rupiah(ONE_WAY_FARE),
        format_rupiah(ROUND_TRIP_FARE)
    )
}

/// Comando con `/`, sin el sufijo `@bot`, y el resto del texto
fn split_command(text: &str) -> Option<(&str, &str)> {
    let text = text.trim();
    if !text.starts_with('/') {
        return None;
    }
    let (head, args) = match text.find(char::is_whitespace) {
        Some(i) => (&text[..i], text[i..].trim()),
        None => (text, ""),
    };
    let command = head.split('@').next().unwrap_or(head);
    Some((command, args))
}

#[derive(Clone)]
pub struct MessageController {
    directory: DirectoryService,
    recorder: LegRecorder,
    reports: ReportService,
    sessions: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    admin_id: Option<i64>,
}

impl MessageController {
    pub fn new(
        store: Arc<dyn TripStore>,
        sessions: Arc<dyn SessionStore>,
        clock: Arc<dyn Clock>,
        admin_id: Option<i64>,
    ) -> Self {
        Self {
            directory: DirectoryService::new(store.clone()),
            recorder: LegRecorder::new(store.clone()),
            reports: ReportService::new(store),
            sessions,
            clock,
            admin_id,
        }
    }

    pub fn reports(&self) -> &ReportService {
        &self.reports
    }

    /// Procesa un mensaje del chat `tenant_id` enviado por `sender_id`
    pub async fn handle(&self, tenant_id: i64, sender_id: Option<i64>, text: &str) -> Vec<String> {
        let span = info_span!("message", request_id = %Uuid::new_v4(), tenant_id);

        async move {
            let reply = match self.dispatch(tenant_id, sender_id, text).await {
                Ok(reply) => reply,
                Err(e) => {
                    if e.is_user_error() {
                        debug!("🙅 Mensaje rechazado: {}", e);
                    }
                    Some(e.user_message())
                }
            };

            reply
                .map(|text| split_message(&text, MESSAGE_CHUNK_LIMIT))
                .unwrap_or_default()
        }
        .instrument(span)
        .await
    }

    async fn dispatch(&self, tenant_id: i64, sender_id: Option<i64>, text: &str) -> LedgerResult<Option<String>> {
        if let Some((command, args)) = split_command(text) {
            // cualquier comando cancela el prompt pendiente
            self.cancel_prompt(tenant_id).await?;
            return self.command(tenant_id, sender_id, command, args).await;
        }

        if is_trip_message(text) {
            self.cancel_prompt(tenant_id).await?;
            let trip = parse_trip_message(text, self.clock.today())?;
            let receipt = self.recorder.record(tenant_id, &trip).await?;
            return Ok(Some(render_receipt(&receipt)));
        }

        let pending = match self.sessions.take_pending(tenant_id).await {
            Ok(pending) => pending,
            Err(e) => {
                warn!("⚠️ No se pudo leer la sesión de {}: {}", tenant_id, e);
                None
            }
        };

        match pending {
            Some(PendingPrompt::DriverName) => self.add_driver(tenant_id, text).await.map(Some),
            Some(PendingPrompt::PassengerName) => self.add_passenger(tenant_id, text).await.map(Some),
            None => Ok(None),
        }
    }

    async fn command(
        &self,
        tenant_id: i64,
        sender_id: Option<i64>,
        command: &str,
        args: &str,
    ) -> LedgerResult<Option<String>> {
        info!("⌨️ Comando {}", command);

        let reply = match command {
            "/ping" => "pong".to_string(),
            "/start" | "/help" => HELP_TEXT.to_string(),
            "/gas" | "/antar" | "/jemput" => trip_format_text(),
            "/driver" => {
                self.prompt(tenant_id, PendingPrompt::DriverName).await;
                "👤 Send the new driver's name.".to_string()
            }
            "/add_driver" => self.add_driver(tenant_id, args).await?,
            "/drivers" => render_drivers(&self.directory.list_drivers(tenant_id).await?),
            "/activate_driver" | "/deactivate_driver" => {
                let active = command == "/activate_driver";
                self.directory.set_driver_active(tenant_id, args, active).await?;
                format!(
                    "✅ Driver '{}' is now {}.",
                    args.trim(),
                    if active { "active" } else { "inactive" }
                )
            }
            "/santri" | "/passenger" => {
                self.prompt(tenant_id, PendingPrompt::PassengerName).await;
                "🧒 Send the new passenger's name.".to_string()
            }
            "/daftarsantri" | "/passengers" => render_passengers(&self.directory.list_passengers(tenant_id).await?),
            "/laporan" | "/report" => {
                let day = self.day_argument(args)?;
                render_report(&self.reports.build_report(tenant_id, day).await?)
            }
            "/delete" => self.delete(tenant_id, sender_id, args).await?,
            _ => {
                debug!("🤷 Comando desconocido ignorado: {}", command);
                return Ok(None);
            }
        };

        Ok(Some(reply))
    }

    /// Borra el prompt pendiente; un fallo se propaga como error de sesión
    async fn cancel_prompt(&self, tenant_id: i64) -> LedgerResult<()> {
        self.sessions
            .clear(tenant_id)
            .await
            .map_err(|e| LedgerError::Session(e.to_string()))
    }

    async fn prompt(&self, tenant_id: i64, prompt: PendingPrompt) {
        if let Err(e) = self.sessions.set_pending(tenant_id, prompt).await {
            warn!("⚠️ No se pudo guardar la sesión de {}: {}", tenant_id, e);
        }
    }

    async fn add_driver(&self, tenant_id: i64, name: &str) -> LedgerResult<String> {
        let driver = self.directory.register_driver(tenant_id, name).await?;
        Ok(format!("✅ Driver '{}' registered.", driver.name))
    }

    async fn add_passenger(&self, tenant_id: i64, name: &str) -> LedgerResult<String> {
        let name = name.trim();
        Ok(match self.directory.register_passenger(tenant_id, name).await? {
            Some(passenger) => format!("✅ Passenger '{}' registered.", passenger.name),
            None => format!("ℹ️ Passenger '{}' is already registered.", name),
        })
    }

    fn day_argument(&self, args: &str) -> LedgerResult<NaiveDate> {
        match args.split_whitespace().next() {
            Some(value) => parse_display_day(value).ok_or_else(|| LedgerError::InvalidDate(value.to_string())),
            None => Ok(self.clock.today()),
        }
    }

    async fn delete(&self, tenant_id: i64, sender_id: Option<i64>, args: &str) -> LedgerResult<String> {
        if let Some(admin) = self.admin_id {
            if sender_id != Some(admin) && tenant_id != admin {
                warn!("⛔ /delete rechazado para {:?}", sender_id);
                return Ok("⛔ Only the admin can delete trips.".to_string());
            }
        }

        let mut parts = args.split_whitespace();
        let direction = parts
            .next()
            .and_then(Direction::from_keyword)
            .ok_or_else(|| LedgerError::InvalidFormat("use /delete <antar|jemput> [DD/MM/YYYY]".to_string()))?;
        let day = self.day_argument(parts.collect::<Vec<_>>().join(" ").as_str())?;

        let removed = self.recorder.delete(tenant_id, direction, day).await?;
        Ok(format!(
            "✅ Deleted {} {} trip(s) for {}.",
            removed,
            direction,
            format_day(day)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemorySessionStore;
    use crate::database::create_memory_pool;
    use crate::repositories::SqliteTripRepository;
    use crate::utils::clock::FixedClock;
    use std::time::Duration;

    const CHAT: i64 = -1001;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 12, 5).unwrap()
    }

    async fn controller(admin_id: Option<i64>) -> MessageController {
        let pool = create_memory_pool().await.unwrap();
        MessageController::new(
            Arc::new(SqliteTripRepository::new(pool)),
            Arc::new(MemorySessionStore::new(Duration::from_secs(60))),
            Arc::new(FixedClock::on(today())),
            admin_id,
        )
    }

    async fn say(controller: &MessageController, text: &str) -> String {
        controller.handle(CHAT, Some(42), text).await.join("\n")
    }

    /// Sesiones que guardan prompts pero no pueden borrarlos
    struct StuckSessions(MemorySessionStore);

    #[async_trait::async_trait]
    impl SessionStore for StuckSessions {
        async fn set_pending(&self, tenant_id: i64, prompt: PendingPrompt) -> anyhow::Result<()> {
            self.0.set_pending(tenant_id, prompt).await
        }

        async fn take_pending(&self, tenant_id: i64) -> anyhow::Result<Option<PendingPrompt>> {
            self.0.take_pending(tenant_id).await
        }

        async fn clear(&self, _tenant_id: i64) -> anyhow::Result<()> {
            Err(anyhow::anyhow!("Error de Redis: connection refused"))
        }
    }

    #[test]
    fn test_split_command() {
        assert_eq!(split_command("/ping"), Some(("/ping", "")));
        assert_eq!(split_command("/report@angkot_bot 05-12-2024"), Some(("/report", "05-12-2024")));
        assert_eq!(split_command("  /add_driver   Pak Ahmad "), Some(("/add_driver", "Pak Ahmad")));
        assert_eq!(split_command("antar"), None);
    }

    #[tokio::test]
    async fn test_ping_and_unknown_text() {
        let controller = controller(None).await;
        assert_eq!(controller.handle(CHAT, None, "/ping").await, vec!["pong"]);
        assert!(controller.handle(CHAT, None, "hello there").await.is_empty());
        assert!(controller.handle(CHAT, None, "/unknown").await.is_empty());
    }

    #[tokio::test]
    async fn test_driver_prompt_then_trip_and_report() {
        let controller = controller(None).await;

        assert!(say(&controller, "/driver").await.contains("driver's name"));
        assert!(say(&controller, "Ahmad").await.contains("Driver 'Ahmad' registered"));
        // el prompt ya se consumió
        assert_eq!(say(&controller, "Budi").await, "");

        let receipt = say(&controller, "antar\nDriver: Ahmad\n1. Ali\n2. Umar").await;
        assert!(receipt.contains("- Ali (Rp 10.000 - one-way)"));

        let receipt = say(&controller, "jemput\nDriver: Ahmad\n1. Ali").await;
        assert!(receipt.contains("- Ali (Rp 5.000 - round-trip)"));

        let report = say(&controller, "/laporan").await;
        assert!(report.contains("- Ali (Rp 15.000 - round-trip)"));
        assert!(report.contains("- Umar (Rp 10.000 - one-way)"));
        assert!(report.contains("Total income: Rp 25.000"));

        let same = say(&controller, "/report 05/12/2024").await;
        assert_eq!(same, report);
    }

    #[tokio::test]
    async fn test_command_cancels_prompt() {
        let controller = controller(None).await;

        say(&controller, "/santri").await;
        say(&controller, "/ping").await;
        assert_eq!(say(&controller, "Ali").await, "");
        assert!(say(&controller, "/passengers").await.contains("No passengers"));
    }

    #[tokio::test]
    async fn test_failed_prompt_cancel_is_reported() {
        let pool = create_memory_pool().await.unwrap();
        let store = Arc::new(SqliteTripRepository::new(pool));
        let controller = MessageController::new(
            store.clone(),
            Arc::new(StuckSessions(MemorySessionStore::new(Duration::from_secs(60)))),
            Arc::new(FixedClock::on(today())),
            None,
        );
        store.save_driver(CHAT, "Ahmad").await.unwrap();

        assert!(say(&controller, "/driver").await.contains("conversation state could not be updated"));
        assert!(say(&controller, "antar\nDriver: Ahmad\n1. Ali").await.contains("Please try again"));
        assert!(store.list_drivers_with_legs_on_day(CHAT, today()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_user_errors_are_explained() {
        let controller = controller(None).await;

        assert!(say(&controller, "antar\nDriver: Ghost\n1. Ali").await.contains("Driver 'Ghost' not found"));
        assert!(say(&controller, "antar\nDriver: Ghost").await.contains("No valid passengers"));
        assert!(say(&controller, "/report 2024-12-05").await.contains("Invalid date"));
        assert!(say(&controller, "/delete besok").await.contains("Invalid format"));

        say(&controller, "/add_driver Ahmad").await;
        assert!(say(&controller, "/add_driver Ahmad").await.contains("already registered"));
        assert!(say(&controller, "/deactivate_driver Ahmad").await.contains("inactive"));
        assert!(say(&controller, "antar\nDriver: Ahmad\n1. Ali").await.contains("not found or inactive"));
    }

    #[tokio::test]
    async fn test_delete_is_restricted_to_admin() {
        let controller = controller(Some(7)).await;
        say(&controller, "/add_driver Ahmad").await;
        say(&controller, "antar\nDriver: Ahmad\n1. Ali").await;

        assert!(say(&controller, "/delete antar").await.contains("Only the admin"));

        let replies = controller.handle(CHAT, Some(7), "/delete antar 05/12/2024").await;
        assert_eq!(replies, vec!["✅ Deleted 1 departure (antar) trip(s) for 05/12/2024."]);
        assert!(say(&controller, "/laporan").await.contains("No trips recorded"));
    }
}
