//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum y al worker de polling.

use std::sync::Arc;

use crate::cache::SessionStore;
use crate::clients::TelegramClient;
use crate::config::environment::EnvironmentConfig;
use crate::controllers::MessageController;
use crate::polling::UpdateDispatcher;
use crate::repositories::TripStore;
use crate::utils::clock::Clock;

#[derive(Clone)]
pub struct AppState {
    pub config: EnvironmentConfig,
    pub controller: MessageController,
    /// Colas por chat; solo existe si hay cliente de Telegram
    pub dispatcher: Option<UpdateDispatcher>,
    pub storage_label: &'static str,
    pub sessions_label: &'static str,
}

impl AppState {
    pub fn new(
        config: EnvironmentConfig,
        store: Arc<dyn TripStore>,
        sessions: Arc<dyn SessionStore>,
        clock: Arc<dyn Clock>,
        telegram: Option<TelegramClient>,
        storage_label: &'static str,
        sessions_label: &'static str,
    ) -> Self {
        let controller = MessageController::new(store, sessions, clock, config.admin_id);
        let dispatcher = telegram.map(|client| UpdateDispatcher::new(controller.clone(), Arc::new(client)));
        Self {
            config,
            controller,
            dispatcher,
            storage_label,
            sessions_label,
        }
    }
}
