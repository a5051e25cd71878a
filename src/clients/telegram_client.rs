//! Cliente HTTP para la Bot API de Telegram
//!
//! Solo usa dos métodos: `getUpdates` (long polling) y `sendMessage`.

use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::dto::{ApiResponse, GetUpdatesRequest, SendMessageRequest, Update};

/// Segundos que Telegram mantiene abierta cada petición de getUpdates
pub const LONG_POLL_TIMEOUT_SECS: u64 = 60;

#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    base_url: String,
}

impl TelegramClient {
    pub fn new(api_base: &str, token: &str) -> Result<Self> {
        let client = Client::builder()
            // margen sobre el long polling
            .timeout(Duration::from_secs(LONG_POLL_TIMEOUT_SECS + 15))
            .build()?;

        Ok(Self {
            client,
            base_url: format!("{}/bot{}", api_base.trim_end_matches('/'), token),
        })
    }

    async fn call<B: Serialize, T: DeserializeOwned>(&self, method: &str, body: &B) -> Result<T> {
        let response = self
            .client
            .post(format!("{}/{}", self.base_url, method))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let payload: ApiResponse<T> = response.json().await?;
        if !payload.ok {
            return Err(anyhow!(
                "Telegram {} falló ({}): {}",
                method,
                status,
                payload.description.unwrap_or_default()
            ));
        }

        payload
            .result
            .ok_or_else(|| anyhow!("Telegram {} respondió sin result", method))
    }

    /// Espera hasta `LONG_POLL_TIMEOUT_SECS` por updates posteriores a `offset`
    pub async fn get_updates(&self, offset: Option<i64>) -> Result<Vec<Update>> {
        let request = GetUpdatesRequest {
            offset,
            timeout: LONG_POLL_TIMEOUT_SECS,
            allowed_updates: vec!["message".to_string()],
        };
        let updates: Vec<Update> = self.call("getUpdates", &request).await?;
        if !updates.is_empty() {
            debug!("📨 {} updates recibidos", updates.len());
        }
        Ok(updates)
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        let request = SendMessageRequest { chat_id, text };
        let _: serde_json::Value = self.call("sendMessage", &request).await.map_err(|e| {
            warn!("⚠️ No se pudo enviar mensaje a {}: {}", chat_id, e);
            e
        })?;
        Ok(())
    }
}

/// Offset siguiente para confirmar los updates ya procesados
pub fn next_offset(current: Option<i64>, updates: &[Update]) -> Option<i64> {
    updates
        .iter()
        .map(|u| u.update_id + 1)
        .max()
        .max(current)
}
