//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno: transporte de Telegram,
//! backend de almacenamiento, sesiones de diálogo y zona horaria del tenant.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Cómo recibe el bot los mensajes de Telegram
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelegramMode {
    Polling,
    Webhook,
    Disabled,
}

impl FromStr for TelegramMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "polling" => Ok(TelegramMode::Polling),
            "webhook" => Ok(TelegramMode::Webhook),
            "disabled" | "off" => Ok(TelegramMode::Disabled),
            _ => Err(()),
        }
    }
}

/// Implementación del TripStore a usar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Sqlite,
    File,
}

impl FromStr for StorageBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" | "sql" => Ok(StorageBackend::Sqlite),
            "file" | "json" => Ok(StorageBackend::File),
            _ => Err(()),
        }
    }
}

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub host: String,
    pub port: u16,
    pub log_level: tracing::Level,
    pub telegram_token: Option<String>,
    pub telegram_api_base: String,
    pub telegram_mode: TelegramMode,
    pub telegram_webhook_secret: Option<String>,
    /// Bearer token de la API de reportes; sin él la API queda deshabilitada
    pub api_token: Option<String>,
    pub storage_backend: StorageBackend,
    pub database_url: String,
    pub data_dir: PathBuf,
    pub redis_url: Option<String>,
    pub session_ttl_secs: u64,
    pub tenant_utc_offset_hours: i32,
    pub admin_id: Option<i64>,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: tracing::Level::INFO,
            telegram_token: None,
            telegram_api_base: "https://api.telegram.org".to_string(),
            telegram_mode: TelegramMode::Disabled,
            telegram_webhook_secret: None,
            api_token: None,
            storage_backend: StorageBackend::Sqlite,
            database_url: "sqlite://data/angkot.db".to_string(),
            data_dir: PathBuf::from("data"),
            redis_url: None,
            session_ttl_secs: 600,
            tenant_utc_offset_hours: 7,
            admin_id: None,
        }
    }
}

fn optional(name: &'static str) -> Option<String> {
    env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parsed<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match optional(name) {
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

impl EnvironmentConfig {
    /// Lee la configuración del entorno (tras `dotenvy::dotenv()`)
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let telegram_token = optional("TELEGRAM_TOKEN");
        let default_mode = if telegram_token.is_some() {
            TelegramMode::Polling
        } else {
            TelegramMode::Disabled
        };
        let telegram_mode = parsed("TELEGRAM_MODE", default_mode)?;
        if telegram_mode != TelegramMode::Disabled && telegram_token.is_none() {
            return Err(ConfigError::Missing("TELEGRAM_TOKEN"));
        }

        Ok(Self {
            environment: optional("ENVIRONMENT").unwrap_or(defaults.environment),
            host: optional("HOST").unwrap_or(defaults.host),
            port: parsed("PORT", defaults.port)?,
            log_level: parsed("LOG_LEVEL", defaults.log_level)?,
            telegram_token,
            telegram_api_base: optional("TELEGRAM_API_BASE").unwrap_or(defaults.telegram_api_base),
            telegram_mode,
            telegram_webhook_secret: optional("TELEGRAM_WEBHOOK_SECRET"),
            api_token: optional("API_TOKEN"),
            storage_backend: parsed("STORAGE_BACKEND", defaults.storage_backend)?,
            database_url: optional("DATABASE_URL").unwrap_or(defaults.database_url),
            data_dir: optional("DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir),
            redis_url: optional("REDIS_URL"),
            session_ttl_secs: parsed("SESSION_TTL_SECS", defaults.session_ttl_secs)?,
            tenant_utc_offset_hours: parsed("TENANT_UTC_OFFSET_HOURS", defaults.tenant_utc_offset_hours)?,
            admin_id: match optional("ADMIN_ID") {
                Some(value) => Some(value.parse().map_err(|_| ConfigError::Invalid { name: "ADMIN_ID", value })?),
                None => None,
            },
        })
    }

    /// Obtener la URL del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
