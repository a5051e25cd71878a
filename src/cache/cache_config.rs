//! Configuración de cache
//!
//! Este módulo contiene la configuración del almacén de sesiones de diálogo
//! y el contrato genérico de operaciones de cache.

use anyhow::Result;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::config::EnvironmentConfig;

/// Configuración del cache
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub redis_url: Option<String>,
    pub key_prefix: String,
    pub default_ttl: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            key_prefix: "angkot".to_string(),
            default_ttl: 600, // 10 minutos
        }
    }
}

impl CacheConfig {
    pub fn from_environment(config: &EnvironmentConfig) -> Self {
        Self {
            redis_url: config.redis_url.clone(),
            default_ttl: config.session_ttl_secs,
            ..Self::default()
        }
    }
}

/// Operaciones de cache sobre valores serializados en JSON
#[async_trait::async_trait]
pub trait CacheOperations {
    async fn set<T: Serialize + Send + Sync>(&self, key: &str, value: &T, ttl: u64) -> Result<()>;

    /// Lee y elimina la clave en una sola operación
    async fn take<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>>;

    async fn delete(&self, key: &str) -> Result<()>;
}
