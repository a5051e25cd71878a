//! Cache
//!
//! Este módulo contiene el cliente Redis y el almacén de sesiones de diálogo
//! (prompts pendientes por chat).

pub mod cache_config;
pub mod redis_client;
pub mod session_cache;

pub use cache_config::{CacheConfig, CacheOperations};
pub use redis_client::RedisClient;
pub use session_cache::{MemorySessionStore, PendingPrompt, RedisSessionStore, SessionStore};
