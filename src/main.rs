use anyhow::Result;
use dotenvy::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};

use angkot_ledger::cache::{CacheConfig, MemorySessionStore, RedisClient, RedisSessionStore, SessionStore};
use angkot_ledger::clients::TelegramClient;
use angkot_ledger::config::database::DatabaseConfig;
use angkot_ledger::config::{EnvironmentConfig, StorageBackend, TelegramMode};
use angkot_ledger::database::create_pool;
use angkot_ledger::polling::run_polling;
use angkot_ledger::repositories::{FileTripRepository, SqliteTripRepository, TripStore};
use angkot_ledger::routes::create_router;
use angkot_ledger::state::AppState;
use angkot_ledger::utils::clock::SystemClock;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();
    let config = EnvironmentConfig::from_env()?;

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    info!("🚐 Angkot Ledger - tarifas y reportes de trayectos");
    info!("==================================================");
    info!("🌍 Entorno: {}", config.environment);

    // Inicializar almacenamiento
    let store: Arc<dyn TripStore> = match config.storage_backend {
        StorageBackend::Sqlite => {
            // la URL por defecto apunta dentro de DATA_DIR
            tokio::fs::create_dir_all(&config.data_dir).await?;
            let pool = create_pool(&DatabaseConfig::new(config.database_url.clone())).await?;
            Arc::new(SqliteTripRepository::new(pool))
        }
        StorageBackend::File => Arc::new(FileTripRepository::open(&config.data_dir).await?),
    };
    let storage_label = match config.storage_backend {
        StorageBackend::Sqlite => "sqlite",
        StorageBackend::File => "file",
    };

    // Sesiones: Redis si está configurado, si no en memoria
    let cache_config = CacheConfig::from_environment(&config);
    let redis = match &cache_config.redis_url {
        Some(url) => match RedisClient::new(url, cache_config.clone()).await {
            Ok(client) => Some(client),
            Err(e) => {
                warn!("⚠️ Redis no disponible ({}), usando sesiones en memoria", e);
                None
            }
        },
        None => None,
    };
    let (sessions, sessions_label): (Arc<dyn SessionStore>, &'static str) = match redis {
        Some(client) => (Arc::new(RedisSessionStore::new(client)), "redis"),
        None => (
            Arc::new(MemorySessionStore::new(Duration::from_secs(cache_config.default_ttl))),
            "memory",
        ),
    };

    let telegram = match &config.telegram_token {
        Some(token) => Some(TelegramClient::new(&config.telegram_api_base, token)?),
        None => None,
    };

    let clock = Arc::new(SystemClock::from_hours(config.tenant_utc_offset_hours));
    let app_state = AppState::new(
        config.clone(),
        store,
        sessions,
        clock,
        telegram.clone(),
        storage_label,
        sessions_label,
    );

    let polling_handle = match (config.telegram_mode, telegram, app_state.dispatcher.clone()) {
        (TelegramMode::Polling, Some(client), Some(dispatcher)) => Some(tokio::spawn(run_polling(dispatcher, client))),
        (TelegramMode::Webhook, _, _) => {
            info!("🪝 Modo webhook: POST /telegram/webhook");
            None
        }
        _ => {
            info!("🔕 Telegram deshabilitado");
            None
        }
    };

    let app = create_router(app_state);
    let addr: SocketAddr = config.server_url().parse()?;

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Estado del servicio");
    info!("   POST /telegram/webhook - Updates de Telegram");
    info!("   GET  /api/tenants/:tenant_id/reports/:date - Reporte diario (JSON)");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("❌ Error del servidor: {}", e);
    }

    if let Some(handle) = polling_handle {
        handle.abort();
    }

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo escuchar Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el handler de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
