//! Sistema de manejo de errores
//!
//! Este módulo define los errores del almacenamiento, los errores de dominio
//! del ledger y su conversión a respuestas HTTP apropiadas.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

/// Errores de la capa de persistencia (SQLite o archivo)
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Errores del dominio de tarifas y reportes
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("No valid passengers in the trip message")]
    NoPassengers,

    #[error("Driver '{0}' not found or inactive")]
    DriverNotFound(String),

    #[error("Driver '{0}' is already registered")]
    DriverAlreadyExists(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Session error: {0}")]
    Session(String),
}

impl LedgerError {
    /// Indica si el error lo puede corregir el usuario reenviando el mensaje
    pub fn is_user_error(&self) -> bool {
        !matches!(self, LedgerError::Storage(_) | LedgerError::Session(_))
    }

    /// Texto que se devuelve al chat.
    ///
    /// Los errores de almacenamiento se registran aquí y se degradan a un
    /// mensaje genérico; el resto se explica al usuario tal cual.
    pub fn user_message(&self) -> String {
        match self {
            LedgerError::InvalidFormat(msg) => {
                format!("❌ Invalid format: {}. Use /gas to see the expected format.", msg)
            }
            LedgerError::InvalidDate(value) => {
                format!("❌ Invalid date '{}'. Use the DD/MM/YYYY format.", value)
            }
            LedgerError::NoPassengers => {
                "❌ No valid passengers found. List them as '1. Name'.".to_string()
            }
            LedgerError::DriverNotFound(name) => {
                format!("❌ Driver '{}' not found or inactive.", name)
            }
            LedgerError::DriverAlreadyExists(name) => {
                format!("❌ Driver '{}' is already registered.", name)
            }
            LedgerError::Storage(e) => {
                error!("❌ Error de almacenamiento: {}", e);
                "❌ Sorry, something went wrong while accessing the data. Please try again.".to_string()
            }
            LedgerError::Session(e) => {
                error!("❌ Error de sesión: {}", e);
                "❌ Sorry, the conversation state could not be updated. Please try again.".to_string()
            }
        }
    }
}

/// Resultado tipado para operaciones del ledger
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Errores principales de la API HTTP
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Respuesta de error para la API
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match self {
            AppError::Ledger(LedgerError::Storage(e)) => {
                error!("Storage error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: "Storage Error".to_string(),
                        message: "An error occurred while accessing the ledger".to_string(),
                        code: Some("STORAGE_ERROR".to_string()),
                    },
                )
            }

            AppError::Ledger(LedgerError::Session(e)) => {
                error!("Session error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: "Session Error".to_string(),
                        message: "An error occurred while updating the conversation state".to_string(),
                        code: Some("SESSION_ERROR".to_string()),
                    },
                )
            }

            AppError::Ledger(LedgerError::DriverNotFound(name)) => (
                StatusCode::NOT_FOUND,
                ErrorResponse {
                    error: "Not Found".to_string(),
                    message: format!("Driver '{}' not found or inactive", name),
                    code: Some("DRIVER_NOT_FOUND".to_string()),
                },
            ),

            AppError::Ledger(LedgerError::DriverAlreadyExists(name)) => (
                StatusCode::CONFLICT,
                ErrorResponse {
                    error: "Conflict".to_string(),
                    message: format!("Driver '{}' already exists", name),
                    code: Some("CONFLICT".to_string()),
                },
            ),

            AppError::Ledger(e) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: "Bad Request".to_string(),
                    message: e.to_string(),
                    code: Some("INVALID_INPUT".to_string()),
                },
            ),

            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: "Bad Request".to_string(),
                    message: msg,
                    code: Some("BAD_REQUEST".to_string()),
                },
            ),

            AppError::Unauthorized(msg) => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse {
                    error: "Unauthorized".to_string(),
                    message: msg,
                    code: Some("UNAUTHORIZED".to_string()),
                },
            ),

            AppError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorResponse {
                    error: "Service Unavailable".to_string(),
                    message: msg,
                    code: Some("SERVICE_UNAVAILABLE".to_string()),
                },
            ),
        };

        (status, Json(error_response)).into_response()
    }
}

/// Resultado tipado para los handlers HTTP
pub type AppResult<T> = Result<T, AppError>;

/// Función helper para crear errores de solicitud incorrecta
pub fn bad_request_error(message: &str) -> AppError {
    AppError::BadRequest(message.to_string())
}
