//! Clients - HTTP Clients for External APIs
//!
//! This module contains the Telegram Bot API client used by the polling
//! worker and for sending replies.

pub mod telegram_client;

pub use telegram_client::{next_offset, TelegramClient, LONG_POLL_TIMEOUT_SECS};
