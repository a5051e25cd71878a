//! Utilidades de presentación
//!
//! Formato de montos en rupias, fechas y partición de mensajes largos
//! según el límite de tamaño del transporte de chat.

use chrono::NaiveDate;

/// Límite de caracteres por mensaje del transporte (Telegram)
pub const MESSAGE_CHUNK_LIMIT: usize = 4096;

/// Formato de fecha visible para el usuario
pub const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";

/// Formato ISO usado internamente y en la API HTTP
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Separa miles con punto: 15000 -> "15.000"
pub fn format_thousands(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut result = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push('.');
        }
        result.push(ch);
    }

    if amount < 0 {
        format!("-{}", result)
    } else {
        result
    }
}

/// "Rp 15.000"
pub fn format_rupiah(amount: i64) -> String {
    format!("Rp {}", format_thousands(amount))
}

pub fn format_day(day: NaiveDate) -> String {
    day.format(DISPLAY_DATE_FORMAT).to_string()
}

/// Acepta DD/MM/YYYY y DD-MM-YYYY (ambos aparecen en los comandos de chat)
pub fn parse_display_day(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%d/%m/%Y")
        .or_else(|_| NaiveDate::parse_from_str(value, "%d-%m-%Y"))
        .ok()
}

/// Divide un texto en fragmentos de como máximo `limit` caracteres.
///
/// El corte se hace en el último salto de línea que quede en o antes del
/// límite y ese salto se elimina, de modo que `chunks.join("\n")` reconstruye
/// el texto original. Si no hay salto de línea disponible se corta en seco
/// en el límite sin perder caracteres.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut chunks = Vec::new();
    let mut rest = text;

    loop {
        // byte offset del carácter número `limit` (None si el resto cabe)
        let Some((limit_byte, _)) = rest.char_indices().nth(limit) else {
            chunks.push(rest.to_string());
            break;
        };

        // el salto puede estar justo en la posición `limit`
        let window_end = limit_byte + rest[limit_byte..].chars().next().map_or(0, char::len_utf8);
        match rest[..window_end].rfind('\n') {
            Some(newline) => {
                chunks.push(rest[..newline].to_string());
                rest = &rest[newline + 1..];
            }
            None => {
                chunks.push(rest[..limit_byte].to_string());
                rest = &rest[limit_byte..];
            }
        }
    }

    chunks
}
