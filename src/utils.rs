//! utils.rs

use chrono::{SecondsFormat, Utc};

/// Normaliza un teléfono a formato E.164 quitando espacios y separadores.
pub fn normalize_phone(phone: &str) -> String {
    phone
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '.'))
        .collect()
}

/// Timestamp UTC en ISO-8601 con sufijo Z.
pub fn utc_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}
