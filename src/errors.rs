//! errors.rs
//! Errores de dominio que los handlers necesitan distinguir.
//! El resto de la app trabaja con `anyhow::Result`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CallAgentError {
    /// Credenciales ausentes; se detecta en el primer uso, nunca al arrancar.
    #[error("Missing credentials: {0}")]
    MissingCredentials(&'static str),

    #[error("{service} returned HTTP {status}: {body}")]
    Upstream {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("No call id returned from {0}")]
    MissingCallId(&'static str),

    #[error("{0} not found")]
    NotFound(String),
}
