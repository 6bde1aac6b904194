//! models/call_model.rs
//! Estructuras del ciclo de vida de una llamada saliente.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::classification_model::Outcome;
use crate::utils::normalize_phone;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
    TimedOut,
}

impl CallStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            CallStatus::Completed | CallStatus::Failed | CallStatus::TimedOut
        )
    }
}

/// Estado de una llamada mientras su monitor está vivo. Nunca se persiste.
#[derive(Debug, Clone, Serialize)]
pub struct CallSession {
    pub call_id: String,
    pub phone: String,
    pub requested_at: DateTime<Utc>,
    pub status: CallStatus,
    pub transcript: String,
    outcome: Option<Outcome>,
}

impl CallSession {
    pub fn new(call_id: String, phone: &str) -> Self {
        CallSession {
            call_id,
            phone: normalize_phone(phone),
            requested_at: Utc::now(),
            status: CallStatus::Pending,
            transcript: String::new(),
            outcome: None,
        }
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Sólo se acepta un resultado cuando la sesión ya es terminal.
    pub fn set_outcome(&mut self, outcome: Outcome) -> bool {
        if !self.status.is_terminal() {
            return false;
        }
        self.outcome = Some(outcome);
        true
    }
}

/// Datos del contacto tal como los manda el backend (camelCase).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactData {
    #[serde(rename = "userId", default)]
    pub user_id: Option<serde_json::Value>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallContext {
    #[serde(rename = "contactId", default = "default_id")]
    pub contact_id: serde_json::Value,
    #[serde(rename = "campaignId", default = "default_id")]
    pub campaign_id: serde_json::Value,
    #[serde(rename = "contactData", default)]
    pub contact_data: Option<ContactData>,
}

impl Default for CallContext {
    fn default() -> Self {
        CallContext {
            contact_id: default_id(),
            campaign_id: default_id(),
            contact_data: None,
        }
    }
}

fn default_id() -> serde_json::Value {
    serde_json::Value::from(0)
}

/// POST /api/call
#[derive(Debug, Clone, Deserialize)]
pub struct CallRequest {
    pub phone: String,
    pub name: String,
    pub company: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub context: Option<CallContext>,
}

/// Destino de una llamada, ya con el teléfono normalizado.
#[derive(Debug, Clone)]
pub struct CallTarget {
    pub phone: String,
    pub name: String,
    pub company: String,
    pub metadata: Option<serde_json::Value>,
}

impl CallTarget {
    pub fn new(phone: &str, name: &str, company: &str) -> Self {
        CallTarget {
            phone: normalize_phone(phone),
            name: name.to_string(),
            company: company.to_string(),
            metadata: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CallPlacement {
    pub call_id: String,
    pub status: String,
}

/// Datos del lead necesarios para agendar y confirmar una reunión.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeadInfo {
    pub name: String,
    pub email: String,
    pub company: String,
    pub phone: String,
}

/// Resultado de consultar el estado/transcripción de una llamada.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TranscriptFetch {
    pub call_id: String,
    pub status: String,
    pub transcript: String,
    pub has_recording: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recording_url: Option<String>,
}

/// Turno de conversación devuelto por el proveedor de voz.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TranscriptTurn {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}
