//! models/webhook_model.rs
//! Payload que se reporta al backend al terminar cada llamada.

use serde::{Deserialize, Serialize};

use crate::models::classification_model::Outcome;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutcomePayload {
    pub call_id: String,
    pub contact_id: serde_json::Value,
    pub campaign_id: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<serde_json::Value>,
    pub outcome: Outcome,
    pub picked: bool,
    pub transcript: String,
    pub meeting_time: Option<String>,
    pub meeting_link: Option<String>,
    pub meeting_id: Option<String>,
}
