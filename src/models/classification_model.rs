//! models/classification_model.rs

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Interested,
    NotInterested,
    Callback,
    NoResponse,
    Unclear,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Interested => "interested",
            Outcome::NotInterested => "not_interested",
            Outcome::Callback => "callback",
            Outcome::NoResponse => "no_response",
            Outcome::Unclear => "unclear",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FollowUpAction {
    ScheduleMeeting,
    Blocklist,
    ScheduleCallback,
    FollowUp,
}

/// Resultado inmutable de clasificar una transcripción.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassificationResult {
    pub outcome: Outcome,
    pub qualified: bool,
    pub action: FollowUpAction,
    /// Sólo la variante con puntaje la produce.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// POST /api/analyze
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeRequest {
    pub transcript: String,
}
