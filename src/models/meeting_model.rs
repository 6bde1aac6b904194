//! models/meeting_model.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reunión agendada para un lead calificado.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MeetingRecord {
    pub link: String,
    pub scheduled_time: DateTime<Utc>,
    pub email_sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting_id: Option<String>,
}

impl MeetingRecord {
    pub fn display_time(&self) -> String {
        format_meeting_time(self.scheduled_time)
    }
}

/// Lo que devuelve el servicio de calendario antes de enviar el correo.
#[derive(Debug, Clone, PartialEq)]
pub struct BookedMeeting {
    pub link: String,
    pub scheduled_time: DateTime<Utc>,
    pub duration_minutes: i64,
    pub meeting_id: Option<String>,
}

impl BookedMeeting {
    /// Formato legible que va en el correo y en el webhook.
    pub fn display_time(&self) -> String {
        format_meeting_time(self.scheduled_time)
    }
}

fn format_meeting_time(time: DateTime<Utc>) -> String {
    time.format("%B %d, %Y at %I:%M %p UTC").to_string()
}
