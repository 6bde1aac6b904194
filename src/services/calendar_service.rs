//! services/calendar_service.rs
//! Agenda de la demo para leads calificados: Cal.com o Google Calendar (Meet).
//! Cada reserva es una sola llamada externa, sin reintentos.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::config::app_config::{require, CalComConfig, GoogleCalendarConfig};
use crate::errors::CallAgentError;
use crate::models::call_model::LeadInfo;
use crate::models::meeting_model::BookedMeeting;

pub const DEMO_DURATION_MINUTES: i64 = 30;
const DEMO_HOUR_UTC: u32 = 14;

#[async_trait]
pub trait MeetingBooker: Send + Sync {
    fn name(&self) -> &'static str;

    async fn book(&self, lead: &LeadInfo) -> Result<BookedMeeting>;
}

/// Mañana a las 14:00 UTC.
pub fn next_demo_slot(now: DateTime<Utc>) -> DateTime<Utc> {
    let tomorrow = (now + Duration::days(1)).date_naive();
    tomorrow
        .and_hms_opt(DEMO_HOUR_UTC, 0, 0)
        .map(|naive| naive.and_utc())
        .unwrap_or(now + Duration::days(1))
}

async fn ensure_success(resp: reqwest::Response, service: &'static str) -> Result<reqwest::Response> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    Err(CallAgentError::Upstream {
        service,
        status,
        body,
    }
    .into())
}

// ============================================================
// Cal.com
// ============================================================

#[derive(Clone)]
pub struct CalComBooker {
    config: CalComConfig,
    http_client: Client,
}

#[derive(Debug, Deserialize)]
struct CalComBooking {
    #[serde(default)]
    uid: Option<String>,
    #[serde(default)]
    id: Option<serde_json::Value>,
    #[serde(default)]
    booking_url: Option<String>,
    #[serde(default, rename = "startTime")]
    start_time: Option<DateTime<Utc>>,
}

impl CalComBooker {
    pub fn new(config: CalComConfig, http_client: Client) -> Self {
        CalComBooker {
            config,
            http_client,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.config.api_key.is_some() && self.config.event_type_id.is_some()
    }
}

#[async_trait]
impl MeetingBooker for CalComBooker {
    fn name(&self) -> &'static str {
        "Cal.com"
    }

    async fn book(&self, lead: &LeadInfo) -> Result<BookedMeeting> {
        let api_key = require(&self.config.api_key, "CALCOM_API_KEY")?;
        let event_type_id = self
            .config
            .event_type_id
            .ok_or(CallAgentError::MissingCredentials("CALCOM_EVENT_TYPE_ID"))?;

        let start = next_demo_slot(Utc::now());
        let payload = json!({
            "eventTypeId": event_type_id,
            "start": start.to_rfc3339(),
            "timeZone": "UTC",
            "language": "en",
            "name": lead.name,
            "email": lead.email,
            "responses": { "name": lead.name, "email": lead.email },
            "metadata": { "phone": lead.phone, "company": lead.company },
        });

        log::info!("(CalComBooker::book) Reservando demo para {}", lead.email);
        let resp = self
            .http_client
            .post(format!("{}/bookings", self.config.base_url))
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await
            .context("(CalComBooker::book) Fallo al crear booking")?;
        let booking: CalComBooking = ensure_success(resp, "Cal.com")
            .await?
            .json()
            .await
            .context("(CalComBooker::book) Respuesta JSON inválida")?;

        let link = match (&booking.booking_url, &booking.uid) {
            (Some(url), _) => url.clone(),
            (None, Some(uid)) => format!("https://cal.com/booking/{}", uid),
            (None, None) => return Err(anyhow!("Cal.com booking without uid or url")),
        };
        let meeting_id = booking.uid.clone().or_else(|| {
            booking.id.as_ref().map(|v| match v.as_str() {
                Some(s) => s.to_string(),
                None => v.to_string(),
            })
        });

        Ok(BookedMeeting {
            link,
            scheduled_time: booking.start_time.unwrap_or(start),
            duration_minutes: DEMO_DURATION_MINUTES,
            meeting_id,
        })
    }
}

// ============================================================
// Google Calendar + Meet
// ============================================================

#[derive(Clone)]
pub struct GoogleCalendarBooker {
    config: GoogleCalendarConfig,
    http_client: Client,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct CalendarEvent {
    id: String,
    #[serde(default, rename = "hangoutLink")]
    hangout_link: Option<String>,
    #[serde(default, rename = "conferenceData")]
    conference_data: Option<ConferenceData>,
}

#[derive(Debug, Deserialize)]
struct ConferenceData {
    #[serde(default, rename = "entryPoints")]
    entry_points: Vec<EntryPoint>,
}

#[derive(Debug, Deserialize)]
struct EntryPoint {
    #[serde(default)]
    uri: Option<String>,
}

impl GoogleCalendarBooker {
    pub fn new(config: GoogleCalendarConfig, http_client: Client) -> Self {
        GoogleCalendarBooker {
            config,
            http_client,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.config.client_id.is_some()
            && self.config.client_secret.is_some()
            && self.config.refresh_token.is_some()
    }

    /// Cambia el refresh token por un access token (uno por reserva).
    async fn access_token(&self) -> Result<String> {
        let client_id = require(&self.config.client_id, "GOOGLE_CLIENT_ID")?;
        let client_secret = require(&self.config.client_secret, "GOOGLE_CLIENT_SECRET")?;
        let refresh_token = require(&self.config.refresh_token, "GOOGLE_REFRESH_TOKEN")?;

        let resp = self
            .http_client
            .post(&self.config.token_url)
            .form(&[
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .context("(GoogleCalendarBooker) Fallo al refrescar token")?;
        let token: TokenResponse = ensure_success(resp, "Google OAuth").await?.json().await?;
        Ok(token.access_token)
    }
}

#[async_trait]
impl MeetingBooker for GoogleCalendarBooker {
    fn name(&self) -> &'static str {
        "Google Calendar"
    }

    async fn book(&self, lead: &LeadInfo) -> Result<BookedMeeting> {
        let token = self.access_token().await?;

        let now = Utc::now();
        let start = next_demo_slot(now);
        let end = start + Duration::minutes(DEMO_DURATION_MINUTES);
        let event = json!({
            "summary": format!("Demo Meeting - {}", lead.company),
            "description": format!("Product demo with {} from {}", lead.name, lead.company),
            "start": { "dateTime": start.to_rfc3339(), "timeZone": "UTC" },
            "end": { "dateTime": end.to_rfc3339(), "timeZone": "UTC" },
            "attendees": [{ "email": lead.email }],
            "conferenceData": {
                "createRequest": {
                    "requestId": format!("meet-{}", now.timestamp()),
                    "conferenceSolutionKey": { "type": "hangoutsMeet" }
                }
            },
            "reminders": {
                "useDefault": false,
                "overrides": [
                    { "method": "email", "minutes": 24 * 60 },
                    { "method": "popup", "minutes": 30 }
                ]
            }
        });

        let url = format!(
            "{}/calendars/{}/events?conferenceDataVersion=1",
            self.config.base_url,
            urlencoding::encode(&self.config.calendar_id)
        );
        log::info!("(GoogleCalendarBooker::book) Creando evento para {}", lead.email);
        let resp = self
            .http_client
            .post(&url)
            .bearer_auth(&token)
            .json(&event)
            .send()
            .await
            .context("(GoogleCalendarBooker::book) Fallo al crear evento")?;
        let created: CalendarEvent = ensure_success(resp, "Google Calendar")
            .await?
            .json()
            .await
            .context("(GoogleCalendarBooker::book) Respuesta JSON inválida")?;

        let link = created
            .hangout_link
            .clone()
            .or_else(|| {
                created
                    .conference_data
                    .as_ref()
                    .and_then(|c| c.entry_points.first())
                    .and_then(|e| e.uri.clone())
            })
            .unwrap_or_default();

        log::info!("(GoogleCalendarBooker::book) Reunión creada: {}", link);
        Ok(BookedMeeting {
            link,
            scheduled_time: start,
            duration_minutes: DEMO_DURATION_MINUTES,
            meeting_id: Some(created.id),
        })
    }
}
