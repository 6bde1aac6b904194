//! tests/support.rs
//! Dobles de prueba compartidos: fetchers guionados, notificador que graba,
//! agenda/correo falsos y servidores HTTP locales.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use actix_web::dev::ServerHandle;
use actix_web::{web, App, HttpServer};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use crate::config::app_config::MonitorConfig;
use crate::models::call_model::{LeadInfo, TranscriptFetch};
use crate::models::company_model::CompanyDetails;
use crate::models::meeting_model::BookedMeeting;
use crate::models::webhook_model::OutcomePayload;
use crate::services::calendar_service::MeetingBooker;
use crate::services::email_service::ConfirmationMailer;
use crate::services::notifier_service::BackendNotifier;
use crate::services::voice_service::TranscriptFetcher;

/// Monitor rápido para pruebas: pocos intentos, casi sin espera.
pub fn fast_monitor_config(max_polls: u32) -> MonitorConfig {
    MonitorConfig {
        max_polls,
        poll_interval: Duration::from_millis(1),
        ..MonitorConfig::default()
    }
}

/// Reporta "in_progress" hasta la consulta `finish_on` (1-based), luego `final_status`.
/// Con `fail` todas las consultas fallan.
pub struct ScriptedFetcher {
    calls: AtomicU32,
    finish_on: Option<u32>,
    final_status: &'static str,
    transcript: &'static str,
    fail: bool,
}

impl ScriptedFetcher {
    pub fn never_finishes(transcript: &'static str) -> Self {
        ScriptedFetcher {
            calls: AtomicU32::new(0),
            finish_on: None,
            final_status: "in_progress",
            transcript,
            fail: false,
        }
    }

    pub fn finishes_on(call: u32, status: &'static str, transcript: &'static str) -> Self {
        ScriptedFetcher {
            calls: AtomicU32::new(0),
            finish_on: Some(call),
            final_status: status,
            transcript,
            fail: false,
        }
    }

    pub fn always_fails() -> Self {
        ScriptedFetcher {
            calls: AtomicU32::new(0),
            finish_on: None,
            final_status: "in_progress",
            transcript: "",
            fail: true,
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranscriptFetcher for ScriptedFetcher {
    async fn fetch(&self, call_id: &str) -> Result<TranscriptFetch> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail {
            return Err(anyhow!("connection reset on poll {}", n));
        }
        let status = match self.finish_on {
            Some(finish_on) if n >= finish_on => self.final_status,
            _ => "in_progress",
        };
        Ok(TranscriptFetch {
            call_id: call_id.to_string(),
            status: status.to_string(),
            transcript: self.transcript.to_string(),
            has_recording: false,
            recording_url: None,
        })
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    payloads: Mutex<Vec<OutcomePayload>>,
}

impl RecordingNotifier {
    pub fn payloads(&self) -> Vec<OutcomePayload> {
        self.payloads.lock().unwrap().clone()
    }
}

#[async_trait]
impl BackendNotifier for RecordingNotifier {
    async fn notify(&self, payload: &OutcomePayload) -> bool {
        self.payloads.lock().unwrap().push(payload.clone());
        true
    }
}

pub struct FakeBooker {
    pub fail: bool,
}

#[async_trait]
impl MeetingBooker for FakeBooker {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn book(&self, _lead: &LeadInfo) -> Result<BookedMeeting> {
        if self.fail {
            return Err(anyhow!("calendar unavailable"));
        }
        Ok(BookedMeeting {
            link: "https://meet.example.com/abc-defg".to_string(),
            scheduled_time: Utc.with_ymd_and_hms(2026, 4, 1, 14, 0, 0).unwrap(),
            duration_minutes: 30,
            meeting_id: Some("evt_1".to_string()),
        })
    }
}

#[derive(Default)]
pub struct FakeMailer {
    pub fail: bool,
    sent: Mutex<Vec<(String, Option<String>)>>,
}

impl FakeMailer {
    pub fn failing() -> Self {
        FakeMailer {
            fail: true,
            ..FakeMailer::default()
        }
    }

    /// (destinatario, empresa firmante)
    pub fn sent(&self) -> Vec<(String, Option<String>)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ConfirmationMailer for FakeMailer {
    async fn send_confirmation(
        &self,
        lead: &LeadInfo,
        _meeting: &BookedMeeting,
        company: Option<&CompanyDetails>,
    ) -> Result<()> {
        if self.fail {
            return Err(anyhow!("smtp rejected"));
        }
        self.sent
            .lock()
            .unwrap()
            .push((lead.email.clone(), company.map(|c| c.company_name.clone())));
        Ok(())
    }
}

pub fn sample_lead() -> LeadInfo {
    LeadInfo {
        name: "Ana Torres".to_string(),
        email: "ana@example.com".to_string(),
        company: "Acme".to_string(),
        phone: "+15551234567".to_string(),
    }
}

pub fn sample_company() -> CompanyDetails {
    CompanyDetails {
        company_name: "Globex".to_string(),
        company_location: "Springfield".to_string(),
        phone_number: "+15550000000".to_string(),
        email: "sales@globex.example".to_string(),
        company_url: "https://globex.example".to_string(),
        company_knowledge_base: "We sell widgets".to_string(),
    }
}

/// Levanta un servidor actix en un puerto libre de 127.0.0.1.
/// Devuelve la URL base y el handle para detenerlo.
pub fn start_stub<F>(configure: F) -> (String, ServerHandle)
where
    F: Fn(&mut web::ServiceConfig) + Send + Clone + 'static,
{
    let server = HttpServer::new(move || App::new().configure(configure.clone()))
        .workers(1)
        .bind(("127.0.0.1", 0))
        .expect("no se pudo abrir puerto local");
    let addr = server.addrs()[0];
    let server = server.run();
    let handle = server.handle();
    actix_rt::spawn(server);
    (format!("http://{}", addr), handle)
}
