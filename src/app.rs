//! app.rs
use std::sync::Arc;
use std::time::Duration;

use crate::config::app_config::AppConfig;
use crate::handlers::{call_handler, company_handler};
use crate::services::calendar_service::{CalComBooker, GoogleCalendarBooker, MeetingBooker};
use crate::services::call_service::CallService;
use crate::services::classifier_service::OutcomeClassifier;
use crate::services::company_service::CompanyService;
use crate::services::dispatch_service::MeetingDispatch;
use crate::services::email_service::SmtpMailer;
use crate::services::monitor_service::CallMonitor;
use crate::services::notifier_service::WebhookNotifier;
use crate::services::record_store::RecordStore;
use crate::services::voice_service::VoiceClients;
use actix_web::{web, HttpResponse};
use serde_json::json;

/// Cliente HTTP compartido por gateways y calendarios. Todo request lleva
/// `timeout`, así cada consulta del monitor termina y siempre se notifica.
pub fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            log::error!("(http_client) No se pudo construir el cliente con timeout: {:?}", e);
            reqwest::Client::new()
        })
}

/// Arma todos los servicios a partir de la configuración.
/// Las credenciales faltantes no fallan aquí; fallan en el primer uso.
pub fn build_call_service(config: &AppConfig, store: Arc<dyn RecordStore>) -> CallService {
    let http_client = http_client(config.http_timeout);
    let voice = VoiceClients::from_config(config, http_client.clone());
    let classifier = OutcomeClassifier::new(config.keywords.clone());
    log::info!(
        "(build_call_service) Clasificador con {}/{}/{} palabras clave",
        classifier.keywords().positive.len(),
        classifier.keywords().negative.len(),
        classifier.keywords().callback.len()
    );

    let calcom = CalComBooker::new(config.calcom.clone(), http_client.clone());
    let google = GoogleCalendarBooker::new(config.google.clone(), http_client.clone());
    let booker: Arc<dyn MeetingBooker> = if !calcom.is_configured() && google.is_configured() {
        Arc::new(google)
    } else {
        Arc::new(calcom)
    };
    log::info!("(build_call_service) Calendario: {}", booker.name());
    let dispatch = MeetingDispatch::new(booker, Arc::new(SmtpMailer::new(config.smtp.clone())));

    let notifier = WebhookNotifier::new(config.webhook_url(), http_client);
    log::info!("(build_call_service) Webhook de resultados: {}", notifier.webhook_url());
    let monitor = CallMonitor::new(
        voice.fetcher,
        Arc::new(notifier),
        classifier.clone(),
        Some(dispatch.clone()),
        config.monitor.clone(),
    );

    CallService::new(
        voice.gateway,
        monitor,
        classifier,
        CompanyService::new(store),
        Some(dispatch),
    )
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "AI running",
        "service": "Call Agent Service"
    }))
}

pub fn init_app(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(health_check)).service(
        web::scope("/api")
            .route("/call", web::post().to(call_handler::make_call_endpoint))
            .route(
                "/call/complete",
                web::post().to(call_handler::complete_call_endpoint),
            )
            .route(
                "/transcript/{call_id}",
                web::get().to(call_handler::get_transcript_endpoint),
            )
            .route("/analyze", web::post().to(call_handler::analyze_endpoint))
            .route(
                "/email/reply",
                web::post().to(call_handler::email_reply_endpoint),
            )
            .service(
                web::scope("/company")
                    .route(
                        "",
                        web::post().to(company_handler::create_company_endpoint),
                    )
                    .route(
                        "/{id}",
                        web::get().to(company_handler::get_company_endpoint),
                    ),
            ),
    );
}
