//! services/call_service.rs
//! Capa de negocio detrás de los endpoints de llamadas: dispara la llamada y
//! deja el monitor corriendo, consulta transcripciones y procesa los flujos
//! de cierre manual y de respuesta por correo.

use std::sync::Arc;

use anyhow::Result;
use serde_json::json;
use uuid::Uuid;

use crate::errors::CallAgentError;
use crate::models::call_model::{
    CallContext, CallPlacement, CallRequest, CallSession, CallTarget, LeadInfo, TranscriptFetch,
};
use crate::models::classification_model::ClassificationResult;
use crate::models::company_model::{
    CallCompletionRequest, CallCompletionResponse, CompanyDetails, EmailReplyRequest,
    EmailReplyResponse,
};
use crate::services::classifier_service::OutcomeClassifier;
use crate::services::company_service::CompanyService;
use crate::services::dispatch_service::MeetingDispatch;
use crate::services::monitor_service::{CallMonitor, MonitorJob};
use crate::services::voice_service::VoiceGateway;
use crate::utils::utc_timestamp;

/// Resultados (en texto libre) que justifican agendar en el cierre manual.
const BOOKABLE_OUTCOMES: &[&str] = &["interested_demo", "interested", "schedule_demo"];

pub fn should_book_meeting(outcome: &str) -> bool {
    let outcome = outcome.trim().to_lowercase();
    BOOKABLE_OUTCOMES.iter().any(|o| *o == outcome)
}

#[derive(Clone)]
pub struct CallService {
    gateway: Arc<dyn VoiceGateway>,
    monitor: CallMonitor,
    classifier: OutcomeClassifier,
    companies: CompanyService,
    dispatch: Option<MeetingDispatch>,
}

impl CallService {
    pub fn new(
        gateway: Arc<dyn VoiceGateway>,
        monitor: CallMonitor,
        classifier: OutcomeClassifier,
        companies: CompanyService,
        dispatch: Option<MeetingDispatch>,
    ) -> Self {
        CallService {
            gateway,
            monitor,
            classifier,
            companies,
            dispatch,
        }
    }

    pub fn companies(&self) -> &CompanyService {
        &self.companies
    }

    /// Dispara la llamada y, si el proveedor devolvió id, deja el monitor corriendo.
    /// Responde apenas el proveedor contesta; no espera al monitor.
    pub async fn start_call(&self, req: CallRequest) -> Result<CallPlacement> {
        let target = CallTarget::new(&req.phone, &req.name, &req.company);
        log::info!("(start_call) Llamando a {} en {}", req.name, target.phone);

        let placement = self.gateway.place_call(&target).await?;

        let context = req.context.unwrap_or_default();
        let email = req.email.clone().or_else(|| {
            context
                .contact_data
                .as_ref()
                .and_then(|c| c.email.clone())
        });
        let lead = email.map(|email| LeadInfo {
            name: req.name.clone(),
            email,
            company: req.company.clone(),
            phone: target.phone.clone(),
        });

        self.monitor.spawn(MonitorJob {
            session: CallSession::new(placement.call_id.clone(), &target.phone),
            context,
            lead,
            company: None,
        });

        Ok(placement)
    }

    pub async fn get_transcript(&self, call_id: &str) -> Result<TranscriptFetch> {
        self.gateway.fetch(call_id).await
    }

    pub fn analyze(&self, transcript: &str) -> ClassificationResult {
        self.classifier.classify(transcript)
    }

    async fn require_company(&self, company_id: &str) -> Result<CompanyDetails> {
        self.companies
            .get_company(company_id)
            .await?
            .ok_or_else(|| CallAgentError::NotFound("Company".to_string()).into())
    }

    /// Cierre manual de una llamada con datos del cliente.
    pub async fn complete_call(&self, req: CallCompletionRequest) -> Result<CallCompletionResponse> {
        let company = self.require_company(&req.company_id).await?;
        let client_id = Uuid::new_v4().to_string();

        let mut meeting_link = None;
        let mut email_sent = false;

        if let Some(client) = req.client_data.as_ref() {
            if should_book_meeting(&req.outcome) {
                self.companies.save_client(&client_id, client).await?;
                match self.dispatch.as_ref() {
                    Some(dispatch) => {
                        if let Some(record) = dispatch.dispatch(&client.to_lead(), Some(&company)).await {
                            email_sent = record.email_sent;
                            meeting_link = Some(record.link);
                        }
                    }
                    None => log::warn!("(complete_call) Sin servicio de calendario configurado"),
                }
            }
        }

        Ok(CallCompletionResponse {
            client_id,
            transcript: req.transcript,
            outcome: req.outcome,
            meeting_booked: meeting_link.is_some(),
            meeting_link,
            email_sent,
            client_data: req.client_data,
            timestamp: utc_timestamp(),
        })
    }

    /// Una respuesta positiva a un correo dispara la llamada al cliente.
    pub async fn handle_email_reply(&self, req: EmailReplyRequest) -> Result<EmailReplyResponse> {
        let company = self.require_company(&req.company_id).await?;

        if req.reply_status.trim().to_lowercase() != "positive" {
            return Ok(EmailReplyResponse {
                call_triggered: false,
                call_id: None,
                message: "No call triggered - reply was not positive".to_string(),
            });
        }

        let client = &req.client_data;
        let mut target = CallTarget::new(&client.phone_number, &client.name, &client.company_name);
        target.metadata = Some(json!({
            "client_name": client.name,
            "client_email": client.email,
            "client_company": client.company_name,
            "company_name": company.company_name,
            "company_phone": company.phone_number,
            "company_url": company.company_url,
            "context": company.company_knowledge_base,
        }));

        let provider = self.gateway.provider_name();
        match self.gateway.place_call(&target).await {
            Ok(placement) => {
                self.monitor.spawn(MonitorJob {
                    session: CallSession::new(placement.call_id.clone(), &target.phone),
                    context: CallContext::default(),
                    lead: Some(client.to_lead()),
                    company: Some(company),
                });
                Ok(EmailReplyResponse {
                    call_triggered: true,
                    call_id: Some(placement.call_id),
                    message: format!("{} call triggered successfully", provider),
                })
            }
            Err(e) => {
                log::error!("(handle_email_reply) Fallo al disparar llamada: {:?}", e);
                Ok(EmailReplyResponse {
                    call_triggered: false,
                    call_id: None,
                    message: format!("Failed to trigger {} call", provider),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bookable_outcomes_are_case_insensitive() {
        assert!(should_book_meeting("Interested"));
        assert!(should_book_meeting(" schedule_demo "));
        assert!(should_book_meeting("INTERESTED_DEMO"));
        assert!(!should_book_meeting("not_interested"));
        assert!(!should_book_meeting("callback"));
    }
}
