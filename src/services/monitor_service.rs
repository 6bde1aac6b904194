//! services/monitor_service.rs
//! Monitoreo en segundo plano de una llamada: polling hasta estado terminal o
//! agotar intentos, transcripción final, clasificación, reunión (si califica)
//! y un único reporte al backend.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::sleep;

use crate::config::app_config::MonitorConfig;
use crate::models::call_model::{CallContext, CallSession, CallStatus, LeadInfo};
use crate::models::classification_model::ClassificationResult;
use crate::models::company_model::CompanyDetails;
use crate::models::meeting_model::MeetingRecord;
use crate::models::webhook_model::OutcomePayload;
use crate::services::classifier_service::{OutcomeClassifier, MIN_TRANSCRIPT_CHARS};
use crate::services::dispatch_service::MeetingDispatch;
use crate::services::notifier_service::BackendNotifier;
use crate::services::voice_service::TranscriptFetcher;

/// Todo lo que un monitor necesita; la tarea es dueña exclusiva de esto.
#[derive(Debug, Clone)]
pub struct MonitorJob {
    pub session: CallSession,
    pub context: CallContext,
    pub lead: Option<LeadInfo>,
    pub company: Option<CompanyDetails>,
}

#[derive(Debug, Clone)]
pub struct MonitorReport {
    pub session: CallSession,
    pub classification: ClassificationResult,
    pub meeting: Option<MeetingRecord>,
    pub picked: bool,
    pub polls: u32,
    pub notified: bool,
}

#[derive(Clone)]
pub struct CallMonitor {
    fetcher: Arc<dyn TranscriptFetcher>,
    notifier: Arc<dyn BackendNotifier>,
    classifier: OutcomeClassifier,
    dispatch: Option<MeetingDispatch>,
    config: MonitorConfig,
}

/// Una llamada se considera contestada si la transcripción supera 10 caracteres.
pub fn was_picked(transcript: &str) -> bool {
    transcript.chars().count() > MIN_TRANSCRIPT_CHARS
}

impl CallMonitor {
    pub fn new(
        fetcher: Arc<dyn TranscriptFetcher>,
        notifier: Arc<dyn BackendNotifier>,
        classifier: OutcomeClassifier,
        dispatch: Option<MeetingDispatch>,
        config: MonitorConfig,
    ) -> Self {
        CallMonitor {
            fetcher,
            notifier,
            classifier,
            dispatch,
            config,
        }
    }

    /// Lanza el monitor como tarea independiente. No hay cancelación.
    pub fn spawn(&self, job: MonitorJob) -> JoinHandle<()> {
        let monitor = self.clone();
        let call_id = job.session.call_id.clone();
        log::info!("(spawn) Iniciando monitoreo en segundo plano para {}", call_id);

        tokio::spawn(async move {
            // Con panic = unwind el panic del monitor llega como JoinError;
            // el perfil release usa panic = "abort" y ahí no hay aislamiento.
            match tokio::spawn(async move { monitor.run(job).await }).await {
                Ok(report) => log::info!(
                    "(spawn) Monitoreo terminado para {}: status={:?} polls={} picked={} outcome={} meeting={} notified={}",
                    call_id,
                    report.session.status,
                    report.polls,
                    report.picked,
                    report.classification.outcome.as_str(),
                    report
                        .meeting
                        .as_ref()
                        .map(|m| m.link.as_str())
                        .unwrap_or("-"),
                    report.notified
                ),
                Err(e) => log::error!("(spawn) El monitor de {} abortó: {:?}", call_id, e),
            }
        })
    }

    /// Ejecuta el ciclo completo. Nunca devuelve error: todo fallo se registra
    /// y se degrada a datos vacíos.
    pub async fn run(&self, job: MonitorJob) -> MonitorReport {
        let MonitorJob {
            mut session,
            context,
            lead,
            company,
        } = job;
        let call_id = session.call_id.clone();

        session.status = CallStatus::InProgress;
        let (terminal_status, polls) = self.poll_until_terminal(&call_id).await;

        session.status = match terminal_status.as_deref() {
            Some(s) if self.config.is_failure(s) => CallStatus::Failed,
            Some(_) => CallStatus::Completed,
            None => {
                log::warn!(
                    "(run) {} sin estado terminal tras {} intentos",
                    call_id,
                    polls
                );
                CallStatus::TimedOut
            }
        };

        session.transcript = match self.fetcher.fetch(&call_id).await {
            Ok(fetch) => fetch.transcript,
            Err(e) => {
                log::error!("(run) Fallo la transcripción final de {}: {:?}", call_id, e);
                String::new()
            }
        };

        let classification = self.classifier.classify(&session.transcript);
        session.set_outcome(classification.outcome);
        let picked = was_picked(&session.transcript);
        log::info!(
            "(run) {} -> outcome={} qualified={} picked={}",
            call_id,
            classification.outcome.as_str(),
            classification.qualified,
            picked
        );

        let meeting = if classification.qualified {
            self.dispatch_meeting(&call_id, lead.as_ref(), company.as_ref())
                .await
        } else {
            None
        };

        let payload = build_payload(&session, &context, &classification, picked, meeting.as_ref());
        let notified = self.notifier.notify(&payload).await;

        MonitorReport {
            session,
            classification,
            meeting,
            picked,
            polls,
            notified,
        }
    }

    /// Devuelve el estado terminal (si se alcanzó) y cuántas consultas se hicieron.
    async fn poll_until_terminal(&self, call_id: &str) -> (Option<String>, u32) {
        let max_polls = self.config.max_polls;
        for attempt in 1..=max_polls {
            match self.fetcher.fetch(call_id).await {
                Ok(fetch) if self.config.is_terminal(&fetch.status) => {
                    log::info!("(poll) {} terminó con estado {}", call_id, fetch.status);
                    return (Some(fetch.status), attempt);
                }
                Ok(fetch) => {
                    log::debug!("(poll) {} está {} ({}/{})", call_id, fetch.status, attempt, max_polls);
                }
                Err(e) => {
                    log::error!(
                        "(poll) Error consultando estado de {} ({}/{}): {:?}",
                        call_id,
                        attempt,
                        max_polls,
                        e
                    );
                }
            }
            if attempt < max_polls {
                sleep(self.config.poll_interval).await;
            }
        }
        (None, max_polls)
    }

    async fn dispatch_meeting(
        &self,
        call_id: &str,
        lead: Option<&LeadInfo>,
        company: Option<&CompanyDetails>,
    ) -> Option<MeetingRecord> {
        let (Some(dispatch), Some(lead)) = (self.dispatch.as_ref(), lead) else {
            log::info!(
                "(run) {} calificado pero sin datos de lead o sin calendario; no se agenda",
                call_id
            );
            return None;
        };
        dispatch.dispatch(lead, company).await
    }
}

pub fn build_payload(
    session: &CallSession,
    context: &CallContext,
    classification: &ClassificationResult,
    picked: bool,
    meeting: Option<&MeetingRecord>,
) -> OutcomePayload {
    OutcomePayload {
        call_id: session.call_id.clone(),
        contact_id: context.contact_id.clone(),
        campaign_id: context.campaign_id.clone(),
        user_id: context
            .contact_data
            .as_ref()
            .and_then(|c| c.user_id.clone()),
        outcome: session.outcome().unwrap_or(classification.outcome),
        picked,
        transcript: session.transcript.clone(),
        meeting_time: meeting.map(|m| m.display_time()),
        meeting_link: meeting.map(|m| m.link.clone()),
        meeting_id: meeting.and_then(|m| m.meeting_id.clone()),
    }
}
