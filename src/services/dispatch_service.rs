//! services/dispatch_service.rs
//! Reserva + correo de confirmación para un lead calificado.

use std::sync::Arc;

use crate::models::call_model::LeadInfo;
use crate::models::company_model::CompanyDetails;
use crate::models::meeting_model::{BookedMeeting, MeetingRecord};
use crate::services::calendar_service::MeetingBooker;
use crate::services::email_service::ConfirmationMailer;

#[derive(Clone)]
pub struct MeetingDispatch {
    booker: Arc<dyn MeetingBooker>,
    mailer: Arc<dyn ConfirmationMailer>,
}

impl MeetingDispatch {
    pub fn new(booker: Arc<dyn MeetingBooker>, mailer: Arc<dyn ConfirmationMailer>) -> Self {
        MeetingDispatch { booker, mailer }
    }

    /// `None` si la reserva falla. Un fallo del correo deja `email_sent = false`.
    pub async fn dispatch(
        &self,
        lead: &LeadInfo,
        company: Option<&CompanyDetails>,
    ) -> Option<MeetingRecord> {
        log::info!(
            "(dispatch) Agendando con {} para {}",
            self.booker.name(),
            lead.email
        );
        let booked: BookedMeeting = match self.booker.book(lead).await {
            Ok(b) => b,
            Err(e) => {
                log::error!(
                    "(dispatch) Fallo al agendar en {}: {:?}",
                    self.booker.name(),
                    e
                );
                return None;
            }
        };

        let email_sent = match self.mailer.send_confirmation(lead, &booked, company).await {
            Ok(()) => true,
            Err(e) => {
                log::error!("(dispatch) Fallo al enviar confirmación a {}: {:?}", lead.email, e);
                false
            }
        };

        Some(MeetingRecord {
            link: booked.link,
            scheduled_time: booked.scheduled_time,
            email_sent,
            meeting_id: booked.meeting_id,
        })
    }
}
