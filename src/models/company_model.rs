//! models/company_model.rs
//! Empresas (quien vende) y clientes (a quien se llama).

use serde::{Deserialize, Serialize};

use crate::models::call_model::LeadInfo;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompanyDetails {
    pub company_name: String,
    pub company_location: String,
    pub phone_number: String,
    pub email: String,
    pub company_url: String,
    pub company_knowledge_base: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientData {
    pub name: String,
    pub phone_number: String,
    pub email: String,
    pub company_name: String,
}

impl ClientData {
    pub fn to_lead(&self) -> LeadInfo {
        LeadInfo {
            name: self.name.clone(),
            email: self.email.clone(),
            company: self.company_name.clone(),
            phone: self.phone_number.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CompanyResponse {
    pub company_id: String,
    pub message: String,
}

/// POST /api/call/complete
#[derive(Debug, Clone, Deserialize)]
pub struct CallCompletionRequest {
    pub company_id: String,
    pub transcript: String,
    pub outcome: String,
    #[serde(default)]
    pub client_data: Option<ClientData>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CallCompletionResponse {
    pub client_id: String,
    pub transcript: String,
    pub outcome: String,
    pub meeting_booked: bool,
    pub meeting_link: Option<String>,
    pub email_sent: bool,
    pub client_data: Option<ClientData>,
    pub timestamp: String,
}

/// POST /api/email/reply
#[derive(Debug, Clone, Deserialize)]
pub struct EmailReplyRequest {
    pub company_id: String,
    pub client_data: ClientData,
    pub reply_status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmailReplyResponse {
    pub call_triggered: bool,
    pub call_id: Option<String>,
    pub message: String,
}
