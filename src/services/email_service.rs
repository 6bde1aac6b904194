//! services/email_service.rs
//! Correo de confirmación de reunión vía SMTP (lettre).

use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::app_config::{require, SmtpConfig};
use crate::models::call_model::LeadInfo;
use crate::models::company_model::CompanyDetails;
use crate::models::meeting_model::BookedMeeting;

const SEND_TIMEOUT_SECS: u64 = 30;

#[async_trait]
pub trait ConfirmationMailer: Send + Sync {
    /// `company` presente: el correo sale firmado por esa empresa.
    async fn send_confirmation(
        &self,
        lead: &LeadInfo,
        meeting: &BookedMeeting,
        company: Option<&CompanyDetails>,
    ) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct SmtpMailer {
    config: SmtpConfig,
}

impl SmtpMailer {
    pub fn new(config: SmtpConfig) -> Self {
        SmtpMailer { config }
    }

    fn transport(&self, user: &str, pass: &str) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
        let creds = Credentials::new(user.to_string(), pass.to_string());
        let builder = if self.config.use_tls {
            let tls_params = TlsParameters::new(self.config.host.clone())?;
            AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.host)?
                .tls(Tls::Required(tls_params))
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.config.host)
        };
        Ok(builder.port(self.config.port).credentials(creds).build())
    }
}

pub fn confirmation_subject(lead: &LeadInfo, company: Option<&CompanyDetails>) -> String {
    match company {
        Some(c) => format!("Meeting Confirmation - {}", c.company_name),
        None => format!("Meeting Confirmed - Demo for {}", lead.name),
    }
}

pub fn render_confirmation_html(
    lead: &LeadInfo,
    meeting: &BookedMeeting,
    company: Option<&CompanyDetails>,
) -> String {
    let signature = match company {
        Some(c) => format!(
            "<p>If you have any questions, reach out to us at {} or {}.</p>\
             <p style=\"color: #7f8c8d; margin-top: 30px;\">Best regards,<br><strong>{}</strong><br>{}</p>",
            c.email, c.phone_number, c.company_name, c.company_url
        ),
        None => "<p style=\"color: #7f8c8d; margin-top: 30px;\">Best regards,<br><strong>AI SDR Team</strong></p>"
            .to_string(),
    };

    format!(
        r#"<html>
<body style="font-family: Arial; color: #333;">
  <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
    <h2>Great News, {name}!</h2>
    <p>Thank you for your interest! We're excited to show you how we can help {lead_company}.</p>
    <div style="background: #f8f9fa; padding: 20px; border-radius: 8px; margin: 20px 0;">
      <h3>Meeting Details</h3>
      <p><strong>Time:</strong> {time}</p>
      <p><strong>Duration:</strong> {duration} minutes</p>
      <p><strong>Link:</strong> <a href="{link}">{link}</a></p>
    </div>
    <p>Looking forward to speaking with you!</p>
    {signature}
  </div>
</body>
</html>"#,
        name = lead.name,
        lead_company = lead.company,
        time = meeting.display_time(),
        duration = meeting.duration_minutes,
        link = meeting.link,
        signature = signature,
    )
}

#[async_trait]
impl ConfirmationMailer for SmtpMailer {
    async fn send_confirmation(
        &self,
        lead: &LeadInfo,
        meeting: &BookedMeeting,
        company: Option<&CompanyDetails>,
    ) -> Result<()> {
        let user = require(&self.config.user, "SMTP_USER")?;
        let pass = require(&self.config.password, "SMTP_PASSWORD")?;

        let from: Mailbox = match company {
            Some(c) => format!("{} <{}>", c.company_name, user),
            None => user.to_string(),
        }
        .parse()
        .context("Invalid from address")?;
        let to: Mailbox = lead.email.parse().context("Invalid recipient address")?;

        let html_part = SinglePart::builder()
            .header(ContentType::parse("text/html; charset=utf-8")?)
            .body(render_confirmation_html(lead, meeting, company));

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(confirmation_subject(lead, company))
            .multipart(MultiPart::alternative().singlepart(html_part))?;

        let mailer = self.transport(user, pass)?;
        tokio::time::timeout(
            std::time::Duration::from_secs(SEND_TIMEOUT_SECS),
            mailer.send(message),
        )
        .await??;

        log::info!("(SmtpMailer::send_confirmation) Correo enviado a {}", lead.email);
        Ok(())
    }
}
