//! services/twilio_service.rs
//! Gateway de voz directo contra la API REST de Twilio (TwiML inline + grabación
//! con transcripción).

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::app_config::{require, TwilioConfig};
use crate::errors::CallAgentError;
use crate::models::call_model::{CallPlacement, CallTarget, TranscriptFetch};
use crate::services::voice_service::{TranscriptFetcher, VoiceGateway};

const API_VERSION: &str = "2010-04-01";

#[derive(Clone)]
pub struct TwilioGateway {
    config: TwilioConfig,
    http_client: Client,
}

#[derive(Debug, Deserialize)]
struct TwilioCall {
    sid: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct RecordingList {
    #[serde(default)]
    recordings: Vec<Recording>,
}

#[derive(Debug, Deserialize)]
struct Recording {
    sid: String,
    uri: String,
}

#[derive(Debug, Deserialize)]
struct TranscriptionList {
    #[serde(default)]
    transcriptions: Vec<Transcription>,
}

#[derive(Debug, Deserialize)]
struct Transcription {
    status: String,
    #[serde(default)]
    transcription_text: Option<String>,
}

impl TwilioGateway {
    pub fn new(config: TwilioConfig, http_client: Client) -> Self {
        if config.account_sid.is_none() || config.auth_token.is_none() {
            log::warn!("(TwilioGateway::new) Faltan credenciales de Twilio; las llamadas fallarán.");
        }
        TwilioGateway {
            config,
            http_client,
        }
    }

    fn credentials(&self) -> Result<(&str, &str), CallAgentError> {
        let sid = require(&self.config.account_sid, "TWILIO_ACCOUNT_SID")?;
        let token = require(&self.config.auth_token, "TWILIO_AUTH_TOKEN")?;
        Ok((sid, token))
    }

    fn account_url(&self, sid: &str) -> String {
        format!("{}/{}/Accounts/{}", self.config.base_url, API_VERSION, sid)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let (sid, token) = self.credentials()?;
        let resp = self
            .http_client
            .get(url)
            .basic_auth(sid, Some(token))
            .send()
            .await
            .with_context(|| format!("(TwilioGateway) Fallo GET {}", url))?;
        parse_response(resp).await
    }
}

async fn parse_response<T: DeserializeOwned>(resp: Response) -> Result<T> {
    if !resp.status().is_success() {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        return Err(CallAgentError::Upstream {
            service: "Twilio",
            status,
            body,
        }
        .into());
    }
    resp.json::<T>()
        .await
        .context("(TwilioGateway) Respuesta JSON inválida")
}

/// Twilio tiene varios estados finales de "no contestó"; se reportan como `failed`.
pub fn normalize_call_status(status: &str) -> String {
    match status {
        "busy" | "no-answer" | "canceled" => "failed".to_string(),
        other => other.to_string(),
    }
}

/// TwiML del saludo; graba la respuesta del lead con transcripción.
pub fn build_twiml(name: &str, company: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<Response>
    <Say voice="Polly.Joanna">Hello {}, this is an A I assistant from {}. We wanted to reach out about our services. Are you interested in scheduling a demo? Please respond after the beep.</Say>
    <Record maxLength="10" transcribe="true" />
    <Say voice="Polly.Joanna">Thank you for your response. Goodbye.</Say>
</Response>"#,
        xml_escape(name),
        xml_escape(company)
    )
}

fn xml_escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[async_trait]
impl TranscriptFetcher for TwilioGateway {
    async fn fetch(&self, call_id: &str) -> Result<TranscriptFetch> {
        let (sid, _) = self.credentials()?;
        let base = self.account_url(sid);

        let call: TwilioCall = self
            .get_json(&format!("{}/Calls/{}.json", base, call_id))
            .await?;

        let recordings: RecordingList = self
            .get_json(&format!(
                "{}/Recordings.json?CallSid={}",
                base,
                urlencoding::encode(call_id)
            ))
            .await?;

        let mut texts = Vec::new();
        for rec in &recordings.recordings {
            let list: TranscriptionList = self
                .get_json(&format!("{}/Recordings/{}/Transcriptions.json", base, rec.sid))
                .await?;
            texts.extend(
                list.transcriptions
                    .into_iter()
                    .filter(|t| t.status == "completed")
                    .filter_map(|t| t.transcription_text)
                    .filter(|t| !t.trim().is_empty()),
            );
        }

        let recording_url = recordings.recordings.first().map(|rec| {
            format!(
                "{}{}",
                self.config.base_url,
                rec.uri.replace(".json", ".mp3")
            )
        });

        Ok(TranscriptFetch {
            call_id: call.sid,
            status: normalize_call_status(&call.status),
            transcript: texts.join(" ").trim().to_string(),
            has_recording: !recordings.recordings.is_empty(),
            recording_url,
        })
    }
}

#[async_trait]
impl VoiceGateway for TwilioGateway {
    fn provider_name(&self) -> &'static str {
        "Twilio"
    }

    async fn place_call(&self, target: &CallTarget) -> Result<CallPlacement> {
        let (sid, token) = self.credentials()?;
        let from = require(&self.config.phone_number, "TWILIO_PHONE_NUMBER")?;
        let twiml = build_twiml(&target.name, &target.company);

        log::info!(
            "(TwilioGateway::place_call) Llamando a {} en {}",
            target.name,
            target.phone
        );
        let resp = self
            .http_client
            .post(format!("{}/Calls.json", self.account_url(sid)))
            .basic_auth(sid, Some(token))
            .form(&[
                ("To", target.phone.as_str()),
                ("From", from),
                ("Twiml", twiml.as_str()),
                ("Record", "true"),
            ])
            .send()
            .await
            .context("(TwilioGateway::place_call) Fallo al crear la llamada")?;

        let call: TwilioCall = parse_response(resp).await?;
        log::info!("(TwilioGateway::place_call) Llamada iniciada: {}", call.sid);
        Ok(CallPlacement {
            call_id: call.sid,
            status: call.status,
        })
    }
}
